use super::backend::{CreatedDevice, GraphicsBackend};
use super::error::DeviceError;
use super::init::DeviceInit;
use super::types::{AdapterLuid, CapabilityFlags, CreationFlags, DriverType, FeatureLevel};

/// Everything derived from one device creation call.
///
/// Device, context, interop handle, adapter and capabilities are created
/// together and replaced together; holders must re-fetch after recovery.
pub struct DeviceState<B: GraphicsBackend> {
    device: B::Device,
    context: B::Context,
    interop: B::Interop,
    adapter: B::Adapter,
    adapter_luid: AdapterLuid,
    driver_type: DriverType,
    feature_level: FeatureLevel,
    capabilities: CapabilityFlags,
}

impl<B: GraphicsBackend> DeviceState<B> {
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn context(&self) -> &B::Context {
        &self.context
    }

    /// Wrapper handed to the compositor. Always wraps `device()`.
    pub fn interop_device(&self) -> &B::Interop {
        &self.interop
    }

    /// Adapter backing `device()`, which may differ from the requested one
    /// after a software fallback.
    pub fn adapter(&self) -> &B::Adapter {
        &self.adapter
    }

    pub fn adapter_luid(&self) -> AdapterLuid {
        self.adapter_luid
    }

    pub fn driver_type(&self) -> DriverType {
        self.driver_type
    }

    pub fn feature_level(&self) -> FeatureLevel {
        self.feature_level
    }

    pub fn capabilities(&self) -> CapabilityFlags {
        self.capabilities
    }

    pub fn supports_vprt(&self) -> bool {
        self.capabilities.vprt
    }
}

/// Creates the factories that do not depend on a device.
pub fn create_device_independent_resources<B: GraphicsBackend>(
    backend: &B,
    init: &DeviceInit,
) -> Result<B::Factories, DeviceError> {
    let factories = backend
        .create_factories(init.debug_layer)
        .map_err(DeviceError::FactoryCreation)?;
    log::debug!("device-independent factories created");
    Ok(factories)
}

/// Creation flags for this configuration on this system.
pub fn creation_flags<B: GraphicsBackend>(backend: &B, init: &DeviceInit) -> CreationFlags {
    let mut flags = CreationFlags::BGRA_SUPPORT;

    if init.debug_layer {
        if backend.validation_layers_available() {
            flags |= CreationFlags::DEBUG;
        } else {
            log::warn!("debug layer requested but validation layers are not installed");
        }
    }

    flags
}

/// Creates the device, context and everything derived from them.
///
/// Hardware creation against `adapter` (or the system default) is tried
/// first; any failure falls back once to the software driver with no adapter
/// constraint.
pub fn create_device_resources<B: GraphicsBackend>(
    backend: &B,
    init: &DeviceInit,
    adapter: Option<&B::Adapter>,
) -> Result<DeviceState<B>, DeviceError> {
    let levels = init.feature_levels.as_slice();
    if levels.is_empty() {
        return Err(DeviceError::NoFeatureLevels);
    }
    let flags = creation_flags(backend, init);

    let (created, driver_type) =
        match backend.create_device(adapter, DriverType::Hardware, flags, levels) {
            Ok(created) => (created, DriverType::Hardware),
            Err(hardware) => {
                log::warn!("hardware device creation failed ({hardware}); falling back to software driver");
                match backend.create_device(None, DriverType::Software, flags, levels) {
                    Ok(created) => (created, DriverType::Software),
                    Err(software) => {
                        return Err(DeviceError::DeviceCreation { hardware, software });
                    }
                }
            }
        };

    let CreatedDevice {
        device,
        context,
        feature_level,
    } = created;

    let device = backend
        .promote_device(device)
        .map_err(DeviceError::interface("device level 3"))?;
    let context = backend
        .promote_context(context)
        .map_err(DeviceError::interface("multithreaded device context"))?;

    // The fallback path may have moved us to a different adapter.
    let adapter = backend
        .device_adapter(&device)
        .map_err(DeviceError::interface("device adapter query"))?;
    let adapter_luid = backend
        .adapter_luid(&adapter)
        .map_err(DeviceError::interface("adapter description"))?;

    let interop = backend
        .create_interop_device(&device)
        .map_err(DeviceError::interface("interop device"))?;

    let vprt = match backend.query_vprt_support(&device) {
        Ok(supported) => supported,
        Err(err) => {
            log::debug!("vprt capability query failed ({err}); assuming unsupported");
            false
        }
    };

    log::info!(
        "created {driver_type} device at feature level {feature_level} on adapter {adapter_luid} (vprt: {vprt})"
    );

    Ok(DeviceState {
        device,
        context,
        interop,
        adapter,
        adapter_luid,
        driver_type,
        feature_level,
        capabilities: CapabilityFlags { vprt },
    })
}
