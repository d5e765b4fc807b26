use std::sync::Arc;

use parking_lot::Mutex;

use super::platform::{SimRenderingParameters, SimView};
use super::{SimEvent, SimJournal};
use crate::device::{
    AdapterLuid, BackendError, BackendResult, CreatedDevice, CreationFlags, DriverType,
    FeatureLevel, GraphicsBackend, CODE_FAIL, CODE_NOT_FOUND, CODE_NO_INTERFACE, CODE_UNSUPPORTED,
};

/// LUID reported for the software rasterizer adapter.
pub const SOFTWARE_ADAPTER_LUID: AdapterLuid = AdapterLuid::new(0xFFFF_0001, 0);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimAdapter {
    pub luid: AdapterLuid,
    pub name: String,
    /// Highest feature level the adapter's driver accepts.
    pub max_level: FeatureLevel,
    pub software: bool,
}

impl SimAdapter {
    pub fn hardware(luid: AdapterLuid, name: impl Into<String>, max_level: FeatureLevel) -> Self {
        Self {
            luid,
            name: name.into(),
            max_level,
            software: false,
        }
    }

    pub fn software() -> Self {
        Self {
            luid: SOFTWARE_ADAPTER_LUID,
            name: "Basic Render Driver".to_string(),
            max_level: FeatureLevel::Level11_1,
            software: true,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimFactories {
    pub debug: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimDevice {
    pub id: u64,
    pub adapter: AdapterLuid,
    pub driver: DriverType,
    pub feature_level: FeatureLevel,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimContext {
    pub device_id: u64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimInterop {
    pub device_id: u64,
}

#[derive(Debug)]
struct SimConfig {
    adapters: Vec<SimAdapter>,
    validation_layers: bool,
    fail_factories: bool,
    fail_hardware: bool,
    fail_software: bool,
    fail_device_promotion: bool,
    fail_context_promotion: bool,
    fail_adapter_description: bool,
    fail_trim: bool,
    vprt: Option<bool>,
    next_device: u64,
}

/// Scriptable [`GraphicsBackend`].
///
/// Clones share configuration and journal, so failures can be injected after
/// the backend has been moved into `DeviceResources`.
#[derive(Debug, Clone)]
pub struct SimBackend {
    config: Arc<Mutex<SimConfig>>,
    journal: SimJournal,
}

impl SimBackend {
    /// Backend exposing `adapters` in enumeration order. The first one is the
    /// system default for hardware creation.
    pub fn new(adapters: Vec<SimAdapter>) -> Self {
        Self {
            config: Arc::new(Mutex::new(SimConfig {
                adapters,
                validation_layers: false,
                fail_factories: false,
                fail_hardware: false,
                fail_software: false,
                fail_device_promotion: false,
                fail_context_promotion: false,
                fail_adapter_description: false,
                fail_trim: false,
                vprt: Some(false),
                next_device: 1,
            })),
            journal: SimJournal::new(),
        }
    }

    pub fn journal(&self) -> SimJournal {
        self.journal.clone()
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.journal.events()
    }

    pub fn clear_events(&self) {
        self.journal.clear();
    }

    pub fn set_validation_layers(&self, available: bool) {
        self.config.lock().validation_layers = available;
    }

    pub fn fail_factories(&self, fail: bool) {
        self.config.lock().fail_factories = fail;
    }

    pub fn fail_hardware(&self, fail: bool) {
        self.config.lock().fail_hardware = fail;
    }

    pub fn fail_software(&self, fail: bool) {
        self.config.lock().fail_software = fail;
    }

    pub fn fail_device_promotion(&self, fail: bool) {
        self.config.lock().fail_device_promotion = fail;
    }

    pub fn fail_context_promotion(&self, fail: bool) {
        self.config.lock().fail_context_promotion = fail;
    }

    pub fn fail_adapter_description(&self, fail: bool) {
        self.config.lock().fail_adapter_description = fail;
    }

    pub fn fail_trim(&self, fail: bool) {
        self.config.lock().fail_trim = fail;
    }

    /// `None` makes the capability query itself fail.
    pub fn set_vprt(&self, supported: Option<bool>) {
        self.config.lock().vprt = supported;
    }

    /// Simulates an adapter being unplugged or disabled.
    pub fn remove_adapter(&self, luid: AdapterLuid) {
        self.config.lock().adapters.retain(|a| a.luid != luid);
    }

    pub fn add_adapter(&self, adapter: SimAdapter) {
        self.config.lock().adapters.push(adapter);
    }
}

fn pick_level(levels: &[FeatureLevel], max: FeatureLevel) -> Option<FeatureLevel> {
    levels.iter().copied().find(|l| *l <= max)
}

impl GraphicsBackend for SimBackend {
    type Factories = SimFactories;
    type Adapter = SimAdapter;
    type RawDevice = SimDevice;
    type RawContext = SimContext;
    type Device = SimDevice;
    type Context = SimContext;
    type Interop = SimInterop;
    type View = SimView;
    type RenderingParameters = SimRenderingParameters;

    fn validation_layers_available(&self) -> bool {
        self.config.lock().validation_layers
    }

    fn create_factories(&self, debug: bool) -> BackendResult<SimFactories> {
        if self.config.lock().fail_factories {
            return Err(BackendError::new(CODE_FAIL, "factory creation failed"));
        }
        self.journal.record(SimEvent::FactoriesCreated { debug });
        Ok(SimFactories { debug })
    }

    fn find_adapter(&self, luid: AdapterLuid, _debug: bool) -> BackendResult<SimAdapter> {
        self.journal.record(SimEvent::FindAdapter(luid));
        self.config
            .lock()
            .adapters
            .iter()
            .find(|a| a.luid == luid)
            .cloned()
            .ok_or_else(|| BackendError::new(CODE_NOT_FOUND, format!("no adapter with luid {luid}")))
    }

    fn create_device(
        &self,
        adapter: Option<&SimAdapter>,
        driver: DriverType,
        flags: CreationFlags,
        feature_levels: &[FeatureLevel],
    ) -> BackendResult<CreatedDevice<Self>> {
        self.journal.record(SimEvent::CreateDevice {
            driver,
            adapter: adapter.map(|a| a.luid),
            flags,
            levels: feature_levels.to_vec(),
        });

        let mut config = self.config.lock();

        let target = match driver {
            DriverType::Hardware => {
                if config.fail_hardware {
                    return Err(BackendError::new(CODE_UNSUPPORTED, "hardware driver unavailable"));
                }
                match adapter {
                    // A handle to an adapter that has since disappeared.
                    Some(a) if !config.adapters.iter().any(|x| x.luid == a.luid) => {
                        return Err(BackendError::new(CODE_NOT_FOUND, "adapter is gone"));
                    }
                    Some(a) => a.clone(),
                    None => config
                        .adapters
                        .iter()
                        .find(|a| !a.software)
                        .cloned()
                        .ok_or_else(|| BackendError::new(CODE_NOT_FOUND, "no hardware adapter"))?,
                }
            }
            DriverType::Software => {
                if config.fail_software {
                    return Err(BackendError::new(CODE_UNSUPPORTED, "software driver unavailable"));
                }
                SimAdapter::software()
            }
        };

        let feature_level = pick_level(feature_levels, target.max_level).ok_or_else(|| {
            BackendError::new(CODE_UNSUPPORTED, "no requested feature level is supported")
        })?;

        let id = config.next_device;
        config.next_device += 1;
        drop(config);

        self.journal.record(SimEvent::DeviceCreated {
            device: id,
            driver,
            feature_level,
        });

        Ok(CreatedDevice {
            device: SimDevice {
                id,
                adapter: target.luid,
                driver,
                feature_level,
            },
            context: SimContext { device_id: id },
            feature_level,
        })
    }

    fn promote_device(&self, device: SimDevice) -> BackendResult<SimDevice> {
        if self.config.lock().fail_device_promotion {
            return Err(BackendError::new(CODE_NO_INTERFACE, "device level 3 not supported"));
        }
        Ok(device)
    }

    fn promote_context(&self, context: SimContext) -> BackendResult<SimContext> {
        if self.config.lock().fail_context_promotion {
            return Err(BackendError::new(CODE_NO_INTERFACE, "context level 3 not supported"));
        }
        Ok(context)
    }

    fn device_adapter(&self, device: &SimDevice) -> BackendResult<SimAdapter> {
        if device.adapter == SOFTWARE_ADAPTER_LUID {
            return Ok(SimAdapter::software());
        }
        self.config
            .lock()
            .adapters
            .iter()
            .find(|a| a.luid == device.adapter)
            .cloned()
            .ok_or_else(|| BackendError::new(CODE_NOT_FOUND, "device adapter is gone"))
    }

    fn adapter_luid(&self, adapter: &SimAdapter) -> BackendResult<AdapterLuid> {
        if self.config.lock().fail_adapter_description {
            return Err(BackendError::new(CODE_FAIL, "adapter description unavailable"));
        }
        Ok(adapter.luid)
    }

    fn create_interop_device(&self, device: &SimDevice) -> BackendResult<SimInterop> {
        self.journal.record(SimEvent::InteropCreated { device: device.id });
        Ok(SimInterop {
            device_id: device.id,
        })
    }

    fn query_vprt_support(&self, _device: &SimDevice) -> BackendResult<bool> {
        self.config
            .lock()
            .vprt
            .ok_or_else(|| BackendError::new(CODE_UNSUPPORTED, "options3 query unsupported"))
    }

    fn clear_state(&self, context: &SimContext) {
        self.journal.record(SimEvent::ClearState {
            device: context.device_id,
        });
    }

    fn trim(&self, device: &SimDevice) -> BackendResult<()> {
        if self.config.lock().fail_trim {
            return Err(BackendError::new(CODE_NO_INTERFACE, "dxgi device 3 not supported"));
        }
        self.journal.record(SimEvent::Trim { device: device.id });
        Ok(())
    }

    fn discard_view(&self, _context: &SimContext, view: &SimView) {
        self.journal.record(SimEvent::DiscardView {
            camera: view.camera,
            kind: view.kind,
        });
    }
}
