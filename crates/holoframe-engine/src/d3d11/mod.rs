//! Direct3D 11 backend.
//!
//! Native calls for device creation and management on Windows, plus the
//! WinRT holographic space/frame bindings in [`holographic`]. The caller must
//! have initialized COM (WinRT apps always have).

mod holographic;

use std::ffi::c_void;

use windows::core::Interface;
use windows::Graphics::DirectX::Direct3D11::IDirect3DDevice;
use windows::Graphics::Holographic::HolographicCameraRenderingParameters;
use windows::Win32::Foundation::{BOOL, LUID};
use windows::Win32::Graphics::Direct2D::{
    D2D1CreateFactory, ID2D1Factory2, D2D1_DEBUG_LEVEL_INFORMATION, D2D1_DEBUG_LEVEL_NONE,
    D2D1_FACTORY_OPTIONS, D2D1_FACTORY_TYPE_SINGLE_THREADED,
};
use windows::Win32::Graphics::Direct3D::{
    D3D_DRIVER_TYPE, D3D_DRIVER_TYPE_HARDWARE, D3D_DRIVER_TYPE_NULL, D3D_DRIVER_TYPE_WARP,
    D3D_FEATURE_LEVEL, D3D_FEATURE_LEVEL_10_0, D3D_FEATURE_LEVEL_10_1, D3D_FEATURE_LEVEL_11_0,
    D3D_FEATURE_LEVEL_11_1, D3D_FEATURE_LEVEL_12_0, D3D_FEATURE_LEVEL_12_1,
};
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, ID3D11Device3, ID3D11DeviceContext, ID3D11DeviceContext3,
    ID3D11Multithread, ID3D11View, D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_CREATE_DEVICE_DEBUG,
    D3D11_CREATE_DEVICE_FLAG, D3D11_FEATURE_D3D11_OPTIONS3, D3D11_FEATURE_DATA_D3D11_OPTIONS3,
    D3D11_SDK_VERSION,
};
use windows::Win32::Graphics::DirectWrite::{
    DWriteCreateFactory, IDWriteFactory2, DWRITE_FACTORY_TYPE_SHARED,
};
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory2, IDXGIAdapter, IDXGIDevice3, IDXGIFactory4, DXGI_CREATE_FACTORY_DEBUG,
    DXGI_CREATE_FACTORY_FLAGS,
};
use windows::Win32::Graphics::Imaging::{CLSID_WICImagingFactory2, IWICImagingFactory2};
use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_INPROC_SERVER};
use windows::Win32::System::WinRT::Direct3D11::CreateDirect3D11DeviceFromDXGIDevice;

use crate::device::{
    AdapterLuid, BackendError, BackendResult, CreatedDevice, CreationFlags, DriverType,
    FeatureLevel, GraphicsBackend, CODE_FAIL, CODE_UNSUPPORTED, FEATURE_LEVELS,
};

/// Direct2D, DirectWrite and WIC factories.
pub struct D3D11Factories {
    pub d2d: ID2D1Factory2,
    pub dwrite: IDWriteFactory2,
    pub wic: IWICImagingFactory2,
}

/// [`GraphicsBackend`] over Direct3D 11 and DXGI.
#[derive(Debug, Default, Clone, Copy)]
pub struct D3D11Backend;

impl D3D11Backend {
    pub fn new() -> Self {
        Self
    }
}

fn native_level(level: FeatureLevel) -> D3D_FEATURE_LEVEL {
    match level {
        FeatureLevel::Level10_0 => D3D_FEATURE_LEVEL_10_0,
        FeatureLevel::Level10_1 => D3D_FEATURE_LEVEL_10_1,
        FeatureLevel::Level11_0 => D3D_FEATURE_LEVEL_11_0,
        FeatureLevel::Level11_1 => D3D_FEATURE_LEVEL_11_1,
        FeatureLevel::Level12_0 => D3D_FEATURE_LEVEL_12_0,
        FeatureLevel::Level12_1 => D3D_FEATURE_LEVEL_12_1,
    }
}

fn from_native_level(native: D3D_FEATURE_LEVEL) -> Option<FeatureLevel> {
    FEATURE_LEVELS
        .iter()
        .copied()
        .find(|level| native_level(*level) == native)
}

fn native_driver(driver: DriverType) -> D3D_DRIVER_TYPE {
    match driver {
        DriverType::Hardware => D3D_DRIVER_TYPE_HARDWARE,
        DriverType::Software => D3D_DRIVER_TYPE_WARP,
    }
}

fn native_flags(flags: CreationFlags) -> D3D11_CREATE_DEVICE_FLAG {
    let mut native = D3D11_CREATE_DEVICE_FLAG::default();
    if flags.contains(CreationFlags::BGRA_SUPPORT) {
        native = native | D3D11_CREATE_DEVICE_BGRA_SUPPORT;
    }
    if flags.contains(CreationFlags::DEBUG) {
        native = native | D3D11_CREATE_DEVICE_DEBUG;
    }
    native
}

impl GraphicsBackend for D3D11Backend {
    type Factories = D3D11Factories;
    type Adapter = IDXGIAdapter;
    type RawDevice = ID3D11Device;
    type RawContext = ID3D11DeviceContext;
    type Device = ID3D11Device3;
    type Context = ID3D11DeviceContext3;
    type Interop = IDirect3DDevice;
    type View = ID3D11View;
    type RenderingParameters = HolographicCameraRenderingParameters;

    fn validation_layers_available(&self) -> bool {
        // A null device is enough to tell whether the SDK layers load.
        unsafe {
            D3D11CreateDevice(
                None,
                D3D_DRIVER_TYPE_NULL,
                None,
                D3D11_CREATE_DEVICE_DEBUG,
                None,
                D3D11_SDK_VERSION,
                None,
                None,
                None,
            )
        }
        .is_ok()
    }

    fn create_factories(&self, debug: bool) -> BackendResult<D3D11Factories> {
        let options = D2D1_FACTORY_OPTIONS {
            debugLevel: if debug {
                D2D1_DEBUG_LEVEL_INFORMATION
            } else {
                D2D1_DEBUG_LEVEL_NONE
            },
        };

        unsafe {
            let d2d: ID2D1Factory2 =
                D2D1CreateFactory(D2D1_FACTORY_TYPE_SINGLE_THREADED, Some(&options as *const _))?;
            let dwrite: IDWriteFactory2 = DWriteCreateFactory(DWRITE_FACTORY_TYPE_SHARED)?;
            let wic: IWICImagingFactory2 =
                CoCreateInstance(&CLSID_WICImagingFactory2, None, CLSCTX_INPROC_SERVER)?;

            Ok(D3D11Factories { d2d, dwrite, wic })
        }
    }

    fn find_adapter(&self, luid: AdapterLuid, debug: bool) -> BackendResult<IDXGIAdapter> {
        let flags = if debug && self.validation_layers_available() {
            DXGI_CREATE_FACTORY_DEBUG
        } else {
            DXGI_CREATE_FACTORY_FLAGS(0)
        };

        unsafe {
            let factory: IDXGIFactory4 = CreateDXGIFactory2(flags)?;
            let adapter: IDXGIAdapter = factory.EnumAdapterByLuid(LUID {
                LowPart: luid.low_part,
                HighPart: luid.high_part,
            })?;
            Ok(adapter)
        }
    }

    fn create_device(
        &self,
        adapter: Option<&IDXGIAdapter>,
        driver: DriverType,
        flags: CreationFlags,
        feature_levels: &[FeatureLevel],
    ) -> BackendResult<CreatedDevice<Self>> {
        let levels: Vec<D3D_FEATURE_LEVEL> =
            feature_levels.iter().copied().map(native_level).collect();

        let mut device = None;
        let mut context = None;
        let mut accepted = D3D_FEATURE_LEVEL::default();

        unsafe {
            D3D11CreateDevice(
                adapter,
                native_driver(driver),
                None,
                native_flags(flags),
                Some(&levels),
                D3D11_SDK_VERSION,
                Some(&mut device),
                Some(&mut accepted),
                Some(&mut context),
            )?;
        }

        let device = device.ok_or_else(|| BackendError::new(CODE_FAIL, "no device returned"))?;
        let context = context.ok_or_else(|| BackendError::new(CODE_FAIL, "no context returned"))?;
        let feature_level = from_native_level(accepted).ok_or_else(|| {
            BackendError::new(CODE_UNSUPPORTED, format!("unexpected feature level {:#x}", accepted.0))
        })?;

        Ok(CreatedDevice {
            device,
            context,
            feature_level,
        })
    }

    fn promote_device(&self, device: ID3D11Device) -> BackendResult<ID3D11Device3> {
        Ok(device.cast()?)
    }

    fn promote_context(&self, context: ID3D11DeviceContext) -> BackendResult<ID3D11DeviceContext3> {
        let multithread: ID3D11Multithread = context.cast()?;
        unsafe {
            multithread.SetMultithreadProtected(BOOL::from(true));
        }
        Ok(context.cast()?)
    }

    fn device_adapter(&self, device: &ID3D11Device3) -> BackendResult<IDXGIAdapter> {
        let dxgi: IDXGIDevice3 = device.cast()?;
        Ok(unsafe { dxgi.GetAdapter()? })
    }

    fn adapter_luid(&self, adapter: &IDXGIAdapter) -> BackendResult<AdapterLuid> {
        let desc = unsafe { adapter.GetDesc()? };
        Ok(AdapterLuid::new(
            desc.AdapterLuid.LowPart,
            desc.AdapterLuid.HighPart,
        ))
    }

    fn create_interop_device(&self, device: &ID3D11Device3) -> BackendResult<IDirect3DDevice> {
        let dxgi: IDXGIDevice3 = device.cast()?;
        let inspectable = unsafe { CreateDirect3D11DeviceFromDXGIDevice(&dxgi)? };
        Ok(inspectable.cast()?)
    }

    fn query_vprt_support(&self, device: &ID3D11Device3) -> BackendResult<bool> {
        let mut options = D3D11_FEATURE_DATA_D3D11_OPTIONS3::default();
        unsafe {
            device.CheckFeatureSupport(
                D3D11_FEATURE_D3D11_OPTIONS3,
                &mut options as *mut _ as *mut c_void,
                std::mem::size_of::<D3D11_FEATURE_DATA_D3D11_OPTIONS3>() as u32,
            )?;
        }
        Ok(options
            .VPAndRTArrayIndexFromAnyShaderFeedingRasterizer
            .as_bool())
    }

    fn clear_state(&self, context: &ID3D11DeviceContext3) {
        unsafe { context.ClearState() }
    }

    fn trim(&self, device: &ID3D11Device3) -> BackendResult<()> {
        let dxgi: IDXGIDevice3 = device.cast()?;
        unsafe { dxgi.Trim() };
        Ok(())
    }

    fn discard_view(&self, context: &ID3D11DeviceContext3, view: &ID3D11View) {
        unsafe { context.DiscardView(view) }
    }
}
