use std::fmt;

use thiserror::Error;

use super::types::AdapterLuid;

/// `DXGI_ERROR_DEVICE_REMOVED`
pub const CODE_DEVICE_REMOVED: i32 = 0x887A_0005_u32 as i32;
/// `DXGI_ERROR_DEVICE_HUNG`
pub const CODE_DEVICE_HUNG: i32 = 0x887A_0006_u32 as i32;
/// `DXGI_ERROR_DEVICE_RESET`
pub const CODE_DEVICE_RESET: i32 = 0x887A_0007_u32 as i32;
/// `E_NOINTERFACE`
pub const CODE_NO_INTERFACE: i32 = 0x8000_4002_u32 as i32;
/// `DXGI_ERROR_NOT_FOUND`
pub const CODE_NOT_FOUND: i32 = 0x887A_0002_u32 as i32;
/// `DXGI_ERROR_UNSUPPORTED`
pub const CODE_UNSUPPORTED: i32 = 0x887A_0004_u32 as i32;
/// `E_FAIL`
pub const CODE_FAIL: i32 = 0x8000_4005_u32 as i32;

/// Failure reported by a backend or platform call.
///
/// `code` carries the native status code (an `HRESULT` on Windows).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BackendError {
    pub code: i32,
    pub message: String,
}

impl BackendError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The device was removed, hung or reset by the driver.
    pub fn is_device_lost(&self) -> bool {
        matches!(
            self.code,
            CODE_DEVICE_REMOVED | CODE_DEVICE_HUNG | CODE_DEVICE_RESET
        )
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08X})", self.message, self.code as u32)
    }
}

impl std::error::Error for BackendError {}

#[cfg(windows)]
impl From<windows::core::Error> for BackendError {
    fn from(err: windows::core::Error) -> Self {
        Self::new(err.code().0, err.message())
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Errors surfaced by device management.
///
/// None of these are retried internally; a functioning device is a
/// precondition for every other operation.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Device-independent factories (2D, text, imaging) could not be created.
    #[error("failed to create device-independent factories")]
    FactoryCreation(#[source] BackendError),

    /// The platform named an adapter that is not present on the system.
    #[error("adapter {luid} requested by the holographic space was not found")]
    AdapterNotFound {
        luid: AdapterLuid,
        #[source]
        source: BackendError,
    },

    /// Both the hardware and the software driver refused to create a device.
    #[error("device creation failed: hardware driver ({hardware}), software driver ({software})")]
    DeviceCreation {
        hardware: BackendError,
        #[source]
        software: BackendError,
    },

    /// The created device lacks an interface this crate depends on.
    #[error("required interface not supported: {interface}")]
    InterfaceNotSupported {
        interface: &'static str,
        #[source]
        source: BackendError,
    },

    /// The configuration offers no feature level to create a device with.
    #[error("no feature levels were offered for device creation")]
    NoFeatureLevels,

    /// Initialization was requested before a holographic space was set.
    #[error("no holographic space has been set")]
    NoHolographicSpace,

    /// The operation needs a device and none is currently active.
    #[error("device resources are not initialized")]
    NotInitialized,

    /// A host platform call failed.
    #[error("platform call failed: {operation}")]
    Platform {
        operation: &'static str,
        #[source]
        source: BackendError,
    },
}

impl DeviceError {
    pub(crate) fn interface(interface: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| DeviceError::InterfaceNotSupported { interface, source }
    }

    pub(crate) fn platform(operation: &'static str) -> impl FnOnce(BackendError) -> Self {
        move |source| DeviceError::Platform { operation, source }
    }
}
