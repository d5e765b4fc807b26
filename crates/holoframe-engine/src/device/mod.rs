//! Graphics device lifecycle.
//!
//! This module is responsible for:
//! - creating the device-independent factories
//! - resolving the platform's preferred adapter
//! - creating the device and context with hardware to software fallback
//! - detecting device loss at present time and recreating everything

mod backend;
mod create;
mod error;
mod init;
mod notify;
mod resources;
mod types;

pub use backend::{CreatedDevice, GraphicsBackend, HolographicFrame, HolographicSpace};
pub use create::{
    create_device_independent_resources, create_device_resources, creation_flags, DeviceState,
};
pub use error::{
    BackendError, BackendResult, DeviceError, CODE_DEVICE_HUNG, CODE_DEVICE_REMOVED,
    CODE_DEVICE_RESET, CODE_FAIL, CODE_NOT_FOUND, CODE_NO_INTERFACE, CODE_UNSUPPORTED,
};
pub use init::DeviceInit;
pub use notify::DeviceNotify;
pub use resources::DeviceResources;
pub use types::{
    AdapterLuid, CameraId, CapabilityFlags, CreationFlags, DriverType, FeatureLevel,
    FramePrediction, PresentOutcome, PresentResult, FEATURE_LEVELS,
};
