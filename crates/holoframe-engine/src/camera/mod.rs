//! Per-camera resource bookkeeping.
//!
//! Camera add/remove events arrive from platform threads while the render
//! thread walks the same map during device-loss teardown; every access goes
//! through one lock.

mod registry;

pub use registry::{CameraRegistry, CameraResources};
