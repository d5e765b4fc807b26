use super::types::{FeatureLevel, FEATURE_LEVELS};

/// Initialization parameters for device resources.
///
/// Keep this structure minimal. The feature-level list is exposed for tools
/// and tests; production code should keep the default.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Request validation layers when the system has them installed.
    ///
    /// Defaults to on in debug builds.
    pub debug_layer: bool,

    /// Feature levels offered at creation, highest first. Must not be empty.
    pub feature_levels: Vec<FeatureLevel>,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            debug_layer: cfg!(debug_assertions),
            feature_levels: FEATURE_LEVELS.to_vec(),
        }
    }
}

impl DeviceInit {
    /// Release-style configuration: no validation layers.
    pub fn release() -> Self {
        Self {
            debug_layer: false,
            ..Self::default()
        }
    }
}
