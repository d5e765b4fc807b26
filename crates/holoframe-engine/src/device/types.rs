use std::fmt;

use bitflags::bitflags;

/// Locally unique adapter identifier, as reported by the holographic space.
///
/// The all-zero id means "no preference".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct AdapterLuid {
    pub low_part: u32,
    pub high_part: i32,
}

impl AdapterLuid {
    pub const NONE: AdapterLuid = AdapterLuid {
        low_part: 0,
        high_part: 0,
    };

    pub const fn new(low_part: u32, high_part: i32) -> Self {
        Self {
            low_part,
            high_part,
        }
    }

    /// Returns `true` when the platform names a preferred adapter.
    ///
    /// Either half being nonzero is enough. An id with only one nonzero half
    /// is still looked up, so an absent adapter with such an id is reported
    /// as not found instead of being treated as "no preference".
    pub fn is_specified(&self) -> bool {
        self.low_part != 0 || self.high_part != 0
    }
}

impl fmt::Display for AdapterLuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:{:08x}", self.high_part as u32, self.low_part)
    }
}

/// Named tier of guaranteed hardware capability.
///
/// Variants are declared lowest to highest so that `Ord` follows capability.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FeatureLevel {
    Level10_0,
    Level10_1,
    Level11_0,
    Level11_1,
    Level12_0,
    Level12_1,
}

impl FeatureLevel {
    /// `(major, minor)` version of the tier.
    pub fn version(self) -> (u32, u32) {
        match self {
            FeatureLevel::Level10_0 => (10, 0),
            FeatureLevel::Level10_1 => (10, 1),
            FeatureLevel::Level11_0 => (11, 0),
            FeatureLevel::Level11_1 => (11, 1),
            FeatureLevel::Level12_0 => (12, 0),
            FeatureLevel::Level12_1 => (12, 1),
        }
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.version();
        write!(f, "{major}.{minor}")
    }
}

/// Feature levels offered at device creation, highest first.
///
/// Order is significant: the driver picks the first level it accepts.
/// HoloLens runs 11.1; the emulator accepts hardware down to 10.0.
pub const FEATURE_LEVELS: [FeatureLevel; 6] = [
    FeatureLevel::Level12_1,
    FeatureLevel::Level12_0,
    FeatureLevel::Level11_1,
    FeatureLevel::Level11_0,
    FeatureLevel::Level10_1,
    FeatureLevel::Level10_0,
];

/// Driver used for a device creation attempt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DriverType {
    /// Hardware graphics driver.
    Hardware,
    /// Software rasterizer (WARP).
    Software,
}

impl fmt::Display for DriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverType::Hardware => f.write_str("hardware"),
            DriverType::Software => f.write_str("software"),
        }
    }
}

bitflags! {
    /// Device creation flags.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct CreationFlags: u32 {
        /// BGRA surface support, required for Direct2D/text interop.
        const BGRA_SUPPORT = 1 << 0;
        /// Validation (SDK) layers.
        const DEBUG = 1 << 1;
    }
}

/// Optional device capabilities, queried once per device creation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CapabilityFlags {
    /// Render-target array index may be set from the vertex shader stage
    /// (enables single-pass stereo instancing).
    pub vprt: bool,
}

/// Identifier of a holographic camera (one output surface).
pub type CameraId = u32;

/// Cameras visible in a frame's current prediction.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FramePrediction {
    pub camera_ids: Vec<CameraId>,
}

impl FramePrediction {
    pub fn new(camera_ids: impl Into<Vec<CameraId>>) -> Self {
        Self {
            camera_ids: camera_ids.into(),
        }
    }
}

/// Result reported by the compositor after presenting a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentResult {
    Success,
    /// The device changed or became invalid; every device resource must be
    /// recreated.
    DeviceRemoved,
}

/// What `DeviceResources::present` did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    /// Frame presented; device is healthy.
    Presented,
    /// Device loss was detected and the device has been recreated.
    DeviceRecovered,
}
