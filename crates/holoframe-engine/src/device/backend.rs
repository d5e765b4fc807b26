use super::error::BackendResult;
use super::types::{
    AdapterLuid, CameraId, CreationFlags, DriverType, FeatureLevel, FramePrediction, PresentResult,
};

/// Device and context as returned by a successful creation call, before
/// promotion to the richer interfaces.
pub struct CreatedDevice<B: GraphicsBackend + ?Sized> {
    pub device: B::RawDevice,
    pub context: B::RawContext,
    /// Level the driver accepted from the offered list.
    pub feature_level: FeatureLevel,
}

/// Native graphics API seam.
///
/// `DeviceResources` drives the creation/recovery protocol; a backend only
/// supplies the individual native calls. Handles are reference-counted native
/// objects, so `Clone` is cheap.
pub trait GraphicsBackend {
    /// Device-independent factories (2D, text layout, image codecs).
    type Factories;
    type Adapter: Clone;
    type RawDevice;
    type RawContext;
    type Device: Clone;
    type Context: Clone;
    /// Compositor-facing wrapper of `Device`.
    type Interop: Clone;
    /// Render-target or depth-stencil view owned by a camera.
    type View;
    /// Per-camera rendering parameters handed out by a holographic frame.
    type RenderingParameters;

    /// Whether validation layers are installed on this system.
    fn validation_layers_available(&self) -> bool;

    fn create_factories(&self, debug: bool) -> BackendResult<Self::Factories>;

    /// Looks up the system adapter with exactly this identifier.
    fn find_adapter(&self, luid: AdapterLuid, debug: bool) -> BackendResult<Self::Adapter>;

    /// Creates a device with the first level in `feature_levels` the driver
    /// accepts. `adapter` of `None` lets the system choose.
    fn create_device(
        &self,
        adapter: Option<&Self::Adapter>,
        driver: DriverType,
        flags: CreationFlags,
        feature_levels: &[FeatureLevel],
    ) -> BackendResult<CreatedDevice<Self>>;

    fn promote_device(&self, device: Self::RawDevice) -> BackendResult<Self::Device>;

    fn promote_context(&self, context: Self::RawContext) -> BackendResult<Self::Context>;

    /// Adapter that actually backs `device`.
    fn device_adapter(&self, device: &Self::Device) -> BackendResult<Self::Adapter>;

    fn adapter_luid(&self, adapter: &Self::Adapter) -> BackendResult<AdapterLuid>;

    fn create_interop_device(&self, device: &Self::Device) -> BackendResult<Self::Interop>;

    /// Render-target array index selectable from the vertex stage.
    fn query_vprt_support(&self, device: &Self::Device) -> BackendResult<bool>;

    /// Unbinds all pipeline state from the context.
    fn clear_state(&self, context: &Self::Context);

    /// Hints the driver that the app is idle so transient allocations can be
    /// reclaimed.
    fn trim(&self, device: &Self::Device) -> BackendResult<()>;

    /// Marks the contents of `view` as undefined.
    fn discard_view(&self, context: &Self::Context, view: &Self::View);
}

/// Platform holographic space: decides the adapter and consumes the device.
pub trait HolographicSpace<B: GraphicsBackend> {
    /// Adapter the platform wants used; zero when any adapter will do.
    fn primary_adapter_id(&self) -> AdapterLuid;

    fn set_direct3d11_device(&self, device: &B::Interop) -> BackendResult<()>;
}

/// A frame handed out by the host compositor.
pub trait HolographicFrame<B: GraphicsBackend> {
    fn current_prediction(&self) -> BackendResult<FramePrediction>;

    fn rendering_parameters(&self, camera: CameraId) -> BackendResult<B::RenderingParameters>;

    /// Presents and blocks until the previous frame has finished, which keeps
    /// prediction accuracy stable.
    fn present_using_current_prediction(&self) -> BackendResult<PresentResult>;
}
