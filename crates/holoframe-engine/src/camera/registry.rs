use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::device::{CameraId, DeviceError, DeviceState, GraphicsBackend};

/// Device-dependent resources for one holographic camera (back buffer,
/// render-target and depth-stencil views).
///
/// Implemented by the application; device resources only sequence calls.
pub trait CameraResources<B: GraphicsBackend> {
    /// (Re)creates views for the camera's current back buffer.
    fn create_resources_for_back_buffer(
        &mut self,
        device: &DeviceState<B>,
        params: &B::RenderingParameters,
    ) -> Result<(), DeviceError>;

    /// Releases every resource derived from `device`. Must be idempotent.
    fn release_resources_for_back_buffer(&mut self, device: &DeviceState<B>);

    fn back_buffer_render_target_view(&self) -> Option<&B::View>;

    fn depth_stencil_view(&self) -> Option<&B::View>;
}

/// Camera id to camera resources, guarded by one lock.
///
/// The lock is held for a single lookup, insert or erase, or for a whole
/// walk when the caller needs a consistent view (device-loss teardown).
pub struct CameraRegistry<C> {
    cameras: Mutex<BTreeMap<CameraId, C>>,
}

impl<C> Default for CameraRegistry<C> {
    fn default() -> Self {
        Self {
            cameras: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<C> CameraRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `resources`, returning the entry it replaced.
    pub fn insert(&self, id: CameraId, resources: C) -> Option<C> {
        self.cameras.lock().insert(id, resources)
    }

    pub fn remove(&self, id: CameraId) -> Option<C> {
        self.cameras.lock().remove(&id)
    }

    pub fn contains(&self, id: CameraId) -> bool {
        self.cameras.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.cameras.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.lock().is_empty()
    }

    pub fn ids(&self) -> Vec<CameraId> {
        self.cameras.lock().keys().copied().collect()
    }

    /// Runs `f` with exclusive access to the whole map.
    pub fn with_cameras<R>(&self, f: impl FnOnce(&mut BTreeMap<CameraId, C>) -> R) -> R {
        let mut cameras = self.cameras.lock();
        f(&mut cameras)
    }
}
