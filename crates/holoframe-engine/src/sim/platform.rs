use std::sync::Arc;

use parking_lot::Mutex;

use super::backend::{SimBackend, SimInterop};
use super::{SimEvent, SimJournal};
use crate::camera::CameraResources;
use crate::device::{
    AdapterLuid, BackendError, BackendResult, CameraId, DeviceError, DeviceNotify, DeviceState,
    FramePrediction, HolographicFrame, HolographicSpace, PresentResult, CODE_FAIL,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ViewKind {
    RenderTarget,
    DepthStencil,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimView {
    pub camera: CameraId,
    pub kind: ViewKind,
    pub device_id: u64,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SimRenderingParameters {
    pub camera: CameraId,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
struct SpaceState {
    primary: AdapterLuid,
    published: Option<SimInterop>,
    fail_publish: bool,
}

/// Simulated holographic space. Clones share state.
#[derive(Debug, Clone)]
pub struct SimSpace {
    state: Arc<Mutex<SpaceState>>,
    journal: SimJournal,
}

impl SimSpace {
    pub fn new(journal: &SimJournal, primary: AdapterLuid) -> Self {
        Self {
            state: Arc::new(Mutex::new(SpaceState {
                primary,
                ..SpaceState::default()
            })),
            journal: journal.clone(),
        }
    }

    pub fn set_primary_adapter(&self, luid: AdapterLuid) {
        self.state.lock().primary = luid;
    }

    pub fn fail_publish(&self, fail: bool) {
        self.state.lock().fail_publish = fail;
    }

    /// Device id of the interop device most recently handed to the space.
    pub fn published_device(&self) -> Option<u64> {
        self.state.lock().published.as_ref().map(|i| i.device_id)
    }
}

impl HolographicSpace<SimBackend> for SimSpace {
    fn primary_adapter_id(&self) -> AdapterLuid {
        self.state.lock().primary
    }

    fn set_direct3d11_device(&self, device: &SimInterop) -> BackendResult<()> {
        let mut state = self.state.lock();
        if state.fail_publish {
            return Err(BackendError::new(CODE_FAIL, "space rejected the device"));
        }
        state.published = Some(device.clone());
        drop(state);

        self.journal.record(SimEvent::DevicePublished {
            device: device.device_id,
        });
        Ok(())
    }
}

/// One simulated frame with a fixed prediction and a scripted present result.
#[derive(Debug, Clone)]
pub struct SimFrame {
    prediction: FramePrediction,
    result: BackendResult<PresentResult>,
    journal: SimJournal,
}

impl SimFrame {
    pub fn new(journal: &SimJournal, cameras: &[CameraId]) -> Self {
        Self {
            prediction: FramePrediction::new(cameras.to_vec()),
            result: Ok(PresentResult::Success),
            journal: journal.clone(),
        }
    }

    /// Frame whose present reports the device as removed.
    pub fn device_removed(mut self) -> Self {
        self.result = Ok(PresentResult::DeviceRemoved);
        self
    }

    /// Frame whose present call itself fails with `err`.
    pub fn failing(mut self, err: BackendError) -> Self {
        self.result = Err(err);
        self
    }

    pub fn prediction(&self) -> &FramePrediction {
        &self.prediction
    }
}

impl HolographicFrame<SimBackend> for SimFrame {
    fn current_prediction(&self) -> BackendResult<FramePrediction> {
        Ok(self.prediction.clone())
    }

    fn rendering_parameters(&self, camera: CameraId) -> BackendResult<SimRenderingParameters> {
        Ok(SimRenderingParameters {
            camera,
            width: 1268,
            height: 720,
        })
    }

    fn present_using_current_prediction(&self) -> BackendResult<PresentResult> {
        self.journal.record(SimEvent::Present);
        self.result.clone()
    }
}

/// Camera resources that record their lifecycle.
#[derive(Debug)]
pub struct SimCamera {
    id: CameraId,
    journal: SimJournal,
    render_target: Option<SimView>,
    depth_stencil: Option<SimView>,
    size: Option<(u32, u32)>,
}

impl SimCamera {
    pub fn new(journal: &SimJournal, id: CameraId) -> Self {
        Self {
            id,
            journal: journal.clone(),
            render_target: None,
            depth_stencil: None,
            size: None,
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn has_resources(&self) -> bool {
        self.render_target.is_some()
    }

    pub fn back_buffer_size(&self) -> Option<(u32, u32)> {
        self.size
    }
}

impl CameraResources<SimBackend> for SimCamera {
    fn create_resources_for_back_buffer(
        &mut self,
        device: &DeviceState<SimBackend>,
        params: &SimRenderingParameters,
    ) -> Result<(), DeviceError> {
        let device_id = device.device().id;

        // Views are reused while the device and back buffer size are unchanged.
        let current = self.render_target.as_ref().map(|v| v.device_id);
        if current == Some(device_id) && self.size == Some((params.width, params.height)) {
            return Ok(());
        }

        self.render_target = Some(SimView {
            camera: self.id,
            kind: ViewKind::RenderTarget,
            device_id,
        });
        self.depth_stencil = Some(SimView {
            camera: self.id,
            kind: ViewKind::DepthStencil,
            device_id,
        });
        self.size = Some((params.width, params.height));

        self.journal.record(SimEvent::CameraResourcesCreated {
            camera: self.id,
            device: device_id,
        });
        Ok(())
    }

    fn release_resources_for_back_buffer(&mut self, device: &DeviceState<SimBackend>) {
        if self.render_target.take().is_none() {
            return;
        }
        self.depth_stencil = None;
        self.size = None;

        self.journal.record(SimEvent::CameraResourcesReleased {
            camera: self.id,
            device: device.device().id,
        });
    }

    fn back_buffer_render_target_view(&self) -> Option<&SimView> {
        self.render_target.as_ref()
    }

    fn depth_stencil_view(&self) -> Option<&SimView> {
        self.depth_stencil.as_ref()
    }
}

/// Sink that records notifications under a name.
#[derive(Debug)]
pub struct SimNotify {
    name: String,
    journal: SimJournal,
}

impl SimNotify {
    pub fn new(journal: &SimJournal, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            journal: journal.clone(),
        }
    }
}

impl DeviceNotify for SimNotify {
    fn on_device_lost(&self) {
        self.journal.record(SimEvent::DeviceLostNotified {
            sink: self.name.clone(),
        });
    }

    fn on_device_restored(&self) {
        self.journal.record(SimEvent::DeviceRestoredNotified {
            sink: self.name.clone(),
        });
    }
}
