//! Simulated holographic platform.
//!
//! An in-process backend with scripted adapters and failure injection, plus
//! a holographic space, frames, cameras and a notification sink. Every call
//! is recorded in a shared [`SimJournal`] so call order can be inspected.
//! Used by the unit tests and the studio demo.

mod backend;
mod platform;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::{AdapterLuid, CameraId, CreationFlags, DriverType, FeatureLevel};

pub use backend::{
    SimAdapter, SimBackend, SimContext, SimDevice, SimFactories, SimInterop, SOFTWARE_ADAPTER_LUID,
};
pub use platform::{SimCamera, SimFrame, SimNotify, SimRenderingParameters, SimSpace, SimView, ViewKind};

/// One recorded call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SimEvent {
    FactoriesCreated {
        debug: bool,
    },
    FindAdapter(AdapterLuid),
    CreateDevice {
        driver: DriverType,
        adapter: Option<AdapterLuid>,
        flags: CreationFlags,
        levels: Vec<FeatureLevel>,
    },
    DeviceCreated {
        device: u64,
        driver: DriverType,
        feature_level: FeatureLevel,
    },
    InteropCreated {
        device: u64,
    },
    DevicePublished {
        device: u64,
    },
    ClearState {
        device: u64,
    },
    Trim {
        device: u64,
    },
    DiscardView {
        camera: CameraId,
        kind: ViewKind,
    },
    CameraResourcesCreated {
        camera: CameraId,
        device: u64,
    },
    CameraResourcesReleased {
        camera: CameraId,
        device: u64,
    },
    Present,
    DeviceLostNotified {
        sink: String,
    },
    DeviceRestoredNotified {
        sink: String,
    },
}

/// Shared, ordered record of simulated calls.
#[derive(Debug, Clone, Default)]
pub struct SimJournal {
    events: Arc<Mutex<Vec<SimEvent>>>,
}

impl SimJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: SimEvent) {
        log::trace!("sim: {event:?}");
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<SimEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Index of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&SimEvent) -> bool) -> Option<usize> {
        self.events.lock().iter().position(pred)
    }

    pub fn count(&self, pred: impl Fn(&SimEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}
