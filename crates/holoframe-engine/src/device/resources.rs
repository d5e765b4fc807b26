use std::sync::Weak;

use parking_lot::{MappedRwLockReadGuard, Mutex, RwLock, RwLockReadGuard};

use crate::camera::{CameraRegistry, CameraResources};

use super::backend::{GraphicsBackend, HolographicFrame, HolographicSpace};
use super::create::{create_device_independent_resources, create_device_resources, DeviceState};
use super::error::DeviceError;
use super::init::DeviceInit;
use super::notify::DeviceNotify;
use super::types::{
    CameraId, CapabilityFlags, FeatureLevel, FramePrediction, PresentOutcome, PresentResult,
};

type SharedSpace<B> = Box<dyn HolographicSpace<B> + Send + Sync>;

/// Owns the graphics device, its context and adapter, and the recovery
/// protocol around them.
///
/// Rendering, presentation and recovery are expected on one thread. Camera
/// add/remove may come from platform event threads; all methods take `&self`.
///
/// Lock order: camera map, then device state. Sink callbacks run with no
/// lock held.
pub struct DeviceResources<B: GraphicsBackend, C> {
    backend: B,
    init: DeviceInit,
    factories: B::Factories,

    /// Cached at configuration time and reused by every recreation.
    space: RwLock<Option<SharedSpace<B>>>,

    /// `None` before the first initialization and while recovering.
    state: RwLock<Option<DeviceState<B>>>,

    notify: Mutex<Option<Weak<dyn DeviceNotify>>>,

    cameras: CameraRegistry<C>,
}

impl<B, C> DeviceResources<B, C>
where
    B: GraphicsBackend,
    C: CameraResources<B>,
{
    /// Creates the device-independent factories. No device exists until a
    /// holographic space is set.
    pub fn new(backend: B, init: DeviceInit) -> Result<Self, DeviceError> {
        let factories = create_device_independent_resources(&backend, &init)?;

        Ok(Self {
            backend,
            init,
            factories,
            space: RwLock::new(None),
            state: RwLock::new(None),
            notify: Mutex::new(None),
            cameras: CameraRegistry::new(),
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn init(&self) -> &DeviceInit {
        &self.init
    }

    pub fn factories(&self) -> &B::Factories {
        &self.factories
    }

    pub fn cameras(&self) -> &CameraRegistry<C> {
        &self.cameras
    }

    /// Caches `space` and creates the device it asks for.
    pub fn set_holographic_space<S>(&self, space: S) -> Result<(), DeviceError>
    where
        S: HolographicSpace<B> + Send + Sync + 'static,
    {
        *self.space.write() = Some(Box::new(space));
        self.initialize_using_holographic_space()
    }

    /// Resolves the adapter named by the holographic space, creates the
    /// device and hands its interop wrapper back to the space.
    ///
    /// Also the re-entry point for device-loss recovery; repeated calls
    /// behave identically.
    pub fn initialize_using_holographic_space(&self) -> Result<(), DeviceError> {
        let space = self.space.read();
        let space = space.as_deref().ok_or(DeviceError::NoHolographicSpace)?;

        let luid = space.primary_adapter_id();
        let adapter = if luid.is_specified() {
            let adapter = self
                .backend
                .find_adapter(luid, self.init.debug_layer)
                .map_err(|source| DeviceError::AdapterNotFound { luid, source })?;
            log::info!("holographic space selected adapter {luid}");
            Some(adapter)
        } else {
            // No platform preference; any previous choice is dropped.
            None
        };

        let state = create_device_resources(&self.backend, &self.init, adapter.as_ref())?;

        space
            .set_direct3d11_device(state.interop_device())
            .map_err(DeviceError::platform("set holographic space device"))?;

        *self.state.write() = Some(state);
        Ok(())
    }

    // ── accessors ─────────────────────────────────────────────────────────

    /// Borrows the current device state. Do not hold across frames; the
    /// state is replaced on recovery.
    pub fn device_state(&self) -> Option<MappedRwLockReadGuard<'_, DeviceState<B>>> {
        RwLockReadGuard::try_map(self.state.read(), |s| s.as_ref()).ok()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    pub fn device(&self) -> Option<B::Device> {
        self.state.read().as_ref().map(|s| s.device().clone())
    }

    pub fn context(&self) -> Option<B::Context> {
        self.state.read().as_ref().map(|s| s.context().clone())
    }

    pub fn interop_device(&self) -> Option<B::Interop> {
        self.state.read().as_ref().map(|s| s.interop_device().clone())
    }

    pub fn adapter(&self) -> Option<B::Adapter> {
        self.state.read().as_ref().map(|s| s.adapter().clone())
    }

    pub fn feature_level(&self) -> Option<FeatureLevel> {
        self.state.read().as_ref().map(DeviceState::feature_level)
    }

    pub fn capabilities(&self) -> Option<CapabilityFlags> {
        self.state.read().as_ref().map(DeviceState::capabilities)
    }

    pub fn supports_vprt(&self) -> bool {
        self.state
            .read()
            .as_ref()
            .is_some_and(DeviceState::supports_vprt)
    }

    // ── notification ──────────────────────────────────────────────────────

    /// Replaces the registered sink; `None` deregisters.
    ///
    /// Only a weak reference is kept. Deregister before dropping the sink.
    pub fn register_device_notify(&self, sink: Option<Weak<dyn DeviceNotify>>) {
        *self.notify.lock() = sink;
    }

    fn notify_sink(&self, event: &str, f: impl FnOnce(&dyn DeviceNotify)) {
        let Some(registered) = self.notify.lock().clone() else {
            return;
        };

        match registered.upgrade() {
            Some(sink) => f(sink.as_ref()),
            None => log::warn!("device notify sink dropped without deregistering; {event} not delivered"),
        }
    }

    // ── camera resources ──────────────────────────────────────────────────

    /// Registers resources for a newly added camera. A camera already
    /// registered under `id` is released and replaced.
    pub fn add_holographic_camera(&self, id: CameraId, resources: C) {
        self.cameras.with_cameras(|cameras| {
            if let Some(mut previous) = cameras.insert(id, resources) {
                if let Some(state) = self.state.read().as_ref() {
                    previous.release_resources_for_back_buffer(state);
                }
            }
        });
        log::debug!("camera {id} added");
    }

    /// Releases and forgets the camera's resources. Returns `false` for an
    /// unknown camera.
    pub fn remove_holographic_camera(&self, id: CameraId) -> bool {
        let removed = self.cameras.with_cameras(|cameras| {
            let Some(mut resources) = cameras.remove(&id) else {
                return false;
            };
            if let Some(state) = self.state.read().as_ref() {
                resources.release_resources_for_back_buffer(state);
            }
            true
        });

        if removed {
            log::debug!("camera {id} removed");
        }
        removed
    }

    /// Validates the back buffer of every camera in `prediction` and
    /// recreates resources whose back buffer changed.
    pub fn ensure_camera_resources<F>(
        &self,
        frame: &F,
        prediction: &FramePrediction,
    ) -> Result<(), DeviceError>
    where
        F: HolographicFrame<B> + ?Sized,
    {
        self.cameras.with_cameras(|cameras| -> Result<(), DeviceError> {
            let state = self.state.read();
            let state = state.as_ref().ok_or(DeviceError::NotInitialized)?;

            for &id in &prediction.camera_ids {
                let Some(resources) = cameras.get_mut(&id) else {
                    log::debug!("no resources registered for camera {id}; skipping");
                    continue;
                };

                let params = frame
                    .rendering_parameters(id)
                    .map_err(DeviceError::platform("get camera rendering parameters"))?;
                resources.create_resources_for_back_buffer(state, &params)?;
            }

            Ok(())
        })
    }

    fn release_all_camera_resources(&self) {
        self.cameras.with_cameras(|cameras| {
            let state = self.state.read();
            let Some(state) = state.as_ref() else {
                return;
            };

            for (id, resources) in cameras.iter_mut() {
                log::debug!("releasing back buffer resources for camera {id}");
                resources.release_resources_for_back_buffer(state);
            }
        });
    }

    fn discard_camera_views(&self, prediction: &FramePrediction) {
        self.cameras.with_cameras(|cameras| {
            let state = self.state.read();
            let Some(state) = state.as_ref() else {
                return;
            };

            // Only valid because each frame overwrites these views entirely.
            for id in &prediction.camera_ids {
                let Some(resources) = cameras.get(id) else {
                    continue;
                };
                if let Some(view) = resources.back_buffer_render_target_view() {
                    self.backend.discard_view(state.context(), view);
                }
                if let Some(view) = resources.depth_stencil_view() {
                    self.backend.discard_view(state.context(), view);
                }
            }
        });
    }

    // ── device loss ───────────────────────────────────────────────────────

    /// Tears down and recreates every device resource.
    ///
    /// The sink hears `on_device_lost` before anything is released and
    /// `on_device_restored` once the new device is published. A failed
    /// recreation is returned as is; there is no retry.
    pub fn handle_device_lost(&self) -> Result<(), DeviceError> {
        log::warn!("graphics device lost; recreating device resources");

        self.notify_sink("device lost", |sink| sink.on_device_lost());

        self.release_all_camera_resources();
        self.state.write().take();

        self.initialize_using_holographic_space()?;

        self.notify_sink("device restored", |sink| sink.on_device_restored());

        log::info!("graphics device restored");
        Ok(())
    }

    // ── frame lifecycle ───────────────────────────────────────────────────

    /// Presents `frame`, recovering inline when the compositor reports that
    /// the device was removed.
    ///
    /// Blocks until the previous frame has finished; takes noticeably longer
    /// on a frame that triggers recovery.
    pub fn present<F>(&self, frame: &F) -> Result<PresentOutcome, DeviceError>
    where
        F: HolographicFrame<B> + ?Sized,
    {
        let prediction = frame
            .current_prediction()
            .map_err(DeviceError::platform("get current prediction"))?;
        self.discard_camera_views(&prediction);

        let result = match frame.present_using_current_prediction() {
            Ok(result) => result,
            Err(err) if err.is_device_lost() => {
                log::debug!("present failed with a device-lost code ({err})");
                PresentResult::DeviceRemoved
            }
            Err(err) => {
                return Err(DeviceError::Platform {
                    operation: "present using current prediction",
                    source: err,
                });
            }
        };

        match result {
            PresentResult::Success => Ok(PresentOutcome::Presented),
            PresentResult::DeviceRemoved => {
                self.handle_device_lost()?;
                Ok(PresentOutcome::DeviceRecovered)
            }
        }
    }

    /// Unbinds all pipeline state and lets the driver reclaim transient
    /// allocations. Call when the app is suspending.
    pub fn trim(&self) -> Result<(), DeviceError> {
        let state = self.state.read();
        let state = state.as_ref().ok_or(DeviceError::NotInitialized)?;

        self.backend.clear_state(state.context());
        self.backend
            .trim(state.device())
            .map_err(DeviceError::interface("device trim"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::device::error::{BackendError, CODE_DEVICE_REMOVED, CODE_FAIL};
    use crate::device::types::{AdapterLuid, DriverType};
    use crate::sim::{
        SimAdapter, SimBackend, SimCamera, SimEvent, SimFrame, SimJournal, SimNotify, SimSpace,
        ViewKind, SOFTWARE_ADAPTER_LUID,
    };

    const INTEGRATED: AdapterLuid = AdapterLuid::new(0x10, 0);
    const DISCRETE: AdapterLuid = AdapterLuid::new(0x20, 1);

    type Resources = DeviceResources<SimBackend, SimCamera>;

    fn setup(primary: AdapterLuid) -> (Resources, SimSpace, SimJournal) {
        let backend = SimBackend::new(vec![
            SimAdapter::hardware(INTEGRATED, "integrated", FeatureLevel::Level11_1),
            SimAdapter::hardware(DISCRETE, "discrete", FeatureLevel::Level12_1),
        ]);
        let journal = backend.journal();
        let resources = DeviceResources::new(backend, DeviceInit::release()).unwrap();
        let space = SimSpace::new(&journal, primary);
        (resources, space, journal)
    }

    fn initialized(primary: AdapterLuid) -> (Resources, SimSpace, SimJournal) {
        let (resources, space, journal) = setup(primary);
        resources.set_holographic_space(space.clone()).unwrap();
        (resources, space, journal)
    }

    fn register(resources: &Resources, sink: &Arc<SimNotify>) {
        let weak: Weak<SimNotify> = Arc::downgrade(sink);
        let weak: Weak<dyn DeviceNotify> = weak;
        resources.register_device_notify(Some(weak));
    }

    fn is_create(e: &SimEvent) -> bool {
        matches!(e, SimEvent::CreateDevice { .. })
    }

    fn is_lost(e: &SimEvent) -> bool {
        matches!(e, SimEvent::DeviceLostNotified { .. })
    }

    fn is_restored(e: &SimEvent) -> bool {
        matches!(e, SimEvent::DeviceRestoredNotified { .. })
    }

    fn current_device_id(resources: &Resources) -> u64 {
        resources.device().expect("device").id
    }

    // ── adapter resolution ────────────────────────────────────────────────

    #[test]
    fn specified_adapter_is_used_for_creation() {
        let (resources, _space, journal) = initialized(DISCRETE);

        assert!(journal.events().contains(&SimEvent::FindAdapter(DISCRETE)));
        assert!(journal.events().iter().any(|e| matches!(
            e,
            SimEvent::CreateDevice {
                driver: DriverType::Hardware,
                adapter: Some(luid),
                ..
            } if *luid == DISCRETE
        )));
        assert_eq!(resources.adapter().map(|a| a.luid), Some(DISCRETE));
        assert_eq!(resources.feature_level(), Some(FeatureLevel::Level12_1));
    }

    #[test]
    fn unknown_adapter_is_fatal_and_does_not_fall_back() {
        let missing = AdapterLuid::new(0x99, 0);
        let (resources, space, journal) = setup(missing);

        let err = resources.set_holographic_space(space).unwrap_err();

        assert!(matches!(err, DeviceError::AdapterNotFound { luid, .. } if luid == missing));
        assert_eq!(journal.count(is_create), 0);
        assert!(!resources.is_initialized());
    }

    #[test]
    fn zero_adapter_id_caches_the_adapter_actually_used() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);

        assert_eq!(journal.count(|e| matches!(e, SimEvent::FindAdapter(_))), 0);

        let state = resources.device_state().expect("state");
        assert_eq!(state.adapter_luid(), INTEGRATED);
        assert_eq!(state.device().adapter, state.adapter_luid());
    }

    #[test]
    fn hardware_failure_falls_back_to_software_adapter() {
        let (resources, space, _journal) = setup(DISCRETE);
        resources.backend().fail_hardware(true);

        resources.set_holographic_space(space).unwrap();

        let state = resources.device_state().expect("state");
        assert_eq!(state.driver_type(), DriverType::Software);
        assert_eq!(state.adapter_luid(), SOFTWARE_ADAPTER_LUID);
    }

    #[test]
    fn initialize_without_space_fails() {
        let (resources, _space, _journal) = setup(AdapterLuid::NONE);
        assert!(matches!(
            resources.initialize_using_holographic_space(),
            Err(DeviceError::NoHolographicSpace)
        ));
    }

    #[test]
    fn rejected_publish_is_platform_error() {
        let (resources, space, _journal) = setup(AdapterLuid::NONE);
        space.fail_publish(true);

        let err = resources.set_holographic_space(space).unwrap_err();
        assert!(matches!(err, DeviceError::Platform { .. }));
        assert!(!resources.is_initialized());
    }

    #[test]
    fn factory_failure_aborts_construction() {
        let backend = SimBackend::new(vec![]);
        backend.fail_factories(true);
        assert!(matches!(
            Resources::new(backend, DeviceInit::release()),
            Err(DeviceError::FactoryCreation(_))
        ));
    }

    // ── interop handle ────────────────────────────────────────────────────

    #[test]
    fn interop_and_published_device_track_current_device() {
        let (resources, space, _journal) = initialized(AdapterLuid::NONE);
        let first = current_device_id(&resources);

        assert_eq!(resources.interop_device().map(|i| i.device_id), Some(first));
        assert_eq!(space.published_device(), Some(first));

        resources.handle_device_lost().unwrap();
        let second = current_device_id(&resources);

        assert_ne!(first, second);
        assert_eq!(resources.interop_device().map(|i| i.device_id), Some(second));
        assert_eq!(space.published_device(), Some(second));
    }

    // ── device loss ───────────────────────────────────────────────────────

    #[test]
    fn lost_is_notified_before_teardown_and_restored_after_publish() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        resources.add_holographic_camera(1, SimCamera::new(&journal, 1));
        resources.add_holographic_camera(2, SimCamera::new(&journal, 2));
        let frame = SimFrame::new(&journal, &[1, 2]);
        resources
            .ensure_camera_resources(&frame, frame.prediction())
            .unwrap();

        let sink = Arc::new(SimNotify::new(&journal, "app"));
        register(&resources, &sink);
        journal.clear();

        resources.handle_device_lost().unwrap();

        let lost = journal.position(is_lost).expect("lost");
        let first_release = journal
            .position(|e| matches!(e, SimEvent::CameraResourcesReleased { .. }))
            .expect("release");
        let create = journal.position(is_create).expect("create");
        let published = journal
            .position(|e| matches!(e, SimEvent::DevicePublished { .. }))
            .expect("publish");
        let restored = journal.position(is_restored).expect("restored");

        assert!(lost < first_release);
        assert!(first_release < create);
        assert!(create < published);
        assert!(published < restored);
        assert_eq!(restored, journal.events().len() - 1);
        assert_eq!(
            journal.count(|e| matches!(e, SimEvent::CameraResourcesReleased { .. })),
            2
        );
    }

    #[test]
    fn recovery_without_sink_completes() {
        let (resources, _space, _journal) = initialized(AdapterLuid::NONE);
        resources.handle_device_lost().unwrap();
        assert!(resources.is_initialized());
    }

    #[test]
    fn dropped_sink_is_skipped() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        let sink = Arc::new(SimNotify::new(&journal, "gone"));
        register(&resources, &sink);
        drop(sink);

        resources.handle_device_lost().unwrap();

        assert_eq!(journal.count(is_lost), 0);
        assert_eq!(journal.count(is_restored), 0);
        assert!(resources.is_initialized());
    }

    #[test]
    fn recovery_reresolves_the_adapter() {
        let (resources, space, _journal) = initialized(DISCRETE);
        space.set_primary_adapter(INTEGRATED);

        resources.handle_device_lost().unwrap();

        assert_eq!(resources.adapter().map(|a| a.luid), Some(INTEGRATED));
        assert_eq!(resources.feature_level(), Some(FeatureLevel::Level11_1));
    }

    #[test]
    fn recovery_moves_to_an_adapter_added_after_startup() {
        let external = AdapterLuid::new(0x30, 0);
        let (resources, space, _journal) = initialized(DISCRETE);
        resources.backend().add_adapter(SimAdapter::hardware(
            external,
            "external",
            FeatureLevel::Level12_0,
        ));
        space.set_primary_adapter(external);

        resources.handle_device_lost().unwrap();

        assert_eq!(resources.adapter().map(|a| a.luid), Some(external));
        assert_eq!(resources.feature_level(), Some(FeatureLevel::Level12_0));
    }

    #[test]
    fn failed_recreation_propagates_and_skips_restore() {
        let (resources, _space, journal) = initialized(DISCRETE);
        let sink = Arc::new(SimNotify::new(&journal, "app"));
        register(&resources, &sink);
        resources.backend().remove_adapter(DISCRETE);

        let err = resources.handle_device_lost().unwrap_err();

        assert!(matches!(err, DeviceError::AdapterNotFound { .. }));
        assert!(!resources.is_initialized());
        assert_eq!(journal.count(is_lost), 1);
        assert_eq!(journal.count(is_restored), 0);
    }

    #[test]
    fn capabilities_are_requeried_on_recreation() {
        let (resources, _space, _journal) = initialized(AdapterLuid::NONE);
        assert!(!resources.supports_vprt());

        resources.backend().set_vprt(Some(true));
        resources.handle_device_lost().unwrap();

        assert!(resources.supports_vprt());
        assert_eq!(resources.capabilities(), Some(CapabilityFlags { vprt: true }));
    }

    // ── notification registration ─────────────────────────────────────────

    #[test]
    fn second_registration_replaces_first() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        let first = Arc::new(SimNotify::new(&journal, "first"));
        let second = Arc::new(SimNotify::new(&journal, "second"));
        register(&resources, &first);
        register(&resources, &second);

        resources.handle_device_lost().unwrap();

        let names: Vec<_> = journal
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SimEvent::DeviceLostNotified { sink } | SimEvent::DeviceRestoredNotified { sink } => {
                    Some(sink)
                }
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["second".to_string(), "second".to_string()]);
    }

    #[test]
    fn none_deregisters() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        let sink = Arc::new(SimNotify::new(&journal, "app"));
        register(&resources, &sink);
        resources.register_device_notify(None);

        resources.handle_device_lost().unwrap();

        assert_eq!(journal.count(is_lost), 0);
    }

    // ── present ───────────────────────────────────────────────────────────

    #[test]
    fn normal_present_does_not_recover() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        journal.clear();

        let outcome = resources.present(&SimFrame::new(&journal, &[])).unwrap();

        assert_eq!(outcome, PresentOutcome::Presented);
        assert_eq!(journal.count(is_create), 0);
        assert_eq!(journal.count(|e| *e == SimEvent::Present), 1);
    }

    #[test]
    fn device_removed_present_recovers_exactly_once() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        let sink = Arc::new(SimNotify::new(&journal, "app"));
        register(&resources, &sink);
        let before = current_device_id(&resources);
        journal.clear();

        let outcome = resources
            .present(&SimFrame::new(&journal, &[]).device_removed())
            .unwrap();

        assert_eq!(outcome, PresentOutcome::DeviceRecovered);
        assert_eq!(journal.count(is_create), 1);
        assert_eq!(journal.count(is_lost), 1);
        assert_eq!(journal.count(is_restored), 1);
        assert_ne!(current_device_id(&resources), before);
    }

    #[test]
    fn device_lost_error_code_from_present_recovers() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        let frame = SimFrame::new(&journal, &[])
            .failing(BackendError::new(CODE_DEVICE_REMOVED, "device removed"));

        assert_eq!(resources.present(&frame).unwrap(), PresentOutcome::DeviceRecovered);
    }

    #[test]
    fn other_present_errors_propagate_without_recovery() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        journal.clear();
        let frame = SimFrame::new(&journal, &[]).failing(BackendError::new(CODE_FAIL, "boom"));

        assert!(matches!(
            resources.present(&frame),
            Err(DeviceError::Platform { .. })
        ));
        assert_eq!(journal.count(is_create), 0);
    }

    #[test]
    fn present_returns_the_recreation_error_when_recovery_fails() {
        let (resources, _space, journal) = initialized(DISCRETE);
        let sink = Arc::new(SimNotify::new(&journal, "app"));
        register(&resources, &sink);
        resources.backend().remove_adapter(DISCRETE);

        let err = resources
            .present(&SimFrame::new(&journal, &[]).device_removed())
            .unwrap_err();

        assert!(matches!(err, DeviceError::AdapterNotFound { luid, .. } if luid == DISCRETE));
        assert!(!resources.is_initialized());
        assert_eq!(journal.count(is_lost), 1);
        assert_eq!(journal.count(is_restored), 0);
    }

    #[test]
    fn present_discards_views_of_predicted_cameras_first() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        resources.add_holographic_camera(1, SimCamera::new(&journal, 1));
        resources.add_holographic_camera(2, SimCamera::new(&journal, 2));
        let frame = SimFrame::new(&journal, &[1, 2]);
        resources
            .ensure_camera_resources(&frame, frame.prediction())
            .unwrap();
        journal.clear();

        resources.present(&SimFrame::new(&journal, &[1])).unwrap();

        assert_eq!(
            journal.events(),
            vec![
                SimEvent::DiscardView {
                    camera: 1,
                    kind: ViewKind::RenderTarget
                },
                SimEvent::DiscardView {
                    camera: 1,
                    kind: ViewKind::DepthStencil
                },
                SimEvent::Present,
            ]
        );
    }

    // ── trim ──────────────────────────────────────────────────────────────

    #[test]
    fn trim_clears_state_before_trimming() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        let device = current_device_id(&resources);
        journal.clear();

        resources.trim().unwrap();
        resources.trim().unwrap();

        let expected = vec![
            SimEvent::ClearState { device },
            SimEvent::Trim { device },
            SimEvent::ClearState { device },
            SimEvent::Trim { device },
        ];
        assert_eq!(journal.events(), expected);
    }

    #[test]
    fn trim_without_device_is_not_initialized() {
        let (resources, _space, _journal) = setup(AdapterLuid::NONE);
        assert!(matches!(resources.trim(), Err(DeviceError::NotInitialized)));
    }

    #[test]
    fn trim_failure_propagates() {
        let (resources, _space, _journal) = initialized(AdapterLuid::NONE);
        resources.backend().fail_trim(true);
        assert!(matches!(
            resources.trim(),
            Err(DeviceError::InterfaceNotSupported { .. })
        ));
    }

    // ── cameras ───────────────────────────────────────────────────────────

    #[test]
    fn ensure_creates_resources_for_known_cameras_only() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        resources.add_holographic_camera(1, SimCamera::new(&journal, 1));
        journal.clear();

        let frame = SimFrame::new(&journal, &[1, 5]);
        resources
            .ensure_camera_resources(&frame, frame.prediction())
            .unwrap();

        let device = current_device_id(&resources);
        assert_eq!(
            journal.events(),
            vec![SimEvent::CameraResourcesCreated { camera: 1, device }]
        );
        resources.cameras().with_cameras(|c| {
            assert_eq!(c[&1].id(), 1);
            assert!(c[&1].has_resources());
            assert_eq!(c[&1].back_buffer_size(), Some((1268, 720)));
        });
    }

    #[test]
    fn ensure_before_initialization_fails() {
        let (resources, _space, journal) = setup(AdapterLuid::NONE);
        let frame = SimFrame::new(&journal, &[1]);
        assert!(matches!(
            resources.ensure_camera_resources(&frame, frame.prediction()),
            Err(DeviceError::NotInitialized)
        ));
    }

    #[test]
    fn remove_releases_and_forgets() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        resources.add_holographic_camera(3, SimCamera::new(&journal, 3));
        let frame = SimFrame::new(&journal, &[3]);
        resources
            .ensure_camera_resources(&frame, frame.prediction())
            .unwrap();

        assert!(resources.remove_holographic_camera(3));
        assert!(!resources.remove_holographic_camera(3));
        assert!(!resources.cameras().contains(3));
        assert_eq!(
            journal.count(|e| matches!(e, SimEvent::CameraResourcesReleased { camera: 3, .. })),
            1
        );
    }

    #[test]
    fn cameras_are_rebuilt_on_the_new_device_after_recovery() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);
        resources.add_holographic_camera(1, SimCamera::new(&journal, 1));
        let frame = SimFrame::new(&journal, &[1]);
        resources
            .ensure_camera_resources(&frame, frame.prediction())
            .unwrap();

        resources.handle_device_lost().unwrap();
        resources.cameras().with_cameras(|c| {
            assert!(!c[&1].has_resources());
            assert_eq!(c[&1].back_buffer_size(), None);
        });

        resources
            .ensure_camera_resources(&frame, frame.prediction())
            .unwrap();
        let device = current_device_id(&resources);
        assert!(journal
            .events()
            .contains(&SimEvent::CameraResourcesCreated { camera: 1, device }));
    }

    #[test]
    fn camera_churn_is_serialized_with_recovery() {
        let (resources, _space, journal) = initialized(AdapterLuid::NONE);

        std::thread::scope(|s| {
            let resources = &resources;
            let journal = &journal;

            s.spawn(move || {
                for id in 0..200u32 {
                    resources.add_holographic_camera(id, SimCamera::new(journal, id));
                    if id % 2 == 0 {
                        resources.remove_holographic_camera(id);
                    }
                }
            });

            for _ in 0..10 {
                resources.handle_device_lost().unwrap();
            }
        });

        assert!(resources.is_initialized());
        assert_eq!(resources.cameras().len(), 100);
        assert!(resources.cameras().ids().iter().all(|id| id % 2 == 1));
    }
}
