use std::sync::{Arc, Weak};

use anyhow::{Context, Result};
use holoframe_engine::device::{
    AdapterLuid, DeviceInit, DeviceNotify, DeviceResources, FeatureLevel, PresentOutcome,
};
use holoframe_engine::logging::{init_logging, LoggingConfig};
use holoframe_engine::sim::{
    SimAdapter, SimBackend, SimCamera, SimEvent, SimFrame, SimNotify, SimSpace,
};

const INTEGRATED: AdapterLuid = AdapterLuid::new(0x0000_1a2b, 0);
const DISCRETE: AdapterLuid = AdapterLuid::new(0x0000_3c4d, 0);

const LEFT_EYE: u32 = 1;
const SPECTATOR: u32 = 2;

/// Frame on which the compositor reports the device as removed.
const LOST_FRAME: usize = 3;
const FRAMES: usize = 6;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║        HOLOFRAME STUDIO v0.1           ║");
    println!("  ║   simulated device  ·  recovery demo   ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let backend = SimBackend::new(vec![
        SimAdapter::hardware(INTEGRATED, "Integrated GPU", FeatureLevel::Level11_1),
        SimAdapter::hardware(DISCRETE, "Discrete GPU", FeatureLevel::Level12_1),
    ]);
    backend.set_vprt(Some(true));
    let journal = backend.journal();

    let resources: DeviceResources<SimBackend, SimCamera> =
        DeviceResources::new(backend.clone(), DeviceInit::default())
            .context("creating device-independent resources")?;

    let sink = Arc::new(SimNotify::new(&journal, "renderer"));
    let weak: Weak<SimNotify> = Arc::downgrade(&sink);
    let weak: Weak<dyn DeviceNotify> = weak;
    resources.register_device_notify(Some(weak));

    let space = SimSpace::new(&journal, DISCRETE);
    resources
        .set_holographic_space(space.clone())
        .context("initializing from the holographic space")?;
    report_device(&resources);
    log::info!("holographic space initialized on adapter {DISCRETE}");

    resources.add_holographic_camera(LEFT_EYE, SimCamera::new(&journal, LEFT_EYE));
    resources.add_holographic_camera(SPECTATOR, SimCamera::new(&journal, SPECTATOR));

    // ── FRAME LOOP ────────────────────────────────────────────────────────
    for index in 0..FRAMES {
        let frame = SimFrame::new(&journal, &[LEFT_EYE, SPECTATOR]);
        let frame = if index == LOST_FRAME {
            frame.device_removed()
        } else {
            frame
        };

        resources
            .ensure_camera_resources(&frame, frame.prediction())
            .with_context(|| format!("preparing cameras for frame {index}"))?;

        match resources
            .present(&frame)
            .with_context(|| format!("presenting frame {index}"))?
        {
            PresentOutcome::Presented => println!("  [FRAME {index}] presented"),
            PresentOutcome::DeviceRecovered => {
                log::info!("frame {index} recovered from device removal");
                println!("  [FRAME {index}] device removed  ..  RECOVERED");
                report_device(&resources);
            }
        }
    }

    resources.trim().context("trimming device memory")?;
    log::info!("device trimmed after {FRAMES} frames");
    println!();
    println!("  [SUSPEND] device state cleared and trimmed");
    if let Some(device) = space.published_device() {
        println!("  [SPACE] rendering with device #{device}");
    }

    // ── TIMELINE ──────────────────────────────────────────────────────────
    println!();
    println!("  Recovery timeline:");
    let mut recovering = false;
    for event in journal.events() {
        match &event {
            SimEvent::DeviceLostNotified { .. } => recovering = true,
            SimEvent::DeviceRestoredNotified { .. } => {
                println!("    {event:?}");
                recovering = false;
                continue;
            }
            _ => {}
        }
        if recovering {
            println!("    {event:?}");
        }
    }
    println!();

    Ok(())
}

fn report_device(resources: &DeviceResources<SimBackend, SimCamera>) {
    let Some(state) = resources.device_state() else {
        println!("  [DEVICE] none");
        return;
    };
    println!(
        "  [DEVICE] #{}  adapter {}  driver {}  level {}  vprt {}",
        state.device().id,
        state.adapter_luid(),
        state.driver_type(),
        state.feature_level(),
        state.supports_vprt(),
    );
}
