mod audio;
mod config;
mod consts;
mod error;
mod gui;
mod refresh;

use audio::{CaptureState, CpalBackend, StreamController};
use config::APP_VERSION;
use consts::{DEFAULT_BLOCK_SIZE, REFRESH_INTERVAL};
use cpal::traits::{DeviceTrait, HostTrait};
use gui::{AppState, FrameSink, SharedFrame};
use log::{debug, error, info};
use refresh::{RefreshScheduler, VisualSink};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting up...");

    // === Devices ===
    let host = cpal::default_host();
    let devices = match audio::list_input_devices(&host) {
        Ok(devices) => devices,
        Err(e) => {
            error!("{e}. The application cannot continue.");
            return Err(e.into());
        }
    };

    let default_device_name = host.default_input_device().and_then(|d| d.name().ok());
    let selected_device_idx =
        audio::preferred_device_index(&devices, default_device_name.as_deref());
    let selected_device = devices
        .get(selected_device_idx)
        .map(|d| d.name.as_str())
        .unwrap_or("None");
    info!("Selected initial audio device: {selected_device}");

    // === Shared State ===
    let capture = CaptureState::shared(DEFAULT_BLOCK_SIZE);
    let frame = SharedFrame::default();

    // === Refresh Thread ===
    debug!("Spawning refresh thread...");
    let sinks: Vec<Box<dyn VisualSink>> = vec![Box::new(FrameSink::new(frame.clone()))];
    let mut refresh = RefreshScheduler::new(capture.clone(), sinks).spawn(REFRESH_INTERVAL)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 950.0])
            .with_title(format!("Audio Scope {APP_VERSION}")),
        ..Default::default()
    };

    debug!("Launching GUI...");
    let result = eframe::run_native(
        "audioscope",
        options,
        Box::new(move |_cc| {
            let controller = StreamController::new(CpalBackend::new(host), capture);
            Ok(Box::new(AppState::new(
                controller,
                devices,
                selected_device_idx,
                frame,
            )))
        }),
    );

    debug!("Waiting for refresh thread to finish...");
    refresh.stop();
    debug!("Refresh thread joined");

    info!("Clean shutdown complete");

    result.map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
