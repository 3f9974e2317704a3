mod config_panel;
mod history;
mod live_monitoring;
mod meter;
mod plot;
mod spectrum;
mod waveform;

pub use config_panel::render_config_panel;
pub use history::render_history;
pub use live_monitoring::render_live_monitoring;
pub use meter::render_meter;
pub use spectrum::render_spectrum;
pub use waveform::render_waveform;
