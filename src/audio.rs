pub mod analyzer;
pub mod audio_stream;
pub mod capture;
pub mod devices;
pub mod history;

pub use analyzer::{FftState, MeterState, SignalProcessor};
pub use audio_stream::{CpalBackend, InputBackend, StreamController, StreamState};
pub use capture::{CaptureSnapshot, CaptureState, SharedCapture, StreamStats};
pub use devices::{DeviceInfo, list_input_devices, preferred_device_index};
pub use history::HistoryRing;
