use std::time::Duration;

use crate::config::BlockSize;

/// Amount the displayed meter level drops per refresh tick when no louder
/// peak arrives. At 60 ticks per second this is roughly 3 units per second.
pub const FALL_OFF_RATE: f32 = 0.05;

/// Weight of the newest spectrum in the running average.
/// 0.1 = slow, smooth average; 1.0 = no averaging at all.
pub const FFT_AVERAGE_FACTOR: f32 = 0.1;

/// Added to every FFT magnitude before taking the logarithm so silence maps to
/// -200 dB instead of negative infinity.
pub const DB_EPSILON: f32 = 1e-10;

/// Length of the scrolling waveform history in seconds.
pub const HISTORY_SECONDS: u32 = 4;

/// Refresh cadence of the consumer thread, ~60 Hz.
pub const REFRESH_INTERVAL: Duration = Duration::from_micros(16_667);

/// Block size used when the app starts.
pub const DEFAULT_BLOCK_SIZE: BlockSize = BlockSize::B1024;

/// Input devices whose name contains this are picked first: on Windows this
/// is the loopback device that captures desktop audio.
pub const PREFERRED_DEVICE_HINT: &str = "Stereo Mix";

/// Fixed y-range of the spectrum plot in dB.
pub const SPECTRUM_DB_RANGE: (f32, f32) = (-120.0, 0.0);
