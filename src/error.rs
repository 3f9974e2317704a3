//! Error types for the capture subsystem
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    /// No input device at all; the caller shuts down.
    #[error("No audio input devices found")]
    NoDeviceFound,

    #[error("Failed to enumerate devices: {0}")]
    Enumeration(String),

    /// The device refused to open or rejected the requested parameters.
    /// Retryable with another device or block size.
    #[error("Device '{device}' unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("Unsupported block size: {0}")]
    InvalidBlockSize(u32),
}

impl CaptureError {
    pub fn unavailable(device: impl Into<String>, reason: impl ToString) -> Self {
        CaptureError::DeviceUnavailable {
            device: device.into(),
            reason: reason.to_string(),
        }
    }
}
