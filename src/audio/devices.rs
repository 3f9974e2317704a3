//! Input device enumeration

use cpal::traits::{DeviceTrait, HostTrait};
use log::{debug, info};

use crate::consts::PREFERRED_DEVICE_HINT;
use crate::error::CaptureError;

/// One selectable input device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    /// Identifier handed back to the backend to open the device.
    pub id: String,
    pub max_input_channels: u16,
    pub host_api: String,
}

/// List every device of `host` that has at least one input channel.
pub fn list_input_devices(host: &cpal::Host) -> Result<Vec<DeviceInfo>, CaptureError> {
    let host_api = host.id().name().to_string();

    let devices: Vec<DeviceInfo> = host
        .input_devices()
        .map_err(|e| CaptureError::Enumeration(e.to_string()))?
        .filter_map(|device| {
            let name = device.name().ok()?;
            let max_input_channels = device
                .supported_input_configs()
                .ok()?
                .map(|range| range.channels())
                .max()
                .unwrap_or(0);

            (max_input_channels > 0).then(|| DeviceInfo {
                id: name.clone(),
                name,
                max_input_channels,
                host_api: host_api.clone(),
            })
        })
        .collect();

    debug!("Found {} audio input devices on {host_api}", devices.len());

    if devices.is_empty() {
        return Err(CaptureError::NoDeviceFound);
    }
    Ok(devices)
}

/// Pick the device to open first: a desktop loopback device if there is one,
/// else the host default, else the first entry.
pub fn preferred_device_index(devices: &[DeviceInfo], default_name: Option<&str>) -> usize {
    if let Some(idx) = devices
        .iter()
        .position(|d| d.name.contains(PREFERRED_DEVICE_HINT))
    {
        return idx;
    }

    info!("'{PREFERRED_DEVICE_HINT}' not found; enable it in the system sound settings to capture desktop audio");

    default_name
        .and_then(|name| devices.iter().position(|d| d.name == name))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> DeviceInfo {
        DeviceInfo {
            name: name.to_string(),
            id: name.to_string(),
            max_input_channels: 2,
            host_api: "WASAPI".to_string(),
        }
    }

    #[test]
    fn loopback_device_is_preferred() {
        let devices = [
            device("Microphone"),
            device("Stereo Mix (Realtek Audio)"),
            device("Line In"),
        ];

        assert_eq!(preferred_device_index(&devices, Some("Line In")), 1);
    }

    #[test]
    fn falls_back_to_host_default() {
        let devices = [device("Microphone"), device("Line In")];

        assert_eq!(preferred_device_index(&devices, Some("Line In")), 1);
    }

    #[test]
    fn falls_back_to_first_device() {
        let devices = [device("Microphone"), device("Line In")];

        assert_eq!(preferred_device_index(&devices, None), 0);
        assert_eq!(preferred_device_index(&devices, Some("Headset")), 0);
    }
}
