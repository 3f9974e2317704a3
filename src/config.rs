use std::fmt;

use crate::audio::DeviceInfo;
use crate::consts::HISTORY_SECONDS;
use crate::error::CaptureError;

pub const APP_VERSION: &str = "v0.1.0";

/// Number of frames the driver delivers per capture callback.
///
/// The sample rate is tied to the block size so that the larger blocks keep
/// roughly the same time window instead of only adding latency.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BlockSize {
    B512,
    B1024,
    B2048,
    B4096,
    B8192,
}

impl BlockSize {
    pub const ALL: [BlockSize; 5] = [
        BlockSize::B512,
        BlockSize::B1024,
        BlockSize::B2048,
        BlockSize::B4096,
        BlockSize::B8192,
    ];

    pub fn frames(self) -> usize {
        match self {
            BlockSize::B512 => 512,
            BlockSize::B1024 => 1024,
            BlockSize::B2048 => 2048,
            BlockSize::B4096 => 4096,
            BlockSize::B8192 => 8192,
        }
    }

    /// Sample rate in Hz the stream is opened with for this block size.
    pub fn sample_rate(self) -> u32 {
        match self {
            BlockSize::B512 | BlockSize::B1024 | BlockSize::B2048 => 44_100,
            BlockSize::B4096 => 22_050,
            BlockSize::B8192 => 11_025,
        }
    }
}

impl TryFrom<u32> for BlockSize {
    type Error = CaptureError;

    fn try_from(frames: u32) -> Result<Self, Self::Error> {
        BlockSize::ALL
            .into_iter()
            .find(|size| size.frames() == frames as usize)
            .ok_or(CaptureError::InvalidBlockSize(frames))
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frames())
    }
}

/// Parameters one capture stream is opened with.
///
/// Immutable: a change of device or block size builds a new value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StreamConfig {
    device_id: String,
    device_name: String,
    channels: u16,
    block_size: BlockSize,
}

impl StreamConfig {
    pub fn new(device: &DeviceInfo, block_size: BlockSize) -> Self {
        Self {
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            channels: device.max_input_channels.clamp(1, 2),
            block_size,
        }
    }

    pub fn with_block_size(&self, block_size: BlockSize) -> Self {
        Self {
            block_size,
            ..self.clone()
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Channel count requested from the driver, always 1 or 2.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    pub fn frames(&self) -> usize {
        self.block_size.frames()
    }

    pub fn sample_rate(&self) -> u32 {
        self.block_size.sample_rate()
    }

    /// Capacity of the history ring in samples.
    pub fn history_capacity(&self) -> usize {
        self.sample_rate() as usize * HISTORY_SECONDS as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(max_input_channels: u16) -> DeviceInfo {
        DeviceInfo {
            name: "Line In".to_string(),
            id: "Line In".to_string(),
            max_input_channels,
            host_api: "ALSA".to_string(),
        }
    }

    #[test]
    fn sample_rate_follows_block_size() {
        let rates: Vec<(usize, u32)> = BlockSize::ALL
            .iter()
            .map(|size| (size.frames(), size.sample_rate()))
            .collect();

        assert_eq!(
            rates,
            [
                (512, 44_100),
                (1024, 44_100),
                (2048, 44_100),
                (4096, 22_050),
                (8192, 11_025),
            ]
        );
    }

    #[test]
    fn block_size_parses_only_supported_sizes() {
        assert_eq!(BlockSize::try_from(4096).unwrap(), BlockSize::B4096);
        assert!(matches!(
            BlockSize::try_from(1000),
            Err(CaptureError::InvalidBlockSize(1000))
        ));
        assert!(BlockSize::try_from(0).is_err());
    }

    #[test]
    fn channel_count_is_clamped_to_stereo() {
        assert_eq!(StreamConfig::new(&device(0), BlockSize::B512).channels(), 1);
        assert_eq!(StreamConfig::new(&device(1), BlockSize::B512).channels(), 1);
        assert_eq!(StreamConfig::new(&device(2), BlockSize::B512).channels(), 2);
        assert_eq!(StreamConfig::new(&device(8), BlockSize::B512).channels(), 2);
    }

    #[test]
    fn changing_block_size_rederives_rate_and_history() {
        let config = StreamConfig::new(&device(2), BlockSize::B1024);
        assert_eq!(config.sample_rate(), 44_100);
        assert_eq!(config.history_capacity(), 176_400);

        let config = config.with_block_size(BlockSize::B8192);
        assert_eq!(config.frames(), 8192);
        assert_eq!(config.sample_rate(), 11_025);
        assert_eq!(config.history_capacity(), 44_100);
        assert_eq!(config.device_id(), "Line In");
    }
}
