use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat};
use log::{debug, info, warn};

use super::capture::{SharedCapture, StreamStats};
use crate::config::StreamConfig;
use crate::error::CaptureError;

/// Opens capture streams that deliver into a [`SharedCapture`].
///
/// Dropping the returned stream must stop it and only return once the
/// driver will not invoke the callback again.
pub trait InputBackend {
    type Stream;

    fn open(
        &self,
        config: &StreamConfig,
        capture: SharedCapture,
        stats: Arc<StreamStats>,
    ) -> Result<Self::Stream, CaptureError>;
}

pub struct CpalBackend {
    host: cpal::Host,
}

impl CpalBackend {
    pub fn new(host: cpal::Host) -> Self {
        Self { host }
    }
}

pub struct CpalStream {
    stream: cpal::Stream,
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        // Dropping the cpal stream afterwards joins the driver callback.
        if let Err(e) = self.stream.pause() {
            debug!("Pausing stream before close failed: {e}");
        }
    }
}

impl InputBackend for CpalBackend {
    type Stream = CpalStream;

    fn open(
        &self,
        config: &StreamConfig,
        capture: SharedCapture,
        stats: Arc<StreamStats>,
    ) -> Result<CpalStream, CaptureError> {
        let name = config.device_name();
        let device = self
            .host
            .input_devices()
            .map_err(|e| CaptureError::unavailable(name, e))?
            .find(|d| d.name().ok().as_deref() == Some(config.device_id()))
            .ok_or_else(|| CaptureError::unavailable(name, "device not found"))?;

        let sample_rate = cpal::SampleRate(config.sample_rate());
        let supported = device
            .supported_input_configs()
            .map_err(|e| CaptureError::unavailable(name, e))?
            .find(|range| {
                range.channels() == config.channels()
                    && range.min_sample_rate() <= sample_rate
                    && sample_rate <= range.max_sample_rate()
            })
            .ok_or_else(|| {
                CaptureError::unavailable(
                    name,
                    format!(
                        "no {}-channel input at {} Hz",
                        config.channels(),
                        config.sample_rate()
                    ),
                )
            })?;
        let sample_format = supported.sample_format();

        let mut stream_config = cpal::StreamConfig {
            channels: config.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Fixed(config.frames() as u32),
        };

        let stream = match build_stream(
            &device,
            &stream_config,
            sample_format,
            config,
            &capture,
            &stats,
        ) {
            Ok(stream) => stream,
            Err(e) => {
                warn!(
                    "'{name}' rejected a fixed buffer of {} frames ({e}); using the driver default",
                    config.frames()
                );
                stream_config.buffer_size = cpal::BufferSize::Default;
                build_stream(&device, &stream_config, sample_format, config, &capture, &stats)
                    .map_err(|e| CaptureError::unavailable(name, e))?
            }
        };

        stream
            .play()
            .map_err(|e| CaptureError::unavailable(name, e))?;

        Ok(CpalStream { stream })
    }
}

fn build_stream(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    sample_format: SampleFormat,
    config: &StreamConfig,
    capture: &SharedCapture,
    stats: &Arc<StreamStats>,
) -> Result<cpal::Stream, anyhow::Error> {
    let frames = config.frames();
    let stream = match sample_format {
        SampleFormat::F32 => {
            build_typed::<f32>(device, stream_config, frames, capture.clone(), stats.clone())?
        }
        SampleFormat::I16 => {
            build_typed::<i16>(device, stream_config, frames, capture.clone(), stats.clone())?
        }
        SampleFormat::U16 => {
            build_typed::<u16>(device, stream_config, frames, capture.clone(), stats.clone())?
        }
        other => return Err(anyhow::anyhow!("Unsupported sample format {other:?}")),
    };
    Ok(stream)
}

fn build_typed<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    frames: usize,
    capture: SharedCapture,
    stats: Arc<StreamStats>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: Sample + cpal::SizedSample,
    f32: FromSample<T>,
{
    let channels = stream_config.channels as usize;
    let mut scratch: Vec<f32> = Vec::with_capacity(frames * channels);
    let error_stats = stats.clone();

    device.build_input_stream(
        stream_config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // Convert before locking so the critical section is a plain copy.
            scratch.clear();
            scratch.extend(data.iter().map(|&s| s.to_sample::<f32>()));
            stats.record_block(data.len() / channels, frames);
            capture.lock().write_block(&scratch, channels);
        },
        move |err| match err {
            cpal::StreamError::DeviceNotAvailable => {
                error_stats.record_device_lost();
                warn!("Input device is no longer available");
            }
            other => {
                error_stats.record_status_warning();
                warn!("Stream status warning: {other}");
            }
        },
        None,
    )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Starting,
    Running,
    /// Last start failed; another start may succeed.
    Error(String),
}

/// Owns the one live capture stream and the buffers it writes into.
///
/// Every lifecycle call takes `&mut self`, so starts, stops and
/// reconfigurations can never overlap.
pub struct StreamController<B: InputBackend> {
    backend: B,
    capture: SharedCapture,
    stats: Arc<StreamStats>,
    stream: Option<B::Stream>,
    config: Option<StreamConfig>,
    state: StreamState,
}

impl<B: InputBackend> StreamController<B> {
    pub fn new(backend: B, capture: SharedCapture) -> Self {
        Self {
            backend,
            capture,
            stats: Arc::new(StreamStats::default()),
            stream: None,
            config: None,
            state: StreamState::Idle,
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Configuration of the running stream.
    pub fn config(&self) -> Option<&StreamConfig> {
        self.config.as_ref()
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Open a stream for `config`, closing any stream that is still open.
    ///
    /// On failure the controller is left in [`StreamState::Error`] and the
    /// error is returned; nothing else is torn down.
    pub fn start(&mut self, config: StreamConfig) -> Result<(), CaptureError> {
        self.release();
        self.config = None;
        self.state = StreamState::Starting;

        // No callback can be running here, so the buffers can be reshaped.
        self.capture.lock().resize(config.block_size());
        self.stats.reset();

        match self
            .backend
            .open(&config, self.capture.clone(), self.stats.clone())
        {
            Ok(stream) => {
                info!(
                    "Stream started: {} ({}ch @ {}Hz, {} frames)",
                    config.device_name(),
                    config.channels(),
                    config.sample_rate(),
                    config.frames()
                );
                self.stream = Some(stream);
                self.config = Some(config);
                self.state = StreamState::Running;
                Ok(())
            }
            Err(e) => {
                warn!("Error starting audio stream: {e}");
                self.state = StreamState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Turn a device lost while streaming into [`StreamState::Error`].
    ///
    /// The driver reports the loss from its own thread, so the owner calls
    /// this once per frame.
    pub fn poll(&mut self) {
        if self.stream.is_none() || !self.stats.device_lost() {
            return;
        }

        let device = self
            .config
            .as_ref()
            .map(|c| c.device_name().to_string())
            .unwrap_or_default();
        let err = CaptureError::unavailable(device, "device disconnected");
        warn!("Stream lost: {err}");

        self.release();
        self.config = None;
        self.state = StreamState::Error(err.to_string());
    }

    /// Close the stream. Does nothing if none is open.
    pub fn stop(&mut self) {
        if self.release() {
            info!("Stream stopped");
        }
        self.config = None;
        self.state = StreamState::Idle;
    }

    /// Switch to `config`: the old stream is fully drained before the
    /// buffers are reshaped and the new stream is opened.
    pub fn reconfigure(&mut self, config: StreamConfig) -> Result<(), CaptureError> {
        debug!(
            "Reconfiguring stream: device={}, block={}, rate={}",
            config.device_name(),
            config.block_size(),
            config.sample_rate()
        );
        self.start(config)
    }

    fn release(&mut self) -> bool {
        // Dropping blocks until the driver has delivered its last callback.
        self.stream.take().is_some()
    }
}
