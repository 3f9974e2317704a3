//! Fixed-cadence consumer of the capture buffers

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::audio::{CaptureSnapshot, SharedCapture, SignalProcessor};

/// Receives the derived signals once per refresh tick.
pub trait VisualSink: Send {
    fn set_meter_levels(&mut self, left: f32, right: f32);
    fn set_waveform(&mut self, xs: &[f32], ys: &[f32]);
    fn set_spectrum(&mut self, freqs_khz: &[f32], current_db: &[f32], average_db: &[f32]);
    fn set_history(&mut self, xs: &[f32], ys: &[f32]);
}

pub struct RefreshScheduler {
    capture: SharedCapture,
    processor: SignalProcessor,
    snapshot: CaptureSnapshot,
    sinks: Vec<Box<dyn VisualSink>>,
}

impl RefreshScheduler {
    pub fn new(capture: SharedCapture, sinks: Vec<Box<dyn VisualSink>>) -> Self {
        let block_size = capture.lock().block_size();
        Self {
            capture,
            processor: SignalProcessor::new(block_size),
            snapshot: CaptureSnapshot::default(),
            sinks,
        }
    }

    #[cfg(test)]
    pub fn processor(&self) -> &SignalProcessor {
        &self.processor
    }

    /// Snapshot, process and publish once.
    pub fn tick(&mut self) {
        // The guard is dropped at the end of this statement.
        self.capture.lock().snapshot_into(&mut self.snapshot);

        self.processor.process(&self.snapshot);

        let [left, right] = self.processor.meter().levels;
        let spectrum = self.processor.spectrum();
        let history_x = self.processor.history_x(self.snapshot.history.len());
        for sink in &mut self.sinks {
            sink.set_meter_levels(left, right);
            sink.set_waveform(self.processor.waveform_x(), &self.snapshot.left);
            sink.set_spectrum(
                &spectrum.frequencies_khz,
                &spectrum.current_db,
                &spectrum.average_db,
            );
            sink.set_history(history_x, &self.snapshot.history);
        }
    }

    /// Run [`tick`](Self::tick) every `interval` on a dedicated thread.
    pub fn spawn(mut self, interval: Duration) -> std::io::Result<RefreshHandle> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();

        let thread = thread::Builder::new()
            .name("refresh".to_string())
            .spawn(move || {
                debug!("Refresh thread started");
                let start = Instant::now();
                let mut deadline = start;
                while !thread_shutdown.load(Ordering::Relaxed) {
                    self.tick();

                    let now = Instant::now();
                    let next = next_deadline(start, now, interval);
                    let skipped = ticks_between(deadline, next, interval).saturating_sub(1);
                    if skipped > 0 {
                        trace!("Refresh tick overran, dropped {skipped} frame(s)");
                    }
                    deadline = next;
                    thread::sleep(next.saturating_duration_since(now));
                }
                debug!("Refresh thread shutting down");
            })?;

        Ok(RefreshHandle {
            shutdown,
            thread: Some(thread),
        })
    }
}

/// First tick boundary after `now` on the grid `start + n * interval`.
/// Missed boundaries are skipped, never queued.
pub fn next_deadline(start: Instant, now: Instant, interval: Duration) -> Instant {
    let period = interval.as_nanos().max(1);
    let elapsed = now.saturating_duration_since(start).as_nanos();
    let ticks = elapsed / period + 1;
    start + Duration::from_nanos((ticks * period) as u64)
}

fn ticks_between(from: Instant, to: Instant, interval: Duration) -> u128 {
    to.saturating_duration_since(from).as_nanos() / interval.as_nanos().max(1)
}

/// Stops and joins the refresh thread when dropped.
pub struct RefreshHandle {
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                log::error!("Refresh thread panicked");
            }
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
