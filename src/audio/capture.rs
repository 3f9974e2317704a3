//! State shared between the capture callback and the refresh thread

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use super::history::HistoryRing;
use crate::config::BlockSize;
use crate::consts::HISTORY_SECONDS;

/// Capture state guarded by the one lock both threads take.
pub type SharedCapture = Arc<Mutex<CaptureState>>;

/// Most recent block, one slot per channel.
pub struct CaptureBuffer {
    left: Vec<f32>,
    right: Vec<f32>,
}

impl CaptureBuffer {
    pub fn new(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    #[cfg(test)]
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    /// Write interleaved frames into the channel slots.
    ///
    /// A mono source is written to both slots. A full delivery replaces the
    /// block; a shorter one shifts the previous frames out so the slots always
    /// hold the latest `frames()` samples.
    pub fn write_interleaved(&mut self, data: &[f32], channels: usize) {
        let channels = channels.max(1);
        let block = self.left.len();
        let frames = data.len() / channels;
        if block == 0 || frames == 0 {
            return;
        }

        let take = frames.min(block);
        if take < block {
            self.left.copy_within(take.., 0);
            self.right.copy_within(take.., 0);
        }

        let offset = block - take;
        let incoming = data.chunks_exact(channels).skip(frames - take);
        for (i, frame) in incoming.enumerate() {
            let left = frame[0];
            let right = if channels > 1 { frame[1] } else { left };
            self.left[offset + i] = left;
            self.right[offset + i] = right;
        }
    }
}

/// Copy of the shared state taken by the refresh thread.
#[derive(Clone, Debug, Default)]
pub struct CaptureSnapshot {
    /// Changes whenever the buffers are reallocated for a new configuration.
    pub generation: u64,
    pub sample_rate: u32,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub history: Vec<f32>,
}

pub struct CaptureState {
    buffer: CaptureBuffer,
    history: HistoryRing,
    block_size: BlockSize,
    generation: u64,
}

impl CaptureState {
    pub fn new(block_size: BlockSize) -> Self {
        Self {
            buffer: CaptureBuffer::new(block_size.frames()),
            history: HistoryRing::new(history_capacity(block_size)),
            block_size,
            generation: 0,
        }
    }

    pub fn shared(block_size: BlockSize) -> SharedCapture {
        Arc::new(Mutex::new(Self::new(block_size)))
    }

    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Reallocate both buffers for `block_size`, discarding all samples.
    ///
    /// Must only run while no stream is delivering into this state.
    pub fn resize(&mut self, block_size: BlockSize) {
        self.buffer = CaptureBuffer::new(block_size.frames());
        self.history.resize(history_capacity(block_size));
        self.block_size = block_size;
        self.generation += 1;
    }

    /// Store one driver delivery: the block for both channels and channel 0
    /// into the history.
    pub fn write_block(&mut self, data: &[f32], channels: usize) {
        let channels = channels.max(1);
        self.buffer.write_interleaved(data, channels);
        if channels == 1 {
            self.history.push_slice(data);
        } else {
            for frame in data.chunks_exact(channels) {
                self.history.push(frame[0]);
            }
        }
    }

    /// Copy everything the refresh thread needs into `out`, reusing its
    /// allocations.
    pub fn snapshot_into(&self, out: &mut CaptureSnapshot) {
        out.generation = self.generation;
        out.sample_rate = self.block_size.sample_rate();
        out.left.clear();
        out.left.extend_from_slice(self.buffer.left());
        out.right.clear();
        out.right.extend_from_slice(self.buffer.right());
        self.history.copy_into(&mut out.history);
    }
}

#[cfg(test)]
impl CaptureState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryRing {
        &self.history
    }
}

fn history_capacity(block_size: BlockSize) -> usize {
    block_size.sample_rate() as usize * HISTORY_SECONDS as usize
}

/// Counters bumped from the audio callbacks without taking the lock.
#[derive(Debug, Default)]
pub struct StreamStats {
    blocks: AtomicU64,
    short_blocks: AtomicU64,
    status_warnings: AtomicU64,
    device_lost: AtomicBool,
}

impl StreamStats {
    pub fn record_block(&self, frames: usize, expected: usize) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
        if frames < expected {
            self.short_blocks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_status_warning(&self) {
        self.status_warnings.fetch_add(1, Ordering::Relaxed);
    }

    /// The driver reported the device gone; the stream delivers nothing more.
    pub fn record_device_lost(&self) {
        self.device_lost.store(true, Ordering::Release);
    }

    pub fn device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }

    pub fn blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub fn short_blocks(&self) -> u64 {
        self.short_blocks.load(Ordering::Relaxed)
    }

    pub fn status_warnings(&self) -> u64 {
        self.status_warnings.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.blocks.store(0, Ordering::Relaxed);
        self.short_blocks.store(0, Ordering::Relaxed);
        self.status_warnings.store(0, Ordering::Relaxed);
        self.device_lost.store(false, Ordering::Release);
    }
}
