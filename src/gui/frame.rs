use std::sync::Arc;

use parking_lot::Mutex;

use crate::refresh::VisualSink;

/// Latest values published by the refresh thread, read by the GUI.
#[derive(Clone, Debug, Default)]
pub struct VisualFrame {
    pub levels: [f32; 2],
    pub waveform_x: Vec<f32>,
    pub waveform: Vec<f32>,
    pub freqs_khz: Vec<f32>,
    pub current_db: Vec<f32>,
    pub average_db: Vec<f32>,
    pub history_x: Vec<f32>,
    pub history: Vec<f32>,
}

pub type SharedFrame = Arc<Mutex<VisualFrame>>;

pub struct FrameSink {
    frame: SharedFrame,
}

impl FrameSink {
    pub fn new(frame: SharedFrame) -> Self {
        Self { frame }
    }
}

fn replace(dst: &mut Vec<f32>, src: &[f32]) {
    dst.clear();
    dst.extend_from_slice(src);
}

impl VisualSink for FrameSink {
    fn set_meter_levels(&mut self, left: f32, right: f32) {
        self.frame.lock().levels = [left.clamp(0.0, 1.0), right.clamp(0.0, 1.0)];
    }

    fn set_waveform(&mut self, xs: &[f32], ys: &[f32]) {
        let mut frame = self.frame.lock();
        replace(&mut frame.waveform_x, xs);
        replace(&mut frame.waveform, ys);
    }

    fn set_spectrum(&mut self, freqs_khz: &[f32], current_db: &[f32], average_db: &[f32]) {
        let mut frame = self.frame.lock();
        replace(&mut frame.freqs_khz, freqs_khz);
        replace(&mut frame.current_db, current_db);
        replace(&mut frame.average_db, average_db);
    }

    fn set_history(&mut self, xs: &[f32], ys: &[f32]) {
        let mut frame = self.frame.lock();
        replace(&mut frame.history_x, xs);
        replace(&mut frame.history, ys);
    }
}
