use std::sync::Arc;

use log::debug;
use rustfft::{Fft, FftPlanner, num_complex::Complex};

use super::capture::CaptureSnapshot;
use crate::config::BlockSize;
use crate::consts::{DB_EPSILON, FALL_OFF_RATE, FFT_AVERAGE_FACTOR};

/// Largest absolute sample value, 0 for an empty slice.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

/// Next meter level: jumps up to a louder peak, otherwise drops by
/// [`FALL_OFF_RATE`].
pub fn fall_off(level: f32, peak: f32) -> f32 {
    peak.max(level - FALL_OFF_RATE).clamp(0.0, 1.0)
}

/// Exponential moving average step.
pub fn smooth(average: f32, current: f32, alpha: f32) -> f32 {
    alpha * current + (1.0 - alpha) * average
}

pub fn magnitude_to_db(magnitude: f32) -> f32 {
    20.0 * (magnitude + DB_EPSILON).log10()
}

/// Symmetric Hann window of `len` points.
pub fn hann_window(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (len - 1) as f32).cos()))
        .collect()
}

/// Frequencies in kHz of the non-negative FFT bins for `len` samples.
pub fn rfft_frequencies_khz(len: usize, sample_rate: u32) -> Vec<f32> {
    let bin_hz = sample_rate as f32 / len as f32;
    (0..=len / 2).map(|k| k as f32 * bin_hz / 1000.0).collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeterState {
    /// Left and right level in `[0, 1]`.
    pub levels: [f32; 2],
}

impl MeterState {
    pub fn update(&mut self, left: &[f32], right: &[f32]) {
        self.levels[0] = fall_off(self.levels[0], peak(left));
        self.levels[1] = fall_off(self.levels[1], peak(right));
    }
}

#[derive(Clone, Debug, Default)]
pub struct FftState {
    pub frequencies_khz: Vec<f32>,
    pub current_db: Vec<f32>,
    pub average_db: Vec<f32>,
}

/// Turns capture snapshots into meter levels and spectra.
///
/// Holds only the state that has to survive between ticks: the meter levels,
/// the running spectrum average and the FFT plan for the current block size.
/// Everything resets when the snapshot comes from a new buffer generation.
pub struct SignalProcessor {
    fft_planner: FftPlanner<f32>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    generation: u64,
    frames: usize,
    sample_rate: u32,
    meter: MeterState,
    spectrum: FftState,
    waveform_x: Vec<f32>,
    history_x: Vec<f32>,
}

impl SignalProcessor {
    pub fn new(block_size: BlockSize) -> Self {
        let mut fft_planner = FftPlanner::new();
        let fft = fft_planner.plan_fft_forward(block_size.frames());
        let mut processor = Self {
            fft_planner,
            fft,
            window: Vec::new(),
            fft_buffer: Vec::new(),
            scratch: Vec::new(),
            generation: 0,
            frames: 0,
            sample_rate: 0,
            meter: MeterState::default(),
            spectrum: FftState::default(),
            waveform_x: Vec::new(),
            history_x: Vec::new(),
        };
        processor.reset(0, block_size.frames(), block_size.sample_rate());
        processor
    }

    pub fn meter(&self) -> &MeterState {
        &self.meter
    }

    pub fn spectrum(&self) -> &FftState {
        &self.spectrum
    }

    /// Sample indices `0..frames` for the waveform plot.
    pub fn waveform_x(&self) -> &[f32] {
        &self.waveform_x
    }

    /// Time axis in seconds for the first `len` history samples, as far as
    /// processed snapshots have filled the history.
    pub fn history_x(&self, len: usize) -> &[f32] {
        &self.history_x[..len.min(self.history_x.len())]
    }

    pub fn process(&mut self, snapshot: &CaptureSnapshot) {
        if snapshot.generation != self.generation
            || snapshot.left.len() != self.frames
            || snapshot.sample_rate != self.sample_rate
        {
            self.reset(snapshot.generation, snapshot.left.len(), snapshot.sample_rate);
        }

        self.meter.update(&snapshot.left, &snapshot.right);
        self.update_spectrum(&snapshot.left);
        self.extend_history_axis(snapshot.history.len());
    }

    fn extend_history_axis(&mut self, len: usize) {
        if self.history_x.len() < len {
            let rate = self.sample_rate.max(1) as f32;
            let start = self.history_x.len();
            self.history_x.extend((start..len).map(|i| i as f32 / rate));
        }
    }

    fn update_spectrum(&mut self, samples: &[f32]) {
        if self.frames == 0 || self.fft_buffer.len() != self.frames {
            return;
        }

        for ((slot, &sample), &weight) in self
            .fft_buffer
            .iter_mut()
            .zip(samples)
            .zip(&self.window)
        {
            *slot = Complex::new(sample * weight, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let scale = 2.0 / self.frames as f32;
        let bins = self.spectrum.current_db.len();
        for (k, bin) in self.fft_buffer[..bins].iter().enumerate() {
            let db = magnitude_to_db(bin.norm() * scale);
            self.spectrum.current_db[k] = db;
            self.spectrum.average_db[k] =
                smooth(self.spectrum.average_db[k], db, FFT_AVERAGE_FACTOR);
        }
    }

    fn reset(&mut self, generation: u64, frames: usize, sample_rate: u32) {
        debug!("Resetting signal processor: {frames} frames @ {sample_rate} Hz");

        if frames != self.frames && frames > 0 {
            self.fft = self.fft_planner.plan_fft_forward(frames);
            self.window = hann_window(frames);
            self.fft_buffer = vec![Complex::new(0.0, 0.0); frames];
            self.scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
            self.waveform_x = (0..frames).map(|i| i as f32).collect();
        } else if frames == 0 {
            self.waveform_x.clear();
        }

        let bins = if frames == 0 { 0 } else { frames / 2 + 1 };
        self.spectrum = FftState {
            frequencies_khz: if frames == 0 {
                Vec::new()
            } else {
                rfft_frequencies_khz(frames, sample_rate)
            },
            current_db: vec![0.0; bins],
            average_db: vec![0.0; bins],
        };
        self.meter = MeterState::default();
        self.history_x.clear();
        self.generation = generation;
        self.frames = frames;
        self.sample_rate = sample_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    fn snapshot(block_size: BlockSize, left: Vec<f32>) -> CaptureSnapshot {
        CaptureSnapshot {
            generation: 0,
            sample_rate: block_size.sample_rate(),
            right: left.clone(),
            left,
            history: Vec::new(),
        }
    }

    fn sine(frames: usize, sample_rate: u32, freq: f64, amplitude: f64) -> Vec<f32> {
        (0..frames)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()) as f32
            })
            .collect()
    }

    fn argmax(values: &[f32]) -> usize {
        values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn level_decays_linearly_without_new_peak() {
        let mut level = 0.42;
        for _ in 0..20 {
            let next = fall_off(level, 0.0);
            assert_approx(next, (level - 0.05).max(0.0), 1e-6);
            level = next;
        }
        assert_eq!(level, 0.0);
    }

    #[test]
    fn level_jumps_to_louder_peak() {
        assert_eq!(fall_off(0.1, 1.0), 1.0);
        assert_eq!(fall_off(0.9, 1.0), 1.0);
        assert_approx(fall_off(0.9, 0.3), 0.85, 1e-6);
    }

    #[test]
    fn level_is_clamped_to_unit_range() {
        assert_eq!(fall_off(0.0, 1.7), 1.0);
        assert_eq!(fall_off(0.01, 0.0), 0.0);
    }

    #[test]
    fn peak_uses_absolute_value() {
        assert_eq!(peak(&[0.2, -0.9, 0.5]), 0.9);
        assert_eq!(peak(&[]), 0.0);
    }

    #[test]
    fn hann_window_is_symmetric_with_zero_edges() {
        let window = hann_window(8);
        assert_approx(window[0], 0.0, 1e-7);
        assert_approx(window[7], 0.0, 1e-7);
        for i in 0..4 {
            assert_approx(window[i], window[7 - i], 1e-6);
        }
    }

    #[test]
    fn frequency_axis_matches_rfft_bins() {
        let freqs = rfft_frequencies_khz(1024, 44_100);

        assert_eq!(freqs.len(), 513);
        assert_eq!(freqs[0], 0.0);
        assert_approx(freqs[1], 44.1 / 1024.0, 1e-6);
        assert_approx(freqs[512], 22.05, 1e-4);
    }

    #[test]
    fn silence_produces_epsilon_floor() {
        let mut processor = SignalProcessor::new(BlockSize::B512);
        processor.process(&snapshot(BlockSize::B512, vec![0.0; 512]));

        assert_eq!(processor.spectrum().current_db.len(), 257);
        for &db in &processor.spectrum().current_db {
            assert_approx(db, -200.0, 1e-3);
        }
    }

    #[test]
    fn bin_centered_sine_peaks_at_its_bin() {
        let block = BlockSize::B1024;
        let rate = block.sample_rate();
        let bin = 40;
        let freq = bin as f64 * rate as f64 / block.frames() as f64;
        let amplitude = 0.5;

        let mut processor = SignalProcessor::new(block);
        processor.process(&snapshot(block, sine(block.frames(), rate, freq, amplitude)));

        let spectrum = processor.spectrum();
        let peak_bin = argmax(&spectrum.current_db);
        assert_eq!(peak_bin, bin);

        // The Hann window passes its mean (about 0.5) of a bin-centred tone.
        let window = hann_window(block.frames());
        let coherent_gain = window.iter().sum::<f32>() / block.frames() as f32;
        let expected = 20.0 * (amplitude as f32 * coherent_gain).log10();
        assert_approx(spectrum.current_db[peak_bin], expected, 0.05);
    }

    #[test]
    fn off_bin_sine_peaks_at_nearest_bin() {
        let block = BlockSize::B2048;
        let rate = block.sample_rate();
        let freq = 5000.0;

        let mut processor = SignalProcessor::new(block);
        processor.process(&snapshot(block, sine(block.frames(), rate, freq, 0.8)));

        let spectrum = processor.spectrum();
        let peak_bin = argmax(&spectrum.current_db);
        let bin_width_khz = rate as f32 / block.frames() as f32 / 1000.0;
        let peak_khz = spectrum.frequencies_khz[peak_bin];
        assert!(
            (peak_khz - 5.0).abs() <= bin_width_khz / 2.0,
            "peak at {peak_khz} kHz"
        );
    }

    #[test]
    fn average_converges_geometrically() {
        let mut processor = SignalProcessor::new(BlockSize::B512);
        let silent = snapshot(BlockSize::B512, vec![0.0; 512]);
        let target = magnitude_to_db(0.0);

        for k in 1..=30 {
            processor.process(&silent);
            let average = processor.spectrum().average_db[3];
            let expected_gap = 0.9f32.powi(k) * target.abs();
            assert_approx((average - target).abs(), expected_gap, 1e-2);
        }
    }

    #[test]
    fn smoothing_step_weights_newest_by_alpha() {
        assert_approx(smooth(0.0, -100.0, 0.1), -10.0, 1e-5);
        assert_approx(smooth(-10.0, -100.0, 0.1), -19.0, 1e-5);
    }

    #[test]
    fn new_generation_clears_meter_and_average() {
        let mut processor = SignalProcessor::new(BlockSize::B1024);
        processor.process(&snapshot(BlockSize::B1024, vec![1.0; 1024]));
        assert_eq!(processor.meter().levels, [1.0, 1.0]);

        let mut next = snapshot(BlockSize::B4096, vec![0.0; 4096]);
        next.generation = 1;
        processor.process(&next);

        assert_eq!(processor.meter().levels, [0.0, 0.0]);
        let spectrum = processor.spectrum();
        assert_eq!(spectrum.current_db.len(), 2049);
        assert_eq!(spectrum.frequencies_khz.len(), 2049);
        assert_approx(spectrum.frequencies_khz[2048], 11.025, 1e-4);
        // One tick of silence after the reset.
        assert_approx(spectrum.average_db[0], -20.0, 1e-3);
        assert_eq!(processor.waveform_x().len(), 4096);
    }

    #[test]
    fn history_axis_is_in_seconds() {
        let mut processor = SignalProcessor::new(BlockSize::B1024);
        let mut partial = snapshot(BlockSize::B1024, vec![0.0; 1024]);
        partial.history = vec![0.0; 3];
        processor.process(&partial);

        let xs = processor.history_x(3);
        assert_eq!(xs.len(), 3);
        assert_approx(xs[2], 2.0 / 44_100.0, 1e-9);

        partial.history = vec![0.0; 44_101];
        processor.process(&partial);
        assert_approx(processor.history_x(44_101)[44_100], 1.0, 1e-6);
        assert_eq!(processor.history_x(50_000).len(), 44_101);
    }

    #[test]
    fn silence_then_full_scale_block_end_to_end() {
        let block = BlockSize::B1024;
        assert_eq!(block.sample_rate(), 44_100);

        let mut processor = SignalProcessor::new(block);
        let silent = snapshot(block, vec![0.0; 1024]);
        for _ in 0..100 {
            processor.process(&silent);
        }
        assert_eq!(processor.meter().levels, [0.0, 0.0]);

        let mut loud = vec![0.0; 1024];
        loud[17] = -1.0;
        processor.process(&snapshot(block, loud));
        assert_eq!(processor.meter().levels, [1.0, 1.0]);

        for tick in 1..=20 {
            processor.process(&silent);
            let expected = (1.0 - 0.05 * tick as f32).max(0.0);
            assert_approx(processor.meter().levels[0], expected, 1e-5);
        }
        processor.process(&silent);
        assert_eq!(processor.meter().levels, [0.0, 0.0]);
    }
}
