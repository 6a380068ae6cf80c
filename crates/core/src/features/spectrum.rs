//! Spectral centroid over Hann-windowed FFT frames.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Frames whose total spectral magnitude falls below this are treated as
/// silent and excluded from the centroid mean.
const SILENCE_EPSILON: f32 = 1e-10;

pub(crate) struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    bin_width_hz: f32,
}

impl SpectralAnalyzer {
    pub(crate) fn new(frame_len: usize, sample_rate_hz: u32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_len);
        Self {
            fft,
            window: hann_window(frame_len),
            bin_width_hz: sample_rate_hz as f32 / frame_len as f32,
        }
    }

    /// Magnitude-weighted mean frequency of one frame, `None` for silence.
    pub(crate) fn centroid_hz(&self, frame: &[f32]) -> Option<f32> {
        let n = self.window.len();
        debug_assert_eq!(frame.len(), n);

        let mut buf: Vec<Complex<f32>> = frame
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        self.fft.process(&mut buf);

        let mut weighted = 0.0f64;
        let mut total = 0.0f64;
        for (k, bin) in buf.iter().take(n / 2 + 1).enumerate() {
            let mag = f64::from(bin.norm());
            weighted += mag * f64::from(k as f32 * self.bin_width_hz);
            total += mag;
        }

        if total < f64::from(SILENCE_EPSILON) {
            return None;
        }
        Some((weighted / total) as f32)
    }
}

fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / len as f32).cos())
        .collect()
}
