//! Single-Pole Low-Pass Filter

use std::f64::consts::PI;

/// First-order IIR low-pass filter derived from an RC discretization
///
/// `y[i] = alpha * x[i] + (1 - alpha) * y[i-1]`, with
/// `alpha = w / (w + 1)` and `w = 2*pi*fc / fs`.
#[derive(Debug, Clone, Copy)]
pub struct LowPassFilter {
    alpha: f64,
    cutoff_hz: f64,
    sample_rate: f64,
}

impl LowPassFilter {
    /// Create a filter for the given cutoff and sample rate
    pub fn new(cutoff_hz: f64, sample_rate: f64) -> Self {
        let w = 2.0 * PI * cutoff_hz / sample_rate;
        Self {
            alpha: w / (w + 1.0),
            cutoff_hz,
            sample_rate,
        }
    }

    /// Smoothing factor
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Cutoff frequency (Hz)
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Filter a block of samples in place
    ///
    /// The state starts at the first sample, so a block never begins with a
    /// step from zero. Output is clamped to the i16 range and truncated
    /// toward zero.
    pub fn apply(&self, samples: &mut [i16]) {
        let Some(&first) = samples.first() else {
            return;
        };

        let mut y = f64::from(first);
        for sample in samples.iter_mut() {
            y += self.alpha * (f64::from(*sample) - y);
            *sample = y.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
        }
    }

    /// Theoretical gain of the filter at `freq_hz`
    pub fn magnitude_response(&self, freq_hz: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / self.sample_rate;
        let beta = 1.0 - self.alpha;
        self.alpha / (1.0 - 2.0 * beta * omega.cos() + beta * beta).sqrt()
    }
}
