//! Block Analyzer
//!
//! Owns the FFT plan and a complex scratch block sized once for the pipeline
//! block size, so every analysis cycle runs without allocating a new plan.

use crate::bearing::{assess_spectrum, BearingThresholds, FaultAssessment};
use crate::error::SpectralError;
use crate::fft::{amplitude_spectrum, FftKernel, Spectrum};
use crate::window::hann_window;
use rustfft::num_complex::Complex;
use tracing::trace;

/// Spectral analysis of fixed-size sample blocks
pub struct SpectralAnalyzer {
    kernel: FftKernel,
    buffer: Vec<Complex<f64>>,
    window: Vec<f64>,
    sample_rate: f64,
}

impl SpectralAnalyzer {
    /// Create an analyzer for `block_size`-sample blocks
    pub fn new(block_size: usize, sample_rate: f64) -> Result<Self, SpectralError> {
        if block_size == 0 || !block_size.is_power_of_two() {
            return Err(SpectralError::NotPowerOfTwo(block_size));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SpectralError::InvalidSampleRate(sample_rate));
        }

        Ok(Self {
            kernel: FftKernel::new(block_size),
            buffer: vec![Complex::new(0.0, 0.0); block_size],
            window: hann_window(block_size),
            sample_rate,
        })
    }

    /// Samples per analyzed block
    pub fn block_size(&self) -> usize {
        self.kernel.len()
    }

    /// Sample rate (Hz)
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Frequency resolution (Hz per bin)
    pub fn bin_width(&self) -> f64 {
        self.sample_rate / self.block_size() as f64
    }

    fn load(&mut self, samples: &[i16], windowed: bool) {
        let n = samples.len().min(self.buffer.len());
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let x = if i < n { f64::from(samples[i]) } else { 0.0 };
            let w = if windowed { self.window[i] } else { 1.0 };
            *slot = Complex::new(x * w, 0.0);
        }
    }

    /// Amplitude spectrum of a block, optionally Hann-windowed
    ///
    /// Short blocks are zero-padded to the analyzer block size.
    pub fn spectrum(&mut self, samples: &[i16], windowed: bool) -> Spectrum {
        self.load(samples, windowed);
        self.kernel.process(&mut self.buffer);
        amplitude_spectrum(&self.buffer, self.sample_rate)
    }

    /// Frequency of the strongest bin strictly below `max_useful_hz`
    pub fn dominant_frequency(&mut self, samples: &[i16], max_useful_hz: f64) -> f64 {
        let spectrum = self.spectrum(samples, false);
        let peak = spectrum.peak_below(max_useful_hz);
        trace!(peak_hz = peak, "Dominant frequency");
        peak
    }

    /// Run the bearing-fault heuristic on a Hann-windowed block
    pub fn detect_fault(
        &mut self,
        samples: &[i16],
        thresholds: &BearingThresholds,
    ) -> FaultAssessment {
        let spectrum = self.spectrum(samples, true);
        let assessment = assess_spectrum(&spectrum, thresholds);
        trace!(
            motor_peak = assessment.motor_peak,
            low_freq_peak = assessment.low_freq_peak,
            fault = assessment.fault,
            "Bearing assessment"
        );
        assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{sine_block, synthesize, Tone};

    const FS: f64 = 44100.0;
    const N: usize = 4096;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert_eq!(
            SpectralAnalyzer::new(1000, FS).err(),
            Some(SpectralError::NotPowerOfTwo(1000))
        );
        assert!(SpectralAnalyzer::new(0, FS).is_err());
        assert!(SpectralAnalyzer::new(N, 0.0).is_err());
    }

    #[test]
    fn test_dominant_frequency_pure_sine() {
        let mut analyzer = SpectralAnalyzer::new(N, FS).unwrap();
        let block = sine_block(1000.0, 10000.0, FS, N);
        let freq = analyzer.dominant_frequency(&block, 10000.0);
        assert!(
            (freq - 1000.0).abs() <= analyzer.bin_width(),
            "estimated {freq} Hz"
        );
    }

    #[test]
    fn test_dominant_frequency_ignores_bins_above_limit() {
        let mut analyzer = SpectralAnalyzer::new(N, FS).unwrap();
        let mut block = vec![0; N];
        synthesize(
            &[Tone::new(12000.0, 12000.0), Tone::new(400.0, 3000.0)],
            FS,
            0,
            &mut block,
        );
        let freq = analyzer.dominant_frequency(&block, 10000.0);
        assert!((freq - 400.0).abs() <= analyzer.bin_width());
    }

    #[test]
    fn test_silence_has_no_dominant_frequency() {
        let mut analyzer = SpectralAnalyzer::new(N, FS).unwrap();
        assert_eq!(analyzer.dominant_frequency(&vec![0; N], 10000.0), 0.0);
    }

    #[test]
    fn test_detect_fault_on_low_frequency_component() {
        let mut analyzer = SpectralAnalyzer::new(N, FS).unwrap();
        let thresholds = BearingThresholds::default();

        let mut healthy = vec![0; N];
        synthesize(&[Tone::new(1000.0, 8000.0)], FS, 0, &mut healthy);
        assert!(!analyzer.detect_fault(&healthy, &thresholds).fault);

        let mut faulty = vec![0; N];
        synthesize(
            &[Tone::new(1000.0, 8000.0), Tone::new(60.0, 4000.0)],
            FS,
            0,
            &mut faulty,
        );
        assert!(analyzer.detect_fault(&faulty, &thresholds).fault);
    }

    #[test]
    fn test_detect_fault_without_motor_reference() {
        let mut analyzer = SpectralAnalyzer::new(N, FS).unwrap();
        let block = vec![0; N];
        let result = analyzer.detect_fault(&block, &BearingThresholds::default());
        assert!(!result.fault);
        assert_eq!(result.motor_peak, 0.0);
    }
}
