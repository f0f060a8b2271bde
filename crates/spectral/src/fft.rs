//! FFT Kernel and Amplitude Spectrum

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Planned forward FFT of a fixed power-of-two length
///
/// The plan and its scratch space are allocated once, so repeated transforms
/// run in place without further allocation.
pub struct FftKernel {
    fft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex<f64>>,
    len: usize,
}

impl FftKernel {
    /// Plan a forward transform of `len` points
    ///
    /// `len` must be a power of two; callers validate this before planning.
    pub fn new(len: usize) -> Self {
        debug_assert!(len.is_power_of_two(), "FFT length must be a power of two");
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self { fft, scratch, len }
    }

    /// Transform length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length plan
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Transform `buffer` in place (unnormalized forward DFT)
    pub fn process(&mut self, buffer: &mut [Complex<f64>]) {
        debug_assert_eq!(buffer.len(), self.len);
        self.fft.process_with_scratch(buffer, &mut self.scratch);
    }
}

/// One-sided amplitude spectrum
///
/// Bin `k` covers frequency `k * fs / N` for `k` in `0..=N/2`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spectrum {
    /// Bin frequencies (Hz)
    pub frequencies: Vec<f64>,
    /// Bin amplitudes (signal units)
    pub amplitudes: Vec<f64>,
}

impl Spectrum {
    /// Number of bins
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Check if spectrum is empty
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Iterate `(frequency, amplitude)` pairs
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies
            .iter()
            .copied()
            .zip(self.amplitudes.iter().copied())
    }

    /// Bins `0..N/2`; the Nyquist bin is left out of every search
    pub fn search_bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.bins().take(self.len().saturating_sub(1))
    }

    /// Frequency of the highest-amplitude bin strictly below `max_hz`
    ///
    /// Returns 0.0 when no bin below the bound carries energy.
    pub fn peak_below(&self, max_hz: f64) -> f64 {
        let mut f_peak = 0.0;
        let mut a_peak = 0.0;
        for (freq, amp) in self.search_bins() {
            if freq < max_hz && amp > a_peak {
                a_peak = amp;
                f_peak = freq;
            }
        }
        f_peak
    }

    /// Largest amplitude among bins in `[min_hz, max_hz]`
    pub fn max_in_band(&self, min_hz: f64, max_hz: f64) -> f64 {
        self.search_bins()
            .filter(|&(freq, _)| freq >= min_hz && freq <= max_hz)
            .map(|(_, amp)| amp)
            .fold(0.0, f64::max)
    }
}

/// Convert FFT output into a one-sided amplitude spectrum
///
/// DC and Nyquist bins are scaled by `1/N`, every other bin by `2/N` to fold
/// in the mirrored half.
pub fn amplitude_spectrum(x: &[Complex<f64>], sample_rate: f64) -> Spectrum {
    let n = x.len();
    if n == 0 {
        return Spectrum::default();
    }

    let half = n / 2;
    let n_f = n as f64;
    let mut frequencies = Vec::with_capacity(half + 1);
    let mut amplitudes = Vec::with_capacity(half + 1);

    for (k, value) in x.iter().enumerate().take(half + 1) {
        frequencies.push(k as f64 * sample_rate / n_f);
        let scale = if k == 0 || k == half { 1.0 } else { 2.0 };
        amplitudes.push(scale * value.norm() / n_f);
    }

    Spectrum {
        frequencies,
        amplitudes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_impulse_is_flat() {
        let mut kernel = FftKernel::new(8);
        let mut buffer = vec![Complex::new(0.0, 0.0); 8];
        buffer[0] = Complex::new(1.0, 0.0);
        kernel.process(&mut buffer);
        for bin in &buffer {
            assert!((bin.re - 1.0).abs() < 1e-12);
            assert!(bin.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_fft_matches_direct_dft() {
        let n = 16;
        let input: Vec<Complex<f64>> = (0..n)
            .map(|i| Complex::new((i as f64 * 0.7).sin() + 0.25 * i as f64, 0.0))
            .collect();

        let mut buffer = input.clone();
        FftKernel::new(n).process(&mut buffer);

        for k in 0..n {
            let expected: Complex<f64> = input
                .iter()
                .enumerate()
                .map(|(t, x)| x * Complex::from_polar(1.0, -2.0 * PI * (k * t) as f64 / n as f64))
                .sum();
            assert!((buffer[k] - expected).norm() < 1e-9, "bin {k} differs");
        }
    }

    #[test]
    fn test_amplitude_spectrum_scaling() {
        let n = 8;
        let x: Vec<Complex<f64>> = (0..n).map(|k| Complex::new(k as f64 + 1.0, -1.0)).collect();
        let spectrum = amplitude_spectrum(&x, 800.0);

        assert_eq!(spectrum.len(), n / 2 + 1);
        assert!((spectrum.amplitudes[0] - x[0].norm() / n as f64).abs() < 1e-12);
        assert!((spectrum.amplitudes[n / 2] - x[n / 2].norm() / n as f64).abs() < 1e-12);
        for k in 1..n / 2 {
            assert!((spectrum.amplitudes[k] - 2.0 * x[k].norm() / n as f64).abs() < 1e-12);
        }
        for k in 0..=n / 2 {
            assert!((spectrum.frequencies[k] - k as f64 * 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_sine_amplitude_recovered() {
        // 4 full cycles in 64 samples lands exactly on bin 4
        let n = 64;
        let mut buffer: Vec<Complex<f64>> = (0..n)
            .map(|i| Complex::new(3.0 * (2.0 * PI * 4.0 * i as f64 / n as f64).sin(), 0.0))
            .collect();
        FftKernel::new(n).process(&mut buffer);
        let spectrum = amplitude_spectrum(&buffer, n as f64);

        assert!((spectrum.amplitudes[4] - 3.0).abs() < 1e-9);
        assert!((spectrum.peak_below(f64::INFINITY) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_peak_below_ignores_out_of_range() {
        let spectrum = Spectrum {
            frequencies: vec![0.0, 100.0, 200.0, 300.0, 400.0],
            amplitudes: vec![0.0, 5.0, 1.0, 50.0, 0.0],
        };
        assert_eq!(spectrum.peak_below(300.0), 100.0);
        assert_eq!(spectrum.peak_below(400.0), 300.0);
        assert_eq!(spectrum.peak_below(50.0), 0.0);
    }

    #[test]
    fn test_nyquist_bin_excluded_from_search() {
        let spectrum = Spectrum {
            frequencies: vec![0.0, 100.0, 200.0, 300.0, 400.0],
            amplitudes: vec![0.0, 5.0, 1.0, 2.0, 90.0],
        };
        assert_eq!(spectrum.peak_below(f64::INFINITY), 100.0);
        assert_eq!(spectrum.max_in_band(200.0, 400.0), 2.0);
        assert_eq!(spectrum.search_bins().count(), 4);
    }

    #[test]
    fn test_empty_input() {
        assert!(amplitude_spectrum(&[], 44100.0).is_empty());
    }
}
