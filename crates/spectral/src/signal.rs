//! Signal Helpers
//!
//! Tone synthesis for test signals and simulated capture, and block
//! statistics for diagnostics.

use std::f64::consts::PI;

/// A sinusoidal component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency (Hz)
    pub frequency_hz: f64,
    /// Peak amplitude (i16 units)
    pub amplitude: f64,
}

impl Tone {
    /// Create a tone
    pub fn new(frequency_hz: f64, amplitude: f64) -> Self {
        Self {
            frequency_hz,
            amplitude,
        }
    }
}

/// Fill `out` with the sum of `tones`, starting at absolute sample `start`
///
/// Continuing from the previous `start + out.len()` keeps the phase
/// continuous across blocks. The sum is clamped to the i16 range.
pub fn synthesize(tones: &[Tone], sample_rate: f64, start: u64, out: &mut [i16]) {
    for (i, sample) in out.iter_mut().enumerate() {
        let t = (start + i as u64) as f64 / sample_rate;
        let value: f64 = tones
            .iter()
            .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency_hz * t).sin())
            .sum();
        *sample = value.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16;
    }
}

/// Generate `len` samples of a single sine tone
pub fn sine_block(frequency_hz: f64, amplitude: f64, sample_rate: f64, len: usize) -> Vec<i16> {
    let mut block = vec![0; len];
    synthesize(&[Tone::new(frequency_hz, amplitude)], sample_rate, 0, &mut block);
    block
}

/// Minimum and maximum sample of a block
pub fn peak_range(samples: &[i16]) -> Option<(i16, i16)> {
    let first = *samples.first()?;
    Some(
        samples
            .iter()
            .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_block_amplitude() {
        let block = sine_block(1000.0, 8000.0, 44100.0, 4410);
        let (lo, hi) = peak_range(&block).unwrap();
        assert!(hi <= 8000 && hi > 7900);
        assert!(lo >= -8000 && lo < -7900);
    }

    #[test]
    fn test_synthesize_phase_continuous() {
        let tones = [Tone::new(440.0, 1000.0)];
        let mut whole = vec![0; 200];
        synthesize(&tones, 8000.0, 0, &mut whole);

        let mut first = vec![0; 100];
        let mut second = vec![0; 100];
        synthesize(&tones, 8000.0, 0, &mut first);
        synthesize(&tones, 8000.0, 100, &mut second);

        assert_eq!(&whole[..100], &first[..]);
        assert_eq!(&whole[100..], &second[..]);
    }

    #[test]
    fn test_synthesize_clamps() {
        let tones = [Tone::new(100.0, 30000.0), Tone::new(100.0, 30000.0)];
        let mut block = vec![0; 441];
        synthesize(&tones, 44100.0, 0, &mut block);
        assert_eq!(peak_range(&block), Some((i16::MIN, i16::MAX)));
    }

    #[test]
    fn test_peak_range_empty() {
        assert_eq!(peak_range(&[]), None);
    }
}
