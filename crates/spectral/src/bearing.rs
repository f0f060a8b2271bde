//! Bearing Fault Heuristic
//!
//! Compares low-frequency energy against the running-speed peak: a worn or
//! damaged bearing raises sub-synchronous content relative to the motor
//! fundamental.

use crate::fft::Spectrum;
use serde::{Deserialize, Serialize};

/// Thresholds for the bearing-fault heuristic
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BearingThresholds {
    /// Lower edge of the expected running-speed band (Hz)
    pub motor_min_hz: f64,
    /// Upper edge of the expected running-speed band (Hz)
    pub motor_max_hz: f64,
    /// Bins strictly below this frequency are fault candidates (Hz)
    pub low_freq_thresh_hz: f64,
    /// Fault when a low-frequency bin exceeds this fraction of the motor peak
    pub rel_amp_thresh: f64,
}

impl Default for BearingThresholds {
    fn default() -> Self {
        Self {
            motor_min_hz: 200.0,
            motor_max_hz: 5000.0,
            low_freq_thresh_hz: 150.0,
            rel_amp_thresh: 0.25,
        }
    }
}

/// Result of one bearing assessment
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FaultAssessment {
    /// Fault signature present
    pub fault: bool,
    /// Peak amplitude in the motor band
    pub motor_peak: f64,
    /// Peak amplitude below the low-frequency threshold
    pub low_freq_peak: f64,
}

/// Evaluate the heuristic on an amplitude spectrum
///
/// With no energy in the motor band there is no reference, and the result is
/// "no fault".
pub fn assess_spectrum(spectrum: &Spectrum, thresholds: &BearingThresholds) -> FaultAssessment {
    let motor_peak = spectrum.max_in_band(thresholds.motor_min_hz, thresholds.motor_max_hz);
    let low_freq_peak = spectrum
        .search_bins()
        .filter(|&(freq, _)| freq < thresholds.low_freq_thresh_hz)
        .map(|(_, amp)| amp)
        .fold(0.0, f64::max);

    if motor_peak <= 0.0 {
        return FaultAssessment {
            fault: false,
            motor_peak,
            low_freq_peak,
        };
    }

    FaultAssessment {
        fault: low_freq_peak > thresholds.rel_amp_thresh * motor_peak,
        motor_peak,
        low_freq_peak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10 Hz bins from 0 to 2000 Hz, silent except for the given peaks
    fn spectrum_with(peaks: &[(f64, f64)]) -> Spectrum {
        let frequencies: Vec<f64> = (0..=200).map(|k| k as f64 * 10.0).collect();
        let amplitudes = frequencies
            .iter()
            .map(|f| {
                peaks
                    .iter()
                    .find(|(pf, _)| (pf - f).abs() < 1e-9)
                    .map_or(0.0, |&(_, a)| a)
            })
            .collect();
        Spectrum {
            frequencies,
            amplitudes,
        }
    }

    #[test]
    fn test_low_frequency_bin_above_threshold_is_fault() {
        let spectrum = spectrum_with(&[(1000.0, 1000.0), (50.0, 260.0)]);
        let result = assess_spectrum(&spectrum, &BearingThresholds::default());
        assert!(result.fault);
        assert_eq!(result.motor_peak, 1000.0);
        assert_eq!(result.low_freq_peak, 260.0);
    }

    #[test]
    fn test_low_frequency_bin_below_threshold_is_ok() {
        let spectrum = spectrum_with(&[(1000.0, 1000.0), (50.0, 200.0)]);
        assert!(!assess_spectrum(&spectrum, &BearingThresholds::default()).fault);
    }

    #[test]
    fn test_no_motor_reference_is_ok() {
        // Strong low-frequency content but nothing in the motor band
        let spectrum = spectrum_with(&[(50.0, 5000.0)]);
        let result = assess_spectrum(&spectrum, &BearingThresholds::default());
        assert!(!result.fault);
        assert_eq!(result.motor_peak, 0.0);
    }

    #[test]
    fn test_threshold_bin_is_excluded() {
        // 150 Hz is not strictly below the 150 Hz threshold
        let spectrum = spectrum_with(&[(1000.0, 1000.0), (150.0, 900.0)]);
        assert!(!assess_spectrum(&spectrum, &BearingThresholds::default()).fault);
    }

    #[test]
    fn test_band_edges_inclusive() {
        let thresholds = BearingThresholds::default();
        let spectrum = spectrum_with(&[(200.0, 400.0), (20.0, 90.0)]);
        let result = assess_spectrum(&spectrum, &thresholds);
        assert_eq!(result.motor_peak, 400.0);
        assert!(!result.fault);
    }
}
