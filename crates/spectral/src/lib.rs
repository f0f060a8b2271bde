//! Spectral Kernel
//!
//! Frequency-domain building blocks for the analysis consumers: a planned
//! power-of-two FFT, amplitude spectra, a single-pole low-pass filter, a
//! dominant-frequency extractor and the bearing-fault heuristic.

mod analyzer;
mod bearing;
mod error;
mod fft;
mod filter;
pub mod signal;
mod window;

pub use analyzer::SpectralAnalyzer;
pub use bearing::{assess_spectrum, BearingThresholds, FaultAssessment};
pub use error::SpectralError;
pub use fft::{amplitude_spectrum, FftKernel, Spectrum};
pub use filter::LowPassFilter;
pub use window::hann_window;

pub use rustfft::num_complex::Complex;
