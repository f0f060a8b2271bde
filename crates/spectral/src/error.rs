//! Spectral Error Types

use thiserror::Error;

/// Errors raised when building spectral components
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpectralError {
    /// FFT length is not a power of two
    #[error("Block size {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// Sample rate must be positive and finite
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
}
