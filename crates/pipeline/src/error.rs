//! Pipeline Error Types

use spectral::SpectralError;
use thiserror::Error;

/// Invalid pipeline configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// FFT block size must be a power of two
    #[error("{field} value {value} is not a power of two")]
    NotPowerOfTwo { field: &'static str, value: usize },

    /// Motor band edges are inverted
    #[error("Motor band [{min_hz}, {max_hz}] Hz is empty")]
    InvalidBand { min_hz: f64, max_hz: f64 },
}

/// Errors starting, running or stopping the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Spectral component could not be built
    #[error("Spectral setup failed: {0}")]
    Spectral(#[from] SpectralError),

    /// OS refused to create a thread
    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A pipeline thread panicked
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),

    /// Block limit not reached in time
    #[error("Timed out after dispatching {dispatched} of {limit} blocks")]
    Timeout { dispatched: u64, limit: u64 },
}
