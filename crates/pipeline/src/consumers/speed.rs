//! Shaft Speed Estimator

use super::BlockConsumer;
use crate::config::PipelineConfig;
use crate::context::ConsumerKind;
use crate::error::PipelineError;
use rtdb::Rtdb;
use spectral::SpectralAnalyzer;
use tracing::trace;

/// Publishes the dominant frequency of each block as the running speed
pub struct SpeedEstimator {
    analyzer: SpectralAnalyzer,
    max_useful_hz: f64,
}

impl SpeedEstimator {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            analyzer: SpectralAnalyzer::new(config.block_size, config.sample_rate_hz())?,
            max_useful_hz: config.max_useful_freq_hz,
        })
    }

    /// Dominant frequency of one block (Hz)
    pub fn estimate(&mut self, samples: &[i16]) -> f64 {
        self.analyzer.dominant_frequency(samples, self.max_useful_hz)
    }
}

impl BlockConsumer for SpeedEstimator {
    fn kind(&self) -> ConsumerKind {
        ConsumerKind::Speed
    }

    fn process(&mut self, samples: &[i16], rtdb: &Rtdb) {
        let speed_hz = self.estimate(samples);
        trace!(speed_hz, "Speed estimate");
        rtdb.set_speed(speed_hz);
    }
}
