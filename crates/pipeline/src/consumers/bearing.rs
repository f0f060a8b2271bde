//! Bearing Fault Detector

use super::BlockConsumer;
use crate::config::PipelineConfig;
use crate::context::ConsumerKind;
use crate::error::PipelineError;
use rtdb::Rtdb;
use spectral::{BearingThresholds, FaultAssessment, SpectralAnalyzer};
use tracing::{debug, warn};

/// Publishes the bearing-fault verdict of each block
pub struct BearingDetector {
    analyzer: SpectralAnalyzer,
    thresholds: BearingThresholds,
    last_fault: bool,
}

impl BearingDetector {
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            analyzer: SpectralAnalyzer::new(config.block_size, config.sample_rate_hz())?,
            thresholds: config.bearing,
            last_fault: false,
        })
    }

    /// Assess one block
    pub fn assess(&mut self, samples: &[i16]) -> FaultAssessment {
        self.analyzer.detect_fault(samples, &self.thresholds)
    }
}

impl BlockConsumer for BearingDetector {
    fn kind(&self) -> ConsumerKind {
        ConsumerKind::Bearing
    }

    fn process(&mut self, samples: &[i16], rtdb: &Rtdb) {
        let assessment = self.assess(samples);
        if assessment.fault != self.last_fault {
            if assessment.fault {
                warn!(
                    motor_peak = assessment.motor_peak,
                    low_freq_peak = assessment.low_freq_peak,
                    "Bearing fault signature detected"
                );
            } else {
                debug!("Bearing fault signature cleared");
            }
            self.last_fault = assessment.fault;
        }
        rtdb.set_bearing_fault(assessment.fault);
    }
}
