//! Pipeline Configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use spectral::BearingThresholds;
use std::time::Duration;

/// Real-time scheduling priority hints (SCHED_FIFO, 1-99, 0 disables)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityHints {
    pub speed: i32,
    pub bearing: i32,
    pub display: i32,
}

impl Default for PriorityHints {
    fn default() -> Self {
        Self {
            speed: 60,
            bearing: 50,
            display: 40,
        }
    }
}

impl PriorityHints {
    /// No priority changes (unprivileged runs, tests)
    pub fn disabled() -> Self {
        Self {
            speed: 0,
            bearing: 0,
            display: 0,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capture sample rate (Hz)
    pub sample_rate: u32,
    /// Samples per block, power of two
    pub block_size: usize,
    /// Descriptors held per consumer queue
    pub queue_capacity: usize,
    /// Low-pass cutoff applied by the dispatcher (Hz)
    pub cutoff_hz: f64,
    /// Speed estimates ignore bins at or above this frequency (Hz)
    pub max_useful_freq_hz: f64,
    /// Stop after this many dispatched blocks
    pub block_limit: u64,
    /// Dispatcher sleep when no block is ready (ms)
    pub dispatcher_idle_ms: u64,
    /// Speed estimator period (ms)
    pub speed_period_ms: u64,
    /// Bearing detector period (ms)
    pub bearing_period_ms: u64,
    /// Direction queue drain period (ms)
    pub direction_period_ms: u64,
    /// Bearing heuristic thresholds
    pub bearing: BearingThresholds,
    /// Thread priority hints
    pub priorities: PriorityHints,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            block_size: 4096,
            queue_capacity: sample_buffer::DEFAULT_QUEUE_CAPACITY,
            cutoff_hz: 1000.0,
            max_useful_freq_hz: 10_000.0,
            block_limit: 50,
            dispatcher_idle_ms: 2,
            speed_period_ms: 200,
            bearing_period_ms: 1000,
            direction_period_ms: 200,
            bearing: BearingThresholds::default(),
            priorities: PriorityHints::default(),
        }
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_nan() || value < min || value > max {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    } else {
        Ok(())
    }
}

impl PipelineConfig {
    /// Check every field; the FFT relies on the power-of-two block size
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nyquist = f64::from(self.sample_rate) / 2.0;

        check_range("sample_rate", f64::from(self.sample_rate), 1000.0, 384_000.0)?;
        check_range("block_size", self.block_size as f64, 16.0, 1_048_576.0)?;
        if !self.block_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "block_size",
                value: self.block_size,
            });
        }
        check_range("queue_capacity", self.queue_capacity as f64, 1.0, 1024.0)?;
        check_range("cutoff_hz", self.cutoff_hz, 1.0, nyquist)?;
        check_range("max_useful_freq_hz", self.max_useful_freq_hz, 1.0, f64::MAX)?;
        check_range("block_limit", self.block_limit as f64, 1.0, u32::MAX as f64)?;
        check_range("dispatcher_idle_ms", self.dispatcher_idle_ms as f64, 1.0, 1000.0)?;
        check_range("speed_period_ms", self.speed_period_ms as f64, 1.0, 60_000.0)?;
        check_range("bearing_period_ms", self.bearing_period_ms as f64, 1.0, 60_000.0)?;
        check_range("direction_period_ms", self.direction_period_ms as f64, 1.0, 60_000.0)?;

        let bearing = &self.bearing;
        check_range("bearing.motor_min_hz", bearing.motor_min_hz, 0.0, nyquist)?;
        check_range("bearing.motor_max_hz", bearing.motor_max_hz, 0.0, nyquist)?;
        if bearing.motor_min_hz > bearing.motor_max_hz {
            return Err(ConfigError::InvalidBand {
                min_hz: bearing.motor_min_hz,
                max_hz: bearing.motor_max_hz,
            });
        }
        check_range("bearing.low_freq_thresh_hz", bearing.low_freq_thresh_hz, 0.0, nyquist)?;
        check_range("bearing.rel_amp_thresh", bearing.rel_amp_thresh, 0.0, 1000.0)?;

        let priorities = &self.priorities;
        for (field, value) in [
            ("priorities.speed", priorities.speed),
            ("priorities.bearing", priorities.bearing),
            ("priorities.display", priorities.display),
        ] {
            check_range(field, f64::from(value), 0.0, 99.0)?;
        }

        Ok(())
    }

    /// Sample rate as f64 (Hz)
    pub fn sample_rate_hz(&self) -> f64 {
        f64::from(self.sample_rate)
    }

    /// Duration of one block at the configured sample rate
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs_f64(self.block_size as f64 / self.sample_rate_hz())
    }

    pub fn dispatcher_idle(&self) -> Duration {
        Duration::from_millis(self.dispatcher_idle_ms)
    }

    pub fn speed_period(&self) -> Duration {
        Duration::from_millis(self.speed_period_ms)
    }

    pub fn bearing_period(&self) -> Duration {
        Duration::from_millis(self.bearing_period_ms)
    }

    pub fn direction_period(&self) -> Duration {
        Duration::from_millis(self.direction_period_ms)
    }
}
