//! Monitor Settings
//!
//! Layered configuration: built-in defaults, then an optional TOML file, then
//! `MONITOR__`-prefixed environment variables (`MONITOR__PIPELINE__BLOCK_LIMIT=100`).

use config::{Config, Environment, File};
use pipeline::{Pacing, SyntheticConfig, Tone};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Display reporter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Status line period (ms)
    pub period_ms: u64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self { period_ms: 300 }
    }
}

impl DisplaySettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Tone generator used by `--synthetic`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSettings {
    /// Motor tone (Hz)
    pub speed_hz: f64,
    pub amplitude: f64,
    /// Optional low-frequency fault tone (Hz)
    pub fault_hz: Option<f64>,
    pub fault_amplitude: f64,
    /// Samples per delivered chunk
    pub chunk_size: usize,
}

impl Default for SyntheticSettings {
    fn default() -> Self {
        Self {
            speed_hz: 1000.0,
            amplitude: 8000.0,
            fault_hz: None,
            fault_amplitude: 4000.0,
            chunk_size: 1024,
        }
    }
}

impl SyntheticSettings {
    /// Real-time paced source configuration
    pub fn source_config(&self) -> SyntheticConfig {
        let mut tones = vec![Tone::new(self.speed_hz, self.amplitude)];
        if let Some(fault_hz) = self.fault_hz {
            tones.push(Tone::new(fault_hz, self.fault_amplitude));
        }
        SyntheticConfig {
            tones,
            chunk_size: self.chunk_size,
            pacing: Pacing::RealTime,
        }
    }
}

/// Everything the monitor binary can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub pipeline: pipeline::PipelineConfig,
    pub display: DisplaySettings,
    pub synthetic: SyntheticSettings,
}

/// Load settings from `path` (if given) and the environment
///
/// A file named explicitly must exist. Pipeline values are validated later,
/// when the pipeline context is built.
pub fn load_settings(path: Option<&Path>) -> Result<MonitorSettings, config::ConfigError> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }

    builder
        .add_source(
            Environment::with_prefix("MONITOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.pipeline.block_size, 4096);
        assert_eq!(settings.display.period_ms, 300);
        assert_eq!(settings.synthetic.fault_hz, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = temp_file(
            "monitor-settings",
            r#"
[pipeline]
block_limit = 12
cutoff_hz = 800.0

[pipeline.bearing]
rel_amp_thresh = 0.5

[display]
period_ms = 100

[synthetic]
fault_hz = 60.0
"#,
        );

        let settings = load_settings(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(settings.pipeline.block_limit, 12);
        assert_eq!(settings.pipeline.cutoff_hz, 800.0);
        assert_eq!(settings.pipeline.bearing.rel_amp_thresh, 0.5);
        assert_eq!(settings.pipeline.sample_rate, 44_100);
        assert_eq!(settings.display.period(), Duration::from_millis(100));
        assert_eq!(settings.synthetic.fault_hz, Some(60.0));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("monitor-settings-does-not-exist.toml");
        assert!(load_settings(Some(&path)).is_err());
    }

    #[test]
    fn test_synthetic_source_config() {
        let settings = SyntheticSettings {
            fault_hz: Some(60.0),
            ..Default::default()
        };
        let source = settings.source_config();
        assert_eq!(source.tones.len(), 2);
        assert_eq!(source.tones[1], Tone::new(60.0, 4000.0));
        assert_eq!(source.pacing, Pacing::RealTime);
    }
}
