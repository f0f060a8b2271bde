//! Rotor Monitor - Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use monitor::{format_status, init_logging, load_settings, DisplayReporter, MonitorSettings};
use pipeline::{Pipeline, PipelineContext, Rtdb, RunSummary, SyntheticSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "rotor-monitor")]
#[command(about = "Shaft speed and bearing condition monitor for rotating machinery")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Input device index (prompted when omitted)
    #[arg(short, long, value_name = "INDEX", conflicts_with = "synthetic")]
    device: Option<usize>,

    /// Use the built-in tone generator instead of an audio device
    #[arg(long)]
    synthetic: bool,

    /// Add a low-frequency fault tone to the synthetic signal
    #[arg(long, value_name = "HZ", requires = "synthetic")]
    fault_hz: Option<f64>,

    /// Stop after dispatching this many blocks
    #[arg(short, long)]
    blocks: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

enum Source {
    Synthetic(SyntheticSource),
    #[cfg(feature = "cpal-audio")]
    Audio(monitor::capture::AudioCapture),
}

impl Source {
    fn start(cli: &Cli, settings: &MonitorSettings, ctx: &Arc<PipelineContext>) -> Result<Self> {
        if cli.synthetic {
            let source = SyntheticSource::spawn(Arc::clone(ctx), settings.synthetic.source_config())?;
            return Ok(Self::Synthetic(source));
        }
        Self::start_audio(cli, ctx)
    }

    #[cfg(feature = "cpal-audio")]
    fn start_audio(cli: &Cli, ctx: &Arc<PipelineContext>) -> Result<Self> {
        let device = monitor::capture::select_device(cli.device)?;
        let capture = monitor::capture::AudioCapture::start(Arc::clone(ctx), &device)?;
        Ok(Self::Audio(capture))
    }

    #[cfg(not(feature = "cpal-audio"))]
    fn start_audio(cli: &Cli, _ctx: &Arc<PipelineContext>) -> Result<Self> {
        tracing::debug!(device = ?cli.device, "Audio capture requested");
        Err(monitor::CaptureError::Unsupported.into())
    }

    fn stop(self) -> Result<()> {
        match self {
            Self::Synthetic(source) => {
                source.join()?;
            }
            #[cfg(feature = "cpal-audio")]
            Self::Audio(capture) => capture.stop()?,
        }
        Ok(())
    }
}

fn apply_overrides(cli: &Cli, settings: &mut MonitorSettings) {
    if let Some(blocks) = cli.blocks {
        settings.pipeline.block_limit = blocks;
    }
    if let Some(fault_hz) = cli.fault_hz {
        settings.synthetic.fault_hz = Some(fault_hz);
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let mut settings = load_settings(cli.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(cli, &mut settings);

    let rtdb = Arc::new(Rtdb::new());
    let ctx = Arc::new(PipelineContext::new(settings.pipeline.clone(), rtdb).context("Invalid pipeline configuration")?);

    // Device selection may prompt, so it happens before any thread starts
    let source = Source::start(cli, &settings, &ctx).context("Failed to start capture source")?;
    let pipeline = Pipeline::start(Arc::clone(&ctx)).context("Failed to start pipeline")?;
    let display = DisplayReporter::spawn(Arc::clone(&ctx), settings.display.period())?;

    let dispatched = pipeline.wait_for_block_limit(None)?;
    info!(dispatched, "Block limit reached, shutting down");

    let summary = pipeline.stop()?;
    source.stop()?;
    display.join()?;
    Ok(summary)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    info!("=== Rotor Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let summary = run(&cli).map_err(|e| {
        error!(error = %e, "Monitor failed");
        e
    })?;

    println!(
        "dispatched {} blocks ({} dropped at capture, {} descriptors evicted)",
        summary.blocks_dispatched, summary.buffer.blocks_dropped, summary.descriptors_evicted
    );
    println!("final {}", format_status(&summary.snapshot));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_conflicts_with_synthetic() {
        let result = Cli::try_parse_from(["rotor-monitor", "--synthetic", "--device", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let cli = Cli::try_parse_from(["rotor-monitor", "--synthetic", "--fault-hz", "60", "-b", "7"]).unwrap();
        let mut settings = MonitorSettings::default();
        apply_overrides(&cli, &mut settings);
        assert_eq!(settings.pipeline.block_limit, 7);
        assert_eq!(settings.synthetic.fault_hz, Some(60.0));
    }

    #[test]
    fn test_device_without_synthetic() {
        let cli = Cli::try_parse_from(["rotor-monitor", "--device", "2"]).unwrap();
        assert_eq!(cli.device, Some(2));
        assert!(!cli.synthetic);
    }
}
