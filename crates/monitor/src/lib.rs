//! Rotor Monitor
//!
//! Start-up glue around the pipeline: logging, layered configuration, the
//! capture source and the periodic display line.

pub mod capture;
pub mod display;
pub mod settings;

pub use capture::{f32_to_i16, parse_device_index, CaptureError};
pub use display::{format_status, DisplayReporter};
pub use settings::{load_settings, DisplaySettings, MonitorSettings, SyntheticSettings};

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
///
/// `verbosity` 0 logs at info, 1 at debug, 2 and above at trace.
pub fn init_logging(verbosity: u8, json: bool) -> anyhow::Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_names(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
    .context("Failed to set tracing subscriber")
}
