//! Status Display
//!
//! Periodically prints the RTDB contents as a single status line.

use pipeline::periodic::PeriodicTimer;
use pipeline::priority::apply_realtime_hint;
use pipeline::{PipelineContext, PipelineError, RtdbSnapshot};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

/// `speed: <Hz> Hz (<rpm> rpm) | bearing: FAULT|OK`
pub fn format_status(snapshot: &RtdbSnapshot) -> String {
    format!(
        "speed: {:.1} Hz ({:.0} rpm) | bearing: {}",
        snapshot.speed_hz,
        snapshot.rpm(),
        if snapshot.bearing_fault { "FAULT" } else { "OK" }
    )
}

/// Display thread; exits when the pipeline stops
pub struct DisplayReporter {
    handle: JoinHandle<u64>,
}

impl DisplayReporter {
    pub fn spawn(ctx: Arc<PipelineContext>, period: Duration) -> Result<Self, PipelineError> {
        let handle = thread::Builder::new()
            .name("display".into())
            .spawn(move || {
                apply_realtime_hint("display", ctx.config().priorities.display);
                info!(period_ms = period.as_millis() as u64, "Display started");

                let mut timer = PeriodicTimer::new(period);
                let mut lines = 0u64;
                while !ctx.should_stop() {
                    println!("{}", format_status(&ctx.rtdb().snapshot()));
                    lines += 1;
                    timer.wait();
                }
                lines
            })
            .map_err(|source| PipelineError::ThreadSpawn {
                name: "display",
                source,
            })?;

        Ok(Self { handle })
    }

    /// Wait for the thread to exit; returns lines printed
    pub fn join(self) -> Result<u64, PipelineError> {
        self.handle
            .join()
            .map_err(|_| PipelineError::ThreadPanicked("display"))
    }
}
