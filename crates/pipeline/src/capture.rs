//! Capture Boundary
//!
//! The capture source hands over transient chunks of samples from its
//! delivery callback. [`CaptureWriter`] copies them out immediately and
//! commits one block to the double buffer whenever a block's worth has
//! accumulated. [`SyntheticSource`] drives the writer from a tone generator.

use crate::context::PipelineContext;
use crate::error::PipelineError;
use spectral::signal::{synthesize, Tone};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Producer side of the double buffer
pub struct CaptureWriter {
    ctx: Arc<PipelineContext>,
    staging: Vec<i16>,
    block_size: usize,
}

impl CaptureWriter {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        let block_size = ctx.config().block_size;
        Self {
            ctx,
            staging: Vec::with_capacity(block_size),
            block_size,
        }
    }

    /// Copy a chunk of captured samples; returns blocks committed
    ///
    /// Any chunk size is accepted. A completed block is dropped if both
    /// slots are still in use.
    pub fn push_samples(&mut self, chunk: &[i16]) -> usize {
        let mut committed = 0;
        let mut rest = chunk;
        while !rest.is_empty() {
            let take = (self.block_size - self.staging.len()).min(rest.len());
            self.staging.extend_from_slice(&rest[..take]);
            rest = &rest[take..];

            if self.staging.len() == self.block_size {
                if self.ctx.buffer().write_block(&self.staging) {
                    committed += 1;
                }
                self.staging.clear();
            }
        }
        committed
    }

    /// Samples waiting for the current block to fill
    pub fn pending(&self) -> usize {
        self.staging.len()
    }
}

/// Delivery pace of the synthetic source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// One chunk per chunk duration at the configured sample rate
    RealTime,
    /// One chunk per fixed interval
    Interval(Duration),
}

/// Synthetic capture configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    /// Tones summed into the signal
    pub tones: Vec<Tone>,
    /// Samples per delivered chunk
    pub chunk_size: usize,
    pub pacing: Pacing,
}

impl SyntheticConfig {
    /// A healthy motor running at `speed_hz`
    pub fn motor(speed_hz: f64) -> Self {
        Self {
            tones: vec![Tone::new(speed_hz, 8000.0)],
            chunk_size: 1024,
            pacing: Pacing::RealTime,
        }
    }

    /// Add a low-frequency component (bearing fault signature)
    pub fn with_fault_tone(mut self, frequency_hz: f64, amplitude: f64) -> Self {
        self.tones.push(Tone::new(frequency_hz, amplitude));
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }
}

/// Tone generator thread feeding a [`CaptureWriter`]
///
/// Dropping the source without joining it stops the pipeline it feeds.
pub struct SyntheticSource {
    ctx: Arc<PipelineContext>,
    handle: Option<JoinHandle<u64>>,
}

impl SyntheticSource {
    /// Start generating until the pipeline stops
    pub fn spawn(ctx: Arc<PipelineContext>, config: SyntheticConfig) -> Result<Self, PipelineError> {
        let sample_rate = ctx.config().sample_rate_hz();
        let chunk_size = config.chunk_size.max(1);
        let interval = match config.pacing {
            Pacing::RealTime => Duration::from_secs_f64(chunk_size as f64 / sample_rate),
            Pacing::Interval(interval) => interval,
        };
        info!(
            tones = config.tones.len(),
            chunk_size,
            interval_us = interval.as_micros() as u64,
            "Starting synthetic capture source"
        );

        let thread_ctx = Arc::clone(&ctx);
        let handle = thread::Builder::new()
            .name("capture".into())
            .spawn(move || {
                let mut writer = CaptureWriter::new(Arc::clone(&thread_ctx));
                let mut chunk = vec![0i16; chunk_size];
                let mut position = 0u64;
                let mut committed = 0u64;
                while !thread_ctx.should_stop() {
                    synthesize(&config.tones, sample_rate, position, &mut chunk);
                    position += chunk_size as u64;
                    committed += writer.push_samples(&chunk) as u64;
                    thread::sleep(interval);
                }
                debug!(committed, "Synthetic capture source stopped");
                committed
            })
            .map_err(|source| PipelineError::ThreadSpawn {
                name: "capture",
                source,
            })?;

        Ok(Self {
            ctx,
            handle: Some(handle),
        })
    }

    /// Wait for the generator to exit once the pipeline stops; returns blocks committed
    pub fn join(mut self) -> Result<u64, PipelineError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PipelineError::ThreadPanicked("capture")),
            None => Ok(0),
        }
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.ctx.request_stop();
            // Nothing useful to do with a panic payload during drop
            let _ = handle.join();
        }
    }
}
