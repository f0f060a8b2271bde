//! Pipeline Runner
//!
//! Spawns the dispatcher and the three consumer threads over a shared
//! [`PipelineContext`] and tears them down again.

use crate::consumers::{run_consumer, BearingDetector, BlockConsumer, DirectionPlaceholder, SpeedEstimator};
use crate::context::PipelineContext;
use crate::dispatcher::Dispatcher;
use crate::error::PipelineError;
use crate::priority::apply_realtime_hint;
use rtdb::RtdbSnapshot;
use sample_buffer::BufferStats;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const LIMIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub blocks_dispatched: u64,
    pub buffer: BufferStats,
    pub descriptors_evicted: u64,
    /// Final RTDB contents
    pub snapshot: RtdbSnapshot,
}

/// Entry point for starting the pipeline threads
pub struct Pipeline;

impl Pipeline {
    /// Build the consumers and start every pipeline thread
    ///
    /// If any thread fails to spawn, the threads already running are stopped
    /// and joined before the error is returned.
    pub fn start(ctx: Arc<PipelineContext>) -> Result<PipelineHandle, PipelineError> {
        let config = ctx.config().clone();
        let speed = SpeedEstimator::new(&config)?;
        let bearing = BearingDetector::new(&config)?;
        let direction = DirectionPlaceholder::new();

        let mut handle = PipelineHandle {
            ctx: Arc::clone(&ctx),
            threads: Vec::with_capacity(4),
        };

        let dispatcher = Dispatcher::new(Arc::clone(&ctx));
        handle.spawn("dispatcher", move || dispatcher.run())?;
        handle.spawn_consumer(speed, config.speed_period(), config.priorities.speed)?;
        handle.spawn_consumer(bearing, config.bearing_period(), config.priorities.bearing)?;
        handle.spawn_consumer(direction, config.direction_period(), 0)?;

        info!(threads = handle.threads.len(), "Pipeline started");
        Ok(handle)
    }
}

/// Running pipeline; stops and joins its threads when dropped
pub struct PipelineHandle {
    ctx: Arc<PipelineContext>,
    threads: Vec<(&'static str, JoinHandle<()>)>,
}

impl PipelineHandle {
    pub fn context(&self) -> &Arc<PipelineContext> {
        &self.ctx
    }

    fn spawn<F>(&mut self, name: &'static str, body: F) -> Result<(), PipelineError>
    where
        F: FnOnce() + Send + 'static,
    {
        let join = thread::Builder::new()
            .name(name.into())
            .spawn(body)
            .map_err(|source| PipelineError::ThreadSpawn { name, source })?;
        self.threads.push((name, join));
        Ok(())
    }

    fn spawn_consumer<C>(&mut self, mut consumer: C, period: Duration, priority: i32) -> Result<(), PipelineError>
    where
        C: BlockConsumer + 'static,
    {
        let name = consumer.kind().name();
        let ctx = Arc::clone(&self.ctx);
        self.spawn(name, move || {
            apply_realtime_hint(name, priority);
            run_consumer(&ctx, &mut consumer, period);
        })
    }

    /// Block until the dispatcher reaches its block limit
    ///
    /// Returns the number of blocks dispatched, or [`PipelineError::Timeout`]
    /// if `timeout` elapses first.
    pub fn wait_for_block_limit(&self, timeout: Option<Duration>) -> Result<u64, PipelineError> {
        let started = Instant::now();
        while !self.ctx.limit_reached() {
            if let Some(timeout) = timeout {
                if started.elapsed() >= timeout {
                    return Err(PipelineError::Timeout {
                        dispatched: self.ctx.blocks_dispatched(),
                        limit: self.ctx.config().block_limit,
                    });
                }
            }
            thread::sleep(LIMIT_POLL_INTERVAL);
        }
        Ok(self.ctx.blocks_dispatched())
    }

    /// Stop every thread, release undelivered blocks and summarize the run
    pub fn stop(mut self) -> Result<RunSummary, PipelineError> {
        self.shutdown()?;

        let summary = RunSummary {
            blocks_dispatched: self.ctx.blocks_dispatched(),
            buffer: self.ctx.buffer().stats(),
            descriptors_evicted: self.ctx.queues().total_evicted(),
            snapshot: self.ctx.rtdb().snapshot(),
        };
        info!(
            blocks_dispatched = summary.blocks_dispatched,
            blocks_dropped = summary.buffer.blocks_dropped,
            descriptors_evicted = summary.descriptors_evicted,
            "Pipeline stopped"
        );
        Ok(summary)
    }

    fn shutdown(&mut self) -> Result<(), PipelineError> {
        self.ctx.request_stop();

        let mut first_panic = None;
        for (name, join) in self.threads.drain(..) {
            if join.join().is_err() {
                warn!(thread = name, "Pipeline thread panicked");
                first_panic.get_or_insert(name);
            }
        }

        let released = self.ctx.release_pending();
        debug!(released, "Undelivered descriptors released");

        match first_panic {
            Some(name) => Err(PipelineError::ThreadPanicked(name)),
            None => Ok(()),
        }
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if !self.threads.is_empty() {
            if let Err(e) = self.shutdown() {
                warn!(error = %e, "Pipeline shutdown during drop failed");
            }
        }
    }
}
