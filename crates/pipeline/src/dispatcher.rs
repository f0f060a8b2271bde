//! Dispatcher
//!
//! Claims full blocks from the double buffer, low-pass filters them in place
//! and fans one descriptor out to every consumer queue.

use crate::context::PipelineContext;
use sample_buffer::BlockDescriptor;
use spectral::signal::peak_range;
use spectral::LowPassFilter;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Block dispatcher (one thread)
pub struct Dispatcher {
    ctx: Arc<PipelineContext>,
    filter: LowPassFilter,
}

impl Dispatcher {
    pub fn new(ctx: Arc<PipelineContext>) -> Self {
        let config = ctx.config();
        let filter = LowPassFilter::new(config.cutoff_hz, config.sample_rate_hz());
        Self { ctx, filter }
    }

    /// Dispatch at most one block
    ///
    /// Returns `false` when nothing was ready or the block limit is reached.
    pub fn dispatch_once(&self) -> bool {
        if self.ctx.limit_reached() {
            return false;
        }

        let buffer = self.ctx.buffer();
        let Some((handle, sequence)) = buffer.claim() else {
            return false;
        };

        // Claimed: the producer cannot touch this slot until every consumer releases it
        let len = buffer.with_samples_mut(handle, |samples| {
            self.filter.apply(samples);
            if let Some((lo, hi)) = peak_range(samples) {
                trace!(sequence, lo, hi, "Filtered block range");
            }
            samples.len()
        });

        let descriptor = BlockDescriptor {
            handle,
            len,
            sequence,
        };
        for queue in self.ctx.queues().iter() {
            if let Some(evicted) = queue.push(descriptor) {
                // The consumer will never see the evicted descriptor, so drop its hold here
                self.ctx.release(&evicted);
            }
        }

        let total = self.ctx.record_dispatch();
        metrics::counter!("blocks_dispatched").increment(1);
        debug!(slot = handle.index(), sequence, total, "Block dispatched");
        true
    }

    /// Dispatch until stopped, sleeping briefly whenever no block is ready
    pub fn run(&self) {
        info!("Dispatcher started");
        let idle = self.ctx.config().dispatcher_idle();
        while !self.ctx.should_stop() {
            if !self.dispatch_once() {
                std::thread::sleep(idle);
            }
        }
        info!(dispatched = self.ctx.blocks_dispatched(), "Dispatcher stopped");
    }
}
