//! Pipeline Context
//!
//! Everything the pipeline threads share, built once and handed to each
//! thread entry point behind an `Arc`.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use rtdb::Rtdb;
use sample_buffer::{BlockDescriptor, DescriptorQueue, DoubleBuffer, Release};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Downstream consumers fed by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerKind {
    /// Shaft speed estimator
    Speed,
    /// Bearing fault detector
    Bearing,
    /// Direction queue (no analysis yet)
    Direction,
}

impl ConsumerKind {
    /// Every consumer, in fan-out order
    pub const ALL: [ConsumerKind; 3] = [Self::Speed, Self::Bearing, Self::Direction];

    /// Name used for threads, logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Bearing => "bearing",
            Self::Direction => "direction",
        }
    }
}

/// One descriptor queue per consumer
pub struct ConsumerQueues {
    speed: DescriptorQueue,
    bearing: DescriptorQueue,
    direction: DescriptorQueue,
}

impl ConsumerQueues {
    fn new(capacity: usize) -> Self {
        Self {
            speed: DescriptorQueue::new(ConsumerKind::Speed.name(), capacity),
            bearing: DescriptorQueue::new(ConsumerKind::Bearing.name(), capacity),
            direction: DescriptorQueue::new(ConsumerKind::Direction.name(), capacity),
        }
    }

    /// Queue feeding `kind`
    pub fn get(&self, kind: ConsumerKind) -> &DescriptorQueue {
        match kind {
            ConsumerKind::Speed => &self.speed,
            ConsumerKind::Bearing => &self.bearing,
            ConsumerKind::Direction => &self.direction,
        }
    }

    /// All queues in fan-out order
    pub fn iter(&self) -> impl Iterator<Item = &DescriptorQueue> {
        ConsumerKind::ALL.into_iter().map(move |kind| self.get(kind))
    }

    /// Descriptors evicted across all queues
    pub fn total_evicted(&self) -> u64 {
        self.iter().map(|queue| queue.total_evicted()).sum()
    }
}

/// Shared state of one pipeline instance
pub struct PipelineContext {
    config: PipelineConfig,
    buffer: DoubleBuffer,
    queues: ConsumerQueues,
    rtdb: Arc<Rtdb>,
    stop: AtomicBool,
    dispatched: AtomicU64,
}

impl PipelineContext {
    /// Validate `config` and build the buffers and queues
    pub fn new(config: PipelineConfig, rtdb: Arc<Rtdb>) -> Result<Self, PipelineError> {
        config.validate()?;
        info!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            queue_capacity = config.queue_capacity,
            block_limit = config.block_limit,
            "Creating pipeline context"
        );

        Ok(Self {
            buffer: DoubleBuffer::new(config.block_size, ConsumerKind::ALL.len()),
            queues: ConsumerQueues::new(config.queue_capacity),
            rtdb,
            stop: AtomicBool::new(false),
            dispatched: AtomicU64::new(0),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Double buffer between capture and dispatcher
    pub fn buffer(&self) -> &DoubleBuffer {
        &self.buffer
    }

    pub fn queues(&self) -> &ConsumerQueues {
        &self.queues
    }

    /// Queue feeding `kind`
    pub fn queue(&self, kind: ConsumerKind) -> &DescriptorQueue {
        self.queues.get(kind)
    }

    pub fn rtdb(&self) -> &Arc<Rtdb> {
        &self.rtdb
    }

    /// Ask every pipeline thread to exit at its next loop iteration
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Blocks fanned out so far
    pub fn blocks_dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Whether the configured block limit has been reached
    pub fn limit_reached(&self) -> bool {
        self.blocks_dispatched() >= self.config.block_limit
    }

    pub(crate) fn record_dispatch(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Give up one consumer's hold on a dispatched block
    pub fn release(&self, descriptor: &BlockDescriptor) -> Release {
        self.buffer.release(descriptor.handle)
    }

    /// Drain every queue and release the blocks nobody will consume
    ///
    /// Only meaningful once the dispatcher and consumers have stopped.
    /// Returns the number of descriptors released.
    pub fn release_pending(&self) -> usize {
        let mut released = 0;
        for queue in self.queues.iter() {
            for descriptor in queue.drain() {
                let release = self.release(&descriptor);
                debug!(
                    queue = queue.name(),
                    sequence = descriptor.sequence,
                    ?release,
                    "Released undelivered block"
                );
                released += 1;
            }
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_config() {
        let config = PipelineConfig {
            block_size: 1000,
            ..Default::default()
        };
        let result = PipelineContext::new(config, Arc::new(Rtdb::new()));
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_one_queue_per_consumer() {
        let ctx = PipelineContext::new(PipelineConfig::default(), Arc::new(Rtdb::new())).unwrap();
        let names: Vec<_> = ctx.queues().iter().map(|q| q.name()).collect();
        assert_eq!(names, vec!["speed", "bearing", "direction"]);
        assert_eq!(ctx.buffer().fan_out(), 3);
        assert!(!ctx.should_stop());
        ctx.request_stop();
        assert!(ctx.should_stop());
    }

    #[test]
    fn test_release_pending_frees_dispatched_block() {
        let config = PipelineConfig {
            block_size: 16,
            ..Default::default()
        };
        let ctx = Arc::new(PipelineContext::new(config, Arc::new(Rtdb::new())).unwrap());
        let slot = ctx.buffer().write_target();
        ctx.buffer().write_block(&[3; 16]);
        crate::dispatcher::Dispatcher::new(Arc::clone(&ctx)).dispatch_once();
        assert!(ctx.buffer().is_claimed(slot));

        assert_eq!(ctx.release_pending(), 3);
        assert!(!ctx.buffer().is_full(slot));
        assert_eq!(ctx.release_pending(), 0);
    }
}
