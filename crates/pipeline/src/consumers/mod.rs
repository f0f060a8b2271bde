//! Analysis Consumers
//!
//! Periodic tasks that poll their descriptor queue, analyze the referenced
//! block, publish to the RTDB and release the block.

mod bearing;
mod direction;
mod speed;

pub use bearing::BearingDetector;
pub use direction::DirectionPlaceholder;
pub use speed::SpeedEstimator;

use crate::context::{ConsumerKind, PipelineContext};
use crate::periodic::PeriodicTimer;
use rtdb::Rtdb;
use std::time::Duration;
use tracing::{debug, info};

/// Per-block analysis step of a consumer
pub trait BlockConsumer: Send {
    /// Queue this consumer drains
    fn kind(&self) -> ConsumerKind;

    /// Analyze one filtered block and publish the result
    fn process(&mut self, samples: &[i16], rtdb: &Rtdb);
}

/// Pop one descriptor and process it; `false` if the queue was empty
///
/// The block is released after processing whatever the outcome, so the
/// consumer never holds a slot across cycles.
pub fn poll_once<C: BlockConsumer + ?Sized>(ctx: &PipelineContext, consumer: &mut C) -> bool {
    let kind = consumer.kind();
    let Some(descriptor) = ctx.queue(kind).pop() else {
        return false;
    };

    ctx.buffer().with_samples(descriptor.handle, |samples| {
        let len = descriptor.len.min(samples.len());
        consumer.process(&samples[..len], ctx.rtdb());
    });
    let release = ctx.release(&descriptor);

    metrics::counter!("consumer_cycles", "consumer" => kind.name()).increment(1);
    debug!(
        consumer = kind.name(),
        sequence = descriptor.sequence,
        len = descriptor.len,
        ?release,
        "Consumer cycle"
    );
    true
}

/// Run a consumer at a fixed period until the pipeline stops
pub fn run_consumer<C: BlockConsumer + ?Sized>(ctx: &PipelineContext, consumer: &mut C, period: Duration) {
    let name = consumer.kind().name();
    info!(consumer = name, period_ms = period.as_millis() as u64, "Consumer started");

    let mut timer = PeriodicTimer::new(period);
    let mut processed = 0u64;
    while !ctx.should_stop() {
        if poll_once(ctx, consumer) {
            processed += 1;
        }
        timer.wait();
    }

    info!(
        consumer = name,
        processed,
        overruns = timer.overruns(),
        "Consumer stopped"
    );
}
