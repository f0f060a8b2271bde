//! Slot accounting under arbitrary interleavings of capture, dispatch and consumption

use pipeline::consumers::{poll_once, BlockConsumer};
use pipeline::{ConsumerKind, Dispatcher, PipelineConfig, PipelineContext, Rtdb};
use proptest::prelude::*;
use std::sync::Arc;

const BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
enum Step {
    Write,
    Dispatch,
    Poll(ConsumerKind),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Write),
        Just(Step::Dispatch),
        prop::sample::select(ConsumerKind::ALL.to_vec()).prop_map(Step::Poll),
    ]
}

struct Counter {
    kind: ConsumerKind,
    blocks: usize,
}

impl BlockConsumer for Counter {
    fn kind(&self) -> ConsumerKind {
        self.kind
    }

    fn process(&mut self, samples: &[i16], _rtdb: &Rtdb) {
        assert_eq!(samples.len(), BLOCK_SIZE);
        self.blocks += 1;
    }
}

fn context(queue_capacity: usize) -> Arc<PipelineContext> {
    let config = PipelineConfig {
        block_size: BLOCK_SIZE,
        queue_capacity,
        block_limit: 1_000,
        ..Default::default()
    };
    Arc::new(PipelineContext::new(config, Arc::new(Rtdb::new())).unwrap())
}

proptest! {
    #[test]
    fn prop_every_slot_returns_to_free_pool(
        queue_capacity in 1usize..4,
        steps in prop::collection::vec(step(), 0..96),
    ) {
        let ctx = context(queue_capacity);
        let dispatcher = Dispatcher::new(Arc::clone(&ctx));
        let mut consumers: Vec<Counter> = ConsumerKind::ALL
            .iter()
            .map(|&kind| Counter { kind, blocks: 0 })
            .collect();

        let mut dispatched = 0u64;
        for (i, step) in steps.iter().enumerate() {
            match *step {
                Step::Write => {
                    ctx.buffer().write_block(&[i as i16; BLOCK_SIZE]);
                }
                Step::Dispatch => {
                    if dispatcher.dispatch_once() {
                        dispatched += 1;
                    }
                }
                Step::Poll(kind) => {
                    let consumer = consumers.iter_mut().find(|c| c.kind == kind).unwrap();
                    poll_once(&ctx, consumer);
                }
            }
        }
        prop_assert_eq!(ctx.blocks_dispatched(), dispatched);

        // Shutdown: release what is queued, flush committed blocks, release again
        ctx.release_pending();
        while dispatcher.dispatch_once() {}
        ctx.release_pending();

        for queue in ctx.queues().iter() {
            prop_assert!(queue.is_empty());
        }
        // Both slots accept a new block
        prop_assert!(ctx.buffer().write_block(&[1; BLOCK_SIZE]));
        prop_assert!(ctx.buffer().write_block(&[2; BLOCK_SIZE]));
        for consumer in &consumers {
            prop_assert!(consumer.blocks as u64 <= dispatched);
        }
    }
}
