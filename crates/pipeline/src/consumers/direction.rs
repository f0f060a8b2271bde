//! Direction Queue Drain
//!
//! The dispatcher feeds a direction queue, but no direction estimate exists
//! yet. This consumer releases every block it receives so the queue never
//! pins a slot, and leaves the RTDB direction untouched.

use super::BlockConsumer;
use crate::context::ConsumerKind;
use rtdb::Rtdb;
use tracing::trace;

/// Drains the direction queue without analysis
#[derive(Debug, Default)]
pub struct DirectionPlaceholder {
    drained: u64,
}

impl DirectionPlaceholder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks drained so far
    pub fn drained(&self) -> u64 {
        self.drained
    }
}

impl BlockConsumer for DirectionPlaceholder {
    fn kind(&self) -> ConsumerKind {
        ConsumerKind::Direction
    }

    fn process(&mut self, samples: &[i16], _rtdb: &Rtdb) {
        self.drained += 1;
        trace!(len = samples.len(), "Direction block drained");
    }
}
