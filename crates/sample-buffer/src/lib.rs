//! Sample Block Hand-off
//!
//! Provides the double buffer that sits between the capture source and the
//! dispatcher, and the bounded drop-oldest queues that carry block
//! descriptors to the analysis consumers.

mod double_buffer;
mod queue;

pub use double_buffer::{BlockHandle, BufferStats, DoubleBuffer, Release, SLOT_COUNT};
pub use queue::{DescriptorQueue, DEFAULT_QUEUE_CAPACITY};

/// Lightweight reference to a dispatched sample block
///
/// The same block is referenced by one descriptor per consumer queue; the
/// samples themselves stay inside the [`DoubleBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Which buffer slot holds the samples
    pub handle: BlockHandle,
    /// Number of valid samples in the block
    pub len: usize,
    /// Capture order of the block (monotonic per double buffer)
    pub sequence: u64,
}
