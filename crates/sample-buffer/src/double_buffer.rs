//! Double Buffer Implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, trace, warn};

/// Number of sample slots (double buffering)
pub const SLOT_COUNT: usize = 2;

/// Opaque identity of one buffer slot
///
/// Handles are only created by the [`DoubleBuffer`] that owns the slot, so
/// releasing by handle is a plain index comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle(usize);

impl BlockHandle {
    /// Slot index inside the owning double buffer
    pub fn index(&self) -> usize {
        self.0
    }

    fn other(&self) -> Self {
        Self((self.0 + 1) % SLOT_COUNT)
    }
}

/// Outcome of a consumer releasing a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Other consumers still hold the block
    Pending(usize),
    /// Last holder released; the slot is free for the producer again
    Freed,
    /// The slot was not claimed, nothing changed
    NotClaimed,
}

/// Counters for the producer side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Blocks committed by the producer
    pub blocks_written: u64,
    /// Blocks discarded because no slot was free
    pub blocks_dropped: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    full: bool,
    ready_to_consume: bool,
    pending_releases: usize,
    sequence: u64,
}

impl SlotState {
    fn is_free(&self) -> bool {
        !self.full && !self.ready_to_consume
    }
}

#[derive(Debug)]
struct Flags {
    slots: [SlotState; SLOT_COUNT],
    write_target: BlockHandle,
    next_sequence: u64,
}

/// Two fixed-size sample slots shared by one producer, the dispatcher and the
/// consumers
///
/// Flag transitions (`full`, `ready_to_consume`, pending releases, write
/// target) happen under a single lock. Sample storage is guarded per slot and
/// is never locked while the flag lock is held.
pub struct DoubleBuffer {
    block_size: usize,
    fan_out: usize,
    flags: Mutex<Flags>,
    data: [RwLock<Box<[i16]>>; SLOT_COUNT],
    blocks_written: AtomicU64,
    blocks_dropped: AtomicU64,
}

impl DoubleBuffer {
    /// Create a double buffer of `block_size` samples per slot
    ///
    /// `fan_out` is the number of consumers that must release a claimed block
    /// before its slot is reused.
    pub fn new(block_size: usize, fan_out: usize) -> Self {
        assert!(block_size > 0, "Block size must be > 0");
        assert!(fan_out > 0, "Fan-out must be > 0");
        Self {
            block_size,
            fan_out,
            flags: Mutex::new(Flags {
                slots: [SlotState::default(); SLOT_COUNT],
                write_target: BlockHandle(0),
                next_sequence: 0,
            }),
            data: std::array::from_fn(|_| RwLock::new(vec![0; block_size].into_boxed_slice())),
            blocks_written: AtomicU64::new(0),
            blocks_dropped: AtomicU64::new(0),
        }
    }

    /// Samples per slot
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Consumers per claimed block
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Slot the producer writes into next
    pub fn write_target(&self) -> BlockHandle {
        self.flags().write_target
    }

    /// Copy one block into the current write target and commit it
    ///
    /// Single producer only. Samples beyond `block_size` are ignored and a
    /// short block is zero-padded. Returns `false` when the write target is
    /// still full or being consumed; the block is then dropped.
    pub fn write_block(&self, samples: &[i16]) -> bool {
        let target = {
            let flags = self.flags();
            let target = flags.write_target;
            if !flags.slots[target.0].is_free() {
                drop(flags);
                self.blocks_dropped.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("blocks_dropped").increment(1);
                trace!("No free slot, dropping block");
                return false;
            }
            target
        };

        {
            let mut data = self.data[target.0]
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let n = samples.len().min(self.block_size);
            data[..n].copy_from_slice(&samples[..n]);
            data[n..].fill(0);
        }

        self.write_complete(target)
    }

    /// Mark the targeted slot full and switch the write target to the other
    /// slot
    ///
    /// Returns `false` without changing anything if `target` is not the
    /// current write target or is not free.
    pub fn write_complete(&self, target: BlockHandle) -> bool {
        let mut flags = self.flags();
        if flags.write_target != target || !flags.slots[target.0].is_free() {
            warn!(slot = target.0, "write_complete on a slot that is not the free write target");
            return false;
        }

        let sequence = flags.next_sequence;
        flags.next_sequence += 1;
        let slot = &mut flags.slots[target.0];
        slot.full = true;
        slot.sequence = sequence;
        flags.write_target = target.other();
        drop(flags);

        self.blocks_written.fetch_add(1, Ordering::Relaxed);
        trace!(slot = target.0, sequence, "Block committed");
        true
    }

    /// Claim the oldest full, unclaimed slot for fan-out
    ///
    /// The claimed slot owes `fan_out` releases before it is free again.
    pub fn claim(&self) -> Option<(BlockHandle, u64)> {
        let mut flags = self.flags();
        let index = flags
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.full && !s.ready_to_consume)
            .min_by_key(|(_, s)| s.sequence)
            .map(|(i, _)| i)?;

        let fan_out = self.fan_out;
        let slot = &mut flags.slots[index];
        slot.ready_to_consume = true;
        slot.pending_releases = fan_out;
        Some((BlockHandle(index), slot.sequence))
    }

    /// Release one consumer's hold on a claimed block
    pub fn release(&self, handle: BlockHandle) -> Release {
        let mut flags = self.flags();
        let slot = &mut flags.slots[handle.0];
        if !slot.ready_to_consume || slot.pending_releases == 0 {
            warn!(slot = handle.0, "Release of a block that is not claimed");
            return Release::NotClaimed;
        }

        slot.pending_releases -= 1;
        if slot.pending_releases > 0 {
            return Release::Pending(slot.pending_releases);
        }

        slot.full = false;
        slot.ready_to_consume = false;
        debug!(slot = handle.0, sequence = slot.sequence, "Slot returned to free pool");
        Release::Freed
    }

    /// Whether the producer has committed the slot and it is not yet freed
    pub fn is_full(&self, handle: BlockHandle) -> bool {
        self.flags().slots[handle.0].full
    }

    /// Whether the dispatcher has claimed the slot
    pub fn is_claimed(&self, handle: BlockHandle) -> bool {
        self.flags().slots[handle.0].ready_to_consume
    }

    /// Read a slot's samples
    pub fn with_samples<R>(&self, handle: BlockHandle, f: impl FnOnce(&[i16]) -> R) -> R {
        let data = self.data[handle.0]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&data)
    }

    /// Modify a claimed slot's samples in place (dispatcher filtering)
    pub fn with_samples_mut<R>(&self, handle: BlockHandle, f: impl FnOnce(&mut [i16]) -> R) -> R {
        let mut data = self.data[handle.0]
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    /// Producer-side counters
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
            blocks_dropped: self.blocks_dropped.load(Ordering::Relaxed),
        }
    }
}
