//! Bounded Drop-Oldest Descriptor Queue

use crate::BlockDescriptor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Default queue capacity (descriptors per consumer)
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
}

/// Bounded FIFO with one lock guarding head, tail and count
///
/// `push` never blocks and never fails: on a full queue the oldest entry is
/// evicted and handed back to the caller. `pop` is a non-blocking poll.
pub struct DescriptorQueue<T = BlockDescriptor> {
    name: &'static str,
    capacity: usize,
    ring: Mutex<Ring<T>>,
    total_pushed: AtomicU64,
    total_evicted: AtomicU64,
}

impl<T> DescriptorQueue<T> {
    /// Create a queue holding at most `capacity` entries
    pub fn new(name: &'static str, capacity: usize) -> Self {
        assert!(capacity > 0, "Queue capacity must be > 0");
        Self {
            name,
            capacity,
            ring: Mutex::new(Ring {
                slots: (0..capacity).map(|_| None).collect(),
                head: 0,
                tail: 0,
                count: 0,
            }),
            total_pushed: AtomicU64::new(0),
            total_evicted: AtomicU64::new(0),
        }
    }

    fn ring(&self) -> MutexGuard<'_, Ring<T>> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry, evicting the oldest one if the queue is full
    ///
    /// Returns the evicted entry, if any.
    pub fn push(&self, item: T) -> Option<T> {
        let evicted = {
            let mut ring = self.ring();
            let evicted = if ring.count == self.capacity {
                let tail = ring.tail;
                ring.tail = (tail + 1) % self.capacity;
                ring.count -= 1;
                ring.slots[tail].take()
            } else {
                None
            };

            let head = ring.head;
            ring.slots[head] = Some(item);
            ring.head = (head + 1) % self.capacity;
            ring.count += 1;
            evicted
        };

        self.total_pushed.fetch_add(1, Ordering::Relaxed);
        if evicted.is_some() {
            self.total_evicted.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("descriptors_evicted", "queue" => self.name).increment(1);
            trace!(queue = self.name, "Queue full, evicted oldest descriptor");
        }
        evicted
    }

    /// Remove and return the oldest entry, or `None` if empty
    pub fn pop(&self) -> Option<T> {
        let mut ring = self.ring();
        if ring.count == 0 {
            return None;
        }
        let tail = ring.tail;
        ring.tail = (tail + 1) % self.capacity;
        ring.count -= 1;
        ring.slots[tail].take()
    }

    /// Remove every entry, oldest first
    pub fn drain(&self) -> Vec<T> {
        let mut drained = Vec::new();
        while let Some(item) = self.pop() {
            drained.push(item);
        }
        drained
    }

    /// Number of queued entries
    pub fn len(&self) -> usize {
        self.ring().count
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue name (used in logs and metrics)
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total entries ever pushed
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed.load(Ordering::Relaxed)
    }

    /// Total entries evicted by drop-oldest
    pub fn total_evicted(&self) -> u64 {
        self.total_evicted.load(Ordering::Relaxed)
    }
}
