//! Distributor role: buffers batches during a tick and fans them out at the end of it.
//!
//! Models a load balancer. Each buffered batch is split evenly across the consumers that are
//! active when the flush starts.

use std::collections::VecDeque;

use crate::event_batch::EventBatch;

/// The pending queue was at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QueueFull {
    pub(crate) capacity: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Distributor {
    /// Batches received since the last flush, oldest first.
    pending: VecDeque<EventBatch>,
    /// Maximum number of pending batches. Unbounded when `None`.
    capacity: Option<usize>,
    /// Events discarded, either on overflow or because nothing was active to receive them.
    dropped_total: u64,
}

impl Distributor {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity,
            dropped_total: 0,
        }
    }

    pub(crate) fn receive(&mut self, batch: EventBatch) -> Result<(), QueueFull> {
        if let Some(capacity) = self.capacity {
            if self.pending.len() >= capacity {
                self.discard(batch);
                return Err(QueueFull { capacity });
            }
        }
        self.pending.push_back(batch);
        Ok(())
    }

    /// Take everything pending, in the order it arrived.
    pub(crate) fn drain(&mut self) -> Vec<EventBatch> {
        self.pending.drain(..).collect()
    }

    pub(crate) fn discard(&mut self, batch: EventBatch) {
        self.dropped_total = self.dropped_total.saturating_add(batch.count());
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn dropped_total(&self) -> u64 {
        self.dropped_total
    }
}
