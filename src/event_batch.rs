use std::fmt::{self, Display};

use crate::error::{SimError, SimResult};

/// A number of homogeneous simulated requests, all of the same size.
///
/// Created by a source each tick or by splitting another batch. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBatch {
    count: u64,
    unit_size: u64,
}

impl EventBatch {
    /// Create a batch of `count` events, each of `unit_size`.
    ///
    /// `unit_size` is carried through unchecked. Sources only ever emit batches with a positive
    /// unit size, since [`SimConfig`](crate::SimConfig) rejects zero.
    pub fn new(count: u64, unit_size: u64) -> Self {
        Self { count, unit_size }
    }

    /// The number of events in this batch.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The opaque size of each event.
    pub fn unit_size(&self) -> u64 {
        self.unit_size
    }

    /// Is this batch empty?
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Partition this batch into `n` batches as evenly as possible.
    ///
    /// Every part gets `count / n` events, except the last, which also absorbs any remainder.
    /// The parts always sum to `count`. Fails when `n` is zero.
    pub fn split(&self, n: usize) -> SimResult<Vec<EventBatch>> {
        if n == 0 {
            return Err(SimError::invalid("split count", "must be at least 1"));
        }

        let ways = n as u64;
        let share = self.count / ways;
        let remainder = self.count % ways;

        let mut parts = vec![EventBatch::new(share, self.unit_size); n];
        if let Some(last) = parts.last_mut() {
            last.count += remainder;
        }

        Ok(parts)
    }
}

impl Display for EventBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.count, self.unit_size)
    }
}
