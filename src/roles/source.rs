//! Source role: generates a batch of events every tick.
//!
//! Models a group of web clients, each sending requests at a fixed rate.

use std::time::Duration;

use crate::{
    attribute::{non_zero, Attribute, MULTIPLIER, RATE},
    error::SimResult,
    event_batch::EventBatch,
};

/// Generates `rate * multiplier * duration` events per tick.
#[derive(Debug, Clone)]
pub(crate) struct Source {
    /// Events per second, per client.
    rate: u64,
    /// Number of parallel clients.
    multiplier: u64,
    unit_size: u64,
}

impl Source {
    pub(crate) fn new(rate: u64, multiplier: u64, unit_size: u64) -> SimResult<Self> {
        Ok(Self {
            rate: non_zero(RATE, rate)?,
            multiplier: non_zero(MULTIPLIER, multiplier)?,
            unit_size: non_zero("unit_size", unit_size)?,
        })
    }

    /// The number of events generated over `duration`, rounded down to whole events.
    ///
    /// Saturates at `u64::MAX`.
    pub(crate) fn volume(&self, duration: Duration) -> u64 {
        let per_second = u128::from(self.rate) * u128::from(self.multiplier);
        per_second
            .checked_mul(duration.as_millis())
            .map_or(u64::MAX, |volume| {
                u64::try_from(volume / 1000).unwrap_or(u64::MAX)
            })
    }

    /// The batch to send, undivided, to every active consumer.
    pub(crate) fn emit(&self, duration: Duration) -> EventBatch {
        EventBatch::new(self.volume(duration), self.unit_size)
    }

    pub(crate) fn attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::integer(RATE, self.rate),
            Attribute::integer(MULTIPLIER, self.multiplier),
        ]
    }

    /// Returns whether `name` is one of this role's attributes.
    pub(crate) fn set_integer(&mut self, name: &str, value: u64) -> SimResult<bool> {
        match name {
            RATE => self.rate = non_zero(RATE, value)?,
            MULTIPLIER => self.multiplier = non_zero(MULTIPLIER, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
