//! Sink role: processes what it can of each batch and counts the rest as failed.
//!
//! Models a web server with a fixed number of threads, each taking `latency_ms` per request.

use std::time::Duration;

use crate::{
    attribute::{non_zero, Attribute, LATENCY_MS, THREAD_COUNT},
    error::SimResult,
    event_batch::EventBatch,
};

#[derive(Debug, Clone)]
pub(crate) struct Sink {
    thread_count: u64,
    latency_ms: u64,
    succeeded_total: f64,
    failed_total: f64,
}

/// The outcome of consuming one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Consumed {
    pub(crate) succeeded: f64,
    pub(crate) failed: f64,
}

impl Sink {
    pub(crate) fn new(thread_count: u64, latency_ms: u64) -> SimResult<Self> {
        Ok(Self {
            thread_count: non_zero(THREAD_COUNT, thread_count)?,
            latency_ms: non_zero(LATENCY_MS, latency_ms)?,
            succeeded_total: 0.0,
            failed_total: 0.0,
        })
    }

    /// How many events can be processed over `duration`.
    pub(crate) fn capacity(&self, duration: Duration) -> f64 {
        let per_second = self.thread_count as f64 * (1000.0 / self.latency_ms as f64);
        per_second * duration.as_secs_f64()
    }

    pub(crate) fn consume(&mut self, batch: EventBatch, duration: Duration) -> Consumed {
        let count = batch.count() as f64;
        let failed = (count - self.capacity(duration)).max(0.0);
        let succeeded = count - failed;

        self.failed_total += failed;
        self.succeeded_total += succeeded;

        Consumed { succeeded, failed }
    }

    pub(crate) fn succeeded_total(&self) -> f64 {
        self.succeeded_total
    }

    pub(crate) fn failed_total(&self) -> f64 {
        self.failed_total
    }

    pub(crate) fn attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::integer(THREAD_COUNT, self.thread_count),
            Attribute::integer(LATENCY_MS, self.latency_ms),
        ]
    }

    /// Returns whether `name` is one of this role's attributes.
    pub(crate) fn set_integer(&mut self, name: &str, value: u64) -> SimResult<bool> {
        match name {
            THREAD_COUNT => self.thread_count = non_zero(THREAD_COUNT, value)?,
            LATENCY_MS => self.latency_ms = non_zero(LATENCY_MS, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}
