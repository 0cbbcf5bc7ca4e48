use std::{
    fmt::{self, Display},
    time::Duration,
};

use bon::bon;

use crate::{
    attribute::{non_zero, LATENCY_MS, MULTIPLIER, RATE, THREAD_COUNT},
    error::{SimError, SimResult},
};

/// Simulation settings: the tick length, and the defaults given to newly created components.
///
/// Built with [`SimConfig::builder()`], which validates every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct SimConfig {
    pub(crate) tick: Duration,
    pub(crate) unit_size: u64,
    pub(crate) rate: u64,
    pub(crate) multiplier: u64,
    pub(crate) thread_count: u64,
    pub(crate) latency_ms: u64,
    pub(crate) pending_capacity: Option<usize>,
}

#[bon]
impl SimConfig {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        /// Wall-clock time between ticks, and the duration each tick simulates.
        #[builder(default = Duration::from_secs(1))]
        tick: Duration,
        /// Size of each event generated by a source.
        #[builder(default = 100)]
        unit_size: u64,
        /// Default events per second, per client, for new sources.
        #[builder(default = 10)]
        rate: u64,
        /// Default number of parallel clients for new sources.
        #[builder(default = 10)]
        multiplier: u64,
        /// Default number of threads for new sinks.
        #[builder(default = 1)]
        thread_count: u64,
        /// Default time to process one event, in milliseconds, for new sinks.
        #[builder(default = 1000)]
        latency_ms: u64,
        /// Maximum number of batches a distributor holds between flushes. Unbounded by default.
        pending_capacity: Option<usize>,
    ) -> SimResult<Self> {
        if tick.is_zero() {
            return Err(SimError::invalid("tick", "must be longer than zero"));
        }
        if pending_capacity == Some(0) {
            return Err(SimError::invalid("pending_capacity", "must be at least 1"));
        }

        Ok(Self {
            tick,
            unit_size: non_zero("unit_size", unit_size)?,
            rate: non_zero(RATE, rate)?,
            multiplier: non_zero(MULTIPLIER, multiplier)?,
            thread_count: non_zero(THREAD_COUNT, thread_count)?,
            latency_ms: non_zero(LATENCY_MS, latency_ms)?,
            pending_capacity,
        })
    }

    /// Time between ticks.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Size of each generated event.
    pub fn unit_size(&self) -> u64 {
        self.unit_size
    }

    /// Distributor queue capacity, if bounded.
    pub fn pending_capacity(&self) -> Option<usize> {
        self.pending_capacity
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            unit_size: 100,
            rate: 10,
            multiplier: 10,
            thread_count: 1,
            latency_ms: 1000,
            pending_capacity: None,
        }
    }
}

impl Display for SimConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick: {}ms, unit_size: {}, rate: {}, multiplier: {}, threads: {}, latency: {}ms",
            self.tick.as_millis(),
            self.unit_size,
            self.rate,
            self.multiplier,
            self.thread_count,
            self.latency_ms
        )?;
        match self.pending_capacity {
            Some(capacity) => write!(f, ", pending_capacity: {capacity}"),
            None => write!(f, ", pending_capacity: unbounded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn builder_defaults_match_default() {
        let built = SimConfig::builder().build().unwrap();

        assert_eq!(built, SimConfig::default());
    }

    #[test]
    fn builder_overrides() {
        let config = SimConfig::builder()
            .tick(Duration::from_millis(250))
            .rate(3)
            .pending_capacity(8)
            .build()
            .unwrap();

        assert_eq!(config.tick(), Duration::from_millis(250));
        assert_eq!(config.rate, 3);
        assert_eq!(config.pending_capacity(), Some(8));
    }

    #[test]
    fn rejects_out_of_domain_values() {
        assert_matches!(
            SimConfig::builder().tick(Duration::ZERO).build(),
            Err(SimError::InvalidArgument { .. })
        );
        assert_matches!(
            SimConfig::builder().latency_ms(0).build(),
            Err(SimError::InvalidArgument { .. })
        );
        assert_matches!(
            SimConfig::builder().pending_capacity(0).build(),
            Err(SimError::InvalidArgument { .. })
        );
        assert_matches!(
            SimConfig::builder().unit_size(0).build(),
            Err(SimError::InvalidArgument { .. })
        );
    }

    #[test]
    fn display() {
        assert_eq!(
            SimConfig::default().to_string(),
            "tick: 1000ms, unit_size: 100, rate: 10, multiplier: 10, threads: 1, latency: 1000ms, pending_capacity: unbounded"
        );
    }
}
