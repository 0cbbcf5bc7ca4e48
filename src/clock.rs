use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use bon::bon;
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{debug, info, info_span, warn};

use crate::{
    error::{SimError, SimResult},
    model::Model,
};

/// Advances a [`Model`] once per tick in a background task.
///
/// A `Clock` is idle until [`started`](Clock::start). Each tick it waits for the tick duration,
/// then advances every component in registration order. All of a tick's advances finish before
/// the next wait begins.
#[derive(Debug)]
pub struct Clock {
    model: Model,
    tick: Duration,
}

/// A handle to a running clock.
///
/// Dropping the handle aborts the clock. Use [`ClockHandle::stop()`] to stop it cleanly.
#[derive(Debug)]
pub struct ClockHandle {
    ticks: Arc<AtomicU64>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

#[bon]
impl Clock {
    /// Create a clock for `model`.
    ///
    /// The tick defaults to the one in the model's configuration.
    #[builder]
    pub fn new(model: Model, tick: Option<Duration>) -> SimResult<Self> {
        let tick = tick.unwrap_or_else(|| model.config().tick());
        if tick.is_zero() {
            return Err(SimError::invalid("tick", "must be longer than zero"));
        }
        Ok(Self { model, tick })
    }

    /// Spawn the tick loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> ClockHandle {
        let ticks = Arc::new(AtomicU64::new(0));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(self.run(shutdown_rx, Arc::clone(&ticks)));

        ClockHandle {
            ticks,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    async fn run(self, mut shutdown_rx: oneshot::Receiver<()>, ticks: Arc<AtomicU64>) {
        info!(tick_ms = self.tick.as_millis() as u64, "Clock started");

        loop {
            tokio::select! {
                biased;

                // Also resolves if the handle went away without sending.
                _ = &mut shutdown_rx => break,

                _ = tokio::time::sleep(self.tick) => {}
            }

            let tick = ticks.load(Ordering::Acquire) + 1;
            let report = info_span!("tick", tick).in_scope(|| self.model.advance_all(self.tick));
            ticks.store(tick, Ordering::Release);

            debug!(
                tick,
                advanced = report.advanced,
                failures = report.failures.len(),
                "Tick finished"
            );
        }

        info!(ticks = ticks.load(Ordering::Acquire), "Clock stopped");
    }
}

impl ClockHandle {
    /// The number of ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Is the tick loop still running?
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the clock and wait for the loop to exit.
    ///
    /// A tick in progress is allowed to finish. Returns the number of ticks completed.
    pub async fn stop(mut self) -> u64 {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            // We ignore errors here - if the receiver has gone away, the loop has already exited.
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!("Clock task ended abnormally: {err}");
            }
        }

        self.ticks()
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
