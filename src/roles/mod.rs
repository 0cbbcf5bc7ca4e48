//! The behaviours a component can have in the event flow.
//!
//! - [`Source`](RoleKind::Source): generates events every tick and sends them downstream
//! - [`Distributor`](RoleKind::Distributor): buffers events and splits them across consumers
//! - [`Sink`](RoleKind::Sink): processes events against its capacity, counting failures

use std::{
    fmt::{self, Display},
    time::Duration,
};

use crate::{
    attribute::{Attribute, AttributeKind},
    error::SimResult,
    event_batch::EventBatch,
};

mod distributor;
mod sink;
mod source;

pub(crate) use distributor::{Distributor, QueueFull};
pub(crate) use sink::{Consumed, Sink};
pub(crate) use source::Source;

/// Which role a component plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// Generates events each tick, e.g. web clients.
    Source,
    /// Fans events out across its consumers, e.g. a load balancer.
    Distributor,
    /// Processes events and counts successes and failures, e.g. a web server.
    Sink,
}

#[derive(Debug, Clone)]
pub(crate) enum Role {
    Source(Source),
    Distributor(Distributor),
    Sink(Sink),
}

/// Work produced by advancing a role, to be delivered once the component is unlocked.
#[derive(Debug)]
pub(crate) enum Outgoing {
    Nothing,
    /// Send this batch, whole, to every active consumer.
    Broadcast(EventBatch),
    /// Split each batch across the active consumers.
    FanOut(Vec<EventBatch>),
}

/// What happened to a batch handed to a role.
#[derive(Debug)]
pub(crate) enum Received {
    Ignored,
    Queued,
    Rejected(QueueFull),
    Consumed(Consumed),
}

impl Role {
    pub(crate) fn kind(&self) -> RoleKind {
        match self {
            Role::Source(_) => RoleKind::Source,
            Role::Distributor(_) => RoleKind::Distributor,
            Role::Sink(_) => RoleKind::Sink,
        }
    }

    /// The per-tick action.
    ///
    /// Sinks only react to what is delivered to them, so advancing one does nothing.
    pub(crate) fn advance(&mut self, duration: Duration) -> Outgoing {
        match self {
            Role::Source(source) => Outgoing::Broadcast(source.emit(duration)),
            Role::Distributor(distributor) => {
                let pending = distributor.drain();
                if pending.is_empty() {
                    Outgoing::Nothing
                } else {
                    Outgoing::FanOut(pending)
                }
            }
            Role::Sink(_) => Outgoing::Nothing,
        }
    }

    pub(crate) fn receive(&mut self, batch: EventBatch, duration: Duration) -> Received {
        match self {
            Role::Source(_) => Received::Ignored,
            Role::Distributor(distributor) => match distributor.receive(batch) {
                Ok(()) => Received::Queued,
                Err(full) => Received::Rejected(full),
            },
            Role::Sink(sink) => Received::Consumed(sink.consume(batch, duration)),
        }
    }

    pub(crate) fn attributes(&self) -> Vec<Attribute> {
        match self {
            Role::Source(source) => source.attributes(),
            Role::Distributor(_) => Vec::new(),
            Role::Sink(sink) => sink.attributes(),
        }
    }

    pub(crate) fn attribute_kind(&self, name: &str) -> Option<AttributeKind> {
        self.attributes()
            .into_iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.kind)
    }

    /// Returns whether `name` is one of this role's attributes.
    pub(crate) fn set_integer(&mut self, name: &str, value: u64) -> SimResult<bool> {
        match self {
            Role::Source(source) => source.set_integer(name, value),
            Role::Distributor(_) => Ok(false),
            Role::Sink(sink) => sink.set_integer(name, value),
        }
    }
}

impl Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoleKind::Source => "source",
            RoleKind::Distributor => "distributor",
            RoleKind::Sink => "sink",
        })
    }
}
