use std::{
    fmt::{self, Debug, Display},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tracing::{debug, trace, warn};

use crate::{
    attribute::{
        Attribute, AttributeKind, AttributeValue, ACTIVE, LATENCY_MS, MULTIPLIER, RATE, THREAD_COUNT,
    },
    error::{SimError, SimResult},
    event_batch::EventBatch,
    roles::{Outgoing, Received, Role, RoleKind},
};

/// Stable identity of a component, assigned when it is registered with a
/// [`Model`](crate::Model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

/// A node in the event flow.
///
/// Every component has an `active` flag and an ordered list of downstream consumers. What it does
/// with events depends on its [`RoleKind`].
#[derive(Debug)]
pub(crate) struct Component {
    id: ComponentId,
    name: String,
    /// Inactive components are never picked as delivery targets, but still advance each tick.
    active: bool,
    /// Registration order. Duplicates allowed.
    consumers: Vec<ComponentHandle>,
    role: Role,
}

/// A shared handle to a component.
///
/// Cheap to clone. Clones refer to the same component. Each component has its own lock, which is
/// held for a single delivery, advance or attribute access and never across two components.
#[derive(Clone)]
pub struct ComponentHandle {
    id: ComponentId,
    inner: Arc<Mutex<Component>>,
}

/// A read-only view of a component at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSnapshot {
    /// The component's ID.
    pub id: ComponentId,
    /// Its display name.
    pub name: String,
    /// Its role.
    pub kind: RoleKind,
    /// Whether it can currently be picked as a delivery target.
    pub active: bool,
    /// Its downstream consumers, in registration order.
    pub consumers: Vec<ComponentId>,
    /// Its tunable attributes.
    pub attributes: Vec<Attribute>,
    /// Its counters.
    pub counters: Counters,
}

/// Observable counters, by role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Counters {
    /// Sources keep no counters.
    Source,
    /// Distributor queue state.
    Distributor {
        /// Batches waiting for the next flush.
        pending: usize,
        /// Events discarded on overflow or for lack of an active consumer.
        dropped_total: u64,
    },
    /// Sink throughput.
    Sink {
        /// Events processed within capacity.
        succeeded_total: f64,
        /// Events beyond capacity.
        failed_total: f64,
    },
}

impl ComponentHandle {
    pub(crate) fn new(id: ComponentId, name: String, role: Role) -> Self {
        let component = Component {
            id,
            name,
            active: true,
            consumers: Vec::new(),
            role,
        };
        Self {
            id,
            inner: Arc::new(Mutex::new(component)),
        }
    }

    /// Component state is never left half updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Component> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The component's ID.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The component's display name.
    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    /// The component's role.
    pub fn kind(&self) -> RoleKind {
        self.lock().role.kind()
    }

    /// Can this component currently be picked as a delivery target?
    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// Include or exclude this component from delivery target selection.
    pub fn set_active(&self, active: bool) {
        self.lock().active = active;
    }

    /// Append `consumer` to this component's downstream list.
    pub fn add_consumer(&self, consumer: &ComponentHandle) {
        debug!(from = %self.id, to = %consumer.id, "Adding consumer");
        self.lock().consumers.push(consumer.clone());
    }

    /// The IDs of this component's consumers, in registration order.
    pub fn consumers(&self) -> Vec<ComponentId> {
        self.lock().consumers.iter().map(ComponentHandle::id).collect()
    }

    /// Events processed within capacity so far. `None` unless this is a sink.
    pub fn succeeded_total(&self) -> Option<f64> {
        match self.lock().counters() {
            Counters::Sink {
                succeeded_total, ..
            } => Some(succeeded_total),
            _ => None,
        }
    }

    /// Events beyond capacity so far. `None` unless this is a sink.
    pub fn failed_total(&self) -> Option<f64> {
        match self.lock().counters() {
            Counters::Sink { failed_total, .. } => Some(failed_total),
            _ => None,
        }
    }

    /// Batches waiting to be flushed. `None` unless this is a distributor.
    pub fn pending_len(&self) -> Option<usize> {
        match self.lock().counters() {
            Counters::Distributor { pending, .. } => Some(pending),
            _ => None,
        }
    }

    /// Events discarded so far. `None` unless this is a distributor.
    pub fn dropped_total(&self) -> Option<u64> {
        match self.lock().counters() {
            Counters::Distributor { dropped_total, .. } => Some(dropped_total),
            _ => None,
        }
    }

    /// A consistent view of the whole component.
    pub fn snapshot(&self) -> ComponentSnapshot {
        let component = self.lock();
        ComponentSnapshot {
            id: component.id,
            name: component.name.clone(),
            kind: component.role.kind(),
            active: component.active,
            consumers: component.consumers.iter().map(ComponentHandle::id).collect(),
            attributes: component.attributes(),
            counters: component.counters(),
        }
    }

    /// The component's tunable attributes with their current values.
    pub fn attributes(&self) -> Vec<Attribute> {
        self.lock().attributes()
    }

    /// Get an attribute by name.
    pub fn get_attribute(&self, name: &str) -> SimResult<AttributeValue> {
        let component = self.lock();
        component
            .attributes()
            .into_iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value)
            .ok_or_else(|| component.unknown_attribute(name))
    }

    /// Set an attribute from text, coercing it to the attribute's kind.
    pub fn set_attribute(&self, name: &str, raw: &str) -> SimResult<()> {
        let mut component = self.lock();
        let value = component.attribute_kind(name)?.coerce(name, raw)?;
        component.apply(name, value)
    }

    /// Set an attribute from a typed value.
    pub fn set_value(&self, name: &str, value: AttributeValue) -> SimResult<()> {
        let mut component = self.lock();
        let kind = component.attribute_kind(name)?;
        let matches_kind = matches!(
            (kind, value),
            (AttributeKind::Integer, AttributeValue::Integer(_))
                | (AttributeKind::Boolean, AttributeValue::Boolean(_))
        );
        if !matches_kind {
            return Err(SimError::TypeCoercionFailure {
                attribute: name.to_string(),
                value: value.to_string(),
                expected: kind,
            });
        }
        component.apply(name, value)
    }

    /// Set several attributes from text, all or nothing.
    ///
    /// Every value is coerced before any is applied, and all of it happens under one lock.
    pub(crate) fn set_attributes(&self, edits: &[(String, String)]) -> SimResult<()> {
        let mut component = self.lock();
        let values = edits
            .iter()
            .map(|(name, raw)| {
                let value = component.attribute_kind(name)?.coerce(name, raw)?;
                Ok((name.as_str(), value))
            })
            .collect::<SimResult<Vec<_>>>()?;

        for (name, value) in values {
            component.apply(name, value)?;
        }
        Ok(())
    }

    /// Set a source's per-client request rate.
    pub fn set_rate(&self, rate: u64) -> SimResult<()> {
        self.set_value(RATE, AttributeValue::Integer(rate))
    }

    /// Set a source's number of parallel clients.
    pub fn set_multiplier(&self, multiplier: u64) -> SimResult<()> {
        self.set_value(MULTIPLIER, AttributeValue::Integer(multiplier))
    }

    /// Set a sink's number of threads.
    pub fn set_thread_count(&self, thread_count: u64) -> SimResult<()> {
        self.set_value(THREAD_COUNT, AttributeValue::Integer(thread_count))
    }

    /// Set a sink's per-request latency, in milliseconds.
    pub fn set_latency_ms(&self, latency_ms: u64) -> SimResult<()> {
        self.set_value(LATENCY_MS, AttributeValue::Integer(latency_ms))
    }

    /// Hand a batch to this component for the current tick.
    ///
    /// Distributors queue it, sinks consume it and sources ignore it.
    pub fn deliver(&self, batch: EventBatch, duration: Duration) -> SimResult<()> {
        match self.lock().role.receive(batch, duration) {
            Received::Ignored => {
                debug!(component = %self.id, %batch, "Source ignored delivered batch");
                Ok(())
            }
            Received::Queued => {
                trace!(component = %self.id, %batch, "Queued batch");
                Ok(())
            }
            Received::Rejected(full) => Err(SimError::QueueOverflow {
                component: self.id,
                capacity: full.capacity,
            }),
            Received::Consumed(consumed) => {
                trace!(
                    component = %self.id,
                    succeeded = consumed.succeeded,
                    failed = consumed.failed,
                    "Consumed batch"
                );
                Ok(())
            }
        }
    }

    /// Run this component's per-tick action.
    ///
    /// Sources send a fresh batch to every active consumer. Distributors split each pending batch
    /// across their active consumers, which are picked once per call. Sinks do nothing.
    ///
    /// Every delivery is attempted even if some fail. The first failure is returned.
    pub fn advance(&self, duration: Duration) -> SimResult<()> {
        let (outgoing, consumers) = {
            let mut component = self.lock();
            match component.role.advance(duration) {
                Outgoing::Nothing => return Ok(()),
                outgoing => (outgoing, component.consumers.clone()),
            }
        };

        let targets: Vec<_> = consumers
            .into_iter()
            .filter(ComponentHandle::is_active)
            .collect();

        let mut first_failure = None;
        let mut deliver = |target: &ComponentHandle, batch: EventBatch| {
            if let Err(err) = target.deliver(batch, duration) {
                warn!(from = %self.id, to = %target.id, %batch, "Delivery failed: {err}");
                first_failure.get_or_insert(err);
            }
        };

        match outgoing {
            Outgoing::Nothing => {}
            Outgoing::Broadcast(batch) => {
                for target in &targets {
                    deliver(target, batch);
                }
            }
            Outgoing::FanOut(batches) if targets.is_empty() => {
                debug!(
                    component = %self.id,
                    batches = batches.len(),
                    "No active consumers, discarding pending batches"
                );
                let mut component = self.lock();
                if let Role::Distributor(distributor) = &mut component.role {
                    for batch in batches {
                        distributor.discard(batch);
                    }
                }
            }
            Outgoing::FanOut(batches) => {
                for batch in batches {
                    let slices = batch.split(targets.len())?;
                    for (target, slice) in targets.iter().zip(slices) {
                        deliver(target, slice);
                    }
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Component {
    fn attributes(&self) -> Vec<Attribute> {
        let mut attributes = vec![Attribute::boolean(ACTIVE, self.active)];
        attributes.extend(self.role.attributes());
        attributes
    }

    fn attribute_kind(&self, name: &str) -> SimResult<AttributeKind> {
        if name == ACTIVE {
            return Ok(AttributeKind::Boolean);
        }
        self.role
            .attribute_kind(name)
            .ok_or_else(|| self.unknown_attribute(name))
    }

    /// Apply an already coerced value.
    fn apply(&mut self, name: &str, value: AttributeValue) -> SimResult<()> {
        debug!(component = %self.id, attribute = name, %value, "Setting attribute");
        match value {
            AttributeValue::Boolean(active) if name == ACTIVE => {
                self.active = active;
                Ok(())
            }
            AttributeValue::Integer(value) => {
                if self.role.set_integer(name, value)? {
                    Ok(())
                } else {
                    Err(self.unknown_attribute(name))
                }
            }
            AttributeValue::Boolean(_) => Err(self.unknown_attribute(name)),
        }
    }

    fn counters(&self) -> Counters {
        match &self.role {
            Role::Source(_) => Counters::Source,
            Role::Distributor(distributor) => Counters::Distributor {
                pending: distributor.pending_len(),
                dropped_total: distributor.dropped_total(),
            },
            Role::Sink(sink) => Counters::Sink {
                succeeded_total: sink.succeeded_total(),
                failed_total: sink.failed_total(),
            },
        }
    }

    fn unknown_attribute(&self, name: &str) -> SimError {
        SimError::UnknownAttribute {
            component: self.id,
            attribute: name.to_string(),
        }
    }
}

impl Debug for ComponentHandle {
    // Consumer lists can contain cycles, so only the ID is shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentHandle").field(&self.id).finish()
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
