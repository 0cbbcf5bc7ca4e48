use std::{
    collections::HashMap,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    component::{ComponentHandle, ComponentId, ComponentSnapshot},
    config::SimConfig,
    error::{SimError, SimResult},
    roles::{Distributor, Role, Sink, Source},
};

/// The set of components in a diagram, in registration order.
///
/// Components are looked up by [`ComponentId`], never by anything belonging to the presentation
/// layer. The clock advances them in the order they were added.
///
/// Cheap to clone. Clones share the same registry.
#[derive(Debug, Clone)]
pub struct Model {
    config: SimConfig,
    registry: Arc<Mutex<Registry>>,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    order: Vec<ComponentHandle>,
    by_id: HashMap<ComponentId, ComponentHandle>,
}

/// The outcome of advancing every component once.
#[derive(Debug, Default)]
pub struct TickReport {
    /// How many components were advanced.
    pub advanced: usize,
    /// Components whose advance failed, in the order they ran.
    pub failures: Vec<ComponentFailure>,
}

/// A component that failed while advancing.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentFailure {
    /// The component that failed.
    pub component: ComponentId,
    /// What went wrong.
    pub error: SimError,
}

impl Model {
    /// Create an empty model.
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            registry: Arc::default(),
        }
    }

    /// One web client feeding one load balancer, which spreads the load over `servers` web
    /// servers.
    pub fn load_balanced(config: SimConfig, servers: usize) -> Self {
        let model = Self::new(config);

        let client = model.add_source("web client");
        let lb = model.add_distributor("load balancer");
        client.add_consumer(&lb);
        for n in 1..=servers {
            let server = model.add_sink(format!("web server {n}"));
            lb.add_consumer(&server);
        }

        model
    }

    /// The settings new components are created with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, name: String, role: Role) -> ComponentHandle {
        let mut registry = self.registry();

        let id = ComponentId(registry.next_id);
        registry.next_id += 1;

        debug!(component = %id, %name, kind = %role.kind(), "Registering component");

        let handle = ComponentHandle::new(id, name, role);
        registry.order.push(handle.clone());
        registry.by_id.insert(id, handle.clone());
        handle
    }

    /// Add a source, tuned with the configured defaults.
    pub fn add_source(&self, name: impl Into<String>) -> ComponentHandle {
        let config = &self.config;
        let source = Source::new(config.rate, config.multiplier, config.unit_size)
            .expect("config values are validated on construction");
        self.register(name.into(), Role::Source(source))
    }

    /// Add a distributor, bounded if the configuration says so.
    pub fn add_distributor(&self, name: impl Into<String>) -> ComponentHandle {
        let distributor = Distributor::new(self.config.pending_capacity);
        self.register(name.into(), Role::Distributor(distributor))
    }

    /// Add a sink, tuned with the configured defaults.
    pub fn add_sink(&self, name: impl Into<String>) -> ComponentHandle {
        let sink = Sink::new(self.config.thread_count, self.config.latency_ms)
            .expect("config values are validated on construction");
        self.register(name.into(), Role::Sink(sink))
    }

    /// Look up a component.
    pub fn get(&self, id: ComponentId) -> SimResult<ComponentHandle> {
        self.registry()
            .by_id
            .get(&id)
            .cloned()
            .ok_or(SimError::UnknownComponent(id))
    }

    /// Make `to` a consumer of `from`.
    pub fn attach(&self, from: ComponentId, to: ComponentId) -> SimResult<()> {
        let from = self.get(from)?;
        let to = self.get(to)?;
        from.add_consumer(&to);
        Ok(())
    }

    /// Every component, in registration order.
    pub fn components(&self) -> Vec<ComponentHandle> {
        self.registry().order.clone()
    }

    /// A read-only view of every component, in registration order.
    pub fn snapshot(&self) -> Vec<ComponentSnapshot> {
        self.components()
            .iter()
            .map(ComponentHandle::snapshot)
            .collect()
    }

    /// Advance every component once, in registration order.
    ///
    /// A component that fails or panics is logged and recorded in the report. The rest still
    /// advance.
    pub fn advance_all(&self, duration: Duration) -> TickReport {
        let components = self.components();
        let mut report = TickReport::default();

        for component in &components {
            let result = panic::catch_unwind(AssertUnwindSafe(|| component.advance(duration)))
                .unwrap_or(Err(SimError::Panicked {
                    component: component.id(),
                }));

            if let Err(error) = result {
                warn!(component = %component.id(), "Component failed to advance: {error}");
                report.failures.push(ComponentFailure {
                    component: component.id(),
                    error,
                });
            }
            report.advanced += 1;
        }

        report
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
