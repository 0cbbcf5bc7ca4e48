use sysmodel::{ComponentHandle, Model, SimConfig};

/// A client feeding a load balancer in front of some servers.
pub struct Diagram {
    pub model: Model,
    pub client: ComponentHandle,
    pub lb: ComponentHandle,
    pub servers: Vec<ComponentHandle>,
}

impl Diagram {
    pub fn new(config: SimConfig, servers: usize) -> Self {
        let model = Model::load_balanced(config, servers);

        let mut components = model.components().into_iter();
        let client = components.next().expect("should have a client");
        let lb = components.next().expect("should have a load balancer");
        let servers = components.collect();

        Self {
            model,
            client,
            lb,
            servers,
        }
    }

    pub fn succeeded(&self) -> Vec<f64> {
        self.servers
            .iter()
            .map(|s| s.succeeded_total().expect("servers are sinks"))
            .collect()
    }

    pub fn failed(&self) -> Vec<f64> {
        self.servers
            .iter()
            .map(|s| s.failed_total().expect("servers are sinks"))
            .collect()
    }
}
