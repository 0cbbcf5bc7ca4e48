//! Simulate events flowing through a toy queueing network, one tick at a time.
//!
//! A diagram is made of components. Sources (e.g. web clients) generate a batch of events every
//! tick. Distributors (e.g. load balancers) buffer what they receive and split it evenly across
//! their consumers. Sinks (e.g. web servers) process as much as their capacity allows and count
//! the rest as failures.
//!
//! A [`Clock`] runs in the background. Every tick it advances each component of a [`Model`] in
//! the order they were registered. Meanwhile an interaction surface can rewire components,
//! retune their attributes and read their counters through a [`Session`] or
//! [`ComponentHandle`]s.
//!
//! See the README for an example.

#![deny(missing_docs)]

#[cfg(doctest)]
use doc_comment::doctest;
#[cfg(doctest)]
doctest!("../README.md");

pub mod attribute;
mod clock;
mod component;
mod config;
pub mod error;
mod event_batch;
mod model;
mod roles;
pub mod session;

pub use attribute::{Attribute, AttributeKind, AttributeValue};
pub use clock::{Clock, ClockHandle};
pub use component::{ComponentHandle, ComponentId, ComponentSnapshot, Counters};
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use event_batch::EventBatch;
pub use model::{ComponentFailure, Model, TickReport};
pub use roles::RoleKind;
pub use session::Session;
