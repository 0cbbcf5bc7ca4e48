//! Errors.

use thiserror::Error;

use crate::{attribute::AttributeKind, component::ComponentId};

/// An error raised by the simulation core.
///
/// All errors are local to the component or call that produced them. The tick loop logs them and
/// keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SimError {
    /// An argument was outside of its domain, e.g. splitting a batch zero ways or setting a
    /// tunable that must be positive to zero.
    #[error("Invalid {what}: {reason}")]
    InvalidArgument {
        /// The argument or attribute that was rejected.
        what: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A textual attribute value could not be converted to the attribute's type.
    #[error("Cannot set '{attribute}' to {value:?}: expected {expected}")]
    TypeCoercionFailure {
        /// The attribute being set.
        attribute: String,
        /// The raw value that was given.
        value: String,
        /// The type the attribute expects.
        expected: AttributeKind,
    },

    /// The component has no attribute with this name.
    #[error("Component {component} has no attribute '{attribute}'")]
    UnknownAttribute {
        /// The component that was asked.
        component: ComponentId,
        /// The attribute name that was not recognised.
        attribute: String,
    },

    /// No component is registered with this ID.
    #[error("No component registered as {0}")]
    UnknownComponent(ComponentId),

    /// A bounded distributor was full, so the incoming batch was dropped.
    ///
    /// Only possible when the distributor was configured with a queue capacity.
    #[error("Pending queue of {component} is full (capacity {capacity}), batch dropped")]
    QueueOverflow {
        /// The distributor that rejected the batch.
        component: ComponentId,
        /// Its configured capacity, in batches.
        capacity: usize,
    },

    /// An attach gesture was started while another one was still in progress.
    #[error("Already attaching a consumer to {from}")]
    AttachInProgress {
        /// The component the in-progress gesture started from.
        from: ComponentId,
    },

    /// The component panicked while advancing.
    #[error("Component {component} panicked while advancing")]
    Panicked {
        /// The component that panicked.
        component: ComponentId,
    },
}

/// Result type for simulation operations.
pub type SimResult<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn invalid(what: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidArgument {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
