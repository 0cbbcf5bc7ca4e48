//! State for the interaction surface driving a [`Model`].
//!
//! The presentation layer owns one [`Session`] and routes user gestures through it. Wiring two
//! components together is a two-step gesture: start attaching from one component, then select the
//! consumer. Attribute edits are staged in an [`AttributeEditor`] and applied together on save.

use tracing::debug;

use crate::{
    component::{ComponentHandle, ComponentId},
    error::{SimError, SimResult},
    model::Model,
};

/// What the session is in the middle of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No gesture in progress. Selecting a component just selects it.
    #[default]
    Idle,
    /// Waiting for the consumer to attach to `from`.
    AttachingConsumer {
        /// The component that will gain a consumer.
        from: ComponentId,
    },
}

/// The result of selecting a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Nothing was in progress, so the component was simply selected.
    Selected(ComponentId),
    /// An attach gesture completed.
    Attached {
        /// The component that gained a consumer.
        from: ComponentId,
        /// The new consumer.
        to: ComponentId,
    },
}

/// One user's interaction state.
#[derive(Debug, Clone)]
pub struct Session {
    model: Model,
    mode: Mode,
}

/// Attribute edits for one component, staged until saved.
///
/// Dropping the editor discards the staged edits.
#[derive(Debug)]
pub struct AttributeEditor {
    component: ComponentHandle,
    staged: Vec<(String, String)>,
}

impl Session {
    /// Start an idle session over `model`.
    pub fn new(model: Model) -> Self {
        Self {
            model,
            mode: Mode::Idle,
        }
    }

    /// The model this session edits.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Start attaching a consumer to `from`.
    pub fn begin_attach(&mut self, from: ComponentId) -> SimResult<()> {
        if let Mode::AttachingConsumer { from: current } = self.mode {
            return Err(SimError::AttachInProgress { from: current });
        }
        self.model.get(from)?;

        debug!(%from, "Attach started");
        self.mode = Mode::AttachingConsumer { from };
        Ok(())
    }

    /// Select a component, completing an attach gesture if one is in progress.
    ///
    /// If the component doesn't exist, the session stays in its current mode.
    pub fn select(&mut self, target: ComponentId) -> SimResult<Selection> {
        match self.mode {
            Mode::Idle => {
                self.model.get(target)?;
                Ok(Selection::Selected(target))
            }
            Mode::AttachingConsumer { from } => {
                self.model.attach(from, target)?;

                debug!(%from, to = %target, "Attach finished");
                self.mode = Mode::Idle;
                Ok(Selection::Attached { from, to: target })
            }
        }
    }

    /// Abandon any gesture in progress.
    pub fn cancel(&mut self) {
        if self.mode != Mode::Idle {
            debug!(mode = ?self.mode, "Gesture cancelled");
        }
        self.mode = Mode::Idle;
    }

    /// Open an editor for a component's attributes.
    pub fn edit(&self, id: ComponentId) -> SimResult<AttributeEditor> {
        Ok(AttributeEditor {
            component: self.model.get(id)?,
            staged: Vec::new(),
        })
    }
}

impl AttributeEditor {
    /// The component being edited.
    pub fn component(&self) -> &ComponentHandle {
        &self.component
    }

    /// Stage a textual value. Staging the same attribute again replaces the earlier value.
    pub fn stage(&mut self, name: impl Into<String>, raw: impl Into<String>) -> &mut Self {
        let name = name.into();
        let raw = raw.into();
        match self.staged.iter_mut().find(|(staged, _)| *staged == name) {
            Some(entry) => entry.1 = raw,
            None => self.staged.push((name, raw)),
        }
        self
    }

    /// The staged edits, in the order first staged.
    pub fn staged(&self) -> &[(String, String)] {
        &self.staged
    }

    /// Apply every staged edit, or none of them if any fails to coerce.
    pub fn save(self) -> SimResult<()> {
        self.component.set_attributes(&self.staged)
    }
}
