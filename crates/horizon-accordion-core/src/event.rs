//! DOM-style events dispatched through the document tree.

use std::fmt;
use std::sync::Arc;

use crate::document::{Document, NodeId};

/// The type of a dispatched event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A primary-button click.
    Click,
    /// An application defined event.
    Custom(String),
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// An event travelling from its target up to the document root.
#[derive(Debug, Clone)]
pub struct Event {
    event_type: EventType,
    target: NodeId,
    current_target: NodeId,
    propagation_stopped: bool,
}

impl Event {
    pub(crate) fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            propagation_stopped: false,
        }
    }

    /// The event type.
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// The node the event was dispatched to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// The node whose listeners are currently running.
    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = node;
    }

    /// Stop the event from bubbling past the current node.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Whether [`stop_propagation`](Self::stop_propagation) was called.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// A unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    /// Get the raw u64 value of this listener ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A listener callback.
///
/// Listeners receive the document mutably so they can drive widget state.
pub type Listener = Arc<dyn Fn(&mut Document, &mut Event) + Send + Sync>;

/// A listener registered on a node.
#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub(crate) id: ListenerId,
    pub(crate) event_type: EventType,
    pub(crate) listener: Listener,
}
