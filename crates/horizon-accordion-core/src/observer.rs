//! Mutation observers.
//!
//! Observers watch a node (optionally with its whole subtree) for child-list
//! changes. Records are queued as mutations happen and delivered in batches,
//! in observer creation order, when the document performs a microtask
//! checkpoint ([`Document::perform_microtask_checkpoint`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::{Document, NodeId};

/// A unique identifier for a mutation observer.
///
/// IDs increase monotonically, so ordering by ID is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Get the raw u64 value of this observer ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Which mutations an observer is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserveOptions {
    /// Report children being added or removed.
    pub child_list: bool,
    /// Extend observation to every descendant of the target.
    pub subtree: bool,
}

impl ObserveOptions {
    /// Child-list changes anywhere in the target's subtree.
    pub fn subtree_child_list() -> Self {
        Self {
            child_list: true,
            subtree: true,
        }
    }
}

/// The kind of a recorded mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added or removed.
    ChildList,
}

/// A single recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// What changed.
    pub kind: MutationKind,
    /// The node whose children changed.
    pub target: NodeId,
    /// Nodes that were inserted.
    pub added: Vec<NodeId>,
    /// Nodes that were removed.
    pub removed: Vec<NodeId>,
}

/// Observer callback, invoked with the batch of records gathered since the
/// last delivery.
pub type MutationCallback = Arc<dyn Fn(&mut Document, ObserverId, &[MutationRecord]) + Send + Sync>;

struct Observer {
    target: NodeId,
    options: ObserveOptions,
    callback: MutationCallback,
    pending: Vec<MutationRecord>,
}

/// All observers of one document.
#[derive(Default)]
pub(crate) struct MutationObservers {
    observers: BTreeMap<ObserverId, Observer>,
    next_id: u64,
}

impl MutationObservers {
    pub(crate) fn add(
        &mut self,
        target: NodeId,
        options: ObserveOptions,
        callback: MutationCallback,
    ) -> ObserverId {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        self.observers.insert(
            id,
            Observer {
                target,
                options,
                callback,
                pending: Vec::new(),
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        self.observers.remove(&id).is_some()
    }

    pub(crate) fn contains(&self, id: ObserverId) -> bool {
        self.observers.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Drop observers whose target fails `keep`.
    pub(crate) fn retain(&mut self, keep: impl Fn(NodeId) -> bool) {
        self.observers.retain(|_, o| keep(o.target));
    }

    /// Queue `record` on every observer interested in it.
    ///
    /// `is_in_subtree(root)` must report whether the record's target lies
    /// inside `root`'s subtree.
    pub(crate) fn queue(&mut self, record: &MutationRecord, is_in_subtree: impl Fn(NodeId) -> bool) {
        for observer in self.observers.values_mut() {
            if !observer.options.child_list {
                continue;
            }
            let interested = observer.target == record.target
                || (observer.options.subtree && is_in_subtree(observer.target));
            if interested {
                observer.pending.push(record.clone());
            }
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        self.observers.values().any(|o| !o.pending.is_empty())
    }

    /// Take every pending batch, in observer creation order.
    pub(crate) fn take_pending(&mut self) -> Vec<(ObserverId, MutationCallback, Vec<MutationRecord>)> {
        self.observers
            .iter_mut()
            .filter(|(_, o)| !o.pending.is_empty())
            .map(|(&id, o)| (id, Arc::clone(&o.callback), std::mem::take(&mut o.pending)))
            .collect()
    }
}
