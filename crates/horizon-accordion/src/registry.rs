//! Document-wide registry of accordions.

use horizon_accordion_core::{Document, NodeId};
use slotmap::SecondaryMap;

/// Ordered list of the accordions known to a document.
///
/// Accordions register when constructed and again whenever they are
/// re-attached, and unregister when detached, so the registry only outlives
/// its entries for nodes that were built but never inserted. It lives in the
/// document as an extension and is created on first registration.
///
/// Entries are ordered by *first* registration: a node that is detached and
/// registered again (for example when it moves) returns to its old place.
#[derive(Debug, Default, Clone)]
pub struct AccordionRegistry {
    entries: Vec<NodeId>,
    ranks: SecondaryMap<NodeId, u64>,
    next_rank: u64,
}

impl AccordionRegistry {
    /// Get the registry of a document, if any accordion ever registered.
    pub fn of(doc: &Document) -> Option<&Self> {
        doc.extension::<Self>()
    }

    /// Register `node` in `doc`, creating the registry if needed.
    pub(crate) fn register_in(doc: &mut Document, node: NodeId) {
        if doc.extension_or_default::<Self>().register(node) {
            tracing::trace!(target: crate::targets::REGISTRY, ?node, "registered accordion");
        }
    }

    /// Remove `node` from the registry of `doc`.
    pub(crate) fn unregister_in(doc: &mut Document, node: NodeId) {
        let removed = doc
            .extension_mut::<Self>()
            .is_some_and(|registry| registry.unregister(node));
        if removed {
            tracing::trace!(target: crate::targets::REGISTRY, ?node, "unregistered accordion");
        }
    }

    /// Add `node` unless already present. Returns whether it was added.
    pub fn register(&mut self, node: NodeId) -> bool {
        if self.contains(node) {
            return false;
        }
        let rank = match self.ranks.get(node) {
            Some(&rank) => rank,
            None => {
                let rank = self.next_rank;
                self.next_rank += 1;
                self.ranks.insert(node, rank);
                rank
            }
        };
        let ranks = &self.ranks;
        let at = self
            .entries
            .partition_point(|&entry| ranks.get(entry).is_some_and(|&other| other < rank));
        self.entries.insert(at, node);
        true
    }

    /// Remove `node`. Returns whether it was present.
    pub fn unregister(&mut self, node: NodeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|&entry| entry != node);
        self.entries.len() != before
    }

    /// Check if `node` is registered.
    pub fn contains(&self, node: NodeId) -> bool {
        self.entries.contains(&node)
    }

    /// Registered nodes in order of first registration.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().copied()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
