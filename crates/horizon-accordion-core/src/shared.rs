//! Thread-safe access to a [`Document`].

use parking_lot::RwLock;

use crate::document::{Document, DocumentConfig, NodeId};
use crate::error::DomResult;

/// A [`Document`] behind a read-write lock.
///
/// Widget callbacks always run with the write lock held, so they must use the
/// `&mut Document` they are handed rather than locking again.
///
/// # Example
///
/// ```
/// use horizon_accordion_core::SharedDocument;
///
/// let shared = SharedDocument::new();
/// let panel = shared.with_write(|doc| {
///     let panel = doc.create_element("div");
///     doc.append_child(doc.root(), panel).map(|_| panel)
/// }).unwrap();
/// assert!(shared.with_read(|doc| doc.is_connected(panel)));
/// ```
#[derive(Debug, Default)]
pub struct SharedDocument {
    inner: RwLock<Document>,
}

impl SharedDocument {
    /// Create a shared, empty document.
    pub fn new() -> Self {
        Self::from_document(Document::new())
    }

    /// Create a shared, empty document with layout parameters.
    pub fn with_config(config: DocumentConfig) -> Self {
        Self::from_document(Document::with_config(config))
    }

    /// Wrap an existing document.
    pub fn from_document(document: Document) -> Self {
        Self {
            inner: RwLock::new(document),
        }
    }

    /// Check if a node exists.
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.read().contains(node)
    }

    /// Get the children of a node (returns owned Vec for thread safety).
    pub fn children(&self, node: NodeId) -> DomResult<Vec<NodeId>> {
        self.inner.read().children(node).map(<[NodeId]>::to_vec)
    }

    /// Dispatch a click.
    pub fn click(&self, node: NodeId) -> DomResult<()> {
        self.inner.write().click(node)
    }

    /// Render one frame, returning the number of callbacks run.
    pub fn render_frame(&self) -> usize {
        self.inner.write().render_frame()
    }

    /// Execute a function with read access to the document.
    pub fn with_read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        f(&self.inner.read())
    }

    /// Execute a function with write access to the document.
    pub fn with_write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Document) -> R,
    {
        f(&mut self.inner.write())
    }

    /// Unwrap the document.
    pub fn into_inner(self) -> Document {
        self.inner.into_inner()
    }
}

static_assertions::assert_impl_all!(SharedDocument: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_shared_across_threads() {
        let shared = Arc::new(SharedDocument::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    shared.with_write(|doc| {
                        let node = doc.create_element("div");
                        let root = doc.root();
                        doc.append_child(root, node).unwrap();
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let root = shared.with_read(|doc| doc.root());
        assert_eq!(shared.children(root).unwrap().len(), 4);
        let shared = Arc::try_unwrap(shared).ok().unwrap();
        assert_eq!(shared.into_inner().node_count(), 5);
    }

    #[test]
    fn test_frames_through_lock() {
        let shared = SharedDocument::new();
        shared.with_write(|doc| {
            doc.request_animation_frame(|_| {});
        });
        assert_eq!(shared.render_frame(), 1);
        assert_eq!(shared.render_frame(), 0);
    }
}
