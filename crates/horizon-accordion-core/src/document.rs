//! Document model for Horizon Accordion.
//!
//! Provides the retained element tree that widgets are built on:
//! - Stable node identifiers via arena-based storage
//! - Ordered parent-child relationships with cycle checks
//! - Attributes, class lists and inline style per element
//! - A block layout model (heights only) for measuring content
//! - Custom element state and lifecycle reactions
//! - Event dispatch, mutation observers and frame callbacks
//!
//! # Key Types
//!
//! - [`Document`] - Owns every node and the services attached to the tree
//! - [`NodeId`] - Unique stable identifier for each node
//! - [`NodeKind`] - Whether a node is the root, an element or text
//! - [`DocumentConfig`] - Layout parameters
//!
//! # Layout
//!
//! Nodes stack vertically. A node's *natural* height ([`Document::scroll_height`])
//! is its intrinsic height plus the rendered heights of its children, ignoring
//! any explicit height on the node itself. Its *rendered* height
//! ([`Document::offset_height`]) is the explicit pixel height when one is set
//! and the natural height otherwise. Text nodes are one line height per line.
//!
//! # Example
//!
//! ```
//! use horizon_accordion_core::{Document, Length};
//!
//! let mut doc = Document::new();
//! let panel = doc.create_element("div");
//! let text = doc.create_text("hello\nworld");
//! doc.append_child(panel, text).unwrap();
//! doc.append_child(doc.root(), panel).unwrap();
//!
//! assert_eq!(doc.scroll_height(panel).unwrap(), 40.0);
//! doc.set_height(panel, Length::Px(0.0)).unwrap();
//! assert_eq!(doc.offset_height(panel).unwrap(), 0.0);
//! assert_eq!(doc.scroll_height(panel).unwrap(), 40.0);
//! ```

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use slotmap::{SlotMap, new_key_type};

use crate::element::{
    CustomElement, CustomElementRegistry, Element, ElementDefinition, element_cast,
    element_cast_mut,
};
use crate::error::{DomError, DomResult};
use crate::event::{Event, EventType, Listener, ListenerEntry, ListenerId};
use crate::logging::targets;
use crate::observer::{
    MutationCallback, MutationKind, MutationObservers, MutationRecord, ObserveOptions, ObserverId,
};
use crate::scheduler::{FrameCallbackId, FrameScheduler};
use crate::style::{InlineStyle, Length};

new_key_type! {
    /// A unique identifier for a node in a [`Document`].
    ///
    /// `NodeId`s stay valid while the node moves around the tree and become
    /// invalid when the node is destroyed. Holding one never keeps a node
    /// alive, which makes it suitable for back references.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// Default height of one line of text, in pixels.
pub const DEFAULT_LINE_HEIGHT: f32 = 20.0;

/// Upper bound on frames rendered by [`Document::run_until_idle`].
const MAX_IDLE_FRAMES: u64 = 1000;

/// Layout parameters for a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentConfig {
    /// Height of one line of text.
    pub line_height: f32,
}

impl DocumentConfig {
    /// Set the line height.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root.
    Document,
    /// An element with a (lowercase) tag name.
    Element {
        /// The tag name.
        tag: String,
    },
    /// A run of text.
    Text {
        /// The text content.
        text: String,
    },
}

/// Internal data stored in the arena for each node.
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: InlineStyle,
    /// Height of the node's own content, excluding children.
    intrinsic_height: f32,
    /// Custom element state, once upgraded.
    element: Option<Box<dyn Element>>,
    listeners: Vec<ListenerEntry>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            style: InlineStyle::default(),
            intrinsic_height: 0.0,
            element: None,
            listeners: Vec::new(),
        }
    }

    fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }
}

/// A pending custom element lifecycle callback.
#[derive(Debug, Clone, Copy)]
enum Reaction {
    Connected(NodeId),
    Disconnected(NodeId),
}

/// The element tree and the services attached to it.
///
/// All mutation goes through `&mut Document`; widget callbacks (reactions,
/// listeners, observers, frame callbacks) receive the document mutably so
/// they can update other nodes.
///
/// # Related Types
///
/// - [`SharedDocument`](crate::SharedDocument) - Lock-protected wrapper
/// - [`CustomElement`] - Widgets hosted by the document
/// - [`DocumentTreeDebug`](crate::DocumentTreeDebug) - Tree dumps
pub struct Document {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    config: DocumentConfig,
    definitions: CustomElementRegistry,
    reactions: VecDeque<Reaction>,
    processing_reactions: bool,
    observers: MutationObservers,
    frames: FrameScheduler,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    next_listener_id: u64,
}

impl Document {
    /// Create an empty document with default layout parameters.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create an empty document.
    pub fn with_config(config: DocumentConfig) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(NodeKind::Document));
        Self {
            nodes,
            root,
            config,
            definitions: CustomElementRegistry::new(),
            reactions: VecDeque::new(),
            processing_reactions: false,
            observers: MutationObservers::default(),
            frames: FrameScheduler::default(),
            extensions: HashMap::new(),
            next_listener_id: 0,
        }
    }

    /// The layout parameters.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// The document root. Nodes reachable from it are *connected*.
    pub fn root(&self) -> NodeId {
        self.root
    }

    // =========================================================================
    // Node Creation & Inspection
    // =========================================================================

    /// Create a detached element. Tag names are lowercased.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        let tag = tag.into().to_ascii_lowercase();
        let id = self.nodes.insert(NodeData::new(NodeKind::Element { tag }));
        tracing::trace!(target: targets::DOCUMENT, ?id, "created element");
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes
            .insert(NodeData::new(NodeKind::Text { text: text.into() }))
    }

    /// Check if a node exists.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of live nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// What kind of node this is.
    pub fn kind(&self, node: NodeId) -> DomResult<&NodeKind> {
        self.data(node).map(|d| &d.kind)
    }

    /// The tag name, if the node is an element.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).and_then(NodeData::tag)
    }

    /// Check if the node is an element.
    pub fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    fn data(&self, node: NodeId) -> DomResult<&NodeData> {
        self.nodes.get(node).ok_or(DomError::InvalidNode)
    }

    fn data_mut(&mut self, node: NodeId) -> DomResult<&mut NodeData> {
        self.nodes.get_mut(node).ok_or(DomError::InvalidNode)
    }

    fn element_data_mut(&mut self, node: NodeId) -> DomResult<&mut NodeData> {
        let data = self.data_mut(node)?;
        if data.tag().is_none() {
            return Err(DomError::invalid_state("only elements carry attributes and classes"));
        }
        Ok(data)
    }

    // =========================================================================
    // Tree Traversal
    // =========================================================================

    /// Get the parent of a node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|d| d.parent)
    }

    /// Get the children of a node.
    pub fn children(&self, node: NodeId) -> DomResult<&[NodeId]> {
        self.data(node).map(|d| d.children.as_slice())
    }

    /// Get all ancestors from immediate parent to root.
    ///
    /// Returns an empty list for detached or invalid nodes.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(node);
        while let Some(id) = current {
            result.push(id);
            current = self.parent(id);
        }
        result
    }

    /// Get every descendant in depth-first pre-order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if let Some(data) = self.nodes.get(node) {
            let mut stack: Vec<NodeId> = data.children.iter().rev().copied().collect();
            while let Some(id) = stack.pop() {
                result.push(id);
                if let Some(child) = self.nodes.get(id) {
                    stack.extend(child.children.iter().rev().copied());
                }
            }
        }
        result
    }

    /// Get every descendant carrying element state of type `T`, in tree order.
    pub fn descendants_of_type<T: Element>(&self, node: NodeId) -> Vec<NodeId> {
        self.descendants(node)
            .into_iter()
            .filter(|&id| self.element::<T>(id).is_some())
            .collect()
    }

    /// Check if `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        is_inclusive_ancestor_in(&self.nodes, ancestor, node)
    }

    /// Check if a node is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(node) && self.is_inclusive_ancestor(self.root, node)
    }

    /// Direct element children that have `class`.
    pub fn child_elements_with_class(&self, node: NodeId, class: &str) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .map(|data| {
                data.children
                    .iter()
                    .copied()
                    .filter(|&child| self.has_class(child, class))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Connected elements with the given tag, in document order.
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.tag_name(id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    // =========================================================================
    // Tree Mutation
    // =========================================================================

    /// Append `child` as the last child of `parent`, moving it if needed.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    ///
    /// Moving an already attached node is a removal followed by an insertion:
    /// both mutations are recorded and both lifecycle reactions run.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        self.validate_insertion(parent, child, reference)?;
        if reference == Some(child) {
            return Ok(());
        }

        self.detach_from_parent(child);

        let siblings = &self.data(parent)?.children;
        let index = match reference {
            Some(reference) => siblings
                .iter()
                .position(|&c| c == reference)
                .ok_or(DomError::NotFound)?,
            None => siblings.len(),
        };
        self.data_mut(parent)?.children.insert(index, child);
        self.data_mut(child)?.parent = Some(parent);
        self.record_child_list(parent, vec![child], Vec::new());

        if self.is_connected(child) {
            self.enqueue_connected(child);
        }
        self.process_reactions();
        Ok(())
    }

    /// Check that `child` could be appended to `parent` without changing
    /// anything. Returns the error [`append_child`](Self::append_child) would.
    pub fn check_insertion(&self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.validate_insertion(parent, child, None)
    }

    fn validate_insertion(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        let parent_data = self.data(parent)?;
        self.data(child)?;
        if matches!(parent_data.kind, NodeKind::Text { .. }) {
            return Err(DomError::hierarchy("text nodes cannot have children"));
        }
        if child == self.root {
            return Err(DomError::hierarchy("the document root cannot be inserted"));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::hierarchy("insertion would create a cycle"));
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotFound);
            }
        }
        Ok(())
    }

    /// Remove `child` from its current parent, if any.
    fn detach_from_parent(&mut self, child: NodeId) {
        let Some(old_parent) = self.parent(child) else {
            return;
        };
        if self.is_connected(child) {
            self.enqueue_disconnected(child);
        }
        if let Some(parent_data) = self.nodes.get_mut(old_parent) {
            parent_data.children.retain(|&c| c != child);
        }
        if let Some(child_data) = self.nodes.get_mut(child) {
            child_data.parent = None;
        }
        self.record_child_list(old_parent, Vec::new(), vec![child]);
    }

    /// Remove `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        self.data(parent)?;
        self.data(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound);
        }
        self.detach_from_parent(child);
        self.process_reactions();
        Ok(())
    }

    /// Remove a node from its parent. Detached nodes are left alone.
    pub fn remove(&mut self, node: NodeId) -> DomResult<()> {
        if node == self.root {
            return Err(DomError::hierarchy("the document root cannot be removed"));
        }
        self.data(node)?;
        self.detach_from_parent(node);
        self.process_reactions();
        Ok(())
    }

    /// Remove every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) -> DomResult<()> {
        let children = self.children(node)?.to_vec();
        for child in children {
            self.detach_from_parent(child);
        }
        self.process_reactions();
        Ok(())
    }

    /// Detach a node and delete it, with its whole subtree, from the arena.
    ///
    /// Disconnected reactions run before the nodes are deleted.
    pub fn destroy(&mut self, node: NodeId) -> DomResult<()> {
        if node == self.root {
            return Err(DomError::hierarchy("the document root cannot be destroyed"));
        }
        self.data(node)?;
        self.detach_from_parent(node);
        self.process_reactions();

        let mut doomed = self.descendants(node);
        doomed.push(node);
        tracing::trace!(target: targets::DOCUMENT, ?node, count = doomed.len(), "destroying subtree");
        for id in doomed {
            self.nodes.remove(id);
        }
        let nodes = &self.nodes;
        self.observers.retain(|target| nodes.contains_key(target));
        Ok(())
    }

    // =========================================================================
    // Attributes, Classes & Text
    // =========================================================================

    /// Get an attribute value.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|d| d.attributes.get(name))
            .map(String::as_str)
    }

    /// Set an attribute value.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let data = self.element_data_mut(node)?;
        data.attributes.insert(name.into(), value.into());
        Ok(())
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> DomResult<Option<String>> {
        let data = self.element_data_mut(node)?;
        Ok(data.attributes.remove(name))
    }

    /// Check if an attribute is present (presence-based flags).
    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    /// All attributes of a node, ordered by name.
    pub fn attributes(&self, node: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.nodes
            .get(node)
            .into_iter()
            .flat_map(|d| d.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Read a `data-*` attribute by dataset key (`isOpen` reads `data-is-open`).
    pub fn dataset(&self, node: NodeId, key: &str) -> Option<String> {
        self.attribute(node, &dataset_attribute_name(key))
            .map(str::to_string)
    }

    /// Write a `data-*` attribute by dataset key.
    pub fn set_dataset(
        &mut self,
        node: NodeId,
        key: &str,
        value: impl Into<String>,
    ) -> DomResult<()> {
        self.set_attribute(node, dataset_attribute_name(key), value)
    }

    /// The class list of a node.
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.nodes
            .get(node)
            .map(|d| d.classes.as_slice())
            .unwrap_or_default()
    }

    /// Check if a node has a class.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).iter().any(|c| c == class)
    }

    /// Add a class if not already present.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> DomResult<()> {
        let data = self.element_data_mut(node)?;
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Remove a class, returning whether it was present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> DomResult<bool> {
        let data = self.element_data_mut(node)?;
        let before = data.classes.len();
        data.classes.retain(|c| c != class);
        Ok(data.classes.len() != before)
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text { text }) = self.nodes.get(node).map(|d| &d.kind) {
            out.push_str(text);
        }
        for id in self.descendants(node) {
            if let Some(NodeKind::Text { text }) = self.nodes.get(id).map(|d| &d.kind) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the children of `node` with a single text node.
    ///
    /// An empty string leaves the node without children.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> DomResult<()> {
        if let NodeKind::Text { text: current } = &mut self.data_mut(node)?.kind {
            *current = text.to_string();
            return Ok(());
        }
        self.clear_children(node)?;
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node)?;
        }
        Ok(())
    }

    // =========================================================================
    // Style & Layout
    // =========================================================================

    /// The inline style of a node.
    pub fn style(&self, node: NodeId) -> DomResult<&InlineStyle> {
        self.data(node).map(|d| &d.style)
    }

    /// Set the explicit height.
    pub fn set_height(&mut self, node: NodeId, height: Length) -> DomResult<()> {
        self.data_mut(node)?.style.height = height;
        Ok(())
    }

    /// Set or clear the height transition.
    pub fn set_transition(&mut self, node: NodeId, transition: Option<String>) -> DomResult<()> {
        self.data_mut(node)?.style.transition = transition;
        Ok(())
    }

    /// Set the height of a node's own content, excluding its children.
    pub fn set_intrinsic_height(&mut self, node: NodeId, height: f32) -> DomResult<()> {
        self.data_mut(node)?.intrinsic_height = height.max(0.0);
        Ok(())
    }

    /// The natural (content driven) height of a node.
    ///
    /// The node's own explicit height is ignored; children contribute their
    /// rendered heights.
    pub fn scroll_height(&self, node: NodeId) -> DomResult<f32> {
        let data = self.data(node)?;
        Ok(match &data.kind {
            NodeKind::Text { text } => self.text_height(text),
            _ => {
                data.intrinsic_height
                    + data
                        .children
                        .iter()
                        .map(|&child| self.offset_height(child).unwrap_or(0.0))
                        .sum::<f32>()
            }
        })
    }

    /// The rendered height of a node.
    pub fn offset_height(&self, node: NodeId) -> DomResult<f32> {
        match self.data(node)?.style.height {
            Length::Px(height) => Ok(height.max(0.0)),
            Length::Auto => self.scroll_height(node),
        }
    }

    fn text_height(&self, text: &str) -> f32 {
        text.lines().count() as f32 * self.config.line_height
    }

    // =========================================================================
    // Custom Elements
    // =========================================================================

    /// The custom element definitions of this document.
    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.definitions
    }

    /// Define a custom element type and upgrade matching connected nodes.
    pub fn define_element<T: CustomElement>(&mut self) -> DomResult<()> {
        self.define(ElementDefinition::of::<T>())
    }

    /// Register a definition and upgrade matching connected nodes.
    pub fn define(&mut self, definition: ElementDefinition) -> DomResult<()> {
        self.definitions.define(definition)?;
        tracing::debug!(target: targets::ELEMENT, tag = definition.tag, type_name = definition.type_name, "defined custom element");

        let candidates = self.elements_by_tag(definition.tag);
        for id in candidates {
            self.reactions.push_back(Reaction::Connected(id));
        }
        self.process_reactions();
        Ok(())
    }

    /// Construct element state for a defined, not yet upgraded node.
    ///
    /// Returns `false` if the node was already upgraded or its tag is not
    /// defined.
    pub fn upgrade(&mut self, node: NodeId) -> DomResult<bool> {
        if self.data(node)?.element.is_some() {
            return Ok(false);
        }
        let Some(definition) = self.definition_for(node) else {
            return Ok(false);
        };
        let element = (definition.construct)(self, node);
        let data = self.data_mut(node)?;
        if data.element.is_some() {
            return Ok(false);
        }
        data.element = Some(element);
        tracing::debug!(target: targets::ELEMENT, ?node, tag = definition.tag, "upgraded custom element");
        Ok(true)
    }

    /// Attach element state to a node directly (programmatic construction).
    pub fn set_element<T: Element>(&mut self, node: NodeId, element: T) -> DomResult<()> {
        self.element_data_mut(node)?.element = Some(Box::new(element));
        Ok(())
    }

    /// Downcast a node's element state.
    pub fn element<T: Element>(&self, node: NodeId) -> Option<&T> {
        self.nodes
            .get(node)?
            .element
            .as_deref()
            .and_then(|e| element_cast::<T>(e))
    }

    /// Mutably downcast a node's element state.
    pub fn element_mut<T: Element>(&mut self, node: NodeId) -> Option<&mut T> {
        self.nodes
            .get_mut(node)?
            .element
            .as_deref_mut()
            .and_then(|e| element_cast_mut::<T>(e))
    }

    /// Check if a node carries custom element state.
    pub fn has_element_state(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|d| d.element.is_some())
    }

    /// The debug summary of a node's element state.
    pub fn element_summary(&self, node: NodeId) -> Option<String> {
        self.nodes
            .get(node)?
            .element
            .as_deref()
            .and_then(|element| element.debug_summary())
    }

    fn definition_for(&self, node: NodeId) -> Option<ElementDefinition> {
        let tag = self.tag_name(node)?;
        self.definitions.get(tag).copied()
    }

    fn enqueue_connected(&mut self, subtree: NodeId) {
        let mut nodes = vec![subtree];
        nodes.extend(self.descendants(subtree));
        for id in nodes {
            if self.definition_for(id).is_some() {
                self.reactions.push_back(Reaction::Connected(id));
            }
        }
    }

    fn enqueue_disconnected(&mut self, subtree: NodeId) {
        let mut nodes = vec![subtree];
        nodes.extend(self.descendants(subtree));
        for id in nodes {
            if self.has_element_state(id) && self.definition_for(id).is_some() {
                self.reactions.push_back(Reaction::Disconnected(id));
            }
        }
    }

    /// Run queued reactions unless an outer call is already running them.
    fn process_reactions(&mut self) {
        if self.processing_reactions {
            return;
        }
        self.processing_reactions = true;
        while let Some(reaction) = self.reactions.pop_front() {
            if let Err(err) = self.run_reaction(reaction) {
                tracing::error!(target: targets::ELEMENT, ?reaction, %err, "custom element reaction failed");
            }
        }
        self.processing_reactions = false;
    }

    fn run_reaction(&mut self, reaction: Reaction) -> DomResult<()> {
        match reaction {
            Reaction::Connected(node) => {
                if !self.contains(node) {
                    return Ok(());
                }
                let Some(definition) = self.definition_for(node) else {
                    return Ok(());
                };
                self.upgrade(node)?;
                tracing::trace!(target: targets::ELEMENT, ?node, tag = definition.tag, "connected reaction");
                (definition.connected)(self, node)
            }
            Reaction::Disconnected(node) => {
                if !self.has_element_state(node) {
                    return Ok(());
                }
                let Some(definition) = self.definition_for(node) else {
                    return Ok(());
                };
                tracing::trace!(target: targets::ELEMENT, ?node, tag = definition.tag, "disconnected reaction");
                (definition.disconnected)(self, node)
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a listener on a node.
    pub fn add_event_listener<F>(
        &mut self,
        node: NodeId,
        event_type: EventType,
        listener: F,
    ) -> DomResult<ListenerId>
    where
        F: Fn(&mut Document, &mut Event) + Send + Sync + 'static,
    {
        self.next_listener_id += 1;
        let id = ListenerId(self.next_listener_id);
        let listener: Listener = Arc::new(listener);
        self.data_mut(node)?.listeners.push(ListenerEntry {
            id,
            event_type,
            listener,
        });
        Ok(id)
    }

    /// Remove a listener, returning whether it was registered.
    pub fn remove_event_listener(&mut self, node: NodeId, id: ListenerId) -> DomResult<bool> {
        let listeners = &mut self.data_mut(node)?.listeners;
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        Ok(listeners.len() != before)
    }

    /// Number of listeners registered on a node.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.nodes.get(node).map_or(0, |d| d.listeners.len())
    }

    /// Dispatch an event at `target`, bubbling up to the root.
    ///
    /// Pending mutation records are delivered once dispatch finishes.
    pub fn dispatch_event(&mut self, target: NodeId, event_type: EventType) -> DomResult<()> {
        self.data(target)?;
        tracing::trace!(target: targets::DOCUMENT, ?target, %event_type, "dispatching event");

        let mut path = vec![target];
        path.extend(self.ancestors(target));
        let mut event = Event::new(event_type, target);

        for node in path {
            let listeners: Vec<Listener> = match self.nodes.get(node) {
                Some(data) => data
                    .listeners
                    .iter()
                    .filter(|entry| entry.event_type == *event.event_type())
                    .map(|entry| Arc::clone(&entry.listener))
                    .collect(),
                None => continue,
            };
            event.set_current_target(node);
            for listener in listeners {
                listener(self, &mut event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        self.perform_microtask_checkpoint();
        Ok(())
    }

    /// Dispatch a click at `target`.
    pub fn click(&mut self, target: NodeId) -> DomResult<()> {
        self.dispatch_event(target, EventType::Click)
    }

    // =========================================================================
    // Mutation Observers
    // =========================================================================

    /// Start observing `target`.
    pub fn observe<F>(
        &mut self,
        target: NodeId,
        options: ObserveOptions,
        callback: F,
    ) -> DomResult<ObserverId>
    where
        F: Fn(&mut Document, ObserverId, &[MutationRecord]) + Send + Sync + 'static,
    {
        self.data(target)?;
        let callback: MutationCallback = Arc::new(callback);
        let id = self.observers.add(target, options, callback);
        tracing::trace!(target: targets::OBSERVER, ?id, ?target, "observer started");
        Ok(id)
    }

    /// Stop an observer and drop its pending records.
    pub fn disconnect_observer(&mut self, id: ObserverId) -> bool {
        let removed = self.observers.remove(id);
        if removed {
            tracing::trace!(target: targets::OBSERVER, ?id, "observer stopped");
        }
        removed
    }

    /// Check if an observer is active.
    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.observers.contains(id)
    }

    /// Number of active observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Deliver pending mutation records until none remain.
    ///
    /// Returns the number of callback invocations.
    pub fn perform_microtask_checkpoint(&mut self) -> usize {
        let mut delivered = 0;
        while self.observers.has_pending() {
            for (id, callback, records) in self.observers.take_pending() {
                // An earlier callback in this batch may have stopped this observer.
                if !self.observers.contains(id) {
                    continue;
                }
                tracing::trace!(target: targets::OBSERVER, ?id, records = records.len(), "delivering mutation records");
                callback(self, id, &records);
                delivered += 1;
            }
        }
        delivered
    }

    fn record_child_list(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.observers.is_empty() {
            return;
        }
        let record = MutationRecord {
            kind: MutationKind::ChildList,
            target,
            added,
            removed,
        };
        let nodes = &self.nodes;
        self.observers
            .queue(&record, |root| is_inclusive_ancestor_in(nodes, root, target));
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Run `callback` during the next frame, after pending mutation records
    /// have been delivered.
    pub fn request_animation_frame<F>(&mut self, callback: F) -> FrameCallbackId
    where
        F: FnOnce(&mut Document) + Send + Sync + 'static,
    {
        self.frames.post(Box::new(callback))
    }

    /// Check if any frame callback is waiting.
    pub fn has_pending_frame_callbacks(&self) -> bool {
        self.frames.has_pending()
    }

    /// Number of frame callbacks waiting.
    pub fn pending_frame_callbacks(&self) -> usize {
        self.frames.pending_count()
    }

    /// Number of frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frames.frames_rendered()
    }

    /// Render one frame.
    ///
    /// Delivers pending mutation records, then runs the callbacks that were
    /// requested before the frame began. Callbacks requested while the frame
    /// runs wait for the next one. Returns the number of callbacks run.
    pub fn render_frame(&mut self) -> usize {
        self.perform_microtask_checkpoint();
        let batch = self.frames.begin_frame();
        let count = batch.len();
        for (id, callback) in batch {
            tracing::trace!(target: targets::FRAME, ?id, "running frame callback");
            callback(self);
            self.perform_microtask_checkpoint();
        }
        count
    }

    /// Render frames until no observer records or frame callbacks remain.
    ///
    /// Returns the number of frames rendered.
    pub fn run_until_idle(&mut self) -> u64 {
        let mut frames = 0;
        self.perform_microtask_checkpoint();
        while self.frames.has_pending() {
            if frames == MAX_IDLE_FRAMES {
                tracing::warn!(target: targets::FRAME, frames, "frame callbacks keep rescheduling; giving up");
                break;
            }
            self.render_frame();
            frames += 1;
        }
        frames
    }

    // =========================================================================
    // Extensions
    // =========================================================================

    /// Store a per-document service, replacing any previous value of the type.
    pub fn insert_extension<T: Any + Send + Sync>(&mut self, value: T) -> Option<T> {
        self.extensions
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|old| old.downcast::<T>().ok())
            .map(|old| *old)
    }

    /// Get a per-document service.
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Get a per-document service mutably.
    pub fn extension_mut<T: Any + Send + Sync>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Get a per-document service, creating it on first use.
    pub fn extension_or_default<T: Any + Send + Sync + Default>(&mut self) -> &mut T {
        self.extensions
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut::<T>()
            .expect("extensions are keyed by their own TypeId")
    }

    /// Remove a per-document service.
    pub fn remove_extension<T: Any + Send + Sync>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("custom_elements", &self.definitions.len())
            .field("observers", &self.observers.len())
            .field("pending_frames", &self.frames.pending_count())
            .finish()
    }
}

static_assertions::assert_impl_all!(Document: Send, Sync);

/// Map a dataset key to its attribute name (`isOpen` -> `data-is-open`).
pub fn dataset_attribute_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 5);
    name.push_str("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn is_inclusive_ancestor_in(
    nodes: &SlotMap<NodeId, NodeData>,
    ancestor: NodeId,
    node: NodeId,
) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        current = nodes.get(id).and_then(|d| d.parent);
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn block(doc: &mut Document, height: f32) -> NodeId {
        let node = doc.create_element("div");
        doc.set_intrinsic_height(node, height).unwrap();
        node
    }

    #[test]
    fn test_append_and_order() {
        let mut doc = Document::new();
        let parent = doc.create_element("div");
        let a = doc.create_element("p");
        let b = doc.create_element("p");
        let c = doc.create_element("p");
        doc.append_child(parent, a).unwrap();
        doc.append_child(parent, c).unwrap();
        doc.insert_before(parent, b, Some(c)).unwrap();
        assert_eq!(doc.children(parent).unwrap(), &[a, b, c]);
        assert_eq!(doc.parent(b), Some(parent));
    }

    #[test]
    fn test_move_between_parents() {
        let mut doc = Document::new();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(first, child).unwrap();
        doc.append_child(second, child).unwrap();
        assert!(doc.children(first).unwrap().is_empty());
        assert_eq!(doc.children(second).unwrap(), &[child]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert!(matches!(
            doc.append_child(inner, outer),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            doc.append_child(outer, outer),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn test_check_insertion_leaves_tree_alone() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        let loose = doc.create_element("span");
        doc.append_child(outer, inner).unwrap();

        assert!(matches!(
            doc.check_insertion(inner, outer),
            Err(DomError::HierarchyRequest(_))
        ));
        doc.check_insertion(inner, loose).unwrap();
        assert_eq!(doc.parent(loose), None);
        assert_eq!(doc.children(outer).unwrap(), &[inner]);
    }

    #[test]
    fn test_text_cannot_have_children() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        let child = doc.create_element("div");
        assert!(matches!(
            doc.append_child(text, child),
            Err(DomError::HierarchyRequest(_))
        ));
    }

    #[test]
    fn test_remove_child_requires_parent() {
        let mut doc = Document::new();
        let parent = doc.create_element("div");
        let stranger = doc.create_element("div");
        assert_eq!(doc.remove_child(parent, stranger), Err(DomError::NotFound));
        let root = doc.root();
        assert!(doc.remove(root).is_err());
    }

    #[test]
    fn test_connectivity() {
        let mut doc = Document::new();
        let panel = doc.create_element("div");
        let child = doc.create_element("div");
        doc.append_child(panel, child).unwrap();
        assert!(!doc.is_connected(child));
        doc.append_child(doc.root(), panel).unwrap();
        assert!(doc.is_connected(child));
        doc.remove(panel).unwrap();
        assert!(!doc.is_connected(child));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut doc = Document::new();
        let root = doc.create_element("div");
        let a = doc.create_element("div");
        let a1 = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(root, a).unwrap();
        doc.append_child(a, a1).unwrap();
        doc.append_child(root, b).unwrap();
        assert_eq!(doc.descendants(root), vec![a, a1, b]);
        assert_eq!(doc.ancestors(a1), vec![a, root]);
    }

    #[test]
    fn test_layout_heights() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = block(&mut doc, 30.0);
        let text = doc.create_text("one\ntwo\nthree");
        doc.append_child(outer, inner).unwrap();
        doc.append_child(outer, text).unwrap();

        assert_eq!(doc.scroll_height(outer).unwrap(), 90.0);

        doc.set_height(inner, Length::Px(0.0)).unwrap();
        assert_eq!(doc.offset_height(inner).unwrap(), 0.0);
        assert_eq!(doc.scroll_height(inner).unwrap(), 30.0);
        assert_eq!(doc.scroll_height(outer).unwrap(), 60.0);

        doc.set_height(outer, Length::Px(10.0)).unwrap();
        assert_eq!(doc.offset_height(outer).unwrap(), 10.0);
        assert_eq!(doc.scroll_height(outer).unwrap(), 60.0);
    }

    #[test]
    fn test_custom_line_height() {
        let mut doc = Document::with_config(DocumentConfig::default().with_line_height(16.0));
        let text = doc.create_text("a\nb");
        assert_eq!(doc.scroll_height(text).unwrap(), 32.0);
    }

    #[test]
    fn test_text_content() {
        let mut doc = Document::new();
        let title = doc.create_element("div");
        doc.set_text_content(title, "Hello").unwrap();
        assert_eq!(doc.text_content(title), "Hello");
        doc.set_text_content(title, "").unwrap();
        assert!(doc.children(title).unwrap().is_empty());
    }

    #[test]
    fn test_attributes_and_dataset() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.set_dataset(node, "isOpen", "").unwrap();
        assert!(doc.has_attribute(node, "data-is-open"));
        doc.set_attribute(node, "data-group", "Nav").unwrap();
        assert_eq!(doc.dataset(node, "group").as_deref(), Some("Nav"));
        assert_eq!(doc.remove_attribute(node, "data-group").unwrap(), Some("Nav".to_string()));
        assert_eq!(doc.dataset(node, "group"), None);

        let text = doc.create_text("x");
        assert!(doc.set_attribute(text, "id", "t").is_err());
    }

    #[test]
    fn test_classes() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.add_class(node, "open").unwrap();
        doc.add_class(node, "open").unwrap();
        assert_eq!(doc.classes(node), &["open".to_string()]);
        assert!(doc.remove_class(node, "open").unwrap());
        assert!(!doc.remove_class(node, "open").unwrap());
    }

    #[test]
    fn test_click_bubbles_and_stops() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        doc.append_child(doc.root(), outer).unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        doc.add_event_listener(outer, EventType::Click, move |_, event| {
            assert_eq!(event.current_target(), event.target());
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        let counter = Arc::clone(&hits);
        let listener = doc
            .add_event_listener(inner, EventType::Click, move |_, event| {
                counter.fetch_add(10, Ordering::SeqCst);
                event.stop_propagation();
            })
            .unwrap();

        doc.click(inner).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 10);

        assert!(doc.remove_event_listener(inner, listener).unwrap());
        doc.click(outer).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_observer_batches_subtree_records() {
        let mut doc = Document::new();
        let watched = doc.create_element("div");
        let nested = doc.create_element("div");
        doc.append_child(watched, nested).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let records_seen = Arc::new(AtomicUsize::new(0));
        let (c, r) = (Arc::clone(&calls), Arc::clone(&records_seen));
        doc.observe(watched, ObserveOptions::subtree_child_list(), move |_, _, records| {
            c.fetch_add(1, Ordering::SeqCst);
            r.fetch_add(records.len(), Ordering::SeqCst);
        })
        .unwrap();

        let a = doc.create_element("p");
        let b = doc.create_element("p");
        doc.append_child(nested, a).unwrap();
        doc.append_child(watched, b).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(doc.perform_microtask_checkpoint(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(records_seen.load(Ordering::SeqCst), 2);
        assert_eq!(doc.perform_microtask_checkpoint(), 0);
    }

    #[test]
    fn test_observer_without_subtree_ignores_descendants() {
        let mut doc = Document::new();
        let watched = doc.create_element("div");
        let nested = doc.create_element("div");
        doc.append_child(watched, nested).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let options = ObserveOptions {
            child_list: true,
            subtree: false,
        };
        let observer = doc
            .observe(watched, options, move |_, _, _| {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        let leaf = doc.create_element("p");
        doc.append_child(nested, leaf).unwrap();
        doc.perform_microtask_checkpoint();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(doc.disconnect_observer(observer));
        assert!(!doc.is_observing(observer));
        doc.append_child(watched, leaf).unwrap();
        doc.perform_microtask_checkpoint();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_frame_callbacks_are_deferred() {
        let mut doc = Document::new();
        let node = block(&mut doc, 10.0);
        doc.request_animation_frame(move |doc| {
            doc.set_height(node, Length::Px(42.0)).unwrap();
            doc.request_animation_frame(move |doc| {
                doc.set_height(node, Length::Px(7.0)).unwrap();
            });
        });
        assert_eq!(doc.offset_height(node).unwrap(), 10.0);

        assert_eq!(doc.render_frame(), 1);
        assert_eq!(doc.offset_height(node).unwrap(), 42.0);
        assert!(doc.has_pending_frame_callbacks());

        assert_eq!(doc.run_until_idle(), 1);
        assert_eq!(doc.offset_height(node).unwrap(), 7.0);
        assert_eq!(doc.frame_count(), 2);
    }

    #[test]
    fn test_destroy_removes_subtree() {
        let mut doc = Document::new();
        let panel = doc.create_element("div");
        let child = doc.create_element("div");
        doc.append_child(panel, child).unwrap();
        doc.append_child(doc.root(), panel).unwrap();
        let before = doc.node_count();
        doc.destroy(panel).unwrap();
        assert!(!doc.contains(panel));
        assert!(!doc.contains(child));
        assert_eq!(doc.node_count(), before - 2);
        assert!(doc.children(doc.root()).unwrap().is_empty());
    }

    #[derive(Default, Debug, PartialEq)]
    struct Counter(u32);

    #[test]
    fn test_extensions() {
        let mut doc = Document::new();
        assert!(doc.extension::<Counter>().is_none());
        doc.extension_or_default::<Counter>().0 += 2;
        assert_eq!(doc.extension::<Counter>(), Some(&Counter(2)));
        assert_eq!(doc.insert_extension(Counter(5)), Some(Counter(2)));
        doc.extension_mut::<Counter>().unwrap().0 += 1;
        assert_eq!(doc.remove_extension::<Counter>(), Some(Counter(6)));
        assert!(doc.extension::<Counter>().is_none());
    }

    #[test]
    fn test_dataset_attribute_name() {
        assert_eq!(dataset_attribute_name("title"), "data-title");
        assert_eq!(dataset_attribute_name("isOpen"), "data-is-open");
    }
}
