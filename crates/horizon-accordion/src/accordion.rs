//! Accordion widget implementation.
//!
//! This module provides [`Accordion`], the state behind `<accordion-element>`
//! nodes. An accordion owns two regions:
//!
//! - a **title region** that toggles the accordion when clicked
//! - a **body region** whose explicit height is `0` while closed and the
//!   body's natural height while open
//!
//! Both regions are adopted from author markup when a direct child carries
//! the configured title/body class, and synthesized otherwise.
//!
//! # Nesting
//!
//! Accordions inside the body of another accordion remember that accordion
//! as their *parent accordion*. Opening or closing a nested accordion adds or
//! removes its body height from every open accordion above it, so the outer
//! bodies keep fitting their content.
//!
//! # Groups
//!
//! Accordions with the same group (compared case-insensitively) and the same
//! parent accordion are mutually exclusive: expanding one collapses the
//! others. Same-group accordions under different parents are independent.
//!
//! # Example
//!
//! ```
//! use horizon_accordion::{Accordion, AccordionOptions};
//! use horizon_accordion_core::Document;
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let a = Accordion::create(&mut doc, AccordionOptions::new().with_group("menu")).unwrap();
//! let b = Accordion::create(&mut doc, AccordionOptions::new().with_group("Menu")).unwrap();
//! doc.append_child(root, a).unwrap();
//! doc.append_child(root, b).unwrap();
//!
//! Accordion::expand(&mut doc, a).unwrap();
//! Accordion::expand(&mut doc, b).unwrap();
//! assert!(!Accordion::get(&doc, a).unwrap().is_open());
//! assert!(Accordion::get(&doc, b).unwrap().is_open());
//! ```

use horizon_accordion_core::{
    CustomElement, Document, DomError, DomResult, Element, EventType, InlineStyle, Length,
    MutationKind, NodeId, ObserveOptions, ObserverId,
};

use crate::config::AccordionConfig;
use crate::registry::AccordionRegistry;
use crate::targets;

/// Attribute that opens an accordion when it is attached.
const OPEN_ATTRIBUTE: &str = "data-open";

/// Options for [`Accordion::create`].
///
/// Every option overrides the matching `data-*` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccordionOptions {
    /// Title text.
    pub title: Option<String>,
    /// Identity used by [`Accordion::find_by_id`].
    pub id: Option<String>,
    /// Open the accordion once it is attached.
    pub is_open: Option<bool>,
    /// Exclusivity group.
    pub group: Option<String>,
}

impl AccordionOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title text.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the identity.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Open the accordion on attachment.
    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    /// Set the group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// New content for an accordion title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleContent {
    /// Plain title text.
    Text(String),
    /// A subtree placed inside the title region.
    Node(NodeId),
}

impl From<&str> for TitleContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TitleContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<NodeId> for TitleContent {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

/// State of an `<accordion-element>` node.
///
/// Operations are associated functions taking the document and the
/// accordion's node, since they touch other nodes (regions, ancestors,
/// siblings) as well as this state.
#[derive(Debug, Clone)]
pub struct Accordion {
    accordion_id: String,
    title: String,
    group: String,
    is_open: bool,
    open_on_connect: bool,
    title_region: Option<NodeId>,
    body_region: Option<NodeId>,
    /// Nearest enclosing accordion, refreshed on every attachment.
    parent_accordion: Option<NodeId>,
    initial_parent_height: f32,
    observer: Option<ObserverId>,
    finished_connecting: bool,
}

impl Accordion {
    /// Create a detached accordion node.
    ///
    /// Installs the accordion elements if needed and registers the new
    /// node. The tree is left untouched: regions are built once the node is
    /// attached.
    pub fn create(doc: &mut Document, options: AccordionOptions) -> DomResult<NodeId> {
        crate::install(doc)?;
        let node = doc.create_element(Self::TAG);
        let accordion = Self::from_options(doc, node, options);
        tracing::debug!(target: targets::ACCORDION, ?node, id = %accordion.accordion_id, "created accordion");
        doc.set_element(node, accordion)?;
        AccordionRegistry::register_in(doc, node);
        Ok(node)
    }

    fn from_options(doc: &Document, node: NodeId, options: AccordionOptions) -> Self {
        let title = options
            .title
            .or_else(|| doc.dataset(node, "title"))
            .unwrap_or_default();
        let accordion_id = options
            .id
            .or_else(|| doc.dataset(node, "id"))
            .unwrap_or_else(|| crate::next_sequence().to_string());
        let open_on_connect = options
            .is_open
            .unwrap_or_else(|| doc.dataset(node, "isOpen").is_some());
        let group = options
            .group
            .or_else(|| doc.dataset(node, "group"))
            .unwrap_or_default();

        Self {
            accordion_id,
            title,
            group,
            is_open: false,
            open_on_connect,
            title_region: None,
            body_region: None,
            parent_accordion: None,
            initial_parent_height: 0.0,
            observer: None,
            finished_connecting: false,
        }
    }

    /// Get the accordion state of `node`.
    pub fn get(doc: &Document, node: NodeId) -> DomResult<&Accordion> {
        doc.element::<Accordion>(node)
            .ok_or_else(DomError::type_mismatch::<Accordion>)
    }

    fn state_mut(doc: &mut Document, node: NodeId) -> DomResult<&mut Accordion> {
        doc.element_mut::<Accordion>(node)
            .ok_or_else(DomError::type_mismatch::<Accordion>)
    }

    /// Check if `node` carries accordion state.
    pub fn is_accordion(doc: &Document, node: NodeId) -> bool {
        doc.element::<Accordion>(node).is_some()
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// The identity; fixed at construction.
    pub fn accordion_id(&self) -> &str {
        &self.accordion_id
    }

    /// The title text (empty after a node title was set).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The exclusivity group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Whether the accordion is open.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The title region, once attached.
    pub fn title_region(&self) -> Option<NodeId> {
        self.title_region
    }

    /// The body region, once attached.
    pub fn body_region(&self) -> Option<NodeId> {
        self.body_region
    }

    /// The nearest enclosing accordion found at the last attachment.
    pub fn parent_accordion(&self) -> Option<NodeId> {
        self.parent_accordion
    }

    /// Natural height of the parent accordion at the last attachment.
    pub fn initial_parent_height(&self) -> f32 {
        self.initial_parent_height
    }

    /// Whether structural changes in the subtree are being watched.
    pub fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Replace the title.
    ///
    /// Text can be set at any time and is rendered immediately when
    /// attached. A node title requires the accordion to be attached.
    pub fn set_title(
        doc: &mut Document,
        node: NodeId,
        title: impl Into<TitleContent>,
    ) -> DomResult<()> {
        let region = Self::get(doc, node)?.title_region;
        match title.into() {
            TitleContent::Text(text) => {
                if doc.is_connected(node) {
                    if let Some(region) = region {
                        doc.set_text_content(region, &text)?;
                    }
                }
                Self::state_mut(doc, node)?.title = text;
            }
            TitleContent::Node(content) => {
                let region = region.filter(|_| doc.is_connected(node)).ok_or_else(|| {
                    DomError::invalid_state(
                        "cannot set an accordion title to a node before the accordion is attached",
                    )
                })?;
                doc.check_insertion(region, content)?;
                Self::state_mut(doc, node)?.title.clear();
                doc.clear_children(region)?;
                doc.append_child(region, content)?;
            }
        }
        Ok(())
    }

    /// Replace the body content with `content`. Requires attachment.
    pub fn set_body(doc: &mut Document, node: NodeId, content: NodeId) -> DomResult<()> {
        let body = Self::get(doc, node)?
            .body_region
            .filter(|_| doc.is_connected(node))
            .ok_or_else(|| {
                DomError::invalid_state("cannot set an accordion body before the accordion is attached")
            })?;
        doc.check_insertion(body, content)?;
        doc.clear_children(body)?;
        doc.append_child(body, content)
    }

    /// Change the group, mirroring it into `data-group`.
    pub fn set_group(doc: &mut Document, node: NodeId, group: impl Into<String>) -> DomResult<()> {
        let group = group.into();
        doc.set_dataset(node, "group", group.clone())?;
        Self::state_mut(doc, node)?.group = group;
        Ok(())
    }

    // =========================================================================
    // Open / Close
    // =========================================================================

    /// Open the accordion.
    ///
    /// Collapses open same-group siblings that share this accordion's parent
    /// accordion, sizes the body to its content and grows every open
    /// ancestor body by the same amount. Expanding an open accordion only
    /// propagates the change in its body height.
    pub fn expand(doc: &mut Document, node: NodeId) -> DomResult<()> {
        let state = Self::get(doc, node)?;
        let body = state
            .body_region
            .ok_or_else(|| DomError::invalid_state("cannot expand an accordion before it is attached"))?;
        let parent = state.parent_accordion;
        let group = state.group.clone();
        let was_open = state.is_open;

        let chain = Self::ancestor_chain(doc, node);
        let rivals: Vec<NodeId> = Self::find_by_group(doc, &group)
            .into_iter()
            .filter(|&other| other != node && !chain.contains(&other))
            .filter(|&other| {
                doc.element::<Accordion>(other)
                    .is_some_and(|a| a.parent_accordion == parent)
            })
            .collect();
        for rival in rivals {
            Self::collapse(doc, rival)?;
        }

        let previous = match doc.style(body)?.height {
            Length::Px(height) if was_open => height,
            _ => 0.0,
        };
        Self::state_mut(doc, node)?.is_open = true;
        let natural = doc.scroll_height(body)?;
        doc.set_height(body, Length::Px(natural))?;
        Self::adjust_ancestors(doc, node, natural - previous)?;

        let config = AccordionConfig::for_document(doc);
        doc.add_class(node, &config.open_class)?;
        tracing::debug!(target: targets::ACCORDION, ?node, height = natural, "expanded accordion");
        Ok(())
    }

    /// Close the accordion and every accordion nested in it.
    ///
    /// Does nothing if already closed.
    pub fn collapse(doc: &mut Document, node: NodeId) -> DomResult<()> {
        let state = Self::get(doc, node)?;
        if !state.is_open {
            return Ok(());
        }
        let body = state
            .body_region
            .ok_or_else(|| DomError::invalid_state("open accordion has no body region"))?;

        Self::state_mut(doc, node)?.is_open = false;
        let natural = doc.scroll_height(body)?;
        Self::adjust_ancestors(doc, node, -natural)?;
        doc.set_height(body, Length::Px(0.0))?;

        let config = AccordionConfig::for_document(doc);
        doc.remove_class(node, &config.open_class)?;
        tracing::debug!(target: targets::ACCORDION, ?node, height = natural, "collapsed accordion");

        for nested in doc.descendants_of_type::<Accordion>(node) {
            Self::collapse(doc, nested)?;
        }
        Ok(())
    }

    /// Collapse if open, expand otherwise.
    pub fn toggle(doc: &mut Document, node: NodeId) -> DomResult<()> {
        if Self::get(doc, node)?.is_open {
            Self::collapse(doc, node)
        } else {
            Self::expand(doc, node)
        }
    }

    /// Enclosing accordions, nearest first, following parent links.
    fn ancestor_chain(doc: &Document, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = doc.element::<Accordion>(node).and_then(|a| a.parent_accordion);
        while let Some(parent) = current {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = doc.element::<Accordion>(parent).and_then(|a| a.parent_accordion);
        }
        chain
    }

    /// Add `delta` to the body height of each open ancestor, stopping at the
    /// first closed one. Bodies mid-reflow (auto height) are left alone.
    fn adjust_ancestors(doc: &mut Document, node: NodeId, delta: f32) -> DomResult<()> {
        for parent in Self::ancestor_chain(doc, node) {
            let Some(state) = doc.element::<Accordion>(parent) else {
                break;
            };
            if !state.is_open {
                break;
            }
            let Some(body) = state.body_region else {
                continue;
            };
            let current = doc.style(body)?.height;
            if let Length::Px(height) = current {
                doc.set_height(body, Length::Px((height + delta).max(0.0)))?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// The first registered accordion with this identity.
    ///
    /// Returns `None` when nothing matches, including when no accordion has
    /// ever registered in `doc`.
    pub fn find_by_id(doc: &Document, id: &str) -> Option<NodeId> {
        AccordionRegistry::of(doc)?
            .iter()
            .find(|&node| doc.element::<Accordion>(node).is_some_and(|a| a.accordion_id == id))
    }

    /// Attached accordions whose group equals `group`, ignoring case, in
    /// document order.
    pub fn find_by_group(doc: &Document, group: &str) -> Vec<NodeId> {
        let wanted = group.to_lowercase();
        doc.descendants_of_type::<Accordion>(doc.root())
            .into_iter()
            .filter(|&node| {
                doc.element::<Accordion>(node)
                    .is_some_and(|a| a.group.to_lowercase() == wanted)
            })
            .collect()
    }

    // =========================================================================
    // Attachment
    // =========================================================================

    fn not_attached_yet(doc: &Document, node: NodeId) -> DomResult<bool> {
        Ok(!Self::get(doc, node)?.finished_connecting)
    }

    fn setup(doc: &mut Document, node: NodeId) -> DomResult<()> {
        let config = AccordionConfig::for_document(doc);

        let title_region = Self::resolve_title_region(doc, node, &config)?;
        let body_region = Self::resolve_body_region(doc, node, title_region, &config)?;
        doc.append_child(node, title_region)?;
        doc.append_child(node, body_region)?;
        doc.set_height(body_region, Length::Px(0.0))?;
        doc.set_transition(body_region, Some(config.expand_transition.clone()))?;

        let state = Self::state_mut(doc, node)?;
        state.title_region = Some(title_region);
        state.body_region = Some(body_region);
        let open_on_connect = state.open_on_connect;
        let open = open_on_connect || doc.has_attribute(node, OPEN_ATTRIBUTE);
        if open {
            Self::expand(doc, node)?;
        }

        Self::discover_parent(doc, node)?;
        Self::start_observing(doc, node)?;
        AccordionRegistry::register_in(doc, node);
        Self::state_mut(doc, node)?.finished_connecting = true;
        tracing::debug!(target: targets::ACCORDION, ?node, open, "accordion attached");
        Ok(())
    }

    fn reattach(doc: &mut Document, node: NodeId) -> DomResult<()> {
        Self::discover_parent(doc, node)?;
        Self::start_observing(doc, node)?;
        AccordionRegistry::register_in(doc, node);
        tracing::debug!(target: targets::ACCORDION, ?node, "accordion re-attached");
        Ok(())
    }

    /// Adopt a direct child with the title class or build one from the title
    /// text. Either way the region toggles the accordion when clicked.
    fn resolve_title_region(
        doc: &mut Document,
        node: NodeId,
        config: &AccordionConfig,
    ) -> DomResult<NodeId> {
        let region = match doc
            .child_elements_with_class(node, &config.title_class)
            .first()
        {
            Some(&existing) => existing,
            None => {
                let region = doc.create_element("div");
                doc.add_class(region, &config.title_class)?;
                let title = Self::get(doc, node)?.title.clone();
                doc.set_text_content(region, &title)?;
                region
            }
        };
        doc.add_event_listener(region, EventType::Click, move |doc, _event| {
            if let Err(err) = Accordion::toggle(doc, node) {
                tracing::warn!(target: targets::ACCORDION, ?node, %err, "toggle from title click failed");
            }
        })?;
        Ok(region)
    }

    /// Adopt a direct child with the body class, or build one and move every
    /// other child (except the title region) into it.
    fn resolve_body_region(
        doc: &mut Document,
        node: NodeId,
        title_region: NodeId,
        config: &AccordionConfig,
    ) -> DomResult<NodeId> {
        if let Some(&existing) = doc.child_elements_with_class(node, &config.body_class).first() {
            return Ok(existing);
        }
        let region = doc.create_element("div");
        doc.add_class(region, &config.body_class)?;
        let content: Vec<NodeId> = doc
            .children(node)?
            .iter()
            .copied()
            .filter(|&child| child != title_region)
            .collect();
        for child in content {
            doc.append_child(region, child)?;
        }
        Ok(region)
    }

    fn discover_parent(doc: &mut Document, node: NodeId) -> DomResult<()> {
        let parent = doc
            .ancestors(node)
            .into_iter()
            .find(|&ancestor| Self::is_accordion(doc, ancestor));
        let initial_parent_height = match parent {
            Some(parent) => doc.scroll_height(parent)?,
            None => 0.0,
        };
        let state = Self::state_mut(doc, node)?;
        state.parent_accordion = parent;
        state.initial_parent_height = initial_parent_height;
        Ok(())
    }

    fn start_observing(doc: &mut Document, node: NodeId) -> DomResult<()> {
        Self::stop_observing(doc, node)?;
        let observer = doc.observe(
            node,
            ObserveOptions::subtree_child_list(),
            move |doc, _observer, records| {
                if !records.iter().any(|r| r.kind == MutationKind::ChildList) {
                    return;
                }
                if let Err(err) = Accordion::reflow(doc, node) {
                    tracing::warn!(target: targets::ACCORDION, ?node, %err, "accordion reflow failed");
                }
            },
        )?;
        Self::state_mut(doc, node)?.observer = Some(observer);
        Ok(())
    }

    fn stop_observing(doc: &mut Document, node: NodeId) -> DomResult<()> {
        if let Some(observer) = Self::state_mut(doc, node)?.observer.take() {
            doc.disconnect_observer(observer);
        }
        Ok(())
    }

    /// Resize an open body after its content changed.
    ///
    /// The body is released to auto height now and pinned to its measured
    /// pixel height on the next frame, so the height transition has a fixed
    /// target. The commit measures again: an enclosing accordion can reflow
    /// before a nested one in the same batch, and only at the frame are all
    /// released bodies at their content height. A body that was pinned in
    /// between (collapsed or re-expanded) is left as it is.
    fn reflow(doc: &mut Document, node: NodeId) -> DomResult<()> {
        let state = Self::get(doc, node)?;
        if !state.is_open {
            return Ok(());
        }
        let Some(body) = state.body_region else {
            return Ok(());
        };
        let nested = state.parent_accordion.is_some();
        let config = AccordionConfig::for_document(doc);

        if nested {
            doc.set_transition(body, Some(InlineStyle::TRANSITION_NONE.to_string()))?;
        }
        doc.set_height(body, Length::Auto)?;
        let measured = doc.scroll_height(body)?;
        doc.set_transition(body, Some(config.expand_transition))?;
        tracing::trace!(target: targets::ACCORDION, ?node, measured, "accordion content changed");

        doc.request_animation_frame(move |doc| {
            if let Err(err) = Accordion::commit_reflow(doc, node, body) {
                tracing::warn!(target: targets::ACCORDION, ?body, %err, "failed to commit measured height");
            }
        });
        Ok(())
    }

    fn commit_reflow(doc: &mut Document, node: NodeId, body: NodeId) -> DomResult<()> {
        let Some(state) = doc.element::<Accordion>(node) else {
            return Ok(());
        };
        if !state.is_open || state.body_region != Some(body) {
            return Ok(());
        }
        if doc.style(body)?.height != Length::Auto {
            return Ok(());
        }
        let measured = doc.scroll_height(body)?;
        doc.set_height(body, Length::Px(measured))?;
        tracing::trace!(target: targets::ACCORDION, ?node, measured, "committed accordion height");
        Ok(())
    }
}

impl Element for Accordion {
    fn debug_summary(&self) -> Option<String> {
        Some(format!(
            "id={} group={:?} open={}",
            self.accordion_id, self.group, self.is_open
        ))
    }
}

impl CustomElement for Accordion {
    const TAG: &'static str = "accordion-element";

    fn construct(doc: &mut Document, node: NodeId) -> Self {
        let accordion = Self::from_options(doc, node, AccordionOptions::default());
        AccordionRegistry::register_in(doc, node);
        accordion
    }

    fn connected(doc: &mut Document, node: NodeId) -> DomResult<()> {
        if !doc.is_connected(node) {
            return Ok(());
        }
        if Self::not_attached_yet(doc, node)? {
            Self::setup(doc, node)
        } else {
            Self::reattach(doc, node)
        }
    }

    fn disconnected(doc: &mut Document, node: NodeId) -> DomResult<()> {
        Self::stop_observing(doc, node)?;
        AccordionRegistry::unregister_in(doc, node);
        tracing::debug!(target: targets::ACCORDION, ?node, "accordion detached");
        Ok(())
    }
}

static_assertions::assert_impl_all!(Accordion: Send, Sync);
static_assertions::assert_impl_all!(AccordionOptions: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Document {
        let mut doc = Document::new();
        crate::install(&mut doc).unwrap();
        doc
    }

    fn block(doc: &mut Document, height: f32) -> NodeId {
        let node = doc.create_element("div");
        doc.set_intrinsic_height(node, height).unwrap();
        node
    }

    fn attached(doc: &mut Document, options: AccordionOptions, content: f32) -> NodeId {
        let node = Accordion::create(doc, options).unwrap();
        let filler = block(doc, content);
        doc.append_child(node, filler).unwrap();
        let root = doc.root();
        doc.append_child(root, node).unwrap();
        node
    }

    fn body_height(doc: &Document, node: NodeId) -> f32 {
        let body = Accordion::get(doc, node).unwrap().body_region().unwrap();
        doc.offset_height(body).unwrap()
    }

    #[test]
    fn test_options_override_attributes() {
        let mut doc = setup();
        let node = doc.create_element(Accordion::TAG);
        doc.set_dataset(node, "title", "From markup").unwrap();
        doc.set_dataset(node, "group", "g").unwrap();
        let options = AccordionOptions::new().with_title("From options");
        let accordion = Accordion::from_options(&doc, node, options);
        assert_eq!(accordion.title(), "From options");
        assert_eq!(accordion.group(), "g");
        assert!(!accordion.is_open());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let mut doc = setup();
        let a = Accordion::create(&mut doc, AccordionOptions::new()).unwrap();
        let b = Accordion::create(&mut doc, AccordionOptions::new()).unwrap();
        let a_id = Accordion::get(&doc, a).unwrap().accordion_id().to_string();
        let b_id = Accordion::get(&doc, b).unwrap().accordion_id().to_string();
        assert_ne!(a_id, b_id);
        assert!(a_id.parse::<u64>().is_ok());
    }

    #[test]
    fn test_attach_builds_regions() {
        let mut doc = setup();
        let node = attached(&mut doc, AccordionOptions::new().with_title("Hello"), 60.0);
        let state = Accordion::get(&doc, node).unwrap();
        let title = state.title_region().unwrap();
        let body = state.body_region().unwrap();

        assert_eq!(doc.children(node).unwrap(), &[title, body]);
        assert_eq!(doc.text_content(title), "Hello");
        assert!(doc.has_class(title, "accordion-title"));
        assert!(doc.has_class(body, "accordion-body"));
        assert_eq!(doc.children(body).unwrap().len(), 1);
        assert_eq!(doc.offset_height(body).unwrap(), 0.0);
        assert_eq!(
            doc.style(body).unwrap().transition.as_deref(),
            Some("var(--accordion-expand-rate)")
        );
        assert!(state.is_observing());
    }

    #[test]
    fn test_expand_and_collapse_heights() {
        let mut doc = setup();
        let node = attached(&mut doc, AccordionOptions::new(), 60.0);

        Accordion::expand(&mut doc, node).unwrap();
        assert_eq!(body_height(&doc, node), 60.0);
        assert!(doc.has_class(node, "open"));

        Accordion::collapse(&mut doc, node).unwrap();
        assert_eq!(body_height(&doc, node), 0.0);
        assert!(!doc.has_class(node, "open"));
    }

    #[test]
    fn test_expand_before_attach_is_invalid_state() {
        let mut doc = setup();
        let node = Accordion::create(&mut doc, AccordionOptions::new()).unwrap();
        assert!(Accordion::expand(&mut doc, node).unwrap_err().is_invalid_state());
        // Closed accordions collapse without needing regions.
        Accordion::collapse(&mut doc, node).unwrap();
    }

    #[test]
    fn test_open_flag_expands_on_attach() {
        let mut doc = setup();
        let node = attached(&mut doc, AccordionOptions::new().with_open(true), 40.0);
        assert!(Accordion::get(&doc, node).unwrap().is_open());
        assert_eq!(body_height(&doc, node), 40.0);
    }

    #[test]
    fn test_set_group_mirrors_attribute() {
        let mut doc = setup();
        let node = Accordion::create(&mut doc, AccordionOptions::new()).unwrap();
        Accordion::set_group(&mut doc, node, "Sidebar").unwrap();
        assert_eq!(Accordion::get(&doc, node).unwrap().group(), "Sidebar");
        assert_eq!(doc.attribute(node, "data-group"), Some("Sidebar"));
    }

    #[test]
    fn test_plain_element_is_type_mismatch() {
        let mut doc = setup();
        let plain = doc.create_element("div");
        assert!(matches!(
            Accordion::toggle(&mut doc, plain),
            Err(DomError::TypeMismatch { expected: "Accordion" })
        ));
    }

    #[test]
    fn test_debug_summary() {
        let mut doc = setup();
        let node = Accordion::create(&mut doc, AccordionOptions::new().with_id("faq").with_group("g"))
            .unwrap();
        assert_eq!(
            doc.element_summary(node).as_deref(),
            Some("id=faq group=\"g\" open=false")
        );
    }
}
