//! Custom element extension points.
//!
//! A custom element pairs a tag name with per-node state (an [`Element`]) and
//! lifecycle callbacks. Definitions live in a [`CustomElementRegistry`] owned
//! by the [`Document`]; the document invokes the callbacks as *reactions*
//! when defined nodes are connected to or disconnected from the tree.
//!
//! # Example
//!
//! ```
//! use horizon_accordion_core::{CustomElement, Document, DomResult, Element, NodeId};
//!
//! struct Badge {
//!     label: String,
//! }
//!
//! impl Element for Badge {}
//!
//! impl CustomElement for Badge {
//!     const TAG: &'static str = "x-badge";
//!
//!     fn construct(doc: &mut Document, node: NodeId) -> Self {
//!         Self { label: doc.dataset(node, "label").unwrap_or_default() }
//!     }
//!
//!     fn connected(doc: &mut Document, node: NodeId) -> DomResult<()> {
//!         let label = doc.element::<Badge>(node).map(|b| b.label.clone()).unwrap_or_default();
//!         doc.set_text_content(node, &label)
//!     }
//! }
//!
//! let mut doc = Document::new();
//! doc.define_element::<Badge>().unwrap();
//! let badge = doc.create_element(Badge::TAG);
//! doc.set_dataset(badge, "label", "new").unwrap();
//! doc.append_child(doc.root(), badge).unwrap();
//! assert_eq!(doc.text_content(badge), "new");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::document::{Document, NodeId};
use crate::error::{DomError, DomResult};

/// Type-erased state attached to an upgraded custom element node.
///
/// Use [`Document::element`] / [`Document::element_mut`] to downcast a node's
/// state back to its concrete type.
pub trait Element: Any + Send + Sync {
    /// A one-line summary shown by tree dumps.
    fn debug_summary(&self) -> Option<String> {
        None
    }
}

/// A custom element type that can be registered with a document.
pub trait CustomElement: Element + Sized {
    /// The tag name; must contain a hyphen.
    const TAG: &'static str;

    /// Build the element state for `node`, typically from its attributes.
    ///
    /// Called once per node, either when the node is upgraded or when it is
    /// created programmatically.
    fn construct(doc: &mut Document, node: NodeId) -> Self;

    /// Called when the node becomes connected to the document.
    ///
    /// Hosts may call this more than once for the same node (every time it
    /// is re-inserted), so implementations must be idempotent.
    fn connected(doc: &mut Document, node: NodeId) -> DomResult<()>;

    /// Called when the node is disconnected from the document.
    fn disconnected(_doc: &mut Document, _node: NodeId) -> DomResult<()> {
        Ok(())
    }
}

/// Constructor callback stored in an [`ElementDefinition`].
pub type ConstructFn = fn(&mut Document, NodeId) -> Box<dyn Element>;

/// Lifecycle callback stored in an [`ElementDefinition`].
pub type LifecycleFn = fn(&mut Document, NodeId) -> DomResult<()>;

/// A registered custom element definition.
#[derive(Clone, Copy)]
pub struct ElementDefinition {
    /// The tag this definition applies to.
    pub tag: &'static str,
    /// The concrete state type.
    pub type_id: TypeId,
    /// The concrete state type name, for diagnostics.
    pub type_name: &'static str,
    /// Builds the node's state.
    pub construct: ConstructFn,
    /// Connected reaction.
    pub connected: LifecycleFn,
    /// Disconnected reaction.
    pub disconnected: LifecycleFn,
}

impl ElementDefinition {
    /// Build the definition for a [`CustomElement`] type.
    pub fn of<T: CustomElement>() -> Self {
        Self {
            tag: T::TAG,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            construct: construct_boxed::<T>,
            connected: T::connected,
            disconnected: T::disconnected,
        }
    }
}

impl std::fmt::Debug for ElementDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementDefinition")
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn construct_boxed<T: CustomElement>(doc: &mut Document, node: NodeId) -> Box<dyn Element> {
    Box::new(T::construct(doc, node))
}

/// Check that `tag` is usable as a custom element name.
///
/// Names must start with a lowercase ASCII letter, contain a hyphen and
/// contain no uppercase letters or whitespace.
pub fn is_valid_custom_element_name(tag: &str) -> bool {
    tag.starts_with(|c: char| c.is_ascii_lowercase())
        && tag.contains('-')
        && !tag
            .chars()
            .any(|c| c.is_ascii_uppercase() || c.is_whitespace())
}

/// The set of custom element definitions known to a document.
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<&'static str, ElementDefinition>,
}

impl CustomElementRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition.
    ///
    /// Fails if the tag is not a valid custom element name or is already
    /// defined. Callers that may run their setup more than once should check
    /// [`is_defined`](Self::is_defined) first.
    pub fn define(&mut self, definition: ElementDefinition) -> DomResult<()> {
        if !is_valid_custom_element_name(definition.tag) {
            return Err(DomError::InvalidElementName(definition.tag.to_string()));
        }
        if self.definitions.contains_key(definition.tag) {
            return Err(DomError::AlreadyDefined(definition.tag.to_string()));
        }
        self.definitions.insert(definition.tag, definition);
        Ok(())
    }

    /// Look up the definition for a tag.
    pub fn get(&self, tag: &str) -> Option<&ElementDefinition> {
        self.definitions.get(tag)
    }

    /// Check if a tag has been defined.
    pub fn is_defined(&self, tag: &str) -> bool {
        self.definitions.contains_key(tag)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if no element has been defined.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Safe downcast of element state.
pub fn element_cast<'a, T: Element>(element: &'a (dyn Element + 'static)) -> Option<&'a T> {
    (element as &dyn Any).downcast_ref::<T>()
}

/// Safe mutable downcast of element state.
pub fn element_cast_mut<'a, T: Element>(
    element: &'a mut (dyn Element + 'static),
) -> Option<&'a mut T> {
    (element as &mut dyn Any).downcast_mut::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample;

    impl Element for Sample {}

    impl CustomElement for Sample {
        const TAG: &'static str = "x-sample";

        fn construct(_doc: &mut Document, _node: NodeId) -> Self {
            Sample
        }

        fn connected(_doc: &mut Document, _node: NodeId) -> DomResult<()> {
            Ok(())
        }
    }

    struct Other;

    impl Element for Other {}

    #[test]
    fn test_valid_names() {
        assert!(is_valid_custom_element_name("accordion-element"));
        assert!(is_valid_custom_element_name("x-a"));
        assert!(!is_valid_custom_element_name("accordion"));
        assert!(!is_valid_custom_element_name("Accordion-Element"));
        assert!(!is_valid_custom_element_name("-leading"));
        assert!(!is_valid_custom_element_name("two words-x"));
    }

    #[test]
    fn test_define_twice_fails() {
        let mut registry = CustomElementRegistry::new();
        registry.define(ElementDefinition::of::<Sample>()).unwrap();
        assert!(registry.is_defined("x-sample"));
        assert_eq!(
            registry.define(ElementDefinition::of::<Sample>()),
            Err(DomError::AlreadyDefined("x-sample".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_element_cast() {
        let sample: Box<dyn Element> = Box::new(Sample);
        assert!(element_cast::<Sample>(sample.as_ref()).is_some());
        assert!(element_cast::<Other>(sample.as_ref()).is_none());
    }

    #[test]
    fn test_definition_records_type() {
        let definition = ElementDefinition::of::<Sample>();
        assert_eq!(definition.tag, "x-sample");
        assert_eq!(definition.type_id, TypeId::of::<Sample>());
        assert!(definition.type_name.ends_with("Sample"));
    }
}
