//! Accordion fan implementation.
//!
//! An `<accordion-fan>` visually stacks the accordions inside it and makes
//! them one exclusive set: each time the fan is attached it generates a new
//! group label and gives it to every accordion in its subtree. Accordions
//! added to the fan later keep whatever group they had.

use horizon_accordion_core::{CustomElement, Document, DomError, DomResult, Element, NodeId};

use crate::accordion::Accordion;
use crate::config::AccordionConfig;
use crate::targets;

/// State of an `<accordion-fan>` node.
#[derive(Debug, Clone, Default)]
pub struct AccordionFan {
    group: Option<String>,
}

impl AccordionFan {
    /// Create a detached fan node, installing the accordion elements if needed.
    pub fn create(doc: &mut Document) -> DomResult<NodeId> {
        crate::install(doc)?;
        let node = doc.create_element(Self::TAG);
        doc.set_element(node, Self::default())?;
        Ok(node)
    }

    /// Get the fan state of `node`.
    pub fn get(doc: &Document, node: NodeId) -> DomResult<&AccordionFan> {
        doc.element::<AccordionFan>(node)
            .ok_or_else(DomError::type_mismatch::<AccordionFan>)
    }

    /// The label stamped at the last attachment.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

impl Element for AccordionFan {
    fn debug_summary(&self) -> Option<String> {
        self.group.as_ref().map(|group| format!("group={group:?}"))
    }
}

impl CustomElement for AccordionFan {
    const TAG: &'static str = "accordion-fan";

    fn construct(_doc: &mut Document, _node: NodeId) -> Self {
        Self::default()
    }

    fn connected(doc: &mut Document, node: NodeId) -> DomResult<()> {
        if !doc.is_connected(node) {
            return Ok(());
        }
        let config = AccordionConfig::for_document(doc);
        let label = format!("{}{}", config.fan_group_prefix, crate::next_sequence());

        // Nested markup is connected in tree order, after the fan itself.
        for descendant in doc.descendants(node) {
            if doc.tag_name(descendant) == Some(Accordion::TAG) {
                doc.upgrade(descendant)?;
            }
        }
        let members = doc.descendants_of_type::<Accordion>(node);
        for &member in &members {
            Accordion::set_group(doc, member, label.clone())?;
        }

        tracing::debug!(target: targets::FAN, ?node, group = %label, members = members.len(), "fan grouped accordions");
        if let Some(fan) = doc.element_mut::<AccordionFan>(node) {
            fan.group = Some(label);
        }
        Ok(())
    }
}

static_assertions::assert_impl_all!(AccordionFan: Send, Sync);
