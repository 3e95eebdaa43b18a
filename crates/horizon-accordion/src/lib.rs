//! Horizon Accordion - collapsible panels for Horizon Accordion documents.
//!
//! Two custom elements are provided:
//!
//! - [`Accordion`] (`<accordion-element>`): a panel with a clickable title and
//!   a body whose height follows its content. Opening one accordion closes
//!   its same-group siblings, and nested accordions resize the open
//!   accordions around them.
//! - [`AccordionFan`] (`<accordion-fan>`): stamps a freshly generated group on
//!   every accordion inside it, so they behave as one exclusive set.
//!
//! Accordions can be declared in markup (`data-title`, `data-id`,
//! `data-group`, `data-open` attributes) and upgraded when [`install`] runs,
//! or built with [`Accordion::create`].
//!
//! # Example
//!
//! ```
//! use horizon_accordion::{Accordion, AccordionOptions};
//! use horizon_accordion_core::Document;
//!
//! let mut doc = Document::new();
//! let faq = Accordion::create(&mut doc, AccordionOptions::new().with_title("FAQ")).unwrap();
//! let answer = doc.create_text("Yes.\nReally.");
//! doc.append_child(faq, answer).unwrap();
//! doc.append_child(doc.root(), faq).unwrap();
//!
//! let title = Accordion::get(&doc, faq).unwrap().title_region().unwrap();
//! doc.click(title).unwrap();
//!
//! let body = Accordion::get(&doc, faq).unwrap().body_region().unwrap();
//! assert!(Accordion::get(&doc, faq).unwrap().is_open());
//! assert_eq!(doc.offset_height(body).unwrap(), 40.0);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use horizon_accordion_core::{CustomElement, Document, DomResult};

mod accordion;
mod config;
mod fan;
mod registry;

pub use accordion::{Accordion, AccordionOptions, TitleContent};
pub use config::{
    AccordionConfig, ConfigError, DEFAULT_BODY_CLASS, DEFAULT_EXPAND_TRANSITION,
    DEFAULT_FAN_GROUP_PREFIX, DEFAULT_OPEN_CLASS, DEFAULT_TITLE_CLASS,
};
pub use fan::AccordionFan;
pub use registry::AccordionRegistry;

/// Target names for log filtering.
pub mod targets {
    /// Accordion lifecycle and state changes.
    pub const ACCORDION: &str = "horizon_accordion::accordion";
    /// Fan group stamping.
    pub const FAN: &str = "horizon_accordion::fan";
    /// Registry bookkeeping.
    pub const REGISTRY: &str = "horizon_accordion::registry";
    /// Installation and configuration.
    pub const CONFIG: &str = "horizon_accordion::config";
}

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        Accordion, AccordionConfig, AccordionFan, AccordionOptions, AccordionRegistry,
        TitleContent, install, install_with_config,
    };
    pub use horizon_accordion_core::{Document, DomError, DomResult, NodeId};
}

/// Process-wide counter behind default accordion ids and fan group labels.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Define the accordion elements in `doc`.
///
/// Keeps an existing [`AccordionConfig`] (or stores the default one) and
/// upgrades any accordion markup already in the document. Running it again
/// is harmless.
pub fn install(doc: &mut Document) -> DomResult<()> {
    if doc.extension::<AccordionConfig>().is_none() {
        doc.insert_extension(AccordionConfig::default());
    }
    define_once::<Accordion>(doc)?;
    define_once::<AccordionFan>(doc)
}

/// Define the accordion elements in `doc` with a specific configuration.
///
/// The configuration replaces any previously stored one.
pub fn install_with_config(doc: &mut Document, config: AccordionConfig) -> DomResult<()> {
    doc.insert_extension(config);
    define_once::<Accordion>(doc)?;
    define_once::<AccordionFan>(doc)
}

fn define_once<T: CustomElement>(doc: &mut Document) -> DomResult<()> {
    if doc.custom_elements().is_defined(T::TAG) {
        tracing::debug!(target: targets::CONFIG, tag = T::TAG, "element already defined; skipping");
        return Ok(());
    }
    doc.define_element::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_twice_is_silent() {
        let mut doc = Document::new();
        install(&mut doc).unwrap();
        install(&mut doc).unwrap();
        assert!(doc.custom_elements().is_defined(Accordion::TAG));
        assert!(doc.custom_elements().is_defined(AccordionFan::TAG));
        assert_eq!(doc.custom_elements().len(), 2);
    }

    #[test]
    fn test_install_keeps_custom_config() {
        let mut doc = Document::new();
        let config = AccordionConfig::default().with_open_class("expanded");
        install_with_config(&mut doc, config.clone()).unwrap();
        install(&mut doc).unwrap();
        assert_eq!(doc.extension::<AccordionConfig>(), Some(&config));
    }

    #[test]
    fn test_sequence_increases() {
        let first = next_sequence();
        let second = next_sequence();
        assert!(second > first);
    }
}
