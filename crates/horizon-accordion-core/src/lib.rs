//! Core systems for Horizon Accordion.
//!
//! This crate provides the retained document model that Horizon Accordion
//! widgets are built on:
//!
//! - **Document**: Arena-backed element tree with attributes, classes and styles
//! - **Layout**: Block layout reporting natural and rendered heights
//! - **Custom Elements**: Tag definitions with connected/disconnected reactions
//! - **Events**: Bubbling event dispatch with per-node listeners
//! - **Mutation Observers**: Batched child-list records delivered at checkpoints
//! - **Frames**: Animation frame callbacks run by [`Document::render_frame`]
//! - **Extensions**: Per-document services keyed by type
//!
//! # Example
//!
//! ```
//! use horizon_accordion_core::{Document, EventType, Length};
//!
//! let mut doc = Document::new();
//! let button = doc.create_element("button");
//! let panel = doc.create_element("div");
//! doc.set_intrinsic_height(panel, 120.0).unwrap();
//! doc.set_height(panel, Length::Px(0.0)).unwrap();
//! doc.append_child(doc.root(), button).unwrap();
//! doc.append_child(doc.root(), panel).unwrap();
//!
//! doc.add_event_listener(button, EventType::Click, move |doc, _event| {
//!     let natural = doc.scroll_height(panel).unwrap_or(0.0);
//!     doc.request_animation_frame(move |doc| {
//!         let _ = doc.set_height(panel, Length::Px(natural));
//!     });
//! }).unwrap();
//!
//! doc.click(button).unwrap();
//! assert_eq!(doc.offset_height(panel).unwrap(), 0.0);
//! doc.render_frame();
//! assert_eq!(doc.offset_height(panel).unwrap(), 120.0);
//! ```

mod document;
pub mod element;
mod error;
pub mod event;
pub mod logging;
pub mod observer;
mod scheduler;
mod shared;
pub mod style;

pub use document::{
    DEFAULT_LINE_HEIGHT, Document, DocumentConfig, NodeId, NodeKind, dataset_attribute_name,
};
pub use element::{
    CustomElement, CustomElementRegistry, Element, ElementDefinition, element_cast,
    element_cast_mut, is_valid_custom_element_name,
};
pub use error::{DomError, DomResult};
pub use event::{Event, EventType, Listener, ListenerId};
pub use logging::{DocumentTreeDebug, TreeFormatOptions, TreeStyle};
pub use observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId};
pub use scheduler::{FrameCallback, FrameCallbackId};
pub use shared::SharedDocument;
pub use style::{InlineStyle, Length, ParseLengthError};
