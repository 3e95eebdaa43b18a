//! Logging and debugging facilities for Horizon Accordion.
//!
//! This module provides:
//! - Target names for filtering the crate's `tracing` output
//! - Debug visualization for document trees
//!
//! # Tracing Integration
//!
//! Nothing is printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_accordion=debug,horizon_accordion_core::element=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use horizon_accordion_core::{Document, DocumentTreeDebug, TreeFormatOptions};
//!
//! let mut doc = Document::new();
//! let panel = doc.create_element("section");
//! doc.append_child(doc.root(), panel).unwrap();
//!
//! let dump = DocumentTreeDebug::with_options(TreeFormatOptions::minimal())
//!     .format_all(&doc);
//! assert!(dump.contains("<section>"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::document::{Document, NodeId, NodeKind};
use crate::error::DomResult;
use crate::style::Length;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_accordion_core";
    /// Tree mutation and event dispatch.
    pub const DOCUMENT: &str = "horizon_accordion_core::document";
    /// Custom element definitions and reactions.
    pub const ELEMENT: &str = "horizon_accordion_core::element";
    /// Mutation observer delivery.
    pub const OBSERVER: &str = "horizon_accordion_core::observer";
    /// Frame callbacks.
    pub const FRAME: &str = "horizon_accordion_core::frame";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash-prefixed lines.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to show classes and explicit heights.
    pub show_styles: bool,
    /// Whether to show element state summaries.
    pub show_elements: bool,
    /// Whether to list attributes below each element.
    pub show_attributes: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_styles: true,
            show_elements: true,
            show_attributes: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_attributes: true,
            ..Default::default()
        }
    }

    /// Options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_styles: false,
            show_elements: false,
            show_attributes: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing document trees.
#[derive(Debug, Clone, Default)]
pub struct DocumentTreeDebug {
    options: TreeFormatOptions,
}

impl DocumentTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole document.
    pub fn format_all(&self, doc: &Document) -> String {
        let mut output = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(output, "Document ({} nodes):", doc.node_count());
        let children = doc.children(doc.root()).unwrap_or_default();
        if children.is_empty() {
            output.push_str("  (empty)\n");
        }
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            self.format_subtree_into(doc, child, 1, i + 1 == count, &mut output);
        }
        output
    }

    /// Format a subtree starting at `root`.
    pub fn format_subtree(&self, doc: &Document, root: NodeId) -> DomResult<String> {
        doc.kind(root)?;
        let mut output = String::new();
        self.format_subtree_into(doc, root, 0, true, &mut output);
        Ok(output)
    }

    fn format_subtree_into(
        &self,
        doc: &Document,
        id: NodeId,
        depth: usize,
        is_last: bool,
        output: &mut String,
    ) {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let Ok(kind) = doc.kind(id) else {
            return;
        };

        output.push_str(&self.build_prefix(depth, is_last));
        match kind {
            NodeKind::Document => output.push_str("#document"),
            NodeKind::Element { tag } => {
                let _ = write!(output, "<{tag}>");
            }
            NodeKind::Text { text } => {
                let _ = write!(output, "{:?}", text);
            }
        }

        if self.options.show_ids {
            let _ = write!(output, " [{:?}]", id);
        }

        if self.options.show_styles {
            let classes = doc.classes(id);
            if !classes.is_empty() {
                let _ = write!(output, " .{}", classes.join("."));
            }
            if let Ok(style) = doc.style(id) {
                if let Length::Px(_) = style.height {
                    let _ = write!(output, " height={}", style.height);
                }
            }
        }

        if self.options.show_elements {
            if let Some(summary) = doc.element_summary(id) {
                let _ = write!(output, " {{{summary}}}");
            }
        }
        output.push('\n');

        if self.options.show_attributes {
            let prefix = self.build_property_prefix(depth);
            for (name, value) in doc.attributes(id) {
                let _ = writeln!(output, "{prefix}  @{name}={value:?}");
            }
        }

        let children = doc.children(id).unwrap_or_default();
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            self.format_subtree_into(doc, child, depth + 1, i + 1 == count, output);
        }
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }

    fn build_property_prefix(&self, depth: usize) -> String {
        let branch = match self.options.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };
        let mut prefix = String::new();
        for _ in 0..depth {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix
    }
}
