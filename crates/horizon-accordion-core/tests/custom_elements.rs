//! Custom element lifecycle tests.

use std::sync::Arc;

use horizon_accordion_core::{CustomElement, Document, DomError, DomResult, Element, NodeId};
use parking_lot::Mutex;

/// Log of lifecycle calls shared with the test through a document extension.
#[derive(Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

fn journal(doc: &mut Document) -> Arc<Mutex<Vec<String>>> {
    Arc::clone(&doc.extension_or_default::<Journal>().0)
}

fn note(doc: &mut Document, entry: String) {
    journal(doc).lock().push(entry);
}

struct Tracker {
    name: String,
    connections: u32,
}

impl Element for Tracker {
    fn debug_summary(&self) -> Option<String> {
        Some(format!("name={}", self.name))
    }
}

impl CustomElement for Tracker {
    const TAG: &'static str = "x-tracker";

    fn construct(doc: &mut Document, node: NodeId) -> Self {
        let name = doc.dataset(node, "name").unwrap_or_default();
        note(doc, format!("construct {name}"));
        Self {
            name,
            connections: 0,
        }
    }

    fn connected(doc: &mut Document, node: NodeId) -> DomResult<()> {
        let tracker = doc
            .element_mut::<Tracker>(node)
            .ok_or_else(DomError::type_mismatch::<Tracker>)?;
        tracker.connections += 1;
        let name = tracker.name.clone();
        note(doc, format!("connected {name}"));
        Ok(())
    }

    fn disconnected(doc: &mut Document, node: NodeId) -> DomResult<()> {
        let name = doc
            .element::<Tracker>(node)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        note(doc, format!("disconnected {name}"));
        Ok(())
    }
}

struct Faulty;

impl Element for Faulty {}

impl CustomElement for Faulty {
    const TAG: &'static str = "x-faulty";

    fn construct(_doc: &mut Document, _node: NodeId) -> Self {
        Faulty
    }

    fn connected(_doc: &mut Document, _node: NodeId) -> DomResult<()> {
        Err(DomError::invalid_state("always fails"))
    }
}

fn tracker(doc: &mut Document, name: &str) -> NodeId {
    let node = doc.create_element(Tracker::TAG);
    doc.set_dataset(node, "name", name).unwrap();
    node
}

fn entries(doc: &mut Document) -> Vec<String> {
    journal(doc).lock().clone()
}

#[test]
fn test_define_upgrades_connected_nodes_in_tree_order() {
    let mut doc = Document::new();
    let outer = tracker(&mut doc, "outer");
    let inner = tracker(&mut doc, "inner");
    let detached = tracker(&mut doc, "detached");
    doc.append_child(outer, inner).unwrap();
    let root = doc.root();
    doc.append_child(root, outer).unwrap();
    assert!(!doc.has_element_state(outer));

    doc.define_element::<Tracker>().unwrap();

    assert_eq!(
        entries(&mut doc),
        vec![
            "construct outer",
            "connected outer",
            "construct inner",
            "connected inner",
        ]
    );
    assert!(!doc.has_element_state(detached));
    assert_eq!(doc.element_summary(inner).as_deref(), Some("name=inner"));
}

#[test]
fn test_reinsertion_reconnects_without_reconstructing() {
    let mut doc = Document::new();
    doc.define_element::<Tracker>().unwrap();
    let node = tracker(&mut doc, "a");
    let root = doc.root();
    doc.append_child(root, node).unwrap();
    doc.remove(node).unwrap();
    doc.append_child(root, node).unwrap();

    assert_eq!(
        entries(&mut doc),
        vec!["construct a", "connected a", "disconnected a", "connected a"]
    );
    assert_eq!(doc.element::<Tracker>(node).unwrap().connections, 2);
}

#[test]
fn test_move_within_document_disconnects_then_connects() {
    let mut doc = Document::new();
    doc.define_element::<Tracker>().unwrap();
    let left = doc.create_element("div");
    let right = doc.create_element("div");
    let root = doc.root();
    doc.append_child(root, left).unwrap();
    doc.append_child(root, right).unwrap();
    let node = tracker(&mut doc, "m");
    doc.append_child(left, node).unwrap();
    journal(&mut doc).lock().clear();

    doc.append_child(right, node).unwrap();
    assert_eq!(entries(&mut doc), vec!["disconnected m", "connected m"]);
}

#[test]
fn test_detached_insertion_runs_no_reactions() {
    let mut doc = Document::new();
    doc.define_element::<Tracker>().unwrap();
    let holder = doc.create_element("div");
    let node = tracker(&mut doc, "x");
    doc.append_child(holder, node).unwrap();
    assert!(entries(&mut doc).is_empty());
    assert!(!doc.has_element_state(node));
}

#[test]
fn test_failing_reaction_does_not_fail_mutation() {
    let mut doc = Document::new();
    doc.define_element::<Faulty>().unwrap();
    doc.define_element::<Tracker>().unwrap();
    let faulty = doc.create_element(Faulty::TAG);
    let after = tracker(&mut doc, "after");
    doc.append_child(faulty, after).unwrap();

    let root = doc.root();
    assert!(doc.append_child(root, faulty).is_ok());
    assert!(doc.element::<Faulty>(faulty).is_some());
    assert_eq!(doc.element::<Tracker>(after).unwrap().connections, 1);
}

#[test]
fn test_define_twice_is_an_error() {
    let mut doc = Document::new();
    doc.define_element::<Tracker>().unwrap();
    assert_eq!(
        doc.define_element::<Tracker>(),
        Err(DomError::AlreadyDefined("x-tracker".to_string()))
    );
    assert!(doc.custom_elements().is_defined(Tracker::TAG));
}

#[test]
fn test_explicit_upgrade() {
    let mut doc = Document::new();
    doc.define_element::<Tracker>().unwrap();
    let node = tracker(&mut doc, "manual");
    assert!(doc.upgrade(node).unwrap());
    assert!(!doc.upgrade(node).unwrap());
    assert_eq!(doc.element::<Tracker>(node).unwrap().connections, 0);

    let plain = doc.create_element("div");
    assert!(!doc.upgrade(plain).unwrap());
}

#[test]
fn test_destroy_runs_disconnected_first() {
    let mut doc = Document::new();
    doc.define_element::<Tracker>().unwrap();
    let node = tracker(&mut doc, "gone");
    let root = doc.root();
    doc.append_child(root, node).unwrap();
    doc.destroy(node).unwrap();
    assert_eq!(entries(&mut doc).last().map(String::as_str), Some("disconnected gone"));
    assert!(!doc.contains(node));
}
