//! Nested accordions declared as markup, driven by clicks.
//!
//! Run with `RUST_LOG=horizon_accordion=debug` to watch the widgets work.

use horizon_accordion::prelude::*;
use horizon_accordion_core::{CustomElement, DocumentTreeDebug, TreeFormatOptions};
use tracing_subscriber::EnvFilter;

fn accordion_markup(doc: &mut Document, title: &str, lines: &str) -> DomResult<NodeId> {
    let node = doc.create_element(Accordion::TAG);
    doc.set_dataset(node, "title", title)?;
    let text = doc.create_text(lines);
    doc.append_child(node, text)?;
    Ok(node)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut doc = Document::new();
    let root = doc.root();

    let faq = accordion_markup(&mut doc, "FAQ", "Frequently asked questions")?;
    doc.set_dataset(faq, "id", "faq")?;
    let fan = doc.create_element(AccordionFan::TAG);
    for (question, answer) in [
        ("Is it fast?", "Yes."),
        ("Does it nest?", "As deep as you like.\nHeights follow."),
        ("Can I group?", "Fans group for you."),
    ] {
        let item = accordion_markup(&mut doc, question, answer)?;
        doc.append_child(fan, item)?;
    }
    doc.append_child(faq, fan)?;
    doc.append_child(root, faq)?;

    // Markup stays inert until the elements are defined.
    install(&mut doc)?;
    doc.run_until_idle();

    let faq = Accordion::find_by_id(&doc, "faq").ok_or("faq accordion missing")?;
    let faq_title = Accordion::get(&doc, faq)?
        .title_region()
        .ok_or("faq not attached")?;
    doc.click(faq_title)?;

    let answers = doc.descendants_of_type::<Accordion>(fan);
    for &answer in &answers {
        let title = Accordion::get(&doc, answer)?
            .title_region()
            .ok_or("answer not attached")?;
        doc.click(title)?;
        doc.run_until_idle();

        let body = Accordion::get(&doc, faq)?
            .body_region()
            .ok_or("faq not attached")?;
        println!(
            "opened {:?}: faq body is {}px",
            doc.text_content(title),
            doc.offset_height(body)?
        );
    }

    print!("{}", DocumentTreeDebug::with_options(TreeFormatOptions::default()).format_all(&doc));
    Ok(())
}
