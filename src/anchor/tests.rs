use std::collections::HashMap;

use super::*;
use crate::config::LayoutConfig;
use crate::toc::extract_toc;
use crate::transform::transform;

struct FixedTops(HashMap<*const markup5ever_rcdom::Node, f64>);

impl LayoutProbe for FixedTops {
    fn element_top(&self, node: &Handle) -> Option<f64> {
        self.0.get(&Rc::as_ptr(node)).copied()
    }
}

fn fixed(node: &Handle, top: f64) -> FixedTops {
    FixedTops(HashMap::from([(Rc::as_ptr(node), top)]))
}

fn round_layout() -> LayoutConfig {
    LayoutConfig {
        line_height_px: 20.0,
        block_spacing_px: 10.0,
        image_height_px: 300.0,
        ..LayoutConfig::default()
    }
}

#[test]
fn resolves_visible_heading_over_hidden_listing_link() {
    let doc = RenderedDocument::parse(
        r##"<p hidden=""><a href="#section-1" id="section-1">1. Introduction 4</a></p>
            <div id="section-1" class="section-marker"><h2>1. Introduction</h2></div>"##,
    );

    let target = doc.resolve("section-1").expect("target resolves");
    assert!(dom::is_tag(&target, "div"));
    assert!(dom::has_class(&target, "section-marker"));
    assert_eq!(doc.candidates("section-1").len(), 2);
}

#[test]
fn missing_identifier_resolves_to_none() {
    let doc = RenderedDocument::parse("<h1 id=\"section-1\">1. Intro</h1>");
    assert!(doc.resolve("section-404").is_none());
}

#[test]
fn anchor_candidates_stand_for_their_heading() {
    let doc = RenderedDocument::parse(r#"<h1><a name="_Toc5"></a>2. Setup</h1><p>body</p>"#);
    let target = doc.resolve("_Toc5").expect("target resolves");
    assert!(dom::is_tag(&target, "h1"));
}

#[test]
fn anchor_without_block_container_is_its_own_target() {
    let doc = RenderedDocument::parse(r#"<a id="loose"></a>text"#);
    let target = doc.resolve("loose").expect("target resolves");
    assert!(dom::is_tag(&target, "a"));
}

#[test]
fn last_visible_duplicate_wins() {
    let doc = RenderedDocument::parse(
        r#"<h2 id="dup">first</h2><p>gap</p><h2 id="dup">second</h2>"#,
    );
    let target = doc.resolve("dup").expect("target resolves");
    assert_eq!(dom::text_content(&target), "second");
}

#[test]
fn all_hidden_candidates_fall_back_to_last() {
    let doc = RenderedDocument::parse(
        r#"<div style="display: none"><p id="x">one</p></div><p hidden id="x">two</p>"#,
    );
    let target = doc.resolve("x").expect("falls back");
    assert_eq!(dom::text_content(&target), "two");
    assert!(doc.is_hidden(&target));
}

#[test]
fn hidden_ancestor_hides_descendants() {
    let doc = RenderedDocument::parse(
        r#"<section style="DISPLAY:NONE"><div><p id="deep">x</p></div></section><p id="shown">y</p>"#,
    );
    let deep = doc.candidates("deep").remove(0);
    let shown = doc.candidates("shown").remove(0);
    assert!(doc.is_hidden(&deep));
    assert!(!doc.is_hidden(&shown));
}

#[test]
fn preview_source_requires_annotation() {
    let doc = RenderedDocument::parse(
        r#"<img src="plain.png"><img src="shot.png" class="doc-image" data-preview="image">"#,
    );
    let images = doc.images();
    assert_eq!(images.len(), 2);
    assert_eq!(doc.preview_source(&images[0]), None);
    assert_eq!(doc.preview_source(&images[1]).as_deref(), Some("shot.png"));
    assert_eq!(doc.preview_images(), vec!["shot.png".to_string()]);
}

#[test]
fn scroll_is_relative_to_container_minus_offset() {
    let doc = RenderedDocument::parse("<h1 id=\"a\">x</h1>");
    let target = doc.resolve("a").expect("target resolves");
    let container = ContainerMetrics {
        top: 56.0,
        scroll_top: 200.0,
    };

    let command = scroll_command(&target, container, &fixed(&target, 500.0), 80.0)
        .expect("target is laid out");
    assert_eq!(command.top, 564.0);
    assert_eq!(command.behavior, ScrollBehavior::Smooth);
}

#[test]
fn scroll_never_goes_above_the_top() {
    let doc = RenderedDocument::parse("<h1 id=\"a\">x</h1>");
    let target = doc.resolve("a").expect("target resolves");
    let container = ContainerMetrics {
        top: 56.0,
        scroll_top: 0.0,
    };

    let command = scroll_command(&target, container, &fixed(&target, 60.0), 80.0)
        .expect("target is laid out");
    assert_eq!(command.top, 0.0);
}

#[test]
fn unmeasured_target_produces_no_scroll() {
    let doc = RenderedDocument::parse("<h1 id=\"a\">x</h1>");
    let target = doc.resolve("a").expect("target resolves");
    let probe = FixedTops(HashMap::new());
    let container = ContainerMetrics {
        top: 0.0,
        scroll_top: 0.0,
    };
    assert!(scroll_command(&target, container, &probe, 80.0).is_none());
}

#[test]
fn flow_layout_stacks_blocks_and_skips_hidden() {
    let config = round_layout();
    let doc = RenderedDocument::parse(
        r#"<p id="a">short</p><p id="gone" hidden>invisible</p><div><p id="b">next</p><img id="pic" src="x.png"></div>"#,
    );
    let flow = FlowLayout::measure(doc.root(), &config);

    let a = doc.candidates("a").remove(0);
    let gone = doc.candidates("gone").remove(0);
    let b = doc.candidates("b").remove(0);
    let pic = doc.candidates("pic").remove(0);

    let line = config.line_height_px + config.block_spacing_px;
    assert_eq!(flow.offset_of(&a), Some(0.0));
    assert_eq!(flow.offset_of(&gone), None);
    assert_eq!(flow.offset_of(&b), Some(line));
    assert_eq!(flow.offset_of(&pic), Some(2.0 * line));
    assert_eq!(
        flow.content_height(),
        2.0 * line + config.image_height_px + config.block_spacing_px
    );
}

#[test]
fn flow_scroll_target_ignores_current_scroll_position() {
    let config = round_layout();
    let html = format!("{}<h2 id=\"target\">1. Target</h2>", "<p>filler text</p>".repeat(20));
    let doc = RenderedDocument::parse(&html);
    let target = doc.resolve("target").expect("target resolves");

    let top = FlowLayout::measure(doc.root(), &config);
    let scrolled = FlowLayout::measure(doc.root(), &config).scrolled_to(300.0);

    let from_top = scroll_command(&target, top.container(), &top, 80.0).expect("laid out");
    let from_scrolled =
        scroll_command(&target, scrolled.container(), &scrolled, 80.0).expect("laid out");
    assert_eq!(from_top, from_scrolled);

    let offset = top.offset_of(&target).expect("laid out");
    assert_eq!(from_top.top, offset - 80.0);
}

#[test]
fn transformed_document_resolves_every_matched_entry() {
    let raw = r#"
        <p>Contents</p>
        <p>1. Introduction 4</p>
        <p>2. Usage 9</p>
        <p>1. Introduction</p>
        <p>text</p>
        <p>2. Usage</p>
    "#;
    let toc = extract_toc(raw);
    let doc = RenderedDocument::parse(&transform(raw, &toc));

    for entry in &toc {
        let target = doc.resolve(&entry.id).expect("marker resolves");
        assert!(!doc.is_hidden(&target));
        assert!(dom::has_class(&target, "section-marker"));
    }
    assert!(describe(&doc.resolve("section-2").expect("marker resolves")).starts_with("<div id=\"section-2\">"));
}
