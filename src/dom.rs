use std::cell::RefCell;
use std::rc::Rc;

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub fn parse_html(input: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(input)
}

/// The `<body>` of a parsed document, or the document node when the parser
/// produced none.
pub fn body(dom: &RcDom) -> Handle {
    find_element(&dom.document, "body").unwrap_or_else(|| dom.document.clone())
}

pub fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if is_tag(node, tag) {
        return Some(node.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

pub fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

pub fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

pub fn is_tag(node: &Handle, tag: &str) -> bool {
    match &node.data {
        NodeData::Element { name, .. } => (*name.local).eq_ignore_ascii_case(tag),
        _ => false,
    }
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

pub fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Block-level elements, the units of document flow.
pub fn is_block_tag(tag: &str) -> bool {
    is_heading_tag(tag)
        || matches!(
            tag,
            "p" | "div"
                | "section"
                | "article"
                | "main"
                | "nav"
                | "header"
                | "footer"
                | "aside"
                | "ul"
                | "ol"
                | "li"
                | "dl"
                | "dt"
                | "dd"
                | "table"
                | "pre"
                | "blockquote"
                | "figure"
                | "form"
                | "center"
                | "address"
                | "details"
                | "hr"
        )
}

/// Element descendants of `node` in document order, `node` excluded.
pub fn descendant_elements(node: &Handle) -> Vec<Handle> {
    fn walk(node: &Handle, out: &mut Vec<Handle>) {
        for child in node.children.borrow().iter() {
            if is_element(child) {
                out.push(child.clone());
            }
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    walk(node, &mut out);
    out
}

pub fn attr(node: &Handle, key: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| (*a.name.local).eq_ignore_ascii_case(key))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub fn has_attr(node: &Handle, key: &str) -> bool {
    attr(node, key).is_some()
}

/// True when the element itself is display-hidden, through the `hidden`
/// attribute or an inline `display: none`.
pub fn hides_itself(node: &Handle) -> bool {
    if has_attr(node, "hidden") {
        return true;
    }
    attr(node, "style")
        .map(|style| {
            style
                .to_ascii_lowercase()
                .replace(char::is_whitespace, "")
                .contains("display:none")
        })
        .unwrap_or(false)
}

/// Sets `key` to `value`, replacing an existing value. Returns false when the
/// attribute already carried exactly `value`.
pub fn set_attr(node: &Handle, key: &str, value: &str) -> bool {
    let NodeData::Element { attrs, .. } = &node.data else {
        return false;
    };

    let mut attrs = attrs.borrow_mut();
    if let Some(existing) = attrs
        .iter_mut()
        .find(|a| (*a.name.local).eq_ignore_ascii_case(key))
    {
        if &*existing.value == value {
            return false;
        }
        existing.value = StrTendril::from(value);
        return true;
    }

    attrs.push(Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from(key)),
        value: StrTendril::from(value),
    });
    true
}

pub fn classes(node: &Handle) -> Vec<String> {
    attr(node, "class")
        .map(|value| value.split_whitespace().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

pub fn has_class(node: &Handle, class: &str) -> bool {
    classes(node).iter().any(|value| value == class)
}

/// Adds `class` unless it is already present. Returns true when the class
/// list changed.
pub fn add_class(node: &Handle, class: &str) -> bool {
    if !is_element(node) || has_class(node, class) {
        return false;
    }

    let mut list = classes(node);
    list.push(class.to_string());
    set_attr(node, "class", &list.join(" "))
}

/// Concatenated text of all descendant text nodes, script and style content
/// excluded, not normalized.
pub fn raw_text(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, false, &mut out);
    out
}

fn collect_text(node: &Handle, skip_hidden: bool, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Element { name, .. } => {
            if matches!(&*name.local, "script" | "style" | "template") {
                return;
            }
            for child in node.children.borrow().iter() {
                if skip_hidden && is_element(child) && hides_itself(child) {
                    continue;
                }
                collect_text(child, skip_hidden, out);
            }
        }
        NodeData::Document => {
            for child in node.children.borrow().iter() {
                collect_text(child, skip_hidden, out);
            }
        }
        _ => {}
    }
}

/// Text content with whitespace runs (tabs and non-breaking spaces included)
/// collapsed to single spaces and trimmed.
pub fn text_content(node: &Handle) -> String {
    normalize_text(&raw_text(node))
}

/// Normalized text a reader actually sees: hidden descendants of `node`
/// (Word hides leaders and page numbers this way) contribute nothing.
pub fn visible_text(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, true, &mut out);
    normalize_text(&out)
}

pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn element(tag: &str, attributes: &[(&str, &str)], kids: Vec<Handle>) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(key, value)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(*key)),
            value: StrTendril::from(*value),
        })
        .collect::<Vec<Attribute>>();

    let node = Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    });
    for kid in kids {
        append_child(&node, kid);
    }
    node
}

pub fn text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|value| value.upgrade());
    node.parent.set(weak);
    parent
}

/// Swaps `old` for `new` in the parent's child list. Returns false when `old`
/// is detached.
pub fn replace_node(old: &Handle, new: Handle) -> bool {
    let Some(parent) = parent_of(old) else {
        return false;
    };

    let mut kids = parent.children.borrow_mut();
    let Some(index) = kids.iter().position(|kid| Rc::ptr_eq(kid, old)) else {
        return false;
    };

    new.parent.set(Some(Rc::downgrade(&parent)));
    kids[index] = new;
    old.parent.set(None);
    true
}

pub fn detach(node: &Handle) -> bool {
    let Some(parent) = parent_of(node) else {
        return false;
    };

    let mut kids = parent.children.borrow_mut();
    let before = kids.len();
    kids.retain(|kid| !Rc::ptr_eq(kid, node));
    node.parent.set(None);
    kids.len() != before
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

// Children of these elements are raw text and must leave the serializer
// unescaped.
fn is_raw_text(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "script" | "style" | "xmp" | "iframe" | "noembed" | "noframes" | "plaintext" | "noscript"
    )
}

fn serialize_node(out: &mut String, node: &Handle, raw_parent: bool) {
    match &node.data {
        NodeData::Text { contents } => {
            if raw_parent {
                out.push_str(&contents.borrow());
            } else {
                out.push_str(&escape_text(&contents.borrow()));
            }
        }
        NodeData::Comment { contents } => {
            out.push_str("<!--");
            out.push_str(contents);
            out.push_str("-->");
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let tag = name.local.to_string();
            out.push('<');
            out.push_str(&tag);
            for a in attrs.borrow().iter() {
                out.push(' ');
                if let Some(prefix) = &a.name.prefix {
                    out.push_str(prefix);
                    out.push(':');
                }
                out.push_str(&a.name.local);
                out.push_str("=\"");
                out.push_str(&escape_attr(&a.value));
                out.push('"');
            }
            if is_void(&tag) {
                out.push_str("/>");
                return;
            }
            out.push('>');

            let raw = is_raw_text(&tag);
            if let Some(contents) = template_contents.borrow().as_ref() {
                for child in contents.children.borrow().iter() {
                    serialize_node(out, child, raw);
                }
            }
            for child in node.children.borrow().iter() {
                serialize_node(out, child, raw);
            }

            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
        }
        NodeData::Document => {
            for child in node.children.borrow().iter() {
                serialize_node(out, child, false);
            }
        }
        NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {}
    }
}

/// Serializes the children of `node` (not the node itself).
pub fn serialize_children(node: &Handle) -> String {
    let mut out = String::new();
    for child in node.children.borrow().iter() {
        serialize_node(&mut out, child, false);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_keeps_body_markup() {
        let dom = parse_html("<p class=\"a\">One &amp; two</p><img src=\"x.png\">");
        let out = serialize_children(&body(&dom));
        assert_eq!(out, "<p class=\"a\">One &amp; two</p><img src=\"x.png\"/>");
    }

    #[test]
    fn serialize_does_not_escape_style_content() {
        let dom = parse_html("<div><style>p > b { color: red }</style></div>");
        let out = serialize_children(&body(&dom));
        assert!(out.contains("p > b"));
    }

    #[test]
    fn add_class_is_idempotent() {
        let dom = parse_html("<table class=\"x\"></table>");
        let table = find_element(&dom.document, "table").expect("table parsed");
        assert!(add_class(&table, "doc-table"));
        assert!(!add_class(&table, "doc-table"));
        assert_eq!(attr(&table, "class").as_deref(), Some("x doc-table"));
    }

    #[test]
    fn visible_text_skips_hidden_descendants() {
        let dom = parse_html(
            r##"<a href="#_Toc1">1.&nbsp;Intro<span style="display:none">. </span><span hidden>4</span></a>"##,
        );
        let link = find_element(&dom.document, "a").expect("link parsed");
        assert_eq!(visible_text(&link), "1. Intro");
        assert_eq!(text_content(&link), "1. Intro. 4");
    }

    #[test]
    fn is_tag_and_attr_ignore_ascii_case() {
        let dom = parse_html(r#"<P ID="x">t</P>"#);
        let p = find_element(&dom.document, "p").expect("p parsed");
        assert!(is_tag(&p, "P"));
        assert_eq!(attr(&p, "Id").as_deref(), Some("x"));
        assert!(set_attr(&p, "ID", "y"));
        assert_eq!(attr(&p, "id").as_deref(), Some("y"));
    }

    #[test]
    fn text_content_collapses_tabs_and_nbsp() {
        let dom = parse_html("<p><b>2.3.</b>\u{a0}\tNetwork   Topology</p>");
        let p = find_element(&dom.document, "p").expect("p parsed");
        assert_eq!(text_content(&p), "2.3. Network Topology");
    }

    #[test]
    fn replace_node_swaps_in_place() {
        let dom = parse_html("<p>a</p><p>b</p><p>c</p>");
        let root = body(&dom);
        let second = children(&root)[1].clone();
        let div = element("div", &[("id", "x")], vec![text_node("B")]);
        assert!(replace_node(&second, div));
        assert_eq!(
            serialize_children(&root),
            "<p>a</p><div id=\"x\">B</div><p>c</p>"
        );
    }
}
