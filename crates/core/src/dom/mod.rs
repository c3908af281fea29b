// ABOUTME: Shared DOM utilities: parsing, rewrite-serialization, emptiness predicate.
// ABOUTME: Every mutating stage parses with scraper, marks nodes, and re-serializes through Rewrite.

use std::collections::{HashMap, HashSet};

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};

/// Parse a whole document. html5ever always synthesizes an `<html>`/`<body>`
/// skeleton, so fragments without a wrapper still land under `<body>`.
pub fn parse_doc(html: &str) -> Html {
    Html::parse_document(html)
}

/// The working container: `<body>` when present, else the document root.
pub fn body_node(doc: &Html) -> NodeRef<'_, Node> {
    let body = Selector::parse("body").unwrap();
    doc.select(&body)
        .next()
        .map(|el| *el)
        .unwrap_or_else(|| *doc.root_element())
}

/// Check if tag is a void element.
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag.to_lowercase().as_str(),
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
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Escape attribute value.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text-node content. `&nbsp;` survives as an entity so emptiness
/// checks keep seeing it after a serialize/re-parse round trip.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

/// Node edits applied while re-serializing a parsed tree.
///
/// The tree itself is never mutated; transforms collect `NodeId`s into one of
/// these sets/maps and the serializer applies them on the way out.
#[derive(Debug, Default)]
pub struct Rewrite {
    /// Nodes dropped with their entire subtree.
    pub skip: HashSet<NodeId>,
    /// Elements whose tag is removed, children promoted in place.
    pub unwrap: HashSet<NodeId>,
    /// Nodes replaced wholesale by a raw HTML string.
    pub replace: HashMap<NodeId, String>,
    /// Raw HTML injected before / after a node's own output.
    pub insert_before: HashMap<NodeId, String>,
    pub insert_after: HashMap<NodeId, String>,
    /// Text nodes whose content is rewritten (already-escaped not expected;
    /// the serializer escapes).
    pub set_text: HashMap<NodeId, String>,
    /// Attribute overrides per element: `Some(value)` sets, `None` removes.
    /// Attributes not present on the element are appended.
    pub set_attrs: HashMap<NodeId, Vec<(String, Option<String>)>>,
    /// Drop all comment nodes.
    pub drop_comments: bool,
    /// Drop every `style` attribute.
    pub strip_styles: bool,
    /// Drop every `data-*` attribute.
    pub strip_data_attrs: bool,
    /// Drop every `id` attribute.
    pub strip_ids: bool,
}

impl Rewrite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the children of `node` with all edits applied.
    pub fn apply(&self, node: NodeRef<'_, Node>) -> String {
        let mut out = String::new();
        self.serialize_children(node, &mut out);
        out
    }

    pub fn serialize_children(&self, node: NodeRef<'_, Node>, out: &mut String) {
        for child in node.children() {
            self.serialize_node(child, out);
        }
    }

    fn serialize_node(&self, node: NodeRef<'_, Node>, out: &mut String) {
        if self.skip.contains(&node.id()) {
            return;
        }
        if let Some(before) = self.insert_before.get(&node.id()) {
            out.push_str(before);
        }
        if let Some(raw) = self.replace.get(&node.id()) {
            out.push_str(raw);
            if let Some(after) = self.insert_after.get(&node.id()) {
                out.push_str(after);
            }
            return;
        }
        match node.value() {
            Node::Text(text) => {
                if let Some(replacement) = self.set_text.get(&node.id()) {
                    out.push_str(&escape_text(replacement));
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            Node::Comment(comment) => {
                if !self.drop_comments {
                    out.push_str("<!--");
                    out.push_str(comment);
                    out.push_str("-->");
                }
            }
            Node::Element(el) => {
                if self.unwrap.contains(&node.id()) {
                    self.serialize_children(node, out);
                } else {
                    let name = el.name();
                    out.push('<');
                    out.push_str(name);
                    self.serialize_attrs(node.id(), el, out);
                    if is_void_element(name) {
                        out.push_str(" />");
                    } else {
                        out.push('>');
                        self.serialize_children(node, out);
                        out.push_str("</");
                        out.push_str(name);
                        out.push('>');
                    }
                }
            }
            _ => {}
        }
        if let Some(after) = self.insert_after.get(&node.id()) {
            out.push_str(after);
        }
    }

    fn serialize_attrs(&self, id: NodeId, el: &scraper::node::Element, out: &mut String) {
        let overrides = self.set_attrs.get(&id);
        let mut emitted: HashSet<String> = HashSet::new();

        for (name, value) in el.attrs() {
            if self.attr_globally_dropped(name) {
                continue;
            }
            let decided = match overrides.and_then(|o| o.iter().find(|(k, _)| k == name)) {
                Some((_, Some(v))) => Some(v.clone()),
                Some((_, None)) => None,
                None => Some(value.to_string()),
            };
            if let Some(v) = decided {
                push_attr(out, name, &v);
            }
            emitted.insert(name.to_string());
        }

        if let Some(overrides) = overrides {
            for (name, value) in overrides {
                if emitted.contains(name) || self.attr_globally_dropped(name) {
                    continue;
                }
                if let Some(v) = value {
                    push_attr(out, name, v);
                }
            }
        }
    }

    fn attr_globally_dropped(&self, name: &str) -> bool {
        (self.strip_styles && name.eq_ignore_ascii_case("style"))
            || (self.strip_data_attrs && name.to_ascii_lowercase().starts_with("data-"))
            || (self.strip_ids && name.eq_ignore_ascii_case("id"))
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attr(value));
    out.push('"');
}

/// Inner HTML of a node with no edits.
pub fn inner_html(node: NodeRef<'_, Node>) -> String {
    Rewrite::new().apply(node)
}

/// Inner HTML with descendant `style` attributes optionally stripped.
pub fn inner_html_styled(node: NodeRef<'_, Node>, keep_styles: bool) -> String {
    let rw = Rewrite {
        strip_styles: !keep_styles,
        ..Rewrite::new()
    };
    rw.apply(node)
}

/// Outer HTML of a single node.
pub fn outer_html(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    Rewrite::new().serialize_node(node, &mut out);
    out
}

/// Outer HTML with `style` attributes optionally stripped throughout.
pub fn outer_html_styled(node: NodeRef<'_, Node>, keep_styles: bool) -> String {
    let rw = Rewrite {
        strip_styles: !keep_styles,
        ..Rewrite::new()
    };
    let mut out = String::new();
    rw.serialize_node(node, &mut out);
    out
}

/// The one shared definition of "this element holds no real content".
///
/// Empty means: no child elements (a lone `<br>` counts as empty only when
/// `br_is_empty`) and text that trims to nothing once `&nbsp;` is treated as
/// plain whitespace.
pub fn is_semantically_empty(el: &ElementRef, br_is_empty: bool) -> bool {
    for child in el.children() {
        if let Node::Element(e) = child.value() {
            let name = e.name().to_ascii_lowercase();
            if br_is_empty && name == "br" {
                continue;
            }
            return false;
        }
    }
    let text: String = el.text().collect();
    text.replace('\u{a0}', " ").trim().is_empty()
}

/// Text content of an element with `&nbsp;` normalized to plain spaces.
pub fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().replace('\u{a0}', " ")
}
