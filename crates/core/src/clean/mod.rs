// ABOUTME: Ordered HTML cleanup: tag removal, unwrapping, empty-element fixpoints, span merges.
// ABOUTME: Returns the <body> inner fragment that the policy engine and converter operate on.

pub mod artifacts;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Node};

use crate::dom::{self, Rewrite};
use crate::styles::extract::StyleMap;

/// Tags removed with their entire subtree by default. The trailing entries
/// are legacy Word markup that html5ever parses as ordinary unknown elements.
pub const DEFAULT_REMOVE_TAGS: &[&str] = &[
    "script",
    "style",
    "meta",
    "link",
    "title",
    "head",
    "o:p",
    "xml",
    "w:sdt",
    "smarttagtype",
];

/// Tags unwrapped (children promoted in place) by default.
pub const DEFAULT_UNWRAP_TAGS: &[&str] = &["font"];

/// Elements whose text whitespace is collapsed in the final pass.
const BLOCKISH_TAGS: &[&str] = &["p", "span", "div", "li", "td", "th"];

static WS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone)]
pub struct CleanOptions {
    pub remove_tags: Vec<String>,
    pub unwrap_tags: Vec<String>,
    pub remove_comments: bool,
    pub remove_data_attributes: bool,
    /// Off by default: ids are still needed downstream for anchors.
    pub remove_ids: bool,
    pub remove_empty_paragraphs: bool,
    pub collapse_whitespace: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            remove_tags: DEFAULT_REMOVE_TAGS.iter().map(|s| s.to_string()).collect(),
            unwrap_tags: DEFAULT_UNWRAP_TAGS.iter().map(|s| s.to_string()).collect(),
            remove_comments: true,
            remove_data_attributes: true,
            remove_ids: false,
            remove_empty_paragraphs: true,
            collapse_whitespace: true,
        }
    }
}

/// Run the full cleanup sequence and return the body inner fragment.
///
/// Step order matters: empty-span removal feeds the nested-span merge, which
/// in turn can produce new empty paragraphs for the later pass.
pub fn clean(html: &str, options: &CleanOptions) -> String {
    let mut current = structural_pass(html, options);
    current = remove_empty_loop(&current, "span");
    current = merge_nested_spans(&current);
    if options.remove_empty_paragraphs {
        current = remove_empty_loop(&current, "p");
    }
    if options.collapse_whitespace {
        current = collapse_whitespace(&current);
    }
    current
}

/// Steps 1-5: tag removal, unwrapping, comments, data-*/id attributes.
fn structural_pass(html: &str, options: &CleanOptions) -> String {
    let doc = dom::parse_doc(html);
    let body = dom::body_node(&doc);
    let mut rw = Rewrite {
        drop_comments: options.remove_comments,
        strip_data_attrs: options.remove_data_attributes,
        strip_ids: options.remove_ids,
        ..Rewrite::new()
    };

    for node in body.descendants() {
        if let Some(el) = ElementRef::wrap(node) {
            let tag = el.value().name().to_lowercase();
            if options.remove_tags.iter().any(|t| t == &tag) {
                rw.skip.insert(node.id());
            } else if options.unwrap_tags.iter().any(|t| t == &tag) {
                rw.unwrap.insert(node.id());
            }
        }
    }
    rw.apply(body)
}

/// Repeatedly remove semantically empty `<tag>` elements until a full pass
/// makes no change; removing an inner empty element can make its parent
/// newly empty.
fn remove_empty_loop(html: &str, tag: &str) -> String {
    let mut current = html.to_string();
    loop {
        let doc = dom::parse_doc(&current);
        let body = dom::body_node(&doc);
        let mut rw = Rewrite::new();
        for node in body.descendants() {
            if let Some(el) = ElementRef::wrap(node) {
                if el.value().name().eq_ignore_ascii_case(tag)
                    && dom::is_semantically_empty(&el, false)
                {
                    rw.skip.insert(node.id());
                }
            }
        }
        if rw.skip.is_empty() {
            return current;
        }
        current = rw.apply(body);
    }
}

/// Flatten `<span><span>…</span></span>` pairs: one span, styles merged with
/// the inner declarations winning, content taken from the inner span.
fn merge_nested_spans(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let doc = dom::parse_doc(&current);
        let body = dom::body_node(&doc);
        let mut rw = Rewrite::new();
        let mut merged_any = false;

        for node in body.descendants() {
            let el = match ElementRef::wrap(node) {
                Some(el) => el,
                None => continue,
            };
            if !el.value().name().eq_ignore_ascii_case("span") {
                continue;
            }
            if let Some(inner) = sole_span_child(&el) {
                // Deeper chains collapse pairwise across iterations.
                let replacement = merged_span_html(&el, &inner);
                rw.replace.insert(node.id(), replacement);
                merged_any = true;
            }
        }
        if !merged_any {
            return current;
        }
        current = rw.apply(body);
    }
}

/// The single span child of `el`, if its only content is that span plus
/// ignorable whitespace.
fn sole_span_child<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut found: Option<ElementRef<'a>> = None;
    for child in el.children() {
        match child.value() {
            Node::Element(e) => {
                if !e.name().eq_ignore_ascii_case("span") || found.is_some() {
                    return None;
                }
                found = ElementRef::wrap(child);
            }
            Node::Text(text) => {
                if !text.replace('\u{a0}', " ").trim().is_empty() {
                    return None;
                }
            }
            _ => {}
        }
    }
    found
}

fn merged_span_html(outer: &ElementRef, inner: &ElementRef) -> String {
    let mut style = StyleMap::parse(outer.value().attr("style").unwrap_or(""));
    style.merge_from(&StyleMap::parse(inner.value().attr("style").unwrap_or("")));

    let mut out = String::from("<span");
    for (name, value) in outer.value().attrs() {
        if name == "style" {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&dom::escape_attr(value));
        out.push('"');
    }
    if !style.is_empty() {
        out.push_str(" style=\"");
        out.push_str(&dom::escape_attr(&style.to_attr()));
        out.push('"');
    }
    out.push('>');
    out.push_str(&dom::inner_html(**inner));
    out.push_str("</span>");
    out
}

/// Step 9: collapse whitespace runs inside block-ish elements and drop
/// whitespace-only text sitting directly between tags. `<pre>` content is
/// left alone.
fn collapse_whitespace(html: &str) -> String {
    let doc = dom::parse_doc(html);
    let body = dom::body_node(&doc);
    let mut out = String::new();
    serialize_collapsed(body, false, false, &mut out);
    out
}

fn serialize_collapsed(node: ego_tree::NodeRef<'_, Node>, in_blockish: bool, in_pre: bool, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                if in_pre {
                    out.push_str(&dom::escape_text(text));
                    continue;
                }
                let is_ws_only = text.trim().is_empty() && !text.contains('\u{a0}');
                if is_ws_only {
                    let between_tags = matches!(
                        child.prev_sibling().map(|s| s.value().is_element()),
                        None | Some(true)
                    ) && matches!(
                        child.next_sibling().map(|s| s.value().is_element()),
                        None | Some(true)
                    );
                    if between_tags {
                        continue;
                    }
                }
                if in_blockish {
                    out.push_str(&dom::escape_text(&WS_RUN_RE.replace_all(text, " ")));
                } else {
                    out.push_str(&dom::escape_text(text));
                }
            }
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Element(el) => {
                let name = el.name().to_lowercase();
                out.push('<');
                out.push_str(el.name());
                for (k, v) in el.attrs() {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&dom::escape_attr(v));
                    out.push('"');
                }
                if dom::is_void_element(&name) {
                    out.push_str(" />");
                    continue;
                }
                out.push('>');
                serialize_collapsed(
                    child,
                    in_blockish || BLOCKISH_TAGS.contains(&name.as_str()),
                    in_pre || name == "pre",
                    out,
                );
                out.push_str("</");
                out.push_str(el.name());
                out.push('>');
            }
            _ => {}
        }
    }
}
