// ABOUTME: Applies extracted style maps onto matching elements as inline style attributes.
// ABOUTME: Specificity order element < class < id < existing inline; strips <style> tags last.

use scraper::{ElementRef, Selector};

use crate::dom::{self, Rewrite};
use crate::styles::extract::{extract, StyleIndex, StyleMap};

/// Options for `inline_all_styles`.
#[derive(Debug, Clone)]
pub struct InlineOptions {
    /// Keep `class` attributes after inlining.
    pub keep_classes: bool,
    /// Merge computed styles with pre-existing inline declarations. When
    /// false, elements that already carry a `style` attribute are left
    /// untouched.
    pub merge_existing: bool,
    /// Class names whose rules are never applied.
    pub ignore_classes: Vec<String>,
    pub apply_id_styles: bool,
    pub apply_element_styles: bool,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            keep_classes: false,
            merge_existing: true,
            ignore_classes: Vec::new(),
            apply_id_styles: true,
            apply_element_styles: true,
        }
    }
}

/// Extract the document's stylesheet index and apply it to every element
/// under `<body>`, then strip the `<style>` tags.
pub fn inline_all_styles(html: &str, options: &InlineOptions) -> String {
    let index = extract(html);
    let inlined = apply_index(html, &index, options);
    remove_style_tags(&inlined)
}

/// Apply a pre-built index to the document. Exposed separately so callers
/// holding an index from `extract` can reuse it.
pub fn apply_index(html: &str, index: &StyleIndex, options: &InlineOptions) -> String {
    let doc = dom::parse_doc(html);
    let body = dom::body_node(&doc);
    let mut rw = Rewrite::new();

    for node in body.descendants() {
        let el = match ElementRef::wrap(node) {
            Some(el) => el,
            None => continue,
        };
        let tag = el.value().name().to_lowercase();
        if tag == "style" || tag == "script" {
            continue;
        }

        let has_style_attr = el.value().attr("style").is_some();
        let existing = el.value().attr("style").filter(|s| !s.trim().is_empty());
        if existing.is_some() && !options.merge_existing {
            continue;
        }

        let merged = computed_style(&el, index, options);
        let mut overrides: Vec<(String, Option<String>)> = Vec::new();
        if merged.is_empty() {
            if has_style_attr {
                overrides.push(("style".to_string(), None));
            }
        } else {
            overrides.push(("style".to_string(), Some(merged.to_attr())));
        }
        if !options.keep_classes && el.value().attr("class").is_some() {
            overrides.push(("class".to_string(), None));
        }
        if !overrides.is_empty() {
            rw.set_attrs.insert(node.id(), overrides);
        }
    }

    let mut out = String::new();
    serialize_document(&doc, &rw, &mut out);
    out
}

/// Build the merged style map for one element in increasing specificity
/// order; the pre-existing inline style always wins.
fn computed_style(el: &ElementRef, index: &StyleIndex, options: &InlineOptions) -> StyleMap {
    let mut merged = StyleMap::new();
    let tag = el.value().name().to_lowercase();

    if options.apply_element_styles {
        if let Some(map) = index.element_map.get(&tag) {
            merged.merge_from(map);
        }
    }
    for class in el.value().classes() {
        if options.ignore_classes.iter().any(|c| c == class) {
            continue;
        }
        if let Some(map) = index.class_map.get(class) {
            merged.merge_from(map);
        }
    }
    if options.apply_id_styles {
        if let Some(id) = el.value().attr("id") {
            if let Some(map) = index.id_map.get(id) {
                merged.merge_from(map);
            }
        }
    }
    if let Some(existing) = el.value().attr("style") {
        merged.merge_from(&StyleMap::parse(existing));
    }
    merged
}

/// Delete every `<style>` element. Runs as its own final step whether or not
/// inlining ran: past this point all visual properties are explicit.
pub fn remove_style_tags(html: &str) -> String {
    let doc = dom::parse_doc(html);
    let sel = Selector::parse("style").unwrap();
    let mut rw = Rewrite::new();
    for el in doc.select(&sel) {
        rw.skip.insert(el.id());
    }
    let mut out = String::new();
    serialize_document(&doc, &rw, &mut out);
    out
}

/// Serialize the parsed document back with an explicit skeleton. The cleaner
/// takes body inner content at the end of the pipeline, so keeping the
/// wrapper here is harmless and preserves any remaining <head> styles for
/// later extraction passes.
fn serialize_document(doc: &scraper::Html, rw: &Rewrite, out: &mut String) {
    out.push_str("<html><head>");
    let head = Selector::parse("head").unwrap();
    if let Some(head_el) = doc.select(&head).next() {
        rw.serialize_children(*head_el, out);
    }
    out.push_str("</head><body>");
    rw.serialize_children(dom::body_node(doc), out);
    out.push_str("</body></html>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body_inner(html: &str) -> String {
        let doc = dom::parse_doc(html);
        dom::inner_html(dom::body_node(&doc))
    }

    #[test]
    fn test_class_rule_becomes_inline_style() {
        let html = "<style>.c1 { color: red }</style><p class=\"c1\">x</p>";
        let out = inline_all_styles(html, &InlineOptions::default());
        assert_eq!(body_inner(&out), "<p style=\"color: red\">x</p>");
    }

    #[test]
    fn test_existing_inline_always_wins() {
        let html = "<style>.c1 { color: red }</style><p class=\"c1\" style=\"color: blue\">x</p>";
        let out = inline_all_styles(html, &InlineOptions::default());
        assert_eq!(body_inner(&out), "<p style=\"color: blue\">x</p>");
    }

    #[test]
    fn test_specificity_element_class_id() {
        let html = concat!(
            "<style>p { color: black } .c { color: red } #i { color: green }</style>",
            "<p id=\"i\" class=\"c\">x</p>",
        );
        let out = inline_all_styles(html, &InlineOptions::default());
        assert_eq!(body_inner(&out), "<p id=\"i\" style=\"color: green\">x</p>");
    }

    #[test]
    fn test_keep_classes_option() {
        let html = "<style>.c1 { color: red }</style><p class=\"c1\">x</p>";
        let opts = InlineOptions {
            keep_classes: true,
            ..InlineOptions::default()
        };
        let out = inline_all_styles(html, &opts);
        assert_eq!(
            body_inner(&out),
            "<p class=\"c1\" style=\"color: red\">x</p>"
        );
    }

    #[test]
    fn test_ignore_classes() {
        let html = "<style>.skip { color: red }</style><p class=\"skip\">x</p>";
        let opts = InlineOptions {
            ignore_classes: vec!["skip".to_string()],
            ..InlineOptions::default()
        };
        let out = inline_all_styles(html, &opts);
        assert_eq!(body_inner(&out), "<p>x</p>");
    }

    #[test]
    fn test_merge_existing_false_leaves_styled_elements_alone() {
        let html = "<style>.c { margin: 0 }</style><p class=\"c\" style=\"color: blue\">x</p>";
        let opts = InlineOptions {
            merge_existing: false,
            keep_classes: true,
            ..InlineOptions::default()
        };
        let out = inline_all_styles(html, &opts);
        assert_eq!(
            body_inner(&out),
            "<p class=\"c\" style=\"color: blue\">x</p>"
        );
    }

    #[test]
    fn test_style_tags_removed_even_without_matches() {
        let html = "<style>.unused { color: red }</style><p>x</p>";
        let out = inline_all_styles(html, &InlineOptions::default());
        assert!(!out.contains("<style"));
        assert_eq!(body_inner(&out), "<p>x</p>");
    }

    #[test]
    fn test_empty_merged_map_removes_style_attr() {
        let html = "<p style=\"  \">x</p>";
        let out = inline_all_styles(html, &InlineOptions::default());
        assert_eq!(body_inner(&out), "<p>x</p>");
    }
}
