// ABOUTME: Editor-specific pre-passes for Google Docs and Word exports.
// ABOUTME: Run before the general cleaner so its rules see plain markup.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::dom::{self, Rewrite};

// Office conditional comments appear both comment-wrapped and bare after
// some mail clients strip the comment markers.
static WORD_IF_COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--\[if [^\]]*\]>.*?<!\[endif\]-->").unwrap());
static WORD_IF_BARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\[if [^\]]*\]>.*?<!\[endif\]").unwrap());

/// Strip the markup noise Google Docs leaves in a copy-paste or export:
/// `docs-` class tokens, Google data attributes, the `<b id="docs-internal-guid-…">`
/// wrapper, and empty bookmark anchors.
pub fn remove_google_docs_artifacts(html: &str) -> String {
    let doc = dom::parse_doc(html);
    let body = dom::body_node(&doc);
    let mut rw = Rewrite::new();

    for node in body.descendants() {
        let el = match ElementRef::wrap(node) {
            Some(el) => el,
            None => continue,
        };
        let tag = el.value().name().to_lowercase();
        let id = el.value().attr("id").unwrap_or("");

        // The guid wrapper is a <b> that carries no bold intent.
        if tag == "b" && id.starts_with("docs-internal-guid-") {
            rw.unwrap.insert(node.id());
            continue;
        }

        // Bookmark anchors: id only, no href, nothing inside.
        if tag == "a"
            && !id.is_empty()
            && el.value().attr("href").is_none()
            && dom::is_semantically_empty(&el, true)
        {
            rw.skip.insert(node.id());
            continue;
        }

        let mut overrides: Vec<(String, Option<String>)> = Vec::new();
        if let Some(class) = el.value().attr("class") {
            if class.split_whitespace().any(|t| t.contains("docs-")) {
                let kept: Vec<&str> = class
                    .split_whitespace()
                    .filter(|t| !t.contains("docs-"))
                    .collect();
                if kept.is_empty() {
                    overrides.push(("class".to_string(), None));
                } else {
                    overrides.push(("class".to_string(), Some(kept.join(" "))));
                }
            }
        }
        for (name, _) in el.value().attrs() {
            if name.starts_with("data-") {
                overrides.push((name.to_string(), None));
            }
        }
        if !overrides.is_empty() {
            rw.set_attrs.insert(node.id(), overrides);
        }
    }
    rw.apply(body)
}

/// Strip Word export noise: `Mso*` class tokens and Office conditional
/// comment islands.
pub fn remove_word_artifacts(html: &str) -> String {
    let stripped = WORD_IF_COMMENT_RE.replace_all(html, "");
    let stripped = WORD_IF_BARE_RE.replace_all(&stripped, "");

    let doc = dom::parse_doc(&stripped);
    let body = dom::body_node(&doc);
    let mut rw = Rewrite::new();

    for node in body.descendants() {
        let el = match ElementRef::wrap(node) {
            Some(el) => el,
            None => continue,
        };
        if let Some(class) = el.value().attr("class") {
            if class.split_whitespace().any(|t| t.starts_with("Mso")) {
                let kept: Vec<&str> = class
                    .split_whitespace()
                    .filter(|t| !t.starts_with("Mso"))
                    .collect();
                let value = if kept.is_empty() {
                    None
                } else {
                    Some(kept.join(" "))
                };
                rw.set_attrs
                    .insert(node.id(), vec![("class".to_string(), value)]);
            }
        }
    }
    rw.apply(body)
}

/// True when the document looks like it came out of Google Docs.
pub fn looks_like_google_docs(html: &str) -> bool {
    html.contains("docs-internal-guid") || html.contains("class=\"docs-")
}

/// True when the document looks like a Word export.
pub fn looks_like_word(html: &str) -> bool {
    html.contains("urn:schemas-microsoft-com")
        || html.contains("class=\"Mso")
        || html.contains("mso-")
        || WORD_IF_COMMENT_RE.is_match(html)
}
