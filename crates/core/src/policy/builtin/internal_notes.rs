// ABOUTME: removeInternalNotes (priority 8): strips authoring artifacts that must not publish.
// ABOUTME: Pattern list is data, not code; user-supplied patterns that fail to compile are skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node};
use serde::Deserialize;
use serde_json::Value;

use super::parse_options;
use crate::dom::{self, Rewrite};
use crate::policy::{Policy, PolicyOutcome};

/// Heuristic patterns for editorial notes, matched case-insensitively against
/// an element's full text or a single line of a text node.
static NOTE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("bracket-note", r"^\s*\[(?:note|draft|internal|todo|wip|seo)\b[^\]]*\]"),
        ("mention", r"^\s*@\w+"),
        ("alt-note", r"^\s*alt\s*:"),
        ("seo-writer-note", r"^\s*note\s+seo\s+writer\b"),
        ("landing-note", r"^\s*landing\s*:"),
        ("link-note", r"^\s*link\s*:"),
        ("url-note", r"^\s*url\s*:"),
        ("team-instruction", r"^\s*(?:writer|editor|seo team|content team)\s*:"),
        ("do-not-publish", r"^\s*do\s+not\s+publish\b"),
        ("internal-only", r"^\s*internal\s+use\s+only\b"),
        ("todo-marker", r"^\s*(?:todo|tbd)\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(&format!("(?i){pattern}")).unwrap()))
    .collect()
});

static COMMENT_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[[a-z]\]$").unwrap());

const CONTAINER_TAGS: &[&str] = &["p", "div", "li", "td"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Options {
    auto_remove: bool,
    remove_empty_containers: bool,
    /// Extra user patterns, same matching rules as the builtins.
    patterns: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto_remove: true,
            remove_empty_containers: true,
            patterns: Vec::new(),
        }
    }
}

pub struct RemoveInternalNotes;

impl Policy for RemoveInternalNotes {
    fn name(&self) -> &str {
        "removeInternalNotes"
    }

    fn description(&self) -> &str {
        "Removes editorial comments, mentions and instruction lines"
    }

    fn priority(&self) -> i32 {
        8
    }

    fn apply(&self, _html: &str, doc: &Html, options: &Value) -> anyhow::Result<PolicyOutcome> {
        let options: Options = parse_options(self.name(), options);
        let extra = compile_extra(&options.patterns);
        let body = dom::body_node(doc);

        let mut rw = Rewrite::new();
        let mut matches: Vec<String> = Vec::new();

        for node in body.descendants() {
            match node.value() {
                Node::Element(_) => {
                    let el = ElementRef::wrap(node).unwrap();
                    let tag = el.value().name().to_lowercase();

                    // Google Docs comment references pull their whole container.
                    if tag == "a"
                        && el
                            .value()
                            .attr("href")
                            .is_some_and(|h| h.starts_with("#cmnt"))
                    {
                        if let Some(container) = enclosing_container(node) {
                            rw.skip.insert(container);
                            matches.push("comment-reference link".to_string());
                        } else {
                            rw.skip.insert(node.id());
                            matches.push("comment-reference link".to_string());
                        }
                        continue;
                    }

                    // Bare [a], [b] comment anchors.
                    if (tag == "a" || tag == "sup")
                        && COMMENT_MARKER_RE.is_match(dom::element_text(&el).trim())
                    {
                        rw.skip.insert(node.id());
                        matches.push("comment anchor marker".to_string());
                        continue;
                    }

                    if is_leaf_block(&el, &tag) {
                        let text = dom::element_text(&el);
                        if let Some(name) = first_match(text.trim(), &extra) {
                            rw.skip.insert(node.id());
                            matches.push(format!("{name} element"));
                        }
                    }
                }
                Node::Text(text) => {
                    let parent_is_block = node
                        .parent()
                        .and_then(ElementRef::wrap)
                        .map(|p| CONTAINER_TAGS.contains(&p.value().name().to_lowercase().as_str()))
                        .unwrap_or(false);
                    if !parent_is_block || !text.contains('\n') {
                        continue;
                    }
                    let kept: Vec<&str> = text
                        .lines()
                        .filter(|line| first_match(line.trim(), &extra).is_none())
                        .collect();
                    if kept.len() != text.lines().count() {
                        matches.push("note line".to_string());
                        rw.set_text.insert(node.id(), kept.join("\n"));
                    }
                }
                _ => {}
            }
        }

        if matches.is_empty() {
            return Ok(PolicyOutcome::pass());
        }
        if !options.auto_remove {
            return Ok(PolicyOutcome {
                passed: false,
                errors: matches
                    .iter()
                    .map(|m| format!("internal note present: {m}"))
                    .collect(),
                ..PolicyOutcome::default()
            });
        }

        let mut html = rw.apply(body);
        if options.remove_empty_containers {
            html = remove_empty_containers(&html);
        }
        Ok(PolicyOutcome::pass()
            .with_html(html)
            .act(format!("removed {} internal note(s)", matches.len())))
    }
}

fn compile_extra(patterns: &[String]) -> Vec<(String, Regex)> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(&format!("(?i){p}")) {
            Ok(re) => Some((p.clone(), re)),
            Err(err) => {
                log::warn!("removeInternalNotes: bad pattern {p:?} ({err}), ignoring");
                None
            }
        })
        .collect()
}

fn first_match<'a>(text: &str, extra: &'a [(String, Regex)]) -> Option<&'a str> {
    if text.is_empty() {
        return None;
    }
    for (name, re) in NOTE_PATTERNS.iter() {
        if re.is_match(text) {
            return Some(name);
        }
    }
    extra
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| name.as_str())
}

/// Nearest p/div/li/td ancestor.
fn enclosing_container(node: ego_tree::NodeRef<'_, Node>) -> Option<ego_tree::NodeId> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if let Some(el) = ElementRef::wrap(parent) {
            if CONTAINER_TAGS.contains(&el.value().name().to_lowercase().as_str()) {
                return Some(parent.id());
            }
        }
        current = parent.parent();
    }
    None
}

/// Full-text matching only applies to elements that hold their own prose;
/// a div wrapping paragraphs must not be deleted because its first child is
/// a note.
fn is_leaf_block(el: &ElementRef, tag: &str) -> bool {
    let textual = matches!(
        tag,
        "p" | "li" | "td" | "th" | "span" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    );
    if textual {
        return true;
    }
    if tag != "div" {
        return false;
    }
    !el.children().any(|c| {
        matches!(c.value(), Node::Element(e) if matches!(
            e.name().to_lowercase().as_str(),
            "p" | "div" | "ul" | "ol" | "li" | "table" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        ))
    })
}

/// Delete containers the removals emptied out, to a fixed point. A lone
/// `<br>` counts as empty here.
fn remove_empty_containers(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let doc = dom::parse_doc(&current);
        let body = dom::body_node(&doc);
        let mut rw = Rewrite::new();
        for node in body.descendants() {
            if let Some(el) = ElementRef::wrap(node) {
                if CONTAINER_TAGS.contains(&el.value().name().to_lowercase().as_str())
                    && dom::is_semantically_empty(&el, true)
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

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(html: &str, options: Value) -> PolicyOutcome {
        let doc = dom::parse_doc(html);
        RemoveInternalNotes.apply(html, &doc, &options).unwrap()
    }

    #[test]
    fn test_clean_content_untouched() {
        let outcome = apply("<p>Regular paragraph.</p>", Value::Null);
        assert!(outcome.passed);
        assert!(outcome.html.is_none());
    }

    #[test]
    fn test_comment_reference_container_removed() {
        let html = "<p>keep</p><p>note text<a href=\"#cmnt1\">[a]</a></p>";
        let outcome = apply(html, Value::Null);
        assert_eq!(outcome.html.unwrap(), "<p>keep</p>");
    }

    #[test]
    fn test_bare_comment_anchor_removed() {
        let html = "<p>text<sup>[b]</sup> more</p>";
        let outcome = apply(html, Value::Null);
        assert_eq!(outcome.html.unwrap(), "<p>text more</p>");
    }

    #[test]
    fn test_mention_paragraph_removed() {
        let html = "<p>@somchai please fix this</p><p>real</p>";
        let outcome = apply(html, Value::Null);
        assert_eq!(outcome.html.unwrap(), "<p>real</p>");
    }

    #[test]
    fn test_instruction_prefixes_removed() {
        for prefix in ["Alt: hero image", "NOTE SEO Writer do X", "Landing: /promo", "URL: http://x", "TODO", "[draft] rework intro"] {
            let html = format!("<p>{prefix}</p><p>keep</p>");
            let outcome = apply(&html, Value::Null);
            assert_eq!(outcome.html.unwrap(), "<p>keep</p>", "prefix {prefix:?}");
        }
    }

    #[test]
    fn test_wrapper_div_not_removed_for_inner_note() {
        let html = "<div><p>Editor: tighten this</p><p>keep</p></div>";
        let outcome = apply(html, Value::Null);
        assert_eq!(outcome.html.unwrap(), "<div><p>keep</p></div>");
    }

    #[test]
    fn test_note_line_blanked_inside_block() {
        let html = "<div>Line one\nLink: internal-target\nLine three</div>";
        let outcome = apply(html, Value::Null);
        assert_eq!(outcome.html.unwrap(), "<div>Line one\nLine three</div>");
    }

    #[test]
    fn test_emptied_container_cleaned_up() {
        let html = "<div><a href=\"#cmnt2\">[a]</a></div><p>keep</p>";
        let outcome = apply(html, Value::Null);
        assert_eq!(outcome.html.unwrap(), "<p>keep</p>");
    }

    #[test]
    fn test_auto_remove_false_reports_errors() {
        let html = "<p>@reviewer check</p>";
        let outcome = apply(html, serde_json::json!({"autoRemove": false}));
        assert!(!outcome.passed);
        assert!(!outcome.errors.is_empty());
        assert!(outcome.html.is_none());
    }

    #[test]
    fn test_bad_user_pattern_ignored() {
        let html = "<p>fine</p>";
        let outcome = apply(html, serde_json::json!({"patterns": ["([unclosed"]}));
        assert!(outcome.passed);
    }

    #[test]
    fn test_user_pattern_applies() {
        let html = "<p>CONFIDENTIAL draft</p><p>keep</p>";
        let outcome = apply(html, serde_json::json!({"patterns": ["^confidential\\b"]}));
        assert_eq!(outcome.html.unwrap(), "<p>keep</p>");
    }
}
