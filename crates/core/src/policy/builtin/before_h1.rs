// ABOUTME: removeBeforeH1 (priority 3): drops everything preceding the first <h1>, then the <h1>.
// ABOUTME: Editor exports put titles and front-matter above the H1 that WordPress supplies itself.

use std::collections::BTreeSet;

use scraper::{ElementRef, Html, Node, Selector};
use serde::Deserialize;
use serde_json::Value;

use super::parse_options;
use crate::dom::{self, Rewrite};
use crate::policy::{Policy, PolicyOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Options {
    auto_remove: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { auto_remove: true }
    }
}

pub struct RemoveBeforeH1;

impl Policy for RemoveBeforeH1 {
    fn name(&self) -> &str {
        "removeBeforeH1"
    }

    fn description(&self) -> &str {
        "Removes the first <h1> and everything before it"
    }

    fn priority(&self) -> i32 {
        3
    }

    fn apply(&self, _html: &str, doc: &Html, options: &Value) -> anyhow::Result<PolicyOutcome> {
        let options: Options = parse_options(self.name(), options);
        let sel = Selector::parse("h1").unwrap();
        let h1 = match doc.select(&sel).next() {
            Some(h1) => h1,
            None => return Ok(PolicyOutcome::pass()),
        };
        if !options.auto_remove {
            return Ok(PolicyOutcome::pass());
        }

        let mut rw = Rewrite::new();
        rw.skip.insert(h1.id());
        let mut removed = 0usize;
        let mut tags: BTreeSet<String> = BTreeSet::new();

        // Preceding siblings at every level from the h1 up to the body.
        let mut current = *h1;
        loop {
            let mut sibling = current.prev_sibling();
            while let Some(s) = sibling {
                rw.skip.insert(s.id());
                if let Some(el) = ElementRef::wrap(s) {
                    removed += 1;
                    tags.insert(el.value().name().to_lowercase());
                }
                sibling = s.prev_sibling();
            }
            match current.parent() {
                Some(parent) if !is_container_boundary(&parent) => current = parent,
                _ => break,
            }
        }

        let html = rw.apply(dom::body_node(doc));
        let mut outcome = PolicyOutcome::pass()
            .with_html(html)
            .act("removed first <h1>");
        if removed > 0 {
            outcome = outcome.act(format!(
                "removed {removed} preceding element(s): {}",
                tags.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }
        Ok(outcome)
    }
}

fn is_container_boundary(node: &ego_tree::NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Element(el) => {
            let name = el.name();
            name.eq_ignore_ascii_case("body") || name.eq_ignore_ascii_case("html")
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(html: &str, options: Value) -> PolicyOutcome {
        let doc = dom::parse_doc(html);
        RemoveBeforeH1.apply(html, &doc, &options).unwrap()
    }

    #[test]
    fn test_no_h1_passes_untouched() {
        let outcome = apply("<p>plain</p>", Value::Null);
        assert!(outcome.passed);
        assert!(outcome.html.is_none());
    }

    #[test]
    fn test_h1_and_preceding_siblings_removed() {
        let outcome = apply("<p>meta</p><div>toc</div><h1>Title</h1><p>body</p>", Value::Null);
        assert_eq!(outcome.html.unwrap(), "<p>body</p>");
        assert!(outcome
            .actions
            .iter()
            .any(|a| a.contains("2 preceding element(s): div, p")));
    }

    #[test]
    fn test_nested_h1_clears_ancestor_levels() {
        let outcome = apply(
            "<p>before</p><div><span>inner-before</span><h1>T</h1><p>keep</p></div><p>tail</p>",
            Value::Null,
        );
        assert_eq!(outcome.html.unwrap(), "<div><p>keep</p></div><p>tail</p>");
    }

    #[test]
    fn test_auto_remove_false_is_noop() {
        let outcome = apply(
            "<p>x</p><h1>T</h1>",
            serde_json::json!({"autoRemove": false}),
        );
        assert!(outcome.passed);
        assert!(outcome.html.is_none());
    }
}
