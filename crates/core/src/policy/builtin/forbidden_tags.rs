// ABOUTME: forbiddenTags (priority 5): removes or rejects dangerous/unwanted elements.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use serde::Deserialize;
use serde_json::Value;

use super::parse_options;
use crate::dom::{self, Rewrite};
use crate::policy::{Policy, PolicyOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Options {
    tags: Vec<String>,
    auto_remove: bool,
    /// Unwrap instead of delete: children survive.
    keep_content: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tags: ["script", "iframe", "object", "embed", "form", "input", "button"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            auto_remove: true,
            keep_content: false,
        }
    }
}

pub struct ForbiddenTags;

impl Policy for ForbiddenTags {
    fn name(&self) -> &str {
        "forbiddenTags"
    }

    fn description(&self) -> &str {
        "Removes or rejects configured forbidden elements"
    }

    fn priority(&self) -> i32 {
        5
    }

    fn apply(&self, _html: &str, doc: &Html, options: &Value) -> anyhow::Result<PolicyOutcome> {
        let options: Options = parse_options(self.name(), options);
        let body = dom::body_node(doc);

        let mut rw = Rewrite::new();
        let mut found: BTreeMap<String, usize> = BTreeMap::new();
        for node in body.descendants() {
            if let Some(el) = ElementRef::wrap(node) {
                let tag = el.value().name().to_lowercase();
                if options.tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                    *found.entry(tag).or_insert(0) += 1;
                    if options.keep_content {
                        rw.unwrap.insert(node.id());
                    } else {
                        rw.skip.insert(node.id());
                    }
                }
            }
        }

        if found.is_empty() {
            return Ok(PolicyOutcome::pass());
        }
        let summary = found
            .iter()
            .map(|(tag, count)| format!("<{tag}> x{count}"))
            .collect::<Vec<_>>()
            .join(", ");

        if !options.auto_remove {
            return Ok(PolicyOutcome::fail(format!(
                "forbidden tags present: {summary}"
            )));
        }
        let verb = if options.keep_content {
            "unwrapped"
        } else {
            "removed"
        };
        Ok(PolicyOutcome::pass()
            .with_html(rw.apply(body))
            .warn(format!("forbidden tags found: {summary}"))
            .act(format!("{verb} {summary}")))
    }
}
