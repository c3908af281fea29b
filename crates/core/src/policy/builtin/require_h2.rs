// ABOUTME: requireH2 (priority 10): enforces a minimum number of <h2> section headings.

use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use super::parse_options;
use crate::dom::{self, Rewrite};
use crate::policy::{Policy, PolicyOutcome};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Options {
    min_count: usize,
    auto_generate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_count: 1,
            auto_generate: false,
        }
    }
}

pub struct RequireH2;

impl Policy for RequireH2 {
    fn name(&self) -> &str {
        "requireH2"
    }

    fn description(&self) -> &str {
        "Requires a minimum number of <h2> headings"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn apply(&self, html: &str, doc: &Html, options: &Value) -> anyhow::Result<PolicyOutcome> {
        let options: Options = parse_options(self.name(), options);
        let h2 = Selector::parse("h2").unwrap();
        let count = doc.select(&h2).count();
        if count >= options.min_count {
            return Ok(PolicyOutcome::pass());
        }

        let missing = options.min_count - count;
        if !options.auto_generate {
            return Ok(PolicyOutcome::fail(format!(
                "found {count} of {} required <h2> heading(s)",
                options.min_count
            )));
        }

        let generated: String = (count + 1..=options.min_count)
            .map(|n| format!("<h2>Heading {n}</h2>"))
            .collect();

        // Best-effort insertion point: before the first paragraph, else at
        // the front of the fragment.
        let p = Selector::parse("p").unwrap();
        let new_html = match doc.select(&p).next() {
            Some(first_p) => {
                let mut rw = Rewrite::new();
                rw.insert_before.insert(first_p.id(), generated);
                rw.apply(dom::body_node(doc))
            }
            None => format!("{generated}{html}"),
        };

        Ok(PolicyOutcome::pass()
            .with_html(new_html)
            .warn(format!(
                "only {count} of {} required <h2> heading(s), generated {missing} placeholder(s)",
                options.min_count
            ))
            .act(format!("inserted {missing} placeholder <h2> heading(s)")))
    }
}
