// ABOUTME: minImageCount (priority 20): enforces a minimum number of <img> elements.

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
    auto_insert: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_count: 1,
            auto_insert: false,
        }
    }
}

pub struct MinImageCount;

impl Policy for MinImageCount {
    fn name(&self) -> &str {
        "minImageCount"
    }

    fn description(&self) -> &str {
        "Requires a minimum number of images"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn apply(&self, html: &str, doc: &Html, options: &Value) -> anyhow::Result<PolicyOutcome> {
        let options: Options = parse_options(self.name(), options);
        let img = Selector::parse("img").unwrap();
        let count = doc.select(&img).count();
        if count >= options.min_count {
            return Ok(PolicyOutcome::pass());
        }

        let missing = options.min_count - count;
        if !options.auto_insert {
            return Ok(PolicyOutcome::fail(format!(
                "found {count} of {} required image(s)",
                options.min_count
            )));
        }

        let placeholders: String = (count + 1..=options.min_count)
            .map(|n| {
                format!(
                    "<figure><img src=\"placeholder.png\" alt=\"Placeholder image {n}\" />\
                     <figcaption>Placeholder image {n}</figcaption></figure>"
                )
            })
            .collect();

        // Best-effort insertion point: after the first <h2>, else after the
        // first <p>, else at the front of the fragment.
        let h2 = Selector::parse("h2").unwrap();
        let p = Selector::parse("p").unwrap();
        let anchor = doc.select(&h2).next().or_else(|| doc.select(&p).next());
        let new_html = match anchor {
            Some(el) => {
                let mut rw = Rewrite::new();
                rw.insert_after.insert(el.id(), placeholders);
                rw.apply(dom::body_node(doc))
            }
            None => format!("{placeholders}{html}"),
        };

        Ok(PolicyOutcome::pass()
            .with_html(new_html)
            .warn(format!(
                "only {count} of {} required image(s), inserted {missing} placeholder(s)",
                options.min_count
            ))
            .act(format!("inserted {missing} placeholder figure(s)")))
    }
}
