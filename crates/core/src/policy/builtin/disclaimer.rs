// ABOUTME: addDisclaimer (priority 50): inserts a warning banner when promotional keywords appear.
// ABOUTME: Default keyword list targets Thai promotional copy plus common English terms.

use aho_corasick::AhoCorasick;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use super::parse_options;
use crate::dom::{self, Rewrite};
use crate::policy::{Policy, PolicyOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Position {
    Start,
    End,
    AfterKeyword,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Options {
    keywords: Vec<String>,
    position: Position,
    disclaimer_class: String,
    text: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            keywords: [
                "โปรโมชั่น",
                "โบนัส",
                "ฟรีเครดิต",
                "เครดิตฟรี",
                "แจกฟรี",
                "ของรางวัล",
                "promotion",
                "discount",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            position: Position::End,
            disclaimer_class: "disclaimer-block".to_string(),
            text: "Terms and conditions apply. Please review the offer details carefully."
                .to_string(),
        }
    }
}

pub struct AddDisclaimer;

impl Policy for AddDisclaimer {
    fn name(&self) -> &str {
        "addDisclaimer"
    }

    fn description(&self) -> &str {
        "Adds a disclaimer banner when promotional keywords are present"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn apply(&self, html: &str, doc: &Html, options: &Value) -> anyhow::Result<PolicyOutcome> {
        let options: Options = parse_options(self.name(), options);
        let body = dom::body_node(doc);

        if has_disclaimer(doc, &options.disclaimer_class) {
            return Ok(PolicyOutcome::pass());
        }

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&options.keywords)
            .map_err(|e| anyhow::anyhow!("bad keyword list: {e}"))?;
        let text = dom::element_text(&element_of(body));
        let mut hits = vec![false; options.keywords.len()];
        for m in matcher.find_iter(&text) {
            hits[m.pattern().as_usize()] = true;
        }
        let matched: Vec<&String> = options
            .keywords
            .iter()
            .zip(&hits)
            .filter_map(|(kw, hit)| hit.then_some(kw))
            .collect();
        if matched.is_empty() {
            return Ok(PolicyOutcome::pass());
        }

        let banner = format!(
            "<div class=\"{}\"><p><strong>Disclaimer:</strong> {}</p></div>",
            dom::escape_attr(&options.disclaimer_class),
            dom::escape_text(&options.text)
        );

        let new_html = match options.position {
            Position::Start => format!("{banner}{html}"),
            Position::End => format!("{html}{banner}"),
            Position::AfterKeyword => {
                match first_keyword_paragraph(doc, &matcher) {
                    Some(id) => {
                        let mut rw = Rewrite::new();
                        rw.insert_after.insert(id, banner);
                        rw.apply(body)
                    }
                    // No paragraph carries a keyword hit, append instead.
                    None => format!("{html}{banner}"),
                }
            }
        };

        let names: Vec<&str> = matched.iter().map(|s| s.as_str()).collect();
        Ok(PolicyOutcome::pass()
            .with_html(new_html)
            .warn(format!("promotional keywords found: {}", names.join(", ")))
            .act("inserted disclaimer banner"))
    }
}

fn has_disclaimer(doc: &Html, class: &str) -> bool {
    let any = Selector::parse("*").unwrap();
    doc.select(&any)
        .any(|el| el.value().classes().any(|c| c == class))
}

fn first_keyword_paragraph(doc: &Html, matcher: &AhoCorasick) -> Option<ego_tree::NodeId> {
    let p = Selector::parse("p").unwrap();
    doc.select(&p)
        .find(|el| matcher.is_match(&dom::element_text(el)))
        .map(|el| el.id())
}

fn element_of(node: ego_tree::NodeRef<'_, scraper::Node>) -> ElementRef<'_> {
    ElementRef::wrap(node).expect("body is an element")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(html: &str, options: Value) -> PolicyOutcome {
        let doc = dom::parse_doc(html);
        AddDisclaimer.apply(html, &doc, &options).unwrap()
    }

    #[test]
    fn test_no_keywords_means_no_change() {
        let outcome = apply("<p>ordinary article text</p>", Value::Null);
        assert!(outcome.passed);
        assert!(outcome.html.is_none());
        assert!(!outcome.reported_anything());
    }

    #[test]
    fn test_thai_keyword_appends_banner() {
        let outcome = apply("<p>รับโปรโมชั่นพิเศษวันนี้</p>", Value::Null);
        let html = outcome.html.unwrap();
        assert!(html.starts_with("<p>"));
        assert!(html.contains("class=\"disclaimer-block\""));
        assert!(outcome.warnings[0].contains("โปรโมชั่น"));
    }

    #[test]
    fn test_english_keyword_case_insensitive() {
        let outcome = apply("<p>Big DISCOUNT today</p>", Value::Null);
        assert!(outcome.html.unwrap().contains("disclaimer-block"));
    }

    #[test]
    fn test_existing_disclaimer_is_noop() {
        let html = "<p>promotion</p><div class=\"disclaimer-block\"><p>done</p></div>";
        let outcome = apply(html, Value::Null);
        assert!(outcome.html.is_none());
        assert!(!outcome.reported_anything());
    }

    #[test]
    fn test_position_start() {
        let outcome = apply(
            "<p>promotion</p>",
            serde_json::json!({"position": "start"}),
        );
        assert!(outcome.html.unwrap().starts_with("<div class=\"disclaimer-block\">"));
    }

    #[test]
    fn test_position_after_keyword() {
        let outcome = apply(
            "<p>intro</p><p>big promotion here</p><p>tail</p>",
            serde_json::json!({"position": "after-keyword"}),
        );
        let html = outcome.html.unwrap();
        let banner_at = html.find("disclaimer-block").unwrap();
        let tail_at = html.find("<p>tail</p>").unwrap();
        assert!(banner_at < tail_at);
        assert!(html.starts_with("<p>intro</p><p>big promotion here</p><div"));
    }

    #[test]
    fn test_custom_keywords_and_text() {
        let outcome = apply(
            "<p>flash sale now</p>",
            serde_json::json!({"keywords": ["flash sale"], "text": "Offer ends soon."}),
        );
        let html = outcome.html.unwrap();
        assert!(html.contains("Offer ends soon."));
        assert_eq!(
            outcome.warnings[0],
            "promotional keywords found: flash sale"
        );
    }
}
