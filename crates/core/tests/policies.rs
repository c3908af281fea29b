// ABOUTME: Policy engine integration tests: ordering, strict mode, shipped policy behavior.

use std::collections::BTreeMap;

use docpress_core::policy::{self, EngineOptions};
use docpress_core::{convert, Config, Mode, PolicySetting};
use pretty_assertions::assert_eq;

#[test]
fn builtins_run_in_ascending_priority() {
    let enabled = policy::enabled_policies(&BTreeMap::new());
    let priorities: Vec<i32> = enabled.iter().map(|(p, _)| p.priority()).collect();
    assert_eq!(priorities, vec![3, 5, 8, 10, 20, 50]);
}

#[test]
fn disabled_policy_is_excluded() {
    let mut config = BTreeMap::new();
    config.insert("addDisclaimer".to_string(), PolicySetting::Enabled(false));
    let enabled = policy::enabled_policies(&config);
    assert!(enabled.iter().all(|(p, _)| p.name() != "addDisclaimer"));
    assert_eq!(enabled.len(), 5);
}

#[test]
fn require_h2_strict_fails_the_run() {
    let config = Config::builder()
        .mode(Mode::Strict)
        .disable("minImageCount")
        .build();
    let result = convert("<p>no heading</p>", &config);
    assert!(!result.report.success);
    assert!(!result.report.errors.is_empty());
}

#[test]
fn require_h2_auto_generate_warns_and_inserts() {
    let config = Config::builder()
        .disable("minImageCount")
        .policy(
            "requireH2",
            serde_json::from_value(serde_json::json!({
                "enabled": true,
                "options": {"minCount": 1, "autoGenerate": true}
            }))
            .unwrap(),
        )
        .build();
    let result = convert("<p>no heading</p>", &config);
    assert!(result.html.contains("wp:heading"));
    assert!(result.html.contains("Heading 1"));
    assert!(!result.report.warnings.is_empty());
    assert!(result
        .report
        .policies_triggered
        .iter()
        .any(|p| p == "requireH2"));
}

#[test]
fn forbidden_tags_strips_script_wholesale() {
    // Engine-level run: the general cleaner would otherwise remove <script>
    // before this policy ever saw it.
    let mut config = BTreeMap::new();
    for name in ["removeBeforeH1", "removeInternalNotes", "requireH2", "minImageCount", "addDisclaimer"] {
        config.insert(name.to_string(), PolicySetting::Enabled(false));
    }
    let enabled = policy::enabled_policies(&config);
    let result = policy::run(
        "<p>Hello</p><script>alert(1)</script>",
        &enabled,
        &EngineOptions::default(),
    );
    assert!(result.all_passed);
    assert!(!result.html.contains("script"));
    assert!(!result.html.contains("alert"));
    assert_eq!(result.policies_triggered, vec!["forbiddenTags"]);
}

#[test]
fn disclaimer_added_for_thai_keyword() {
    let config = Config::builder()
        .disable("requireH2")
        .disable("minImageCount")
        .build();
    let result = convert("<p>รับโปรโมชั่นพิเศษ</p>", &config);
    assert!(result.html.contains("disclaimer-block"));
    assert!(result
        .report
        .policies_triggered
        .iter()
        .any(|p| p == "addDisclaimer"));
}

#[test]
fn disclaimer_not_added_without_keywords() {
    let config = Config::builder()
        .disable("requireH2")
        .disable("minImageCount")
        .build();
    let result = convert("<p>ordinary words</p>", &config);
    assert!(!result.html.contains("disclaimer-block"));
    assert!(result
        .report
        .policies_triggered
        .iter()
        .all(|p| p != "addDisclaimer"));
}

#[test]
fn custom_disclaimer_class_passes_through_as_html_block() {
    let config = Config::builder()
        .disable("requireH2")
        .disable("minImageCount")
        .policy(
            "addDisclaimer",
            serde_json::from_value(serde_json::json!({
                "enabled": true,
                "options": {"disclaimerClass": "promo-note"}
            }))
            .unwrap(),
        )
        .build();
    let result = convert("<p>Big promotion today</p>", &config);
    assert!(result.html.contains("<!-- wp:html -->"));
    assert!(result.html.contains("class=\"promo-note\""));
}

#[test]
fn internal_notes_removed_in_full_pipeline() {
    let config = Config::builder()
        .disable("requireH2")
        .disable("minImageCount")
        .build();
    let input = "<p>@reviewer please check</p><p>Published copy.</p>";
    let result = convert(input, &config);
    assert!(!result.html.contains("@reviewer"));
    assert!(result.html.contains("Published copy."));
    assert!(result
        .report
        .policies_triggered
        .iter()
        .any(|p| p == "removeInternalNotes"));
}

#[test]
fn custom_policy_options_reach_the_policy() {
    let config = Config::builder()
        .disable("requireH2")
        .policy(
            "minImageCount",
            serde_json::from_value(serde_json::json!({
                "enabled": true,
                "options": {"minCount": 2, "autoInsert": true}
            }))
            .unwrap(),
        )
        .build();
    let result = convert("<h2>S</h2><p>text</p>", &config);
    assert!(result.html.contains("Placeholder image"));
    assert!(result.report.actions.iter().any(|a| a.contains("placeholder")));
}
