// ABOUTME: Runs enabled policies as an explicit fold over the HTML fragment.
// ABOUTME: Re-parses after each mutation so no policy ever sees a stale tree.

use std::sync::Arc;

use serde_json::Value;

use super::{Policy, PolicyOutcome};
use crate::dom;

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Strict mode flips the final success flag on failure; it does not by
    /// itself abort the run.
    pub strict: bool,
    /// Abort after the first failing policy. Only honored in strict mode.
    pub stop_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct EngineResult {
    pub html: String,
    pub all_passed: bool,
    pub policies_triggered: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub actions: Vec<String>,
}

/// Apply `policies` in the order given (callers sort by priority) and fold
/// the fragment through them.
pub fn run(html: &str, policies: &[(Arc<dyn Policy>, Value)], options: &EngineOptions) -> EngineResult {
    let mut result = EngineResult {
        html: html.to_string(),
        all_passed: true,
        policies_triggered: Vec::new(),
        warnings: Vec::new(),
        errors: Vec::new(),
        actions: Vec::new(),
    };

    for (policy, policy_options) in policies {
        let doc = dom::parse_doc(&result.html);
        log::debug!("running policy {}", policy.name());

        let outcome = match policy.apply(&result.html, &doc, policy_options) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("policy {} failed: {err:#}", policy.name());
                PolicyOutcome::fail(format!("{}: {err:#}", policy.name()))
            }
        };

        if outcome.reported_anything() {
            result.policies_triggered.push(policy.name().to_string());
        }
        result
            .warnings
            .extend(prefixed(policy.name(), &outcome.warnings));
        result.errors.extend(prefixed(policy.name(), &outcome.errors));
        result
            .actions
            .extend(prefixed(policy.name(), &outcome.actions));

        if let Some(new_html) = outcome.html {
            if new_html != result.html {
                result.html = new_html;
            }
        }
        if !outcome.passed {
            result.all_passed = false;
            if options.strict && options.stop_on_error {
                break;
            }
        }
    }
    result
}

fn prefixed(name: &str, messages: &[String]) -> Vec<String> {
    messages
        .iter()
        .map(|m| {
            if m.starts_with(name) {
                m.clone()
            } else {
                format!("{name}: {m}")
            }
        })
        .collect()
}
