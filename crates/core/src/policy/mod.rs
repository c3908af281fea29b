// ABOUTME: Policy plugin interface: named, priority-ordered validation/mutation rules.
// ABOUTME: Policies receive the current fragment plus a parsed tree and report an outcome.

pub mod builtin;
pub mod engine;
pub mod registry;

use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use engine::{run, EngineOptions, EngineResult};
pub use registry::{enabled_policies, register, registered_names};

/// A single validation or mutation rule.
///
/// `apply` must not keep state between calls; the engine hands every policy a
/// freshly parsed tree for the current fragment.
pub trait Policy: Send + Sync {
    /// Unique registry key.
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Lower runs first.
    fn priority(&self) -> i32 {
        100
    }
    fn apply(&self, html: &str, doc: &Html, options: &Value) -> anyhow::Result<PolicyOutcome>;
}

/// What one policy run reported.
#[derive(Debug, Clone, Default)]
pub struct PolicyOutcome {
    /// Replacement fragment, `None` when the policy left the input alone.
    pub html: Option<String>,
    pub passed: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub actions: Vec<String>,
}

impl PolicyOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            ..Self::default()
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            errors: vec![error.into()],
            ..Self::default()
        }
    }

    pub fn with_html(mut self, html: String) -> Self {
        self.html = Some(html);
        self
    }

    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn act(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Anything worth recording in `policies_triggered`.
    pub fn reported_anything(&self) -> bool {
        !self.warnings.is_empty() || !self.errors.is_empty() || !self.actions.is_empty()
    }
}

/// One configuration entry under `policies`: `false` disables, `true` enables
/// with defaults, and the detailed form carries per-policy options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicySetting {
    Enabled(bool),
    Detailed {
        #[serde(default = "default_true")]
        enabled: bool,
        #[serde(default)]
        options: Value,
    },
}

fn default_true() -> bool {
    true
}

impl PolicySetting {
    /// `Some(options)` when the policy should run.
    pub fn resolve(&self) -> Option<Value> {
        match self {
            PolicySetting::Enabled(false) => None,
            PolicySetting::Enabled(true) => Some(Value::Null),
            PolicySetting::Detailed { enabled: false, .. } => None,
            PolicySetting::Detailed { options, .. } => Some(options.clone()),
        }
    }
}
