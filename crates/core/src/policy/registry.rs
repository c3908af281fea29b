// ABOUTME: Process-wide policy registry, insertion-ordered and keyed by name.
// ABOUTME: Builtins are installed on first access; re-registering a name overwrites with a warning.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use serde_json::Value;

use super::builtin;
use super::{Policy, PolicySetting};

struct Registry {
    entries: Vec<Arc<dyn Policy>>,
}

impl Registry {
    fn insert(&mut self, policy: Arc<dyn Policy>) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|p| p.name() == policy.name())
        {
            log::warn!("policy {} re-registered, overwriting", policy.name());
            *existing = policy;
        } else {
            self.entries.push(policy);
        }
    }
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| {
    let mut registry = Registry {
        entries: Vec::new(),
    };
    for policy in builtin::all() {
        registry.insert(policy);
    }
    RwLock::new(registry)
});

/// Register a policy, overwriting any existing policy with the same name.
pub fn register(policy: Arc<dyn Policy>) {
    REGISTRY.write().unwrap().insert(policy);
}

/// Registered policy names in registration order.
pub fn registered_names() -> Vec<String> {
    REGISTRY
        .read()
        .unwrap()
        .entries
        .iter()
        .map(|p| p.name().to_string())
        .collect()
}

/// Resolve the configuration against the registry: absent entries run with
/// default options, unknown configured names are ignored. Returned in
/// ascending priority order, registration order breaking ties.
pub fn enabled_policies(
    config: &BTreeMap<String, PolicySetting>,
) -> Vec<(Arc<dyn Policy>, Value)> {
    let registry = REGISTRY.read().unwrap();
    let mut enabled: Vec<(Arc<dyn Policy>, Value)> = Vec::new();
    for policy in &registry.entries {
        let options = match config.get(policy.name()) {
            Some(setting) => match setting.resolve() {
                Some(options) => options,
                None => continue,
            },
            None => Value::Null,
        };
        enabled.push((Arc::clone(policy), options));
    }
    enabled.sort_by_key(|(p, _)| p.priority());
    enabled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyOutcome;
    use scraper::Html;

    struct Stub {
        name: &'static str,
        priority: i32,
    }

    impl Policy for Stub {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "stub"
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn apply(&self, _: &str, _: &Html, _: &Value) -> anyhow::Result<PolicyOutcome> {
            Ok(PolicyOutcome::pass())
        }
    }

    #[test]
    fn test_enabled_policies_sorted_by_priority() {
        for (name, priority) in [("s50", 50), ("s5", 5), ("s20", 20), ("s10", 10)] {
            register(Arc::new(Stub { name, priority }));
        }
        let mut config = BTreeMap::new();
        // Restrict the run to the stubs so builtin priorities don't interleave.
        for name in registered_names() {
            if !name.starts_with("s") {
                config.insert(name, PolicySetting::Enabled(false));
            }
        }
        let order: Vec<i32> = enabled_policies(&config)
            .iter()
            .map(|(p, _)| p.priority())
            .collect();
        assert_eq!(order, vec![5, 10, 20, 50]);
    }

    #[test]
    fn test_unknown_configured_name_ignored() {
        let mut config = BTreeMap::new();
        config.insert("doesNotExist".to_string(), PolicySetting::Enabled(true));
        let enabled = enabled_policies(&config);
        assert!(enabled.iter().all(|(p, _)| p.name() != "doesNotExist"));
    }

    #[test]
    fn test_builtins_present_by_default() {
        let names = registered_names();
        for expected in [
            "removeBeforeH1",
            "forbiddenTags",
            "removeInternalNotes",
            "requireH2",
            "minImageCount",
            "addDisclaimer",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
