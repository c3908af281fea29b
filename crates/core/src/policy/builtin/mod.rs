// ABOUTME: The shipped policy set and the shared option-deserialization helper.

pub mod before_h1;
pub mod disclaimer;
pub mod forbidden_tags;
pub mod image_count;
pub mod internal_notes;
pub mod require_h2;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Policy;

/// Every builtin, in registration order.
pub fn all() -> Vec<Arc<dyn Policy>> {
    vec![
        Arc::new(before_h1::RemoveBeforeH1),
        Arc::new(forbidden_tags::ForbiddenTags),
        Arc::new(internal_notes::RemoveInternalNotes),
        Arc::new(require_h2::RequireH2),
        Arc::new(image_count::MinImageCount),
        Arc::new(disclaimer::AddDisclaimer),
    ]
}

/// Deserialize policy options, falling back to defaults for `null` or a
/// malformed shape. A bad options object degrades to defaults rather than
/// killing the policy.
pub(crate) fn parse_options<T: DeserializeOwned + Default>(name: &str, value: &Value) -> T {
    if value.is_null() {
        return T::default();
    }
    match serde_json::from_value(value.clone()) {
        Ok(options) => options,
        Err(err) => {
            log::warn!("policy {name}: bad options ({err}), using defaults");
            T::default()
        }
    }
}
