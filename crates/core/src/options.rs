// ABOUTME: Conversion configuration: mode, output format, style handling, policy settings.
// ABOUTME: ConfigBuilder provides a fluent API for constructing Config values in code.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::policy::PolicySetting;

/// Whether a policy failure flips the overall success flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Strict,
    #[default]
    Relaxed,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Strict => "strict",
            Mode::Relaxed => "relaxed",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for Mode {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "strict" => Mode::Strict,
            _ => Mode::Relaxed,
        }
    }
}

/// Shape of the CLI/report output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Html,
        }
    }
}

/// Configuration for one conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub mode: Mode,
    /// Keep `class` attributes through style inlining.
    pub keep_classes: bool,
    /// Inline `<style>` rules onto elements before cleaning.
    pub inline_styles: bool,
    pub output_format: OutputFormat,
    /// Abort the policy run at the first failure. Only meaningful in strict
    /// mode.
    pub stop_on_error: bool,
    /// Per-policy enablement and options, keyed by policy name. Absent
    /// policies run with defaults.
    pub policies: BTreeMap<String, PolicySetting>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, crate::error::ConvertError> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::ConvertError::config("parse config", Some(e.into())))
    }
}

/// Builder for constructing Config values with custom settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn keep_classes(mut self, keep: bool) -> Self {
        self.config.keep_classes = keep;
        self
    }

    pub fn inline_styles(mut self, inline: bool) -> Self {
        self.config.inline_styles = inline;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.config.stop_on_error = stop;
        self
    }

    pub fn policy(mut self, name: impl Into<String>, setting: PolicySetting) -> Self {
        self.config.policies.insert(name.into(), setting);
        self
    }

    /// Disable a policy by name.
    pub fn disable(self, name: impl Into<String>) -> Self {
        self.policy(name, PolicySetting::Enabled(false))
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mode_from_str() {
        assert_eq!(Mode::from("strict"), Mode::Strict);
        assert_eq!(Mode::from("STRICT"), Mode::Strict);
        assert_eq!(Mode::from("anything-else"), Mode::Relaxed);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("html"), OutputFormat::Html);
    }

    #[test]
    fn test_config_from_json() {
        let config = Config::from_json(
            r#"{
                "mode": "strict",
                "inlineStyles": true,
                "policies": {
                    "requireH2": {"enabled": true, "options": {"minCount": 2}},
                    "addDisclaimer": false
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.mode, Mode::Strict);
        assert!(config.inline_styles);
        assert!(!config.keep_classes);
        assert!(config.policies["addDisclaimer"].resolve().is_none());
        let opts = config.policies["requireH2"].resolve().unwrap();
        assert_eq!(opts["minCount"], 2);
    }

    #[test]
    fn test_config_from_bad_json_is_config_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .mode(Mode::Strict)
            .stop_on_error(true)
            .disable("minImageCount")
            .build();
        assert_eq!(config.mode, Mode::Strict);
        assert!(config.stop_on_error);
        assert!(config.policies["minImageCount"].resolve().is_none());
    }
}
