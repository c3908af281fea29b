// ABOUTME: Conversion output: the block markup plus a per-run report.
// ABOUTME: Reports serialize as camelCase JSON for the CLI's --report and --json outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What one conversion run did and found.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub input_file: Option<String>,
    pub output_file: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub policies_triggered: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub actions: Vec<String>,
    pub success: bool,
    pub execution_time_ms: u64,
}

impl Default for ConversionReport {
    fn default() -> Self {
        Self {
            input_file: None,
            output_file: None,
            timestamp: Utc::now(),
            policies_triggered: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            actions: Vec::new(),
            success: true,
            execution_time_ms: 0,
        }
    }
}

impl ConversionReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// The result of a conversion: block markup and its report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub html: String,
    pub report: ConversionReport,
}

impl Conversion {
    /// A failed conversion with no output, for errors that precede the
    /// pipeline (unreadable input, bad config).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            html: String::new(),
            report: ConversionReport {
                errors: vec![message.into()],
                success: false,
                ..ConversionReport::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failure_has_no_output() {
        let conversion = Conversion::failure("file not found: missing.html");
        assert_eq!(conversion.html, "");
        assert!(!conversion.report.success);
        assert_eq!(conversion.report.errors.len(), 1);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ConversionReport::default();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"policiesTriggered\""));
        assert!(json.contains("\"executionTimeMs\""));
        assert!(json.contains("\"inputFile\""));
    }

    #[test]
    fn test_helpers() {
        let mut report = ConversionReport::default();
        assert!(!report.has_warnings());
        report.warnings.push("w".to_string());
        assert!(report.has_warnings());
    }
}
