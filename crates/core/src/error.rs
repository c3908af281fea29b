// ABOUTME: Error types for the converter including ErrorCode enum and ConvertError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of conversion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Load,
    Config,
    Policy,
    Convert,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Load => "load error",
            ErrorCode::Config => "config error",
            ErrorCode::Policy => "policy error",
            ErrorCode::Convert => "conversion error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for conversion operations.
#[derive(Debug, thiserror::Error)]
pub struct ConvertError {
    pub code: ErrorCode,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "docpress: {}: {}", self.op, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ConvertError {
    /// Create a Load error.
    pub fn load(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Load,
            op: op.into(),
            source,
        }
    }

    /// Create a Config error.
    pub fn config(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Config,
            op: op.into(),
            source,
        }
    }

    /// Create a Policy error.
    pub fn policy(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Policy,
            op: op.into(),
            source,
        }
    }

    /// Create a Convert error.
    pub fn convert(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Convert,
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a Load error.
    pub fn is_load(&self) -> bool {
        self.code == ErrorCode::Load
    }

    /// Returns true if this is a Config error.
    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }

    /// Returns true if this is a Policy error.
    pub fn is_policy(&self) -> bool {
        self.code == ErrorCode::Policy
    }

    /// Returns true if this is a Convert error.
    pub fn is_convert(&self) -> bool {
        self.code == ErrorCode::Convert
    }
}
