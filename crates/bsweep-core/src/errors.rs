//! Structured error types shared across bsweep crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SweepError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (paths, sizes, exit codes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the sweep driver.
///
/// Every family is fatal: the driver stops at the first error and whatever
/// rows were already flushed stay on the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SweepError {
    /// Invalid sweep bounds, step count, repeat policy or mode combination.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// The measurement executable could not be started.
    #[error("launch error: {0}")]
    Launch(ErrorInfo),
    /// The measurement executable terminated unsuccessfully.
    #[error("exit error: {0}")]
    Exit(ErrorInfo),
    /// The measurement executable exceeded its configured deadline.
    #[error("timeout error: {0}")]
    Timeout(ErrorInfo),
    /// Captured output did not match the line/token contract.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// Writing the emitted table failed.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization of plans and reports failed.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SweepError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SweepError::Config(info)
            | SweepError::Launch(info)
            | SweepError::Exit(info)
            | SweepError::Timeout(info)
            | SweepError::Format(info)
            | SweepError::Io(info)
            | SweepError::Serde(info) => info,
        }
    }

    /// Shorthand for a [`SweepError::Config`] with the given code and message.
    pub fn config(code: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::Config(ErrorInfo::new(code, message))
    }

    /// Shorthand for a [`SweepError::Format`] with the given code and message.
    pub fn format(code: impl Into<String>, message: impl Into<String>) -> Self {
        SweepError::Format(ErrorInfo::new(code, message))
    }
}
