//! Errors raised by link action construction, report writing and the
//! YAML configuration layer.
//!
//! Every failure carries an [`ErrorInfo`]: a stable kebab-case `code` that
//! tests and callers match on, a message, and the offending parameters as
//! string context (for example `pair=electron-hole` or `path=report.jsonl`).

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Code, message and parameter context of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case identifier such as `non-positive-mass` or `step-before-start`.
    pub code: String,
    /// What went wrong.
    pub message: String,
    /// Offending parameters by name, e.g. `mu`, `pair`, `estimator`, `path`.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested fix, when there is an obvious one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Error with no context.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records the value of a named parameter; a repeated key overwrites.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a suggested fix.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Formats as `message (code: c) | context: [k=v, ...] | hint: h`, leaving
/// out empty sections.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            write!(f, " | context: [{}]", pairs.join(", "))?;
        }
        match &self.hint {
            Some(hint) => write!(f, " | hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Error type of every fallible operation in the workspace, grouped by the
/// subsystem that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PimcError {
    /// Rejected pair parameters, or an origin action that is not finite.
    #[error("action error: {0}")]
    Action(ErrorInfo),
    /// Misused estimators or writers, such as a step before its start.
    #[error("report error: {0}")]
    Report(ErrorInfo),
    /// Unreadable, malformed or invalid YAML configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// A report sink could not be opened, written or flushed.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl PimcError {
    /// Payload shared by all families.
    pub fn info(&self) -> &ErrorInfo {
        let (PimcError::Action(info)
        | PimcError::Report(info)
        | PimcError::Config(info)
        | PimcError::Io(info)) = self;
        info
    }

    /// `Io` error whose message is the text of `err`.
    pub fn io(code: &str, err: impl ToString) -> Self {
        PimcError::Io(ErrorInfo::new(code, err.to_string()))
    }
}
