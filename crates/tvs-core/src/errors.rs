//! Structured error types shared across the targeting crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`TvsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (field names, parameters, ids).
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

/// Fieldless discriminant of [`TvsError`], used by boundary code to pick a
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Unknown field reference.
    NotFound,
    /// Value, operator and declared type are incompatible.
    TypeMismatch,
    /// Operator not registered for the field or its value type.
    UnknownOperator,
    /// Malformed range bounds.
    InvalidRange,
    /// Bad confidence level or margin of error.
    InvalidSamplingParameters,
    /// Structurally invalid predicate or block.
    InvalidPredicate,
    /// Illegal verification plan status change.
    InvalidTransition,
    /// Malformed field-definition source.
    Catalog,
    /// Serialization and IO errors.
    Serde,
}

/// Canonical error type for the targeting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum TvsError {
    /// A predicate references a field absent from the registry.
    #[error("field not found: {0}")]
    NotFound(ErrorInfo),
    /// A stored value or argument cannot be coerced to the declared type.
    #[error("type mismatch: {0}")]
    TypeMismatch(ErrorInfo),
    /// The operator is not registered for the field or value type.
    #[error("unknown operator: {0}")]
    UnknownOperator(ErrorInfo),
    /// Range bounds are malformed.
    #[error("invalid range: {0}")]
    InvalidRange(ErrorInfo),
    /// Sampling parameters are outside the accepted vocabulary.
    #[error("invalid sampling parameters: {0}")]
    InvalidSamplingParameters(ErrorInfo),
    /// Predicate or block is structurally invalid.
    #[error("invalid predicate: {0}")]
    InvalidPredicate(ErrorInfo),
    /// Verification plan status transition is not allowed.
    #[error("invalid transition: {0}")]
    InvalidTransition(ErrorInfo),
    /// Field definitions could not be turned into a catalog.
    #[error("catalog error: {0}")]
    Catalog(ErrorInfo),
    /// Serialization and IO errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl TvsError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            TvsError::NotFound(info)
            | TvsError::TypeMismatch(info)
            | TvsError::UnknownOperator(info)
            | TvsError::InvalidRange(info)
            | TvsError::InvalidSamplingParameters(info)
            | TvsError::InvalidPredicate(info)
            | TvsError::InvalidTransition(info)
            | TvsError::Catalog(info)
            | TvsError::Serde(info) => info,
        }
    }

    /// Returns the fieldless kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TvsError::NotFound(_) => ErrorKind::NotFound,
            TvsError::TypeMismatch(_) => ErrorKind::TypeMismatch,
            TvsError::UnknownOperator(_) => ErrorKind::UnknownOperator,
            TvsError::InvalidRange(_) => ErrorKind::InvalidRange,
            TvsError::InvalidSamplingParameters(_) => ErrorKind::InvalidSamplingParameters,
            TvsError::InvalidPredicate(_) => ErrorKind::InvalidPredicate,
            TvsError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            TvsError::Catalog(_) => ErrorKind::Catalog,
            TvsError::Serde(_) => ErrorKind::Serde,
        }
    }
}
