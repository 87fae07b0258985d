//! Error types for the `hub` core.
use std::error::Error as StdError;
use std::fmt;

/// Top-level hub error type.
/// Mirrors the layered error model used by the rest of the workspace: a small
/// `error_kind` enum the callers can match on plus an optional `source` holding
/// the lower level error that caused it (e.g. a closed channel inside a transport).
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// The kinds of errors the hub core can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A registry lookup or removal missed. Always recoverable.
    NotFound,
    /// The transport could not reach a connection (usually because it just died).
    DeliveryFailed,
    /// An operation was invoked on behalf of a connection the registry doesn't know.
    /// The transport and the core disagree about the connection lifecycle.
    InconsistentState(String),
}

impl Error {
    pub fn not_found() -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::NotFound,
        }
    }

    pub fn delivery_failed<E>(source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: Some(source.into()),
            error_kind: ErrorKind::DeliveryFailed,
        }
    }

    pub fn inconsistent_state(detail: impl Into<String>) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::InconsistentState(detail.into()),
        }
    }

    pub fn is_delivery_failed(&self) -> bool {
        self.error_kind == ErrorKind::DeliveryFailed
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::DeliveryFailed => write!(f, "delivery failed"),
            ErrorKind::InconsistentState(detail) => write!(f, "inconsistent state: {detail}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Hub Error: {} ({source})", self.error_kind),
            None => write!(f, "Hub Error: {}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
