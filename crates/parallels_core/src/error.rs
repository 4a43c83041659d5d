use std::fmt;

use thiserror::Error;

/// Input rejected before it can enter the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no source document selected")]
    MissingSource,
    #[error("no target document selected")]
    MissingTarget,
    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),
    #[error("year 0 does not exist")]
    YearZero,
    #[error("score must be a finite, non-negative number")]
    InvalidScore,
    #[error("highlight index {index} is outside the {side} snippet ({tokens} tokens)")]
    HighlightOutOfRange {
        side: &'static str,
        index: usize,
        tokens: usize,
    },
}

/// Reasons a session operation was refused without changing state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The request gate is full; retry later.
    #[error("too many requests in flight")]
    Throttled,
    /// Paging was requested before any results were loaded.
    #[error("no results are loaded yet")]
    NotReady,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service answered with an error payload.
    Remote,
    /// The call never produced a usable answer (network, timeout, HTTP status).
    Transport,
    /// The service answered but the payload failed validation.
    Malformed,
}

/// Failure details recorded on a session or corpus listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Remote => "remote error",
            ErrorKind::Transport => "transport error",
            ErrorKind::Malformed => "malformed response",
        };
        write!(f, "{kind}: {}", self.message)
    }
}

impl std::error::Error for ErrorInfo {}
