//! Crate-wide error type.

use std::fmt;

/// Beacon gateway error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    /// Error kind.
    pub kind: ErrorKind,
    /// Additional message.
    pub message: String,
}

/// Beacon gateway error kind.
#[derive(Clone, Debug, displaydoc::Display, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// advertisement payload too short: got {got} bytes, need at least {need}.
    PayloadTooShort { got: usize, need: usize },
    /// invalid beacon identity string {0}.
    InvalidIdentity(String),
    /// too many listeners registered on the beacon registry (max {0}).
    TooManyListeners(usize),
    /// RPC publish failed on topic {0}.
    PublishFailed(String),
    /// sensor read failed: {0}.
    SensorReadFailed(String),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, message: String::new() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", &self.kind)
        } else {
            write!(f, "{}: {}", &self.kind, &self.message)
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Beacon gateway result.
pub type Result<T> = std::result::Result<T, Error>;
