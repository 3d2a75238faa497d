//! Error domain for request outcomes.
//!
//! Every failure a request can end in is an [`HttpError`]: a kind out of a
//! fixed taxonomy, a stable integer code, and a human-readable message.
//! Errors never cross the API as panics — a failed request parks its error
//! in the terminal outcome where the caller reads it.

use std::io;

use thiserror::Error;

/// Name of the error domain all [`HttpError`] codes belong to.
pub const DOMAIN: &str = "httpflight";

/// Classifies where in the request lifecycle a failure happened.
///
/// The numeric code of each kind (see [`ErrorKind::code`]) is stable and can
/// be matched on across process boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Hostname resolution produced no usable address.
    ResolutionFailure,
    /// The transport connection could not be established.
    ConnectFailure,
    /// Writing the serialized request to the peer failed.
    WriteFailure,
    /// Reading the response failed, including a connection that closed
    /// before the response was complete.
    ReadFailure,
    /// The peer sent bytes that do not parse as an HTTP/1.x response.
    MalformedResponse,
    /// The caller aborted the request.
    Aborted,
    /// `run` was invoked on a request that had already been started.
    AlreadyStarted,
}

impl ErrorKind {
    /// Stable integer code for this kind within [`DOMAIN`].
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::ResolutionFailure => 1,
            ErrorKind::ConnectFailure => 2,
            ErrorKind::WriteFailure => 3,
            ErrorKind::ReadFailure => 4,
            ErrorKind::MalformedResponse => 5,
            ErrorKind::Aborted => 6,
            ErrorKind::AlreadyStarted => 7,
        }
    }

    /// Short lowercase description used in `Display` output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResolutionFailure => "resolution failure",
            ErrorKind::ConnectFailure => "connect failure",
            ErrorKind::WriteFailure => "write failure",
            ErrorKind::ReadFailure => "read failure",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::Aborted => "aborted",
            ErrorKind::AlreadyStarted => "already started",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal request failure: kind, stable code, message.
///
/// `Clone` because the same error is both recorded on the request (for the
/// read-only accessors) and returned from `run`.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct HttpError {
    kind: ErrorKind,
    message: String,
}

impl HttpError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Resolution produced no usable address. Reserved for layers that sit
    /// above the resolver, which itself only reports an empty address list.
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResolutionFailure, message)
    }

    pub fn connect(err: &io::Error) -> Self {
        Self::new(ErrorKind::ConnectFailure, err.to_string())
    }

    pub fn write(err: &io::Error) -> Self {
        Self::new(ErrorKind::WriteFailure, err.to_string())
    }

    pub fn read(err: &io::Error) -> Self {
        Self::new(ErrorKind::ReadFailure, err.to_string())
    }

    /// Read failure that is not backed by an `io::Error`, e.g. the peer
    /// closing the connection mid-response.
    pub fn read_interrupted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReadFailure, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    /// Error carried by a caller-initiated abort.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Aborted, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Stable integer code, shorthand for `self.kind().code()`.
    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorKind::ResolutionFailure.code(), 1);
        assert_eq!(ErrorKind::ConnectFailure.code(), 2);
        assert_eq!(ErrorKind::WriteFailure.code(), 3);
        assert_eq!(ErrorKind::ReadFailure.code(), 4);
        assert_eq!(ErrorKind::MalformedResponse.code(), 5);
        assert_eq!(ErrorKind::Aborted.code(), 6);
        assert_eq!(ErrorKind::AlreadyStarted.code(), 7);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = HttpError::aborted("deadline exceeded");
        assert_eq!(err.to_string(), "aborted: deadline exceeded");
        assert_eq!(err.kind(), ErrorKind::Aborted);
        assert_eq!(err.code(), 6);
        assert_eq!(err.message(), "deadline exceeded");
    }
}
