//! Operation outcomes returned by the panel surface.

use std::fmt::Display;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Success/failure envelope for panel operations.
///
/// Failures are values, never panics: `success` is false and `msg` carries a
/// human-readable description of what went wrong.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable message
    pub msg: String,
    /// Payload, present on success when the operation returns data
    pub obj: Option<T>,
}

impl<T> Outcome<T> {
    /// Successful outcome carrying a payload.
    pub fn ok(obj: T) -> Self {
        Self {
            success: true,
            msg: String::new(),
            obj: Some(obj),
        }
    }

    /// Successful outcome with nothing to return yet.
    pub fn empty(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            msg: msg.into(),
            obj: None,
        }
    }

    /// Successful outcome with only a message.
    pub fn done(action: impl Display) -> Self {
        Self {
            success: true,
            msg: format!("{action} succeeded"),
            obj: None,
        }
    }

    /// Failed outcome labelled with the action that failed.
    pub fn failure(action: impl Display, err: impl Display) -> Self {
        Self {
            success: false,
            msg: format!("{action} failed: {err}"),
            obj: None,
        }
    }

    /// Maps a result into an outcome carrying the success value.
    pub fn from_result<E: Display>(action: impl Display, result: Result<T, E>) -> Self {
        match result {
            Ok(obj) => Self::ok(obj),
            Err(err) => Self::failure(action, err),
        }
    }

    /// Drops the payload, keeping success and message.
    pub fn discard(self) -> Outcome<()> {
        Outcome {
            success: self.success,
            msg: self.msg,
            obj: self.obj.map(|_| ()),
        }
    }
}

impl Outcome<()> {
    /// Maps a unit result into a message-only outcome.
    pub fn from_unit<E: Display>(action: impl Display, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::done(action),
            Err(err) => Self::failure(action, err),
        }
    }
}

/// Raw database bytes plus the file name to attach to the download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseExport {
    /// Validated download file name
    pub filename: String,
    /// Database file contents
    pub bytes: Bytes,
}
