use std::io;
use strum_macros::Display;
use thiserror::Error;

use crate::packet::MessageKind;

/// Which tagged identifier carried a bad value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TagField {
    #[strum(to_string = "message type")]
    MessageType,
    #[strum(to_string = "notification type")]
    NotificationType,
    #[strum(to_string = "position")]
    Position,
    #[strum(to_string = "config preset")]
    ConfigPreset,
}

/// The primary error type for the `posdet-lib` library.
#[derive(Error, Debug)]
pub enum PosdetError {
    #[error("Malformed {field} tag: {value}")]
    MalformedTag { field: TagField, value: i32 },

    #[error("{kind} requires a payload but none was present")]
    MissingPayload { kind: MessageKind },

    #[error("{kind} carries no payload, got {len} bytes")]
    UnexpectedPayload { kind: MessageKind, len: usize },

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Detector config must populate exactly one alternative, found {populated}")]
    MalformedUnion { populated: usize },

    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Capture log line {line}: {source}")]
    CaptureLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl PosdetError {
    /// True for errors raised by schema validation, as opposed to wire,
    /// file or text-encoding failures.
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            PosdetError::MalformedTag { .. }
                | PosdetError::MissingPayload { .. }
                | PosdetError::UnexpectedPayload { .. }
                | PosdetError::MissingField(_)
                | PosdetError::MalformedUnion { .. }
        )
    }

    pub(crate) fn malformed(field: TagField, value: i32) -> Self {
        PosdetError::MalformedTag { field, value }
    }
}
