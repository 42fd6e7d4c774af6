use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use prost::Message as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{PosdetError, TagField};
use crate::proto;

/// Direction of a message between the host and the sensor hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Direction {
    #[serde(rename = "H2C")]
    #[strum(serialize = "H2C")]
    HostToChre,
    #[serde(rename = "C2H")]
    #[strum(serialize = "C2H")]
    ChreToHost,
}

/// Message type carried in the frame header. Value 0 is reserved and has no
/// variant here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum MessageKind {
    // Host to CHRE
    EnableDetector = 100,
    DisableDetector = 101,
    RequestUpdate = 102,
    ForceUpdate = 103,
    ConfigureDetector = 104,

    // CHRE to host
    AckNotification = 199,
    PositionDetected = 200,
}

impl MessageKind {
    pub fn direction(&self) -> Direction {
        match self {
            MessageKind::EnableDetector
            | MessageKind::DisableDetector
            | MessageKind::RequestUpdate
            | MessageKind::ForceUpdate
            | MessageKind::ConfigureDetector => Direction::HostToChre,
            MessageKind::AckNotification | MessageKind::PositionDetected => Direction::ChreToHost,
        }
    }

    /// Converts a wire value, rejecting the reserved zero and anything
    /// outside the defined set.
    pub fn from_wire(value: i32) -> Result<Self, PosdetError> {
        MessageKind::try_from_primitive(value).map_err(|e| PosdetError::malformed(TagField::MessageType, e.number))
    }

    /// Whether this kind carries exactly one typed payload. Pure signals don't.
    pub fn has_payload(&self) -> bool {
        matches!(
            self,
            MessageKind::ConfigureDetector | MessageKind::AckNotification | MessageKind::PositionDetected
        )
    }
}

impl From<MessageKind> for proto::MessageType {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::EnableDetector => proto::MessageType::H2cEnableDetector,
            MessageKind::DisableDetector => proto::MessageType::H2cDisableDetector,
            MessageKind::RequestUpdate => proto::MessageType::H2cRequestUpdate,
            MessageKind::ForceUpdate => proto::MessageType::H2cForceUpdate,
            MessageKind::ConfigureDetector => proto::MessageType::H2cConfigureDetector,
            MessageKind::AckNotification => proto::MessageType::C2hAckNotification,
            MessageKind::PositionDetected => proto::MessageType::C2hPositionDetected,
        }
    }
}

/// A frame as it travels between host and hub: the raw message type and an
/// optional, still-encoded payload. Nothing is validated at this level.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub message_type: i32,
    pub payload: Option<Bytes>,
}

impl RawMessage {
    pub fn new(message_type: i32, payload: Option<Bytes>) -> Self {
        Self { message_type, payload }
    }

    /// Build a frame from a transport that carries the message type out of
    /// band. No valid payload encodes to zero bytes, so an empty buffer
    /// means the payload is absent.
    pub fn from_parts(message_type: u32, payload: impl Into<Bytes>) -> Self {
        let payload: Bytes = payload.into();
        Self {
            // Out-of-band types are unsigned; anything past i32::MAX is
            // folded into the negative range and rejected as malformed later.
            message_type: message_type as i32,
            payload: (!payload.is_empty()).then_some(payload),
        }
    }

    pub fn message_kind(&self) -> Result<MessageKind, PosdetError> {
        MessageKind::from_wire(self.message_type)
    }

    pub fn payload_len(&self) -> usize {
        self.payload.as_ref().map_or(0, Bytes::len)
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message_kind() {
            Ok(kind) => write!(f, "{} ({})", kind, self.message_type)?,
            Err(_) => write!(f, "unknown ({})", self.message_type)?,
        }
        match &self.payload {
            Some(payload) => write!(f, " payload={}", hex::encode(payload)),
            None => write!(f, " no payload"),
        }
    }
}

impl TryFrom<Bytes> for RawMessage {
    type Error = PosdetError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        let frame = proto::MessageFrame::decode(bytes)?;
        Ok(RawMessage {
            message_type: frame.message_type,
            payload: frame.payload,
        })
    }
}

impl From<RawMessage> for Bytes {
    fn from(raw: RawMessage) -> Self {
        let frame = proto::MessageFrame {
            message_type: raw.message_type,
            payload: raw.payload,
        };
        Bytes::from(frame.encode_to_vec())
    }
}
