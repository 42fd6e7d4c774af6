use bytes::Bytes;
use prost::Message as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::detector::{DetectorConfig, PositionKind};
use crate::error::PosdetError;
use crate::notification::NotificationKind;
use crate::packet::{Direction, MessageKind, RawMessage};
use crate::proto;

/// A validated message between the host and the detector nanoapp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Start the detector
    EnableDetector,
    /// Stop the detector
    DisableDetector,
    /// Ask for the current position at the detector's next opportunity
    RequestUpdate,
    /// Ask for the current position immediately
    ForceUpdate,
    ConfigureDetector(DetectorConfig),
    /// The hub accepted the named request
    AckNotification(NotificationKind),
    PositionDetected(PositionKind),
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::EnableDetector => MessageKind::EnableDetector,
            Message::DisableDetector => MessageKind::DisableDetector,
            Message::RequestUpdate => MessageKind::RequestUpdate,
            Message::ForceUpdate => MessageKind::ForceUpdate,
            Message::ConfigureDetector(_) => MessageKind::ConfigureDetector,
            Message::AckNotification(_) => MessageKind::AckNotification,
            Message::PositionDetected(_) => MessageKind::PositionDetected,
        }
    }

    pub fn direction(&self) -> Direction {
        self.kind().direction()
    }

    /// Encoded payload, `None` for pure signals.
    pub fn encode_payload(&self) -> Option<Bytes> {
        let encoded = match *self {
            Message::EnableDetector | Message::DisableDetector | Message::RequestUpdate | Message::ForceUpdate => {
                return None;
            }
            Message::ConfigureDetector(config) => proto::ConfigureDetector::from(config).encode_to_vec(),
            Message::AckNotification(notification) => proto::AckNotification {
                notification_type: Some(notification.into()),
            }
            .encode_to_vec(),
            Message::PositionDetected(position) => proto::PositionDetected {
                position: Some(position.into()),
            }
            .encode_to_vec(),
        };
        Some(Bytes::from(encoded))
    }

    pub fn to_raw(&self) -> RawMessage {
        RawMessage::new(self.kind().into(), self.encode_payload())
    }

    /// Encode as a self-describing frame.
    pub fn encode(&self) -> Bytes {
        Bytes::from(self.to_raw())
    }

    /// Decode a self-describing frame.
    pub fn decode(bytes: &[u8]) -> Result<Self, PosdetError> {
        let raw = RawMessage::try_from(Bytes::copy_from_slice(bytes))?;
        Message::try_from(raw)
    }

    /// Decode a frame written as hex. Whitespace is ignored.
    pub fn decode_hex(text: &str) -> Result<Self, PosdetError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        Message::decode(&hex::decode(compact)?)
    }

    /// Decode a payload whose message type arrived out of band.
    pub fn decode_parts(message_type: u32, payload: &[u8]) -> Result<Self, PosdetError> {
        Message::try_from(RawMessage::from_parts(message_type, Bytes::copy_from_slice(payload)))
    }
}

impl TryFrom<RawMessage> for Message {
    type Error = PosdetError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        let kind = raw.message_kind()?;
        debug!(%kind, payload_len = raw.payload_len(), "Decoding message");

        let payload = match (kind.has_payload(), raw.payload) {
            (false, None) => None,
            (false, Some(payload)) => {
                return Err(PosdetError::UnexpectedPayload {
                    kind,
                    len: payload.len(),
                });
            }
            (true, None) => return Err(PosdetError::MissingPayload { kind }),
            (true, Some(payload)) => Some(payload),
        };

        let message = match (kind, payload) {
            (MessageKind::EnableDetector, _) => Message::EnableDetector,
            (MessageKind::DisableDetector, _) => Message::DisableDetector,
            (MessageKind::RequestUpdate, _) => Message::RequestUpdate,
            (MessageKind::ForceUpdate, _) => Message::ForceUpdate,
            (MessageKind::ConfigureDetector, Some(payload)) => {
                let wire = proto::ConfigureDetector::decode(payload)?;
                Message::ConfigureDetector(DetectorConfig::try_from(wire)?)
            }
            (MessageKind::AckNotification, Some(payload)) => {
                let wire = proto::AckNotification::decode(payload)?;
                let value = wire
                    .notification_type
                    .ok_or(PosdetError::MissingField("notification_type"))?;
                Message::AckNotification(NotificationKind::from_wire(value)?)
            }
            (MessageKind::PositionDetected, Some(payload)) => {
                let wire = proto::PositionDetected::decode(payload)?;
                let value = wire.position.ok_or(PosdetError::MissingField("position"))?;
                Message::PositionDetected(PositionKind::from_wire(value)?)
            }
            (kind, None) => return Err(PosdetError::MissingPayload { kind }),
        };

        Ok(message)
    }
}

impl From<Message> for RawMessage {
    fn from(message: Message) -> Self {
        message.to_raw()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.direction(), self.kind())?;
        match self {
            Message::ConfigureDetector(config) => write!(f, ": {config}"),
            Message::AckNotification(notification) => write!(f, ": {notification}"),
            Message::PositionDetected(position) => write!(f, ": {position}"),
            _ => Ok(()),
        }
    }
}
