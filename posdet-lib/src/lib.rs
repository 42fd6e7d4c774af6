//! Host-side codec for the carried-position detector nanoapp's message
//! protocol.
//!
//! Frames are protobuf. [`packet::RawMessage`] holds an unvalidated
//! `(message_type, payload)` pair; [`message::Message`] is the validated form
//! in which reserved zero tags and malformed config unions cannot exist.

pub mod capture;
pub mod detector;
pub mod error;
pub mod message;
pub mod notification;
pub mod packet;
pub mod proto;

#[cfg(test)]
mod tests;

pub use detector::{ConfigData, ConfigPresetKind, DetectorConfig, PositionKind, ThresholdViolation};
pub use error::PosdetError;
pub use message::Message;
pub use notification::NotificationKind;
pub use packet::{Direction, MessageKind, RawMessage};
