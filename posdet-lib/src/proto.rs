//! Protobuf mirror of the nanoapp message schema.
//!
//! These types ARE the wire format shared with the hub firmware. Field
//! numbers and enumerant values must never be renumbered. Every enum keeps
//! its reserved zero variant so that the on-wire value space is described
//! exactly; the typed layer in [`crate::message`] refuses to decode them.
//!
//! Payload fields that must be present are declared `optional` so that an
//! absent field stays distinguishable from an explicit zero.

use bytes::Bytes;
use prost::{Enumeration, Message};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enumeration)]
#[repr(i32)]
pub enum MessageType {
    Invalid = 0,

    // Host to CHRE
    H2cEnableDetector = 100,
    H2cDisableDetector = 101,
    H2cRequestUpdate = 102,
    H2cForceUpdate = 103,
    H2cConfigureDetector = 104,

    // CHRE to host
    C2hAckNotification = 199,
    C2hPositionDetected = 200,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enumeration)]
#[repr(i32)]
pub enum NotificationType {
    Invalid = 0,
    Enable = 1,
    Disable = 2,
    RequestUpdate = 3,
    ForceUpdate = 4,
    Configure = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enumeration)]
#[repr(i32)]
pub enum PositionType {
    Unknown = 0,
    InMotion = 1,
    FaceUpOnTable = 2,
    FaceDownOnTable = 3,
    StationaryUnknown = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enumeration)]
#[repr(i32)]
pub enum ConfigPreset {
    Unspecified = 0,
    Default = 1,
    StickyStationary = 2,
}

/// Envelope used when the transport does not carry the message type
/// alongside the payload.
#[derive(Clone, PartialEq, Message)]
pub struct MessageFrame {
    #[prost(enumeration = "MessageType", tag = "1")]
    pub message_type: i32,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub payload: Option<Bytes>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AckNotification {
    #[prost(enumeration = "NotificationType", optional, tag = "1")]
    pub notification_type: Option<i32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PositionDetected {
    #[prost(enumeration = "PositionType", optional, tag = "1")]
    pub position: Option<i32>,
}

/// `oneof config { preset = 1; config_data = 2; }`
///
/// The oneof is held as two independent optional fields so that a frame
/// populating both alternatives is observable instead of being collapsed to
/// the last one seen. When exactly one is set the encoding is identical to
/// the oneof encoding.
#[derive(Clone, PartialEq, Message)]
pub struct ConfigureDetector {
    #[prost(enumeration = "ConfigPreset", optional, tag = "1")]
    pub preset: Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub config_data: Option<ConfigData>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ConfigData {
    #[prost(uint64, tag = "1")]
    pub window_duration_ns: u64,
    #[prost(uint32, tag = "2")]
    pub min_stationary_duration_ns: u32,
    #[prost(float, tag = "3")]
    pub motion_confidence_threshold: f32,
    #[prost(float, tag = "4")]
    pub stationary_confidence_threshold: f32,
    #[prost(float, tag = "5")]
    pub var_threshold: f32,
    #[prost(float, tag = "6")]
    pub var_threshold_delta: f32,
}
