//! Common test utilities and shared imports

// Shared across several test files; not every item is used by each one
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use hex;
#[allow(unused_imports)]
pub use posdet_lib::detector::{ConfigData, ConfigPresetKind, DetectorConfig, PositionKind, ThresholdViolation};
#[allow(unused_imports)]
pub use posdet_lib::error::{PosdetError, TagField};
#[allow(unused_imports)]
pub use posdet_lib::message::Message;
#[allow(unused_imports)]
pub use posdet_lib::notification::NotificationKind;
#[allow(unused_imports)]
pub use posdet_lib::packet::{Direction, MessageKind, RawMessage};
#[allow(unused_imports)]
pub use posdet_lib::proto;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

/// A tuning bundle inside every documented constraint
#[allow(dead_code)]
pub fn tuned_params() -> ConfigData {
    ConfigData {
        window_duration_ns: 1_500_000_000,
        min_stationary_duration_ns: 3_000_000_000,
        motion_confidence_threshold: 0.75,
        stationary_confidence_threshold: 0.9,
        var_threshold: 0.02,
        var_threshold_delta: 0.005,
    }
}

/// One valid message of every kind
#[allow(dead_code)]
pub fn one_of_each_kind() -> Vec<Message> {
    vec![
        Message::EnableDetector,
        Message::DisableDetector,
        Message::RequestUpdate,
        Message::ForceUpdate,
        Message::ConfigureDetector(DetectorConfig::Preset(ConfigPresetKind::Default)),
        Message::AckNotification(NotificationKind::ForceUpdate),
        Message::PositionDetected(PositionKind::StationaryUnknown),
    ]
}

/// Frame `message_type` with a payload field, built by hand
#[allow(dead_code)]
pub fn frame_with_payload(message_type: i32, payload: &[u8]) -> Bytes {
    RawMessage::new(message_type, Some(Bytes::copy_from_slice(payload))).into()
}
