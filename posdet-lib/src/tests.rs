use crate::detector::{ConfigData, ConfigPresetKind, DetectorConfig, PositionKind};
use crate::error::{PosdetError, TagField};
use crate::message::Message;
use crate::notification::NotificationKind;
use crate::packet::{Direction, MessageKind, RawMessage};
use crate::proto;
use bytes::Bytes;
use strum::IntoEnumIterator;

fn sample_params() -> ConfigData {
    ConfigData {
        window_duration_ns: 2_000_000_000,
        min_stationary_duration_ns: 500_000_000,
        motion_confidence_threshold: 0.8,
        stationary_confidence_threshold: 0.6,
        var_threshold: 0.05,
        var_threshold_delta: 0.01,
    }
}

#[test]
fn test_encode_enable_detector() {
    let bytes = Message::EnableDetector.encode();
    assert_eq!(hex::encode(&bytes), "0864");
}

#[test]
fn test_encode_position_detected() {
    let bytes = Message::PositionDetected(PositionKind::FaceUpOnTable).encode();
    assert_eq!(hex::encode(&bytes), "08c80112020802");
}

#[test]
fn test_encode_ack_configure() {
    let bytes = Message::AckNotification(NotificationKind::Configure).encode();
    assert_eq!(hex::encode(&bytes), "08c70112020805");
}

#[test]
fn test_encode_configure_preset() {
    let bytes = Message::ConfigureDetector(DetectorConfig::Preset(ConfigPresetKind::StickyStationary)).encode();
    assert_eq!(hex::encode(&bytes), "086812020802");
}

#[test]
fn test_parse_raw_frame() {
    let bytes = Bytes::from(hex::decode("08c80112020803").unwrap());
    let raw = RawMessage::try_from(bytes).expect("Failed to parse frame");

    assert_eq!(raw.message_type, 200);
    assert_eq!(raw.payload.as_deref(), Some(&[0x08, 0x03][..]));
    assert_eq!(raw.message_kind().unwrap(), MessageKind::PositionDetected);
}

#[test]
fn test_raw_frame_keeps_unknown_type() {
    // Raw frames are not validated; only the typed conversion rejects them
    let raw = RawMessage::try_from(Bytes::from(hex::decode("089601").unwrap())).unwrap();
    assert_eq!(raw.message_type, 150);
    assert!(raw.payload.is_none());
    assert!(matches!(
        Message::try_from(raw),
        Err(PosdetError::MalformedTag {
            field: TagField::MessageType,
            value: 150
        })
    ));
}

#[test]
fn test_kind_numbers_match_wire_enum() {
    for kind in MessageKind::iter() {
        let wire = proto::MessageType::from(kind);
        assert_eq!(i32::from(kind), wire as i32, "{kind} disagrees with wire enum");
    }
    assert_eq!(proto::MessageType::Invalid as i32, 0);
    assert_eq!(i32::from(NotificationKind::Enable), proto::NotificationType::Enable as i32);
    assert_eq!(i32::from(NotificationKind::Configure), proto::NotificationType::Configure as i32);
    assert_eq!(i32::from(PositionKind::InMotion), proto::PositionType::InMotion as i32);
    assert_eq!(
        i32::from(PositionKind::StationaryUnknown),
        proto::PositionType::StationaryUnknown as i32
    );
    assert_eq!(i32::from(ConfigPresetKind::Default), proto::ConfigPreset::Default as i32);
    assert_eq!(
        i32::from(ConfigPresetKind::StickyStationary),
        proto::ConfigPreset::StickyStationary as i32
    );
}

#[test]
fn test_directions() {
    assert_eq!(MessageKind::EnableDetector.direction(), Direction::HostToChre);
    assert_eq!(MessageKind::ConfigureDetector.direction(), Direction::HostToChre);
    assert_eq!(MessageKind::AckNotification.direction(), Direction::ChreToHost);
    assert_eq!(MessageKind::PositionDetected.direction(), Direction::ChreToHost);
    assert_eq!(Direction::HostToChre.to_string(), "H2C");
    assert_eq!(Direction::ChreToHost.to_string(), "C2H");
}

#[test]
fn test_payload_kinds() {
    let with_payload: Vec<MessageKind> = MessageKind::iter().filter(MessageKind::has_payload).collect();
    assert_eq!(
        with_payload,
        vec![
            MessageKind::ConfigureDetector,
            MessageKind::AckNotification,
            MessageKind::PositionDetected
        ]
    );
}

#[test]
fn test_signal_has_no_payload() {
    for message in [
        Message::EnableDetector,
        Message::DisableDetector,
        Message::RequestUpdate,
        Message::ForceUpdate,
    ] {
        assert!(message.encode_payload().is_none(), "{message} should be a pure signal");
    }
}

#[test]
fn test_explicit_params_roundtrip() {
    let message = Message::ConfigureDetector(DetectorConfig::Parameters(sample_params()));
    let decoded = Message::decode(&message.encode()).expect("Failed to decode configure");
    assert_eq!(decoded, message);
}

#[test]
fn test_zeroed_params_still_populate_union() {
    let zeroed = ConfigData {
        window_duration_ns: 0,
        min_stationary_duration_ns: 0,
        motion_confidence_threshold: 0.0,
        stationary_confidence_threshold: 0.0,
        var_threshold: 0.0,
        var_threshold_delta: 0.0,
    };
    let message = Message::ConfigureDetector(DetectorConfig::Parameters(zeroed));
    assert_eq!(hex::encode(message.encode()), "086812021200");
    assert_eq!(Message::decode(&message.encode()).unwrap(), message);
}

#[test]
fn test_out_of_band_payload() {
    let message = Message::decode_parts(200, &[0x08, 0x01]).unwrap();
    assert_eq!(message, Message::PositionDetected(PositionKind::InMotion));

    let message = Message::decode_parts(101, &[]).unwrap();
    assert_eq!(message, Message::DisableDetector);
}

#[test]
fn test_from_parts_empty_payload_is_absent() {
    let raw = RawMessage::from_parts(199, Bytes::new());
    assert!(raw.payload.is_none());
    assert!(matches!(
        Message::try_from(raw),
        Err(PosdetError::MissingPayload {
            kind: MessageKind::AckNotification
        })
    ));
}

#[test]
fn test_from_parts_large_type_is_malformed() {
    let raw = RawMessage::from_parts(u32::MAX, Bytes::new());
    assert!(matches!(
        raw.message_kind(),
        Err(PosdetError::MalformedTag {
            field: TagField::MessageType,
            ..
        })
    ));
}

#[test]
fn test_decode_hex_ignores_whitespace() {
    let message = Message::decode_hex("08 c7 01 12 02 08 01\n").unwrap();
    assert_eq!(message, Message::AckNotification(NotificationKind::Enable));
    assert!(matches!(Message::decode_hex("0g"), Err(PosdetError::Hex(_))));
}

#[test]
fn test_notification_pairs_with_request() {
    for notification in NotificationKind::iter() {
        let request = notification.acknowledges();
        assert_eq!(request.direction(), Direction::HostToChre);
        assert_eq!(NotificationKind::for_request(request), Some(notification));
    }
    assert_eq!(NotificationKind::for_request(MessageKind::PositionDetected), None);
}

#[test]
fn test_enum_parsing_from_cli_names() {
    assert_eq!("face-down-on-table".parse::<PositionKind>().unwrap(), PositionKind::FaceDownOnTable);
    assert_eq!(
        "sticky-stationary".parse::<ConfigPresetKind>().unwrap(),
        ConfigPresetKind::StickyStationary
    );
    assert_eq!("request-update".parse::<NotificationKind>().unwrap(), NotificationKind::RequestUpdate);
    assert!("sideways".parse::<PositionKind>().is_err());
}

#[test]
fn test_stationary_positions() {
    let stationary: Vec<PositionKind> = PositionKind::iter().filter(PositionKind::is_stationary).collect();
    assert_eq!(
        stationary,
        vec![
            PositionKind::FaceUpOnTable,
            PositionKind::FaceDownOnTable,
            PositionKind::StationaryUnknown
        ]
    );
}

#[test]
fn test_message_display() {
    let message = Message::PositionDetected(PositionKind::InMotion);
    assert_eq!(message.to_string(), "[C2H] position-detected: in-motion");
    assert_eq!(Message::ForceUpdate.to_string(), "[H2C] force-update");
}

#[test]
fn test_raw_display() {
    let raw = RawMessage::new(0, None);
    assert_eq!(raw.to_string(), "unknown (0) no payload");
    let raw = Message::PositionDetected(PositionKind::FaceUpOnTable).to_raw();
    assert_eq!(raw.to_string(), "position-detected (200) payload=0802");
}

#[test]
fn test_schema_violation_classification() {
    let err = Message::decode(&[]).unwrap_err();
    assert!(err.is_schema_violation());

    let err = Message::decode(&[0xff]).unwrap_err();
    assert!(matches!(err, PosdetError::Decode(_)));
    assert!(!err.is_schema_violation());
}
