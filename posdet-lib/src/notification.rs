use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::{PosdetError, TagField};
use crate::packet::MessageKind;

/// Control signal named by an acknowledgment. Value 0 is reserved.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
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
pub enum NotificationKind {
    Enable = 1,
    Disable = 2,
    RequestUpdate = 3,
    ForceUpdate = 4,
    Configure = 5,
}

impl NotificationKind {
    pub fn from_wire(value: i32) -> Result<Self, PosdetError> {
        NotificationKind::try_from_primitive(value)
            .map_err(|e| PosdetError::malformed(TagField::NotificationType, e.number))
    }

    /// The host request this notification acknowledges.
    pub fn acknowledges(&self) -> MessageKind {
        match self {
            NotificationKind::Enable => MessageKind::EnableDetector,
            NotificationKind::Disable => MessageKind::DisableDetector,
            NotificationKind::RequestUpdate => MessageKind::RequestUpdate,
            NotificationKind::ForceUpdate => MessageKind::ForceUpdate,
            NotificationKind::Configure => MessageKind::ConfigureDetector,
        }
    }

    /// The notification the hub sends back for a host request, if any.
    pub fn for_request(kind: MessageKind) -> Option<Self> {
        match kind {
            MessageKind::EnableDetector => Some(NotificationKind::Enable),
            MessageKind::DisableDetector => Some(NotificationKind::Disable),
            MessageKind::RequestUpdate => Some(NotificationKind::RequestUpdate),
            MessageKind::ForceUpdate => Some(NotificationKind::ForceUpdate),
            MessageKind::ConfigureDetector => Some(NotificationKind::Configure),
            MessageKind::AckNotification | MessageKind::PositionDetected => None,
        }
    }
}
