//! The local notification record.
//!
//! The wire body (`Notification`) travels inside a transport message; the
//! local record (`LocalNotification`) wraps it with direction, peer, status
//! and the receiving device. Own notifications start `Sent`, inbound ones
//! start `Open`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use wallet_core::{Address, DeviceId, NotificationId};

use crate::notifications::items::NotificationItem;

/// The notification body exchanged between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique id of the notification.
    pub id: NotificationId,

    /// The side effects to apply, in order.
    pub items: Vec<NotificationItem>,
}

/// Processing status of a local notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Inbound, not yet processed.
    Open,
    /// Own notification, handed to the transport.
    Sent,
    /// All items processed successfully.
    Completed,
    /// Processing failed; retry is caller-initiated.
    Error,
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Sent => "sent",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A notification as stored by the local account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalNotification {
    /// Unique id of the notification.
    pub id: NotificationId,

    /// Whether the local identity authored the notification.
    pub is_own: bool,

    /// The exchange peer (recipient for own, author for inbound).
    pub peer: Address,

    /// When the local record was created.
    pub created_at: DateTime<Utc>,

    /// Processing status.
    pub status: NotificationStatus,

    /// The side effects, in declared order.
    pub items: Vec<NotificationItem>,

    /// The device that received the notification; inbound only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_by_device: Option<DeviceId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&NotificationStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        assert_eq!(NotificationStatus::Error.to_string(), "error");
    }

    #[test]
    fn local_notification_roundtrip() {
        let record = LocalNotification {
            id: NotificationId::new(),
            is_own: false,
            peer: Address::from_bytes([2u8; 32]),
            created_at: Utc::now(),
            status: NotificationStatus::Open,
            items: vec![NotificationItem::AttributeDeleted {
                attribute_id: wallet_core::AttributeId::new(),
                deletion_date: Utc::now(),
            }],
            received_by_device: Some(DeviceId::new()),
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: LocalNotification = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
