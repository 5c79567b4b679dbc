//! The consumed boundary of the external account and transport layer.
//!
//! The account layer owns identities, devices, and message delivery. The
//! consumption layer only sees the identity it operates for and the messages
//! the transport hands over; both are modeled here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wallet_core::{Address, DeviceId};

use crate::notifications::Notification;

/// The identity and device this consumption instance operates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContext {
    /// Address of the local identity.
    pub address: Address,
    /// The device this process runs on.
    pub device_id: DeviceId,
}

impl AccountContext {
    /// Creates an account context.
    #[must_use]
    pub const fn new(address: Address, device_id: DeviceId) -> Self {
        Self { address, device_id }
    }
}

/// A transport message carrying notification content.
///
/// Produced by the external messaging layer; `NotificationsController::sent`
/// and `received` translate it into a `LocalNotification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Whether the local identity authored this message.
    pub is_own: bool,

    /// Addresses the message was sent to.
    pub recipients: Vec<Address>,

    /// Address of the message's author.
    pub created_by: Address,

    /// When the message was created.
    pub created_at: DateTime<Utc>,

    /// The notification the message carries.
    pub content: Notification,
}
