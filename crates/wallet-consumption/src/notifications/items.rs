//! Notification items.
//!
//! A notification carries a flat ordered list of items, each describing a
//! side effect the recipient must apply locally. The explicit
//! [`NotificationItemKind`] discriminator is what the processor registry is
//! keyed by.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use wallet_core::{AttributeContent, AttributeId};

/// Registry key: the kind of a notification item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationItemKind {
    /// A peer succeeded an attribute shared with us.
    PeerSharedAttributeSucceeded,
    /// A peer deleted (or scheduled deleting) an attribute copy.
    AttributeDeleted,
}

impl NotificationItemKind {
    /// Stable name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PeerSharedAttributeSucceeded => "PeerSharedAttributeSucceeded",
            Self::AttributeDeleted => "AttributeDeleted",
        }
    }
}

impl fmt::Display for NotificationItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One side effect the notification's recipient must apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum NotificationItem {
    /// The owner succeeded an attribute they had shared with the recipient;
    /// the recipient mirrors the succession on its local copy.
    PeerSharedAttributeSucceeded {
        /// The recipient's copy to succeed (ids are shared across peers).
        predecessor_id: AttributeId,
        /// Id the successor copy must be created under.
        successor_id: AttributeId,
        /// The successor's content.
        successor_content: AttributeContent,
    },

    /// A peer deleted (or scheduled deleting) their side of an attribute;
    /// the recipient stamps the kind-appropriate deletion status onto its
    /// local chain.
    AttributeDeleted {
        /// The recipient's affected copy.
        attribute_id: AttributeId,
        /// When the deletion happened or is due.
        deletion_date: DateTime<Utc>,
    },
}

impl NotificationItem {
    /// The item's registry kind.
    #[must_use]
    pub fn kind(&self) -> NotificationItemKind {
        match self {
            Self::PeerSharedAttributeSucceeded { .. } => {
                NotificationItemKind::PeerSharedAttributeSucceeded
            }
            Self::AttributeDeleted { .. } => NotificationItemKind::AttributeDeleted,
        }
    }
}
