//! Response items.
//!
//! Deciding a request item produces a response item: an accept carrying a
//! kind-specific payload, or a reject carrying the recorded reason. The
//! accept payloads mirror the request item kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wallet_core::{AttributeContent, AttributeId};

/// Kind-specific payload of an accept response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum AcceptResponseItem {
    /// Bare acceptance with no payload.
    Generic,

    /// The recipient stored the attribute copy.
    CreateAttribute {
        /// Id of the created copy (identical on both sides).
        attribute_id: AttributeId,
    },

    /// The recipient stored the offered attribute copy.
    ShareAttribute {
        /// Id of the created copy (identical on both sides).
        attribute_id: AttributeId,
    },

    /// The recipient answered the query with an attribute.
    ReadAttribute {
        /// Id of the shared copy (identical on both sides).
        attribute_id: AttributeId,
        /// The provided content.
        attribute: AttributeContent,
    },

    /// The recipient will delete its copy.
    DeleteAttribute {
        /// When the deletion is due.
        deletion_date: DateTime<Utc>,
    },
}

impl AcceptResponseItem {
    /// Stable name of the payload kind, for error reporting.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic => "Generic",
            Self::CreateAttribute { .. } => "CreateAttribute",
            Self::ShareAttribute { .. } => "ShareAttribute",
            Self::ReadAttribute { .. } => "ReadAttribute",
            Self::DeleteAttribute { .. } => "DeleteAttribute",
        }
    }
}

/// The decision over one request item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResponseItem {
    /// The item was accepted; the payload describes the executed effect.
    Accepted {
        /// Kind-specific accept payload.
        #[serde(flatten)]
        payload: AcceptResponseItem,
    },
    /// The item was rejected.
    Rejected {
        /// Machine-readable rejection code.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        /// Human-readable rejection reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ResponseItem {
    /// An accept response with the given payload.
    #[must_use]
    pub fn accepted(payload: AcceptResponseItem) -> Self {
        Self::Accepted { payload }
    }

    /// Whether this is an accept response.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The accept payload, if this is an accept response.
    #[must_use]
    pub fn as_accepted(&self) -> Option<&AcceptResponseItem> {
        match self {
            Self::Accepted { payload } => Some(payload),
            Self::Rejected { .. } => None,
        }
    }
}
