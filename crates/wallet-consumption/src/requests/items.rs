//! Request items and the request tree.
//!
//! A request carries a tree of items and item groups. Each leaf item has a
//! kind-specific payload and an associated processor; the explicit
//! [`RequestItemKind`] discriminator is what the processor registry is
//! keyed by.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use wallet_core::{Address, AttributeContent, AttributeId, AttributeQuery, RequestId};

/// Registry key: the kind of a request item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestItemKind {
    /// Ask the peer to store an attribute copy.
    CreateAttribute,
    /// Offer a repository attribute of one's own.
    ShareAttribute,
    /// Ask the peer to provide an attribute matching a query.
    ReadAttribute,
    /// Ask the peer to delete their copy of an attribute.
    DeleteAttribute,
}

impl RequestItemKind {
    /// Stable name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateAttribute => "CreateAttribute",
            Self::ShareAttribute => "ShareAttribute",
            Self::ReadAttribute => "ReadAttribute",
            Self::DeleteAttribute => "DeleteAttribute",
        }
    }
}

impl fmt::Display for RequestItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific payload of a request item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum RequestItemPayload {
    /// The sender asks the recipient to store a copy of an attribute the
    /// sender owns.
    CreateAttribute {
        /// The content to store.
        attribute: AttributeContent,
    },

    /// The sender offers one of its repository attributes.
    ShareAttribute {
        /// The sender's repository attribute the offer is made from.
        source_attribute_id: AttributeId,
        /// The offered content (must match the source).
        attribute: AttributeContent,
    },

    /// The sender asks the recipient to provide an attribute matching a
    /// query.
    ReadAttribute {
        /// The shape the answer must satisfy.
        query: AttributeQuery,
    },

    /// The sender (data owner) asks the recipient to delete the shared
    /// copy.
    DeleteAttribute {
        /// Id of the shared copy (identical on both sides).
        attribute_id: AttributeId,
    },
}

impl RequestItemPayload {
    /// The payload's registry kind.
    #[must_use]
    pub fn kind(&self) -> RequestItemKind {
        match self {
            Self::CreateAttribute { .. } => RequestItemKind::CreateAttribute,
            Self::ShareAttribute { .. } => RequestItemKind::ShareAttribute,
            Self::ReadAttribute { .. } => RequestItemKind::ReadAttribute,
            Self::DeleteAttribute { .. } => RequestItemKind::DeleteAttribute,
        }
    }
}

/// A leaf item of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    /// Optional display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Whether the recipient may reject this item while accepting the
    /// request.
    #[serde(default)]
    pub must_be_accepted: bool,

    /// The kind-specific payload.
    #[serde(flatten)]
    pub payload: RequestItemPayload,
}

impl RequestItem {
    /// Creates an item from a payload, without title, rejectable.
    #[must_use]
    pub fn new(payload: RequestItemPayload) -> Self {
        Self {
            title: None,
            must_be_accepted: false,
            payload,
        }
    }

    /// The item's registry kind.
    #[must_use]
    pub fn kind(&self) -> RequestItemKind {
        self.payload.kind()
    }
}

/// A titled group of request items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItemGroup {
    /// Optional display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The grouped items.
    pub items: Vec<RequestItem>,
}

/// One node of a request's item tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestItemOrGroup {
    /// A group of items.
    Group(RequestItemGroup),
    /// A leaf item.
    Item(RequestItem),
}

/// A structured exchange of items between two identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique id of the request.
    pub id: RequestId,

    /// The item tree.
    pub items: Vec<RequestItemOrGroup>,

    /// When the request stops being answerable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Context handed to item processors: which request the item belongs to and
/// which peer it is exchanged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestInfo {
    /// The surrounding request.
    pub id: RequestId,
    /// The exchange peer.
    pub peer: Address,
}

/// Parameters for accepting one request item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum AcceptRequestItemParams {
    /// No decision data beyond the acceptance itself.
    Simple,
    /// The answer to a read-attribute item.
    ReadAttribute {
        /// The chosen answer.
        answer: ReadAttributeAnswer,
    },
}

impl AcceptRequestItemParams {
    /// Name of the params kind, for error reporting.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Simple => "Simple",
            Self::ReadAttribute { .. } => "ReadAttribute",
        }
    }
}

/// How a read-attribute item is answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum ReadAttributeAnswer {
    /// Answer with an existing repository attribute.
    ExistingAttribute {
        /// Its id.
        attribute_id: AttributeId,
    },
    /// Answer with freshly provided content.
    NewAttribute {
        /// The content to create and share.
        attribute: AttributeContent,
    },
}

/// Parameters for rejecting one request item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RejectRequestItemParams {
    /// Machine-readable rejection code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Human-readable rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
