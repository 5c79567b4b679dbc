//! The local attribute record.
//!
//! A `LocalAttribute` is one version of one piece of shareable data, as held
//! by the local account. Its `kind` says what role the record plays
//! (unshared master copy, a copy I sent, a copy I received, a third-party
//! relationship copy); succession links chain versions together; deletion
//! is bookkeeping on shared copies and a physical delete only for
//! repository attributes.
//!
//! Every dimension that the original protocol expressed through class
//! hierarchies is a closed serde-tagged sum here, so exhaustive matches at
//! the processor boundaries are compiler-enforced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use wallet_core::{Address, AttributeContent, AttributeId, NotificationId, RequestId};

// ============================================================================
// Sharing
// ============================================================================

/// What exchange created a shared copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum SharingReference {
    /// The copy was created by accepting a request item.
    Request(RequestId),
    /// The copy was created by processing a notification item.
    Notification(NotificationId),
}

/// The role a local attribute record plays.
///
/// Sharing info lives inside the non-repository variants, which makes
/// "sharing info present iff kind is not repository" structural instead of
/// a runtime invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttributeKind {
    /// The unshared master copy, held only by its owner.
    Repository,

    /// A copy the local identity created and sent to a peer.
    OwnShared {
        /// The peer the copy was shared with.
        peer: Address,
        /// The exchange that created the copy.
        reference: SharingReference,
        /// The repository attribute the copy was made from, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_attribute_id: Option<AttributeId>,
    },

    /// A copy a peer created and sent to the local identity.
    PeerShared {
        /// The peer that shared the copy.
        peer: Address,
        /// The exchange that created the copy.
        reference: SharingReference,
    },

    /// A relationship attribute involving a third party.
    ThirdPartyRelationship {
        /// The peer the copy was exchanged with.
        peer: Address,
        /// The exchange that created the copy.
        reference: SharingReference,
        /// The third party the attribute stems from.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        third_party_address: Option<Address>,
    },
}

impl AttributeKind {
    /// The kind's serialized discriminator.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Repository => "Repository",
            Self::OwnShared { .. } => "OwnShared",
            Self::PeerShared { .. } => "PeerShared",
            Self::ThirdPartyRelationship { .. } => "ThirdPartyRelationship",
        }
    }

    /// The peer a shared copy was exchanged with, if this is a shared kind.
    #[must_use]
    pub fn peer(&self) -> Option<&Address> {
        match self {
            Self::Repository => None,
            Self::OwnShared { peer, .. }
            | Self::PeerShared { peer, .. }
            | Self::ThirdPartyRelationship { peer, .. } => Some(peer),
        }
    }

    /// Whether a deletion status is in the allowed set for this kind.
    ///
    /// Repository attributes never carry deletion info (they are deleted
    /// physically); the other kinds each allow their own subset.
    #[must_use]
    pub fn allows_deletion_status(&self, status: DeletionStatus) -> bool {
        match self {
            Self::Repository => false,
            Self::OwnShared { .. } => matches!(
                status,
                DeletionStatus::DeletionRequestSent
                    | DeletionStatus::DeletionRequestRejected
                    | DeletionStatus::ToBeDeleted
                    | DeletionStatus::ToBeDeletedByPeer
                    | DeletionStatus::DeletedByPeer
            ),
            Self::PeerShared { .. } => matches!(
                status,
                DeletionStatus::DeletedByOwner | DeletionStatus::ToBeDeleted
            ),
            Self::ThirdPartyRelationship { .. } => {
                matches!(status, DeletionStatus::DeletedByPeer)
            }
        }
    }

    /// The status a peer-initiated deletion maps to for this kind.
    ///
    /// `None` for repository attributes, which peers cannot delete.
    #[must_use]
    pub fn peer_deletion_status(&self) -> Option<DeletionStatus> {
        match self {
            Self::Repository => None,
            Self::OwnShared { .. } => Some(DeletionStatus::DeletedByPeer),
            Self::PeerShared { .. } => Some(DeletionStatus::DeletedByOwner),
            Self::ThirdPartyRelationship { .. } => Some(DeletionStatus::DeletedByPeer),
        }
    }
}

// ============================================================================
// Deletion
// ============================================================================

/// Lifecycle status of a (pending or executed) deletion.
///
/// One closed sum across all ownership kinds; which statuses a given record
/// may carry is decided by [`AttributeKind::allows_deletion_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionStatus {
    /// The owner asked the peer to delete their copy.
    DeletionRequestSent,
    /// The peer refused to delete their copy.
    DeletionRequestRejected,
    /// The local copy is scheduled for deletion.
    ToBeDeleted,
    /// The peer announced they will delete their copy.
    ToBeDeletedByPeer,
    /// The peer deleted their copy.
    DeletedByPeer,
    /// The owner deleted the original.
    DeletedByOwner,
}

impl DeletionStatus {
    /// Terminal statuses are never overwritten by later propagation.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::DeletedByPeer | Self::DeletedByOwner)
    }
}

impl fmt::Display for DeletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DeletionRequestSent => "deletion_request_sent",
            Self::DeletionRequestRejected => "deletion_request_rejected",
            Self::ToBeDeleted => "to_be_deleted",
            Self::ToBeDeletedByPeer => "to_be_deleted_by_peer",
            Self::DeletedByPeer => "deleted_by_peer",
            Self::DeletedByOwner => "deleted_by_owner",
        };
        write!(f, "{name}")
    }
}

/// Deletion bookkeeping on a shared attribute record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionInfo {
    /// The deletion lifecycle status.
    pub status: DeletionStatus,
    /// When the status was recorded (or the deletion is due).
    pub date: DateTime<Utc>,
}

impl DeletionInfo {
    /// Creates deletion info.
    #[must_use]
    pub const fn new(status: DeletionStatus, date: DateTime<Utc>) -> Self {
        Self { status, date }
    }
}

// ============================================================================
// LocalAttribute
// ============================================================================

/// One version of one piece of shareable data held by the local account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAttribute {
    /// Unique id of this version. Shared copies carry the same id on both
    /// peers; succession versions each get their own id.
    pub id: AttributeId,

    /// The attribute's content.
    pub content: AttributeContent,

    /// When this record was created locally.
    pub created_at: DateTime<Utc>,

    /// The role this record plays (repository, own-shared, peer-shared,
    /// third-party relationship).
    pub kind: AttributeKind,

    /// Id of the version this record succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub succeeds: Option<AttributeId>,

    /// Id of the version that succeeded this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub succeeded_by: Option<AttributeId>,

    /// Parent id, set on children of complex attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<AttributeId>,

    /// Deletion bookkeeping; never present on repository attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_info: Option<DeletionInfo>,
}

impl LocalAttribute {
    /// Whether this is the unshared master copy.
    #[must_use]
    pub fn is_repository(&self) -> bool {
        matches!(self.kind, AttributeKind::Repository)
    }

    /// Whether this is a copy the local identity shared with a peer.
    #[must_use]
    pub fn is_own_shared(&self) -> bool {
        matches!(self.kind, AttributeKind::OwnShared { .. })
    }

    /// Whether this is a copy a peer shared with the local identity.
    #[must_use]
    pub fn is_peer_shared(&self) -> bool {
        matches!(self.kind, AttributeKind::PeerShared { .. })
    }

    /// Whether this is a third-party relationship copy.
    #[must_use]
    pub fn is_third_party(&self) -> bool {
        matches!(self.kind, AttributeKind::ThirdPartyRelationship { .. })
    }

    /// The peer a shared copy was exchanged with, if any.
    #[must_use]
    pub fn peer(&self) -> Option<&Address> {
        self.kind.peer()
    }

    /// Whether the given identity owns the content.
    #[must_use]
    pub fn is_owned_by(&self, address: &Address) -> bool {
        self.content.owner() == address
    }

    /// Whether this record has been succeeded.
    #[must_use]
    pub fn has_successor(&self) -> bool {
        self.succeeded_by.is_some()
    }

    /// Whether the record carries the given deletion status.
    #[must_use]
    pub fn has_deletion_status(&self, status: DeletionStatus) -> bool {
        self.deletion_info
            .is_some_and(|info| info.status == status)
    }
}
