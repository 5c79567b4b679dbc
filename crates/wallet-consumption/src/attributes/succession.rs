//! Succession parameters and validation.
//!
//! Succeeding an attribute creates a new version record and retires the old
//! one's mutability. The checks here are shared by every `succeed_*`
//! operation; each violated rule maps to its own error variant so callers
//! can discriminate.

use serde::{Deserialize, Serialize};
use wallet_core::{Address, AttributeContent, AttributeId};

use crate::attributes::local_attribute::{LocalAttribute, SharingReference};
use crate::error::{ConsumptionError, ConsumptionResult};

/// Parameters describing the successor version to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSuccessorParams {
    /// Caller-fixed id for the successor. Used when mirroring a peer's
    /// succession so both sides end up with the same id; a fresh id is
    /// generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AttributeId>,

    /// The successor's content. Must differ from the predecessor's content
    /// but keep owner, content kind, value type and key.
    pub content: AttributeContent,

    /// Expected peer of the successor copy. When present it must match the
    /// predecessor's peer; shared-copy succession never moves a copy to a
    /// different peer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer: Option<Address>,

    /// Sharing reference for the successor copy; the predecessor's
    /// reference is carried forward when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<SharingReference>,

    /// Repository attribute backing the successor copy, for own-shared
    /// succession.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_attribute_id: Option<AttributeId>,
}

impl AttributeSuccessorParams {
    /// Successor params carrying only new content.
    #[must_use]
    pub fn from_content(content: AttributeContent) -> Self {
        Self {
            id: None,
            content,
            peer: None,
            reference: None,
            source_attribute_id: None,
        }
    }

    /// Fixes the successor id, consuming and returning the params.
    #[must_use]
    pub fn with_id(mut self, id: AttributeId) -> Self {
        self.id = Some(id);
        self
    }
}

/// The result of a succession: both versions, freshly persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessionPair {
    /// The retired version, now carrying a `succeeded_by` link.
    pub predecessor: LocalAttribute,
    /// The new version.
    pub successor: LocalAttribute,
}

/// Validates a proposed succession against the predecessor.
///
/// Covers the predecessor-side invariants: the predecessor must be a
/// current, standalone version, and the successor content must change the
/// value without changing owner, content kind, value type, or key.
pub(crate) fn validate_succession(
    predecessor: &LocalAttribute,
    successor_content: &AttributeContent,
) -> ConsumptionResult<()> {
    if predecessor.parent_id.is_some() {
        return Err(ConsumptionError::CannotSucceedChildOfComplexAttribute(
            predecessor.id,
        ));
    }
    if predecessor.succeeded_by.is_some() {
        return Err(ConsumptionError::AttributeAlreadySucceeded(predecessor.id));
    }
    if successor_content == &predecessor.content {
        return Err(ConsumptionError::SuccessionMustChangeContent);
    }
    if successor_content.owner() != predecessor.content.owner() {
        return Err(ConsumptionError::SuccessionMustNotChangeOwner);
    }
    if successor_content.is_identity() != predecessor.content.is_identity() {
        return Err(ConsumptionError::SuccessionMustNotChangeContentKind);
    }
    if successor_content.value_type() != predecessor.content.value_type() {
        return Err(ConsumptionError::SuccessionMustNotChangeValueType {
            predecessor: predecessor.content.value_type(),
            successor: successor_content.value_type(),
        });
    }
    if successor_content.relationship_key() != predecessor.content.relationship_key() {
        return Err(ConsumptionError::SuccessionMustNotChangeKey);
    }
    Ok(())
}

/// Validates the peer expectation of shared-copy succession.
pub(crate) fn validate_succession_peer(
    predecessor: &LocalAttribute,
    expected_peer: Option<&Address>,
) -> ConsumptionResult<()> {
    if let (Some(expected), Some(actual)) = (expected_peer, predecessor.peer()) {
        if expected != actual {
            return Err(ConsumptionError::SuccessionMustNotChangePeer);
        }
    }
    Ok(())
}

/// Validates an existing record found under a caller-fixed successor id.
///
/// A successor must not exist before the succession creates it; and a
/// record that additionally has its own successor indicates the caller is
/// succeeding into the middle of a chain.
pub(crate) fn validate_fixed_successor_id(
    existing: Option<&LocalAttribute>,
) -> ConsumptionResult<()> {
    match existing {
        None => Ok(()),
        Some(record) if record.has_successor() => Err(
            ConsumptionError::SuccessorMustNotHaveSuccessor(record.id),
        ),
        Some(record) => Err(ConsumptionError::SuccessorMustNotExistYet(record.id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::local_attribute::AttributeKind;
    use chrono::Utc;
    use wallet_core::{
        AttributeValue, Confidentiality, IdentityAttribute, RelationshipAttribute,
    };

    fn owner() -> Address {
        Address::from_bytes([1u8; 32])
    }

    fn given_name(value: &str) -> AttributeContent {
        AttributeContent::Identity(IdentityAttribute::new(
            owner(),
            AttributeValue::GivenName {
                value: value.to_string(),
            },
        ))
    }

    fn repository(content: AttributeContent) -> LocalAttribute {
        LocalAttribute {
            id: AttributeId::new(),
            content,
            created_at: Utc::now(),
            kind: AttributeKind::Repository,
            succeeds: None,
            succeeded_by: None,
            parent_id: None,
            deletion_info: None,
        }
    }

    #[test]
    fn accepts_changed_value() {
        let predecessor = repository(given_name("Heinz"));
        assert!(validate_succession(&predecessor, &given_name("Heinrich")).is_ok());
    }

    #[test]
    fn rejects_unchanged_content() {
        let predecessor = repository(given_name("Heinz"));
        let err = validate_succession(&predecessor, &given_name("Heinz")).unwrap_err();
        assert!(matches!(err, ConsumptionError::SuccessionMustChangeContent));
    }

    #[test]
    fn rejects_changed_owner() {
        let predecessor = repository(given_name("Heinz"));
        let successor = AttributeContent::Identity(IdentityAttribute::new(
            Address::from_bytes([9u8; 32]),
            AttributeValue::GivenName {
                value: "Heinrich".to_string(),
            },
        ));
        let err = validate_succession(&predecessor, &successor).unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::SuccessionMustNotChangeOwner
        ));
    }

    #[test]
    fn rejects_changed_content_kind() {
        let predecessor = repository(given_name("Heinz"));
        let successor = AttributeContent::Relationship(RelationshipAttribute::new(
            owner(),
            "key",
            AttributeValue::ProprietaryString {
                title: "t".to_string(),
                description: None,
                value: "v".to_string(),
            },
            Confidentiality::Public,
        ));
        let err = validate_succession(&predecessor, &successor).unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::SuccessionMustNotChangeContentKind
        ));
    }

    #[test]
    fn rejects_changed_value_type() {
        let predecessor = repository(given_name("Heinz"));
        let successor = AttributeContent::Identity(IdentityAttribute::new(
            owner(),
            AttributeValue::Surname {
                value: "Becker".to_string(),
            },
        ));
        let err = validate_succession(&predecessor, &successor).unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::SuccessionMustNotChangeValueType {
                predecessor: "GivenName",
                successor: "Surname",
            }
        ));
    }

    #[test]
    fn rejects_changed_relationship_key() {
        let make = |key: &str, value: &str| {
            AttributeContent::Relationship(RelationshipAttribute::new(
                owner(),
                key,
                AttributeValue::ProprietaryString {
                    title: "t".to_string(),
                    description: None,
                    value: value.to_string(),
                },
                Confidentiality::Public,
            ))
        };
        let predecessor = repository(make("a", "1"));
        let err = validate_succession(&predecessor, &make("b", "2")).unwrap_err();
        assert!(matches!(err, ConsumptionError::SuccessionMustNotChangeKey));
    }

    #[test]
    fn rejects_already_succeeded_predecessor() {
        let mut predecessor = repository(given_name("Heinz"));
        predecessor.succeeded_by = Some(AttributeId::new());
        let err = validate_succession(&predecessor, &given_name("Heinrich")).unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::AttributeAlreadySucceeded(_)
        ));
    }

    #[test]
    fn rejects_child_of_complex_attribute() {
        let mut predecessor = repository(given_name("Heinz"));
        predecessor.parent_id = Some(AttributeId::new());
        let err = validate_succession(&predecessor, &given_name("Heinrich")).unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::CannotSucceedChildOfComplexAttribute(_)
        ));
    }

    #[test]
    fn peer_expectation_must_match() {
        let peer = Address::from_bytes([2u8; 32]);
        let mut record = repository(given_name("Heinz"));
        record.kind = AttributeKind::OwnShared {
            peer,
            reference: SharingReference::Request(wallet_core::RequestId::new()),
            source_attribute_id: None,
        };

        assert!(validate_succession_peer(&record, Some(&peer)).is_ok());
        assert!(validate_succession_peer(&record, None).is_ok());

        let other = Address::from_bytes([3u8; 32]);
        let err = validate_succession_peer(&record, Some(&other)).unwrap_err();
        assert!(matches!(err, ConsumptionError::SuccessionMustNotChangePeer));
    }

    #[test]
    fn fixed_successor_id_collisions() {
        assert!(validate_fixed_successor_id(None).is_ok());

        let existing = repository(given_name("Heinz"));
        let err = validate_fixed_successor_id(Some(&existing)).unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::SuccessorMustNotExistYet(_)
        ));

        let mut chained = repository(given_name("Heinz"));
        chained.succeeded_by = Some(AttributeId::new());
        let err = validate_fixed_successor_id(Some(&chained)).unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::SuccessorMustNotHaveSuccessor(_)
        ));
    }
}
