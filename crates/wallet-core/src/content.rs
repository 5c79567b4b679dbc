//! Attribute content: identity vs. relationship data.
//!
//! An attribute's content is either an `IdentityAttribute` (personal or
//! organizational data owned by its subject, shareable with any number of
//! peers) or a `RelationshipAttribute` (data that is only meaningful within
//! one relationship, carrying a key for uniqueness and a confidentiality
//! level). The two form a closed sum tagged with `@type`, which is the
//! discriminator persisted in documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Address;
use crate::values::AttributeValue;

/// Confidentiality level of a relationship attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidentiality {
    /// May be forwarded to third parties.
    Public,
    /// Visible within the relationship, not to be forwarded.
    Protected,
    /// Must never leave the owner's side.
    Private,
}

/// Personal or organizational data owned by the identity it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityAttribute {
    /// Address of the identity the value describes.
    pub owner: Address,

    /// The attribute's value.
    pub value: AttributeValue,

    /// Free-form tags used for querying and organization.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Start of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl IdentityAttribute {
    /// Creates an identity attribute with no tags and an open validity window.
    #[must_use]
    pub fn new(owner: Address, value: AttributeValue) -> Self {
        Self {
            owner,
            value,
            tags: Vec::new(),
            valid_from: None,
            valid_to: None,
        }
    }

    /// Adds tags, consuming and returning the attribute.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Data meaningful only within one relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipAttribute {
    /// Address of the identity the value describes.
    pub owner: Address,

    /// Key for uniqueness within the relationship.
    pub key: String,

    /// The attribute's value (typically a proprietary value).
    pub value: AttributeValue,

    /// Who may see or forward the value.
    pub confidentiality: Confidentiality,

    /// Technical attributes are managed by applications, not shown to users.
    #[serde(default)]
    pub is_technical: bool,

    /// Start of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl RelationshipAttribute {
    /// Creates a relationship attribute with the given key and confidentiality.
    #[must_use]
    pub fn new(
        owner: Address,
        key: impl Into<String>,
        value: AttributeValue,
        confidentiality: Confidentiality,
    ) -> Self {
        Self {
            owner,
            key: key.into(),
            value,
            confidentiality,
            is_technical: false,
            valid_from: None,
            valid_to: None,
        }
    }
}

/// The content of a local attribute.
///
/// Closed sum over the two content kinds. Succession must never change the
/// discriminant of this sum; the compiler enforces handling of both kinds at
/// every processor boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum AttributeContent {
    /// Identity data, shareable with any number of peers.
    Identity(IdentityAttribute),
    /// Relationship-scoped data.
    Relationship(RelationshipAttribute),
}

impl AttributeContent {
    /// Address of the identity the content describes.
    #[must_use]
    pub fn owner(&self) -> &Address {
        match self {
            Self::Identity(attribute) => &attribute.owner,
            Self::Relationship(attribute) => &attribute.owner,
        }
    }

    /// The carried value.
    #[must_use]
    pub fn value(&self) -> &AttributeValue {
        match self {
            Self::Identity(attribute) => &attribute.value,
            Self::Relationship(attribute) => &attribute.value,
        }
    }

    /// The value's `@type` discriminator.
    #[must_use]
    pub fn value_type(&self) -> &'static str {
        self.value().value_type()
    }

    /// Whether this is identity content.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity(_))
    }

    /// Whether this is relationship content.
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        matches!(self, Self::Relationship(_))
    }

    /// The relationship key, if this is relationship content.
    #[must_use]
    pub fn relationship_key(&self) -> Option<&str> {
        match self {
            Self::Identity(_) => None,
            Self::Relationship(attribute) => Some(&attribute.key),
        }
    }

    /// Validity window as a pair, regardless of content kind.
    #[must_use]
    pub fn validity_window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match self {
            Self::Identity(attribute) => (attribute.valid_from, attribute.valid_to),
            Self::Relationship(attribute) => (attribute.valid_from, attribute.valid_to),
        }
    }

    /// Returns a copy of this content carrying a different value.
    ///
    /// Used when constructing succession content: everything but the value
    /// (owner, kind, key, confidentiality, tags) is preserved.
    #[must_use]
    pub fn with_value(&self, value: AttributeValue) -> Self {
        match self {
            Self::Identity(attribute) => Self::Identity(IdentityAttribute {
                value,
                ..attribute.clone()
            }),
            Self::Relationship(attribute) => Self::Relationship(RelationshipAttribute {
                value,
                ..attribute.clone()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn given_name(owner: Address) -> AttributeContent {
        AttributeContent::Identity(IdentityAttribute::new(
            owner,
            AttributeValue::GivenName {
                value: "Heinz".to_string(),
            },
        ))
    }

    #[test]
    fn identity_content_roundtrip() {
        let content = given_name(Address::from_bytes([1u8; 32]));
        let json = serde_json::to_string(&content).unwrap();
        assert!(json.contains("\"@type\":\"Identity\""));
        let parsed: AttributeContent = serde_json::from_str(&json).unwrap();
        assert_eq!(content, parsed);
    }

    #[test]
    fn relationship_content_roundtrip() {
        let content = AttributeContent::Relationship(RelationshipAttribute::new(
            Address::from_bytes([2u8; 32]),
            "customerNumber",
            AttributeValue::ProprietaryString {
                title: "Customer number".to_string(),
                description: None,
                value: "KD-1234".to_string(),
            },
            Confidentiality::Protected,
        ));
        let json = serde_json::to_string(&content).unwrap();
        let parsed: AttributeContent = serde_json::from_str(&json).unwrap();
        assert_eq!(content, parsed);
        assert_eq!(parsed.relationship_key(), Some("customerNumber"));
    }

    #[test]
    fn owner_and_value_type_accessors() {
        let owner = Address::from_bytes([3u8; 32]);
        let content = given_name(owner);
        assert_eq!(content.owner(), &owner);
        assert_eq!(content.value_type(), "GivenName");
        assert!(content.is_identity());
        assert!(!content.is_relationship());
    }

    #[test]
    fn with_value_preserves_everything_else() {
        let owner = Address::from_bytes([4u8; 32]);
        let content = AttributeContent::Identity(
            IdentityAttribute::new(
                owner,
                AttributeValue::GivenName {
                    value: "Heinz".to_string(),
                },
            )
            .with_tags(vec!["formal".to_string()]),
        );

        let succeeded = content.with_value(AttributeValue::GivenName {
            value: "Heinrich".to_string(),
        });

        assert_eq!(succeeded.owner(), &owner);
        assert_eq!(succeeded.value_type(), "GivenName");
        match &succeeded {
            AttributeContent::Identity(attribute) => {
                assert_eq!(attribute.tags, vec!["formal".to_string()]);
            }
            AttributeContent::Relationship(_) => panic!("content kind changed"),
        }
    }

    #[test]
    fn confidentiality_serializes_lowercase() {
        let json = serde_json::to_string(&Confidentiality::Protected).unwrap();
        assert_eq!(json, "\"protected\"");
    }
}
