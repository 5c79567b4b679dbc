//! Attribute queries.
//!
//! A query describes the structural shape of an attribute one identity asks
//! another to provide: the value type, optional tags, an optional validity
//! window, and for relationship queries the key and confidentiality the
//! answer must carry. Queries travel inside read-attribute request items;
//! whether a concrete attribute satisfies a query is decided by the pure
//! answer validation in the consumption layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Address;

/// Query for an identity attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityAttributeQuery {
    /// Required value type discriminator (e.g. `"GivenName"`).
    pub value_type: String,

    /// Tags the answer must carry (subset match).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// The answer must be valid from this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// The answer must be valid until this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

impl IdentityAttributeQuery {
    /// Creates a query for the given value type with no further constraints.
    #[must_use]
    pub fn for_value_type(value_type: impl Into<String>) -> Self {
        Self {
            value_type: value_type.into(),
            tags: Vec::new(),
            valid_from: None,
            valid_to: None,
        }
    }
}

/// Query for a relationship attribute within the requester/responder
/// relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipAttributeQuery {
    /// Owner the answer must have; `None` leaves it to the responder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,

    /// Relationship key the answer must carry.
    pub key: String,

    /// Required value type discriminator.
    pub value_type: String,

    /// Confidentiality the answer must have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidentiality: Option<crate::content::Confidentiality>,

    /// Title a proprietary answer value must carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Description a proprietary answer value must carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The answer must be valid from this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,

    /// The answer must be valid until this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
}

/// Query for a relationship attribute involving a third party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyRelationshipAttributeQuery {
    /// Relationship key the answer must carry.
    pub key: String,

    /// The third parties the attribute may stem from (at least one).
    pub third_party: Vec<Address>,

    /// Required value type discriminator.
    pub value_type: String,
}

/// The closed sum of query forms carried by read-attribute request items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "@type")]
pub enum AttributeQuery {
    /// Ask for identity data.
    Identity(IdentityAttributeQuery),
    /// Ask for relationship data within this relationship.
    Relationship(RelationshipAttributeQuery),
    /// Ask for relationship data involving a third party.
    ThirdPartyRelationship(ThirdPartyRelationshipAttributeQuery),
}

impl AttributeQuery {
    /// The value type discriminator the answer must carry.
    #[must_use]
    pub fn value_type(&self) -> &str {
        match self {
            Self::Identity(query) => &query.value_type,
            Self::Relationship(query) => &query.value_type,
            Self::ThirdPartyRelationship(query) => &query.value_type,
        }
    }
}
