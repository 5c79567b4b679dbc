//! wallet-core: Core types for the Attribute Exchange Platform
//!
//! This crate provides:
//! - Id newtypes and identity addresses
//! - Address derivation from Ed25519 public keys
//! - Attribute values, content kinds, and queries
//! - The nested `ValidationResult` tree shared by the processing pipelines
//!
//! It is dependency-light and identity-independent: everything that requires
//! an account context or persistence lives in the consumption layer.

pub mod content;
pub mod identity;
pub mod query;
pub mod types;
pub mod validation;
pub mod values;

pub use content::{AttributeContent, Confidentiality, IdentityAttribute, RelationshipAttribute};
pub use identity::{derive_address, KeyPair, PublicKey, PublicKeyExt};
pub use query::{
    AttributeQuery, IdentityAttributeQuery, RelationshipAttributeQuery,
    ThirdPartyRelationshipAttributeQuery,
};
pub use types::{Address, AddressParseError, AttributeId, DeviceId, NotificationId, RequestId};
pub use validation::{
    ApplicationError, MergeError, ValidationResult, INHERITED_FROM_ITEM_CODE,
};
pub use values::{AttributeValue, ValueError};
