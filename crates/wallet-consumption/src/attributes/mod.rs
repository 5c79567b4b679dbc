//! The local attribute model and its controller.

pub mod controller;
pub mod local_attribute;
pub mod succession;

pub use controller::{
    AttributesController, CreateOwnSharedAttributeParams, CreatePeerSharedAttributeParams,
    CreateRepositoryAttributeParams, CreateSharedAttributeCopyParams,
    CreateThirdPartyRelationshipAttributeParams,
};
pub use local_attribute::{
    AttributeKind, DeletionInfo, DeletionStatus, LocalAttribute, SharingReference,
};
pub use succession::{AttributeSuccessorParams, SuccessionPair};
