//! wallet-consumption: Attribute lifecycle and peer-exchange processing
//!
//! This crate is the core of the Attribute Exchange Platform:
//! - The `LocalAttribute` record with its succession and deletion state
//!   machine, guarded by the `AttributesController`
//! - The request-item pipeline: per-kind processors with a registry,
//!   validating, deciding, executing and mirroring item effects
//! - The notification-item pipeline: per-kind processors orchestrated by
//!   the `NotificationsController` as a compensating-transaction saga
//! - The `ConsumptionController` composition root wiring one account's
//!   stack
//!
//! # Concurrency
//!
//! Everything is single-threaded-cooperative per account: operations are
//! async and I/O-bound, with no internal parallelism. Callers must
//! serialize notification/request processing per account, since the
//! rollback contract assumes no concurrent mutation of the same
//! attributes. Independent accounts run independent stacks.

pub mod account;
pub mod attributes;
pub mod consumption;
pub mod error;
pub mod events;
pub mod notifications;
pub mod requests;

pub use account::{AccountContext, Message};
pub use attributes::{
    AttributeKind, AttributeSuccessorParams, AttributesController, DeletionInfo, DeletionStatus,
    LocalAttribute, SharingReference, SuccessionPair,
};
pub use consumption::ConsumptionController;
pub use error::{ConsumptionError, ConsumptionResult};
pub use events::{ConsumptionEvent, EventBus};
pub use notifications::{
    LocalNotification, Notification, NotificationItem, NotificationItemKind,
    NotificationItemProcessor, NotificationItemProcessorRegistry, NotificationStatus,
    NotificationsController,
};
pub use requests::{
    AcceptRequestItemParams, AcceptResponseItem, ReadAttributeAnswer, RejectRequestItemParams,
    Request, RequestInfo, RequestItem, RequestItemGroup, RequestItemKind, RequestItemOrGroup,
    RequestItemPayload, RequestItemProcessor, RequestItemProcessorRegistry, ResponseItem,
    validate_answer_to_query,
};

// Re-export the foundation crates for downstream callers.
pub use wallet_core;
pub use wallet_store;
