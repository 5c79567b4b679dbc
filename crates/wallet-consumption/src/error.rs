//! Error types for the consumption layer.
//!
//! One variant per discriminable condition: callers match on the violated
//! rule, so succession, deletion, and saga preconditions each get their own
//! variant instead of a generic catch-all.

use thiserror::Error;
use wallet_core::{AttributeId, MergeError, NotificationId};
use wallet_store::StoreError;

use crate::attributes::DeletionStatus;
use crate::notifications::NotificationStatus;

/// Result type alias for consumption operations.
pub type ConsumptionResult<T> = Result<T, ConsumptionError>;

/// Errors that can occur in the consumption layer.
#[derive(Debug, Error)]
pub enum ConsumptionError {
    // ==================== Succession invariants ====================
    /// A caller-fixed successor id already names an existing attribute.
    #[error("successor attribute {0} must not exist before the succession creates it")]
    SuccessorMustNotExistYet(AttributeId),

    /// The existing record under the caller-fixed successor id already has a
    /// successor of its own.
    #[error("successor attribute {0} must not itself have a successor")]
    SuccessorMustNotHaveSuccessor(AttributeId),

    /// The predecessor already has a successor; succeed the successor instead.
    #[error("attribute {0} already has a successor; succeed the successor instead")]
    AttributeAlreadySucceeded(AttributeId),

    /// Succession with unchanged content is a no-op and therefore invalid.
    #[error("succession must change the attribute's content")]
    SuccessionMustChangeContent,

    /// Succession tried to move the attribute to a different owner.
    #[error("succession must not change the attribute's owner")]
    SuccessionMustNotChangeOwner,

    /// Succession tried to cross the identity/relationship content divide.
    #[error("succession must not change the content kind (identity vs. relationship)")]
    SuccessionMustNotChangeContentKind,

    /// Succession tried to change the value type of the attribute.
    #[error("succession must not change the value type ({predecessor} vs {successor})")]
    SuccessionMustNotChangeValueType {
        predecessor: &'static str,
        successor: &'static str,
    },

    /// Succession of a shared attribute tried to change the peer.
    #[error("succession must not change the peer of a shared attribute")]
    SuccessionMustNotChangePeer,

    /// Succession of a relationship attribute tried to change the key.
    #[error("succession must not change the key of a relationship attribute")]
    SuccessionMustNotChangeKey,

    /// Children of complex attributes are succeeded through their parent.
    #[error("attribute {0} is the child of a complex attribute and cannot be succeeded on its own")]
    CannotSucceedChildOfComplexAttribute(AttributeId),

    /// The attribute does not have the kind/content shape the operation
    /// requires (e.g. succeeding a repository attribute as own-shared).
    #[error("attribute {id} is not a {expected} attribute")]
    UnexpectedAttributeKind {
        id: AttributeId,
        expected: &'static str,
    },

    // ==================== Deletion invariants ====================
    /// Repository attributes are deleted physically, never marked.
    #[error("repository attribute {0} cannot carry deletion info; delete it instead")]
    CannotDeleteRepositoryAttribute(AttributeId),

    /// The status is not in the allowed set for the attribute's kind.
    #[error("deletion status {status} is not valid for {kind} attributes")]
    InvalidDeletionStatusForKind {
        status: DeletionStatus,
        kind: &'static str,
    },

    // ==================== Creation / ownership ====================
    /// The local identity must own the content it creates.
    #[error("the content owner must be the local identity")]
    SenderIsNotOwner,

    /// A shared copy can only be made from a repository attribute.
    #[error("attribute {0} is not a repository attribute")]
    SourceAttributeIsNotRepository(AttributeId),

    // ==================== Not found ====================
    /// Attribute not found.
    #[error("attribute not found: {0}")]
    AttributeNotFound(AttributeId),

    /// Notification not found.
    #[error("notification not found: {0}")]
    NotificationNotFound(NotificationId),

    // ==================== Notification preconditions ====================
    /// Only open or errored notifications can be processed.
    #[error("notification {id} has status {status}; only open or errored notifications can be processed")]
    WrongNotificationStatus {
        id: NotificationId,
        status: NotificationStatus,
    },

    /// Own notifications are applied on the peer's side, never locally.
    #[error("notification {0} is an own notification and cannot be processed")]
    CannotProcessOwnNotification(NotificationId),

    /// Each notification is processed on the device that received it.
    #[error("notification {0} was not received by the current device")]
    NotificationNotReceivedByCurrentDevice(NotificationId),

    /// `sent` only accepts own messages.
    #[error("cannot store a foreign message as a sent notification")]
    CannotStoreForeignNotificationAsSent,

    /// `received` only accepts foreign messages.
    #[error("cannot store an own message as a received notification")]
    CannotStoreOwnNotificationAsReceived,

    /// A sent message must name at least one recipient.
    #[error("message has no recipients")]
    MessageHasNoRecipients,

    /// An item's prerequisites check returned a validation error.
    #[error("notification item prerequisites not met: {code}")]
    PrerequisitesNotMet { code: String },

    // ==================== Registry / configuration ====================
    /// `register_processor` refuses to silently override an existing mapping.
    #[error("a processor is already registered for item kind {0}")]
    ProcessorAlreadyRegistered(&'static str),

    /// Dispatch found no processor for the item's kind.
    #[error("no processor registered for item kind {0}")]
    NoProcessorRegistered(&'static str),

    /// A processor received an item of a kind it was not registered for.
    #[error("processor for {expected} received an item of kind {actual}")]
    WrongItemKind {
        expected: &'static str,
        actual: &'static str,
    },

    /// Decision parameters do not fit the item kind they decide.
    #[error("accept parameters of kind {params} do not fit a {item} item")]
    WrongAcceptParams {
        item: &'static str,
        params: &'static str,
    },

    // ==================== Pass-through ====================
    /// Storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Validation tree shape mismatch (programming defect).
    #[error(transparent)]
    Validation(#[from] MergeError),
}
