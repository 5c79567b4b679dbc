//! The per-item-type notification processor contract.
//!
//! Each notification item kind has one processor implementing this trait.
//! `process` applies the item's effect and must be self-contained: if it
//! cannot complete it either has not mutated state yet or raises an error
//! so the saga can reverse exactly what it did. `rollback` restores the
//! pre-`process` state and must be safe to call when `process` never ran.

use async_trait::async_trait;
use wallet_core::ValidationResult;

use crate::error::ConsumptionResult;
use crate::events::ConsumptionEvent;
use crate::notifications::items::{NotificationItem, NotificationItemKind};
use crate::notifications::local_notification::LocalNotification;

/// Processor for one notification item kind.
#[async_trait]
pub trait NotificationItemProcessor: Send + Sync {
    /// The item kind this processor handles; the registry key.
    fn kind(&self) -> NotificationItemKind;

    /// Checks whether the item can be applied in the current local state.
    ///
    /// An error result is treated like a processing failure by the saga.
    async fn check_prerequisites(
        &self,
        item: &NotificationItem,
        notification: &LocalNotification,
    ) -> ConsumptionResult<ValidationResult>;

    /// Applies the item's effect, returning the event to publish on saga
    /// success.
    async fn process(
        &self,
        item: &NotificationItem,
        notification: &LocalNotification,
    ) -> ConsumptionResult<Option<ConsumptionEvent>>;

    /// Restores the state from before `process`.
    ///
    /// Idempotent if `process` was never reached for this item.
    async fn rollback(
        &self,
        item: &NotificationItem,
        notification: &LocalNotification,
    ) -> ConsumptionResult<()>;
}

impl std::fmt::Debug for dyn NotificationItemProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationItemProcessor")
            .field("kind", &self.kind())
            .finish()
    }
}
