//! The consumption composition root.
//!
//! Wires the attributes controller, both processor registries (pre-filled
//! with the default processor maps), the event bus, and the notifications
//! controller, all scoped to one local account's collections. Multiple
//! accounts run independent instances over their own databases.

use std::sync::Arc;
use wallet_store::{Database, TypedCollection};

use crate::account::AccountContext;
use crate::attributes::AttributesController;
use crate::error::ConsumptionResult;
use crate::events::EventBus;
use crate::notifications::{
    NotificationItemProcessor, NotificationItemProcessorRegistry, NotificationsController,
};
use crate::requests::{RequestItemProcessor, RequestItemProcessorRegistry};

/// Collection name for local attributes.
const ATTRIBUTES_COLLECTION: &str = "attributes";
/// Collection name for local notifications.
const NOTIFICATIONS_COLLECTION: &str = "notifications";

/// One account's consumption stack.
pub struct ConsumptionController {
    account: AccountContext,
    attributes: AttributesController,
    notifications: NotificationsController,
    request_processors: Arc<RequestItemProcessorRegistry>,
    notification_processors: Arc<NotificationItemProcessorRegistry>,
    events: EventBus,
}

impl ConsumptionController {
    /// Wires a consumption stack for one account over the given database.
    ///
    /// Both registries come pre-populated with the default processors;
    /// callers override individual mappings through
    /// [`Self::register_or_replace_request_item_processor`] and its
    /// notification counterpart before processing starts.
    pub async fn new(account: AccountContext, database: Arc<dyn Database>) -> Self {
        let attributes = AttributesController::new(
            TypedCollection::new(database.collection(ATTRIBUTES_COLLECTION).await),
            account,
        );

        let request_processors =
            Arc::new(RequestItemProcessorRegistry::with_defaults(attributes.clone()));
        let notification_processors = Arc::new(NotificationItemProcessorRegistry::with_defaults(
            attributes.clone(),
        ));

        let events = EventBus::new();
        let notifications = NotificationsController::new(
            TypedCollection::new(database.collection(NOTIFICATIONS_COLLECTION).await),
            notification_processors.clone(),
            events.clone(),
            account,
        );

        tracing::debug!(address = %account.address, "Wired consumption controller");

        Self {
            account,
            attributes,
            notifications,
            request_processors,
            notification_processors,
            events,
        }
    }

    /// The account this stack operates for.
    #[must_use]
    pub fn account(&self) -> &AccountContext {
        &self.account
    }

    /// The attributes controller.
    #[must_use]
    pub fn attributes(&self) -> &AttributesController {
        &self.attributes
    }

    /// The notifications controller.
    #[must_use]
    pub fn notifications(&self) -> &NotificationsController {
        &self.notifications
    }

    /// The request item processor registry.
    #[must_use]
    pub fn request_item_processors(&self) -> &Arc<RequestItemProcessorRegistry> {
        &self.request_processors
    }

    /// The notification item processor registry.
    #[must_use]
    pub fn notification_item_processors(&self) -> &Arc<NotificationItemProcessorRegistry> {
        &self.notification_processors
    }

    /// The event bus notifications publish through.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Registers a request item processor; fails on a duplicate kind.
    pub async fn register_request_item_processor(
        &self,
        processor: Arc<dyn RequestItemProcessor>,
    ) -> ConsumptionResult<()> {
        self.request_processors.register_processor(processor).await
    }

    /// Registers or replaces a request item processor; the last
    /// registration wins.
    pub async fn register_or_replace_request_item_processor(
        &self,
        processor: Arc<dyn RequestItemProcessor>,
    ) {
        self.request_processors
            .register_or_replace_processor(processor)
            .await;
    }

    /// Registers a notification item processor; fails on a duplicate kind.
    pub async fn register_notification_item_processor(
        &self,
        processor: Arc<dyn NotificationItemProcessor>,
    ) -> ConsumptionResult<()> {
        self.notification_processors
            .register_processor(processor)
            .await
    }

    /// Registers or replaces a notification item processor; the last
    /// registration wins.
    pub async fn register_or_replace_notification_item_processor(
        &self,
        processor: Arc<dyn NotificationItemProcessor>,
    ) {
        self.notification_processors
            .register_or_replace_processor(processor)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_core::{Address, DeviceId};
    use wallet_store::MemoryDatabase;

    use crate::error::ConsumptionError;
    use crate::notifications::NotificationItemKind;
    use crate::requests::RequestItemKind;

    async fn controller() -> ConsumptionController {
        let account = AccountContext::new(Address::from_bytes([1u8; 32]), DeviceId::new());
        ConsumptionController::new(account, Arc::new(MemoryDatabase::new())).await
    }

    #[tokio::test]
    async fn defaults_cover_every_item_kind() {
        let controller = controller().await;

        assert_eq!(
            controller.request_item_processors().registered_kinds().await,
            vec![
                RequestItemKind::CreateAttribute,
                RequestItemKind::ShareAttribute,
                RequestItemKind::ReadAttribute,
                RequestItemKind::DeleteAttribute,
            ]
        );
        assert_eq!(
            controller
                .notification_item_processors()
                .registered_kinds()
                .await,
            vec![
                NotificationItemKind::PeerSharedAttributeSucceeded,
                NotificationItemKind::AttributeDeleted,
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_registration_fails_but_replace_succeeds() {
        let controller = controller().await;

        let processor = controller
            .request_item_processors()
            .processor_for_kind(RequestItemKind::ShareAttribute)
            .await
            .unwrap();

        let err = controller
            .register_request_item_processor(processor.clone())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::ProcessorAlreadyRegistered("ShareAttribute")
        ));

        controller
            .register_or_replace_request_item_processor(processor)
            .await;
    }
}
