//! The notifications controller.
//!
//! Translates transport messages into local notification records and runs
//! the per-notification processing saga: items are applied in declared
//! order, and on any failure the already-applied items are compensated in
//! reverse order. Atomicity across items is emulated entirely by this
//! explicit undo stack; the persistence layer provides none.

use chrono::Utc;
use serde_json::json;
use wallet_core::{Address, NotificationId};
use wallet_store::{DocumentQuery, TypedCollection};

use crate::account::{AccountContext, Message};
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::events::{ConsumptionEvent, EventBus};
use crate::notifications::items::NotificationItem;
use crate::notifications::local_notification::{LocalNotification, NotificationStatus};
use crate::notifications::registry::NotificationItemProcessorRegistry;
use std::sync::Arc;

/// Stores, translates, and processes notifications for one account.
#[derive(Clone)]
pub struct NotificationsController {
    notifications: TypedCollection<LocalNotification>,
    registry: Arc<NotificationItemProcessorRegistry>,
    events: EventBus,
    account: AccountContext,
}

impl NotificationsController {
    /// Creates a controller over the given notification collection.
    #[must_use]
    pub fn new(
        notifications: TypedCollection<LocalNotification>,
        registry: Arc<NotificationItemProcessorRegistry>,
        events: EventBus,
        account: AccountContext,
    ) -> Self {
        Self {
            notifications,
            registry,
            events,
            account,
        }
    }

    /// The processor registry notifications dispatch through.
    #[must_use]
    pub fn registry(&self) -> &Arc<NotificationItemProcessorRegistry> {
        &self.registry
    }

    // ==================== Message translation ====================

    /// Stores an own message as a sent notification.
    pub async fn sent(&self, message: &Message) -> ConsumptionResult<LocalNotification> {
        if !message.is_own {
            return Err(ConsumptionError::CannotStoreForeignNotificationAsSent);
        }
        let Some(peer) = message.recipients.first() else {
            return Err(ConsumptionError::MessageHasNoRecipients);
        };

        let notification = LocalNotification {
            id: message.content.id,
            is_own: true,
            peer: *peer,
            created_at: message.created_at,
            status: NotificationStatus::Sent,
            items: message.content.items.clone(),
            received_by_device: None,
        };
        self.notifications
            .insert(&notification.id.to_string(), &notification)
            .await?;

        tracing::debug!(notification = %notification.id, peer = %peer, "Stored sent notification");

        Ok(notification)
    }

    /// Stores an inbound message as an open notification received by the
    /// current device.
    pub async fn received(&self, message: &Message) -> ConsumptionResult<LocalNotification> {
        if message.is_own {
            return Err(ConsumptionError::CannotStoreOwnNotificationAsReceived);
        }

        let notification = LocalNotification {
            id: message.content.id,
            is_own: false,
            peer: message.created_by,
            created_at: message.created_at,
            status: NotificationStatus::Open,
            items: message.content.items.clone(),
            received_by_device: Some(self.account.device_id),
        };
        self.notifications
            .insert(&notification.id.to_string(), &notification)
            .await?;

        tracing::debug!(
            notification = %notification.id,
            peer = %message.created_by,
            "Stored received notification"
        );

        Ok(notification)
    }

    // ==================== Reads ====================

    /// Reads a notification, failing if it does not exist.
    pub async fn get_notification(
        &self,
        id: NotificationId,
    ) -> ConsumptionResult<LocalNotification> {
        self.notifications
            .get(&id.to_string())
            .await?
            .ok_or(ConsumptionError::NotificationNotFound(id))
    }

    /// Returns all notifications matching a raw document query.
    pub async fn get_notifications(
        &self,
        query: &DocumentQuery,
    ) -> ConsumptionResult<Vec<LocalNotification>> {
        Ok(self.notifications.find(query).await?)
    }

    // ==================== Processing ====================

    /// Processes every open notification received by the current device,
    /// sequentially in id order.
    pub async fn process_open_notifications_received_by_current_device(
        &self,
    ) -> ConsumptionResult<Vec<LocalNotification>> {
        let open = self
            .notifications
            .find(
                &DocumentQuery::new()
                    .field("status", json!("open"))
                    .field("received_by_device", json!(self.account.device_id)),
            )
            .await?;

        let mut processed = Vec::with_capacity(open.len());
        for notification in open {
            processed.push(self.process(notification).await?);
        }
        Ok(processed)
    }

    /// Loads and processes one notification.
    pub async fn process_notification_by_id(
        &self,
        id: NotificationId,
    ) -> ConsumptionResult<LocalNotification> {
        let notification = self.get_notification(id).await?;
        self.process(notification).await
    }

    /// Runs the processing saga over one notification.
    ///
    /// Precondition violations (own notification, wrong status, wrong
    /// device) are caller errors and surface as `Err`. Item failures do
    /// not: they roll back the already-applied items in reverse order, set
    /// the status to `Error`, and return the updated record. Only a
    /// successful run publishes events, in item order.
    pub async fn process(
        &self,
        mut notification: LocalNotification,
    ) -> ConsumptionResult<LocalNotification> {
        if notification.is_own {
            return Err(ConsumptionError::CannotProcessOwnNotification(
                notification.id,
            ));
        }
        match notification.status {
            NotificationStatus::Open | NotificationStatus::Error => {}
            status => {
                return Err(ConsumptionError::WrongNotificationStatus {
                    id: notification.id,
                    status,
                });
            }
        }
        if notification.received_by_device != Some(self.account.device_id) {
            return Err(ConsumptionError::NotificationNotReceivedByCurrentDevice(
                notification.id,
            ));
        }

        let items = notification.items.clone();
        // Compensation stack: items whose effect has been applied, pushed in
        // processing order and popped LIFO on failure.
        let mut applied: Vec<&NotificationItem> = Vec::new();
        let mut events: Vec<ConsumptionEvent> = Vec::new();
        let mut failure: Option<ConsumptionError> = None;

        for item in &items {
            let processor = match self.registry.processor_for_item(item).await {
                Ok(processor) => processor,
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            };

            match processor.check_prerequisites(item, &notification).await {
                Ok(result) => {
                    if let Some(error) = result.application_error() {
                        failure = Some(ConsumptionError::PrerequisitesNotMet {
                            code: error.code.clone(),
                        });
                        break;
                    }
                }
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }

            match processor.process(item, &notification).await {
                Ok(event) => {
                    applied.push(item);
                    if let Some(event) = event {
                        events.push(event);
                    }
                }
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        if let Some(error) = failure {
            tracing::warn!(
                notification = %notification.id,
                error = %error,
                "Notification processing failed; rolling back applied items"
            );

            while let Some(item) = applied.pop() {
                let processor = match self.registry.processor_for_item(item).await {
                    Ok(processor) => processor,
                    Err(error) => {
                        tracing::error!(
                            notification = %notification.id,
                            error = %error,
                            "No processor for applied item during rollback"
                        );
                        continue;
                    }
                };
                if let Err(rollback_error) = processor.rollback(item, &notification).await {
                    // Best effort: a failing rollback never blocks the
                    // remaining undos.
                    tracing::error!(
                        notification = %notification.id,
                        error = %rollback_error,
                        "Rollback of notification item failed; continuing"
                    );
                }
            }

            notification.status = NotificationStatus::Error;
            self.notifications
                .update(&notification.id.to_string(), &notification)
                .await?;
            return Ok(notification);
        }

        notification.status = NotificationStatus::Completed;
        self.notifications
            .update(&notification.id.to_string(), &notification)
            .await?;

        for event in events {
            self.events.publish(event);
        }

        tracing::info!(notification = %notification.id, "Notification processed");

        Ok(notification)
    }

    // ==================== Cleanup ====================

    /// Deletes all notifications exchanged with a peer. Returns the number
    /// of removed records.
    pub async fn delete_notifications_exchanged_with_peer(
        &self,
        peer: &Address,
    ) -> ConsumptionResult<usize> {
        let exchanged = self
            .notifications
            .find(&DocumentQuery::new().field("peer", json!(peer)))
            .await?;

        let mut removed = 0;
        for notification in exchanged {
            if self
                .notifications
                .delete(&notification.id.to_string())
                .await?
            {
                removed += 1;
            }
        }

        tracing::info!(peer = %peer, removed, "Deleted notifications exchanged with peer");

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use wallet_core::{
        ApplicationError, AttributeId, DeviceId, ValidationResult,
    };
    use wallet_store::{Database, MemoryDatabase};

    use crate::notifications::items::NotificationItemKind;
    use crate::notifications::local_notification::Notification;
    use crate::notifications::processor::NotificationItemProcessor;

    /// Scripted processor for saga tests: emits one event per processed
    /// item, fails `process`/`rollback`/prerequisites for designated
    /// attribute ids, and records every call.
    struct ScriptedProcessor {
        calls: Arc<Mutex<Vec<(String, AttributeId)>>>,
        fail_process: Mutex<HashSet<AttributeId>>,
        fail_rollback: HashSet<AttributeId>,
        fail_prerequisites: HashSet<AttributeId>,
        silent: HashSet<AttributeId>,
    }

    impl ScriptedProcessor {
        fn new(calls: Arc<Mutex<Vec<(String, AttributeId)>>>) -> Self {
            Self {
                calls,
                fail_process: Mutex::new(HashSet::new()),
                fail_rollback: HashSet::new(),
                fail_prerequisites: HashSet::new(),
                silent: HashSet::new(),
            }
        }

        fn attribute_id(item: &NotificationItem) -> AttributeId {
            match item {
                NotificationItem::AttributeDeleted { attribute_id, .. } => *attribute_id,
                NotificationItem::PeerSharedAttributeSucceeded {
                    predecessor_id, ..
                } => *predecessor_id,
            }
        }

        fn record(&self, call: &str, id: AttributeId) {
            self.calls.lock().unwrap().push((call.to_string(), id));
        }
    }

    #[async_trait]
    impl NotificationItemProcessor for ScriptedProcessor {
        fn kind(&self) -> NotificationItemKind {
            NotificationItemKind::AttributeDeleted
        }

        async fn check_prerequisites(
            &self,
            item: &NotificationItem,
            _notification: &LocalNotification,
        ) -> ConsumptionResult<ValidationResult> {
            let id = Self::attribute_id(item);
            self.record("prerequisites", id);
            if self.fail_prerequisites.contains(&id) {
                return Ok(ValidationResult::error(ApplicationError::new(
                    "test.prerequisites",
                    "scripted prerequisite failure",
                )));
            }
            Ok(ValidationResult::success())
        }

        async fn process(
            &self,
            item: &NotificationItem,
            _notification: &LocalNotification,
        ) -> ConsumptionResult<Option<ConsumptionEvent>> {
            let id = Self::attribute_id(item);
            self.record("process", id);
            if self.fail_process.lock().unwrap().contains(&id) {
                return Err(ConsumptionError::AttributeNotFound(id));
            }
            if self.silent.contains(&id) {
                return Ok(None);
            }
            Ok(Some(ConsumptionEvent::AttributeWasDeletedByPeer {
                attribute_id: id,
                status: crate::attributes::DeletionStatus::DeletedByOwner,
                timestamp: Utc::now(),
            }))
        }

        async fn rollback(
            &self,
            item: &NotificationItem,
            _notification: &LocalNotification,
        ) -> ConsumptionResult<()> {
            let id = Self::attribute_id(item);
            self.record("rollback", id);
            if self.fail_rollback.contains(&id) {
                return Err(ConsumptionError::AttributeNotFound(id));
            }
            Ok(())
        }
    }

    struct Fixture {
        controller: NotificationsController,
        calls: Arc<Mutex<Vec<(String, AttributeId)>>>,
        account: AccountContext,
    }

    async fn fixture(configure: impl FnOnce(&mut ScriptedProcessor)) -> Fixture {
        let account = AccountContext::new(
            wallet_core::Address::from_bytes([1u8; 32]),
            DeviceId::new(),
        );
        let database = MemoryDatabase::new();
        let notifications = TypedCollection::new(database.collection("notifications").await);

        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut processor = ScriptedProcessor::new(calls.clone());
        configure(&mut processor);

        let registry = NotificationItemProcessorRegistry::new();
        registry
            .register_processor(Arc::new(processor))
            .await
            .unwrap();

        let controller = NotificationsController::new(
            notifications,
            Arc::new(registry),
            EventBus::new(),
            account,
        );
        Fixture {
            controller,
            calls,
            account,
        }
    }

    fn peer() -> wallet_core::Address {
        wallet_core::Address::from_bytes([2u8; 32])
    }

    fn deleted_item(attribute_id: AttributeId) -> NotificationItem {
        NotificationItem::AttributeDeleted {
            attribute_id,
            deletion_date: Utc::now(),
        }
    }

    fn inbound_message(items: Vec<NotificationItem>) -> Message {
        Message {
            is_own: false,
            recipients: vec![wallet_core::Address::from_bytes([1u8; 32])],
            created_by: peer(),
            created_at: Utc::now(),
            content: Notification {
                id: NotificationId::new(),
                items,
            },
        }
    }

    fn calls_of(fixture: &Fixture, call: &str) -> Vec<AttributeId> {
        fixture
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == call)
            .map(|(_, id)| *id)
            .collect()
    }

    #[tokio::test]
    async fn successful_saga_completes_and_publishes_events_in_item_order() {
        let ids = [AttributeId::new(), AttributeId::new(), AttributeId::new()];
        let fixture = fixture(|processor| {
            // The middle item applies an effect but returns no event.
            processor.silent.insert(ids[1]);
        })
        .await;

        let mut receiver = fixture.controller.events.subscribe();
        let stored = fixture
            .controller
            .received(&inbound_message(ids.iter().copied().map(deleted_item).collect()))
            .await
            .unwrap();

        let processed = fixture.controller.process(stored).await.unwrap();
        assert_eq!(processed.status, NotificationStatus::Completed);

        // Events arrive in item order, omitting the silent item.
        for expected in [ids[0], ids[2]] {
            match receiver.recv().await.unwrap() {
                ConsumptionEvent::AttributeWasDeletedByPeer { attribute_id, .. } => {
                    assert_eq!(attribute_id, expected);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert!(receiver.try_recv().is_err());

        // Persisted status matches.
        let reloaded = fixture
            .controller
            .get_notification(processed.id)
            .await
            .unwrap();
        assert_eq!(reloaded.status, NotificationStatus::Completed);
    }

    #[tokio::test]
    async fn failing_item_rolls_back_applied_items_in_reverse_order() {
        let ids = [AttributeId::new(), AttributeId::new(), AttributeId::new()];
        let fixture = fixture(|processor| {
            processor.fail_process.lock().unwrap().insert(ids[2]);
        })
        .await;

        let mut receiver = fixture.controller.events.subscribe();
        let stored = fixture
            .controller
            .received(&inbound_message(ids.iter().copied().map(deleted_item).collect()))
            .await
            .unwrap();

        let processed = fixture.controller.process(stored).await.unwrap();
        assert_eq!(processed.status, NotificationStatus::Error);

        // Items 0 and 1 were applied, then rolled back as 1, 0. Item 2
        // never joins the undo stack.
        assert_eq!(calls_of(&fixture, "process"), vec![ids[0], ids[1], ids[2]]);
        assert_eq!(calls_of(&fixture, "rollback"), vec![ids[1], ids[0]]);

        // No events published.
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn failing_rollback_does_not_block_remaining_rollbacks() {
        let ids = [AttributeId::new(), AttributeId::new(), AttributeId::new()];
        let fixture = fixture(|processor| {
            processor.fail_process.lock().unwrap().insert(ids[2]);
            processor.fail_rollback.insert(ids[1]);
        })
        .await;

        let stored = fixture
            .controller
            .received(&inbound_message(ids.iter().copied().map(deleted_item).collect()))
            .await
            .unwrap();

        let processed = fixture.controller.process(stored).await.unwrap();
        assert_eq!(processed.status, NotificationStatus::Error);

        // Item 1's rollback failed, item 0's still ran.
        assert_eq!(calls_of(&fixture, "rollback"), vec![ids[1], ids[0]]);
    }

    #[tokio::test]
    async fn prerequisite_failure_is_treated_like_a_processing_failure() {
        let ids = [AttributeId::new(), AttributeId::new()];
        let fixture = fixture(|processor| {
            processor.fail_prerequisites.insert(ids[1]);
        })
        .await;

        let stored = fixture
            .controller
            .received(&inbound_message(ids.iter().copied().map(deleted_item).collect()))
            .await
            .unwrap();

        let processed = fixture.controller.process(stored).await.unwrap();
        assert_eq!(processed.status, NotificationStatus::Error);

        // Item 0 was applied and rolled back; item 1 never processed.
        assert_eq!(calls_of(&fixture, "process"), vec![ids[0]]);
        assert_eq!(calls_of(&fixture, "rollback"), vec![ids[0]]);
    }

    #[tokio::test]
    async fn errored_notification_can_be_retried_to_completion() {
        let ids = [AttributeId::new(), AttributeId::new()];
        let fixture = fixture(|processor| {
            processor.fail_process.lock().unwrap().insert(ids[1]);
        })
        .await;

        let stored = fixture
            .controller
            .received(&inbound_message(ids.iter().copied().map(deleted_item).collect()))
            .await
            .unwrap();
        let errored = fixture.controller.process(stored).await.unwrap();
        assert_eq!(errored.status, NotificationStatus::Error);

        // The transient failure clears: wire a controller whose processor
        // no longer fails, sharing the same stored notifications.
        let registry = NotificationItemProcessorRegistry::new();
        registry
            .register_processor(Arc::new(ScriptedProcessor::new(fixture.calls.clone())))
            .await
            .unwrap();
        let controller = NotificationsController::new(
            fixture.controller.notifications.clone(),
            Arc::new(registry),
            EventBus::new(),
            fixture.account,
        );

        let retried = controller
            .process_notification_by_id(errored.id)
            .await
            .unwrap();
        assert_eq!(retried.status, NotificationStatus::Completed);
    }

    #[tokio::test]
    async fn process_rejects_own_wrong_status_and_foreign_device() {
        let fixture = fixture(|_| {}).await;

        let own = LocalNotification {
            id: NotificationId::new(),
            is_own: true,
            peer: peer(),
            created_at: Utc::now(),
            status: NotificationStatus::Sent,
            items: vec![],
            received_by_device: None,
        };
        assert!(matches!(
            fixture.controller.process(own).await.unwrap_err(),
            ConsumptionError::CannotProcessOwnNotification(_)
        ));

        let completed = LocalNotification {
            id: NotificationId::new(),
            is_own: false,
            peer: peer(),
            created_at: Utc::now(),
            status: NotificationStatus::Completed,
            items: vec![],
            received_by_device: Some(fixture.account.device_id),
        };
        assert!(matches!(
            fixture.controller.process(completed).await.unwrap_err(),
            ConsumptionError::WrongNotificationStatus { .. }
        ));

        let foreign_device = LocalNotification {
            id: NotificationId::new(),
            is_own: false,
            peer: peer(),
            created_at: Utc::now(),
            status: NotificationStatus::Open,
            items: vec![],
            received_by_device: Some(DeviceId::new()),
        };
        assert!(matches!(
            fixture.controller.process(foreign_device).await.unwrap_err(),
            ConsumptionError::NotificationNotReceivedByCurrentDevice(_)
        ));
    }

    #[tokio::test]
    async fn missing_processor_sets_error_status() {
        let account = AccountContext::new(
            wallet_core::Address::from_bytes([1u8; 32]),
            DeviceId::new(),
        );
        let database = MemoryDatabase::new();
        let controller = NotificationsController::new(
            TypedCollection::new(database.collection("notifications").await),
            Arc::new(NotificationItemProcessorRegistry::new()),
            EventBus::new(),
            account,
        );

        let stored = controller
            .received(&inbound_message(vec![deleted_item(AttributeId::new())]))
            .await
            .unwrap();
        let processed = controller.process(stored).await.unwrap();
        assert_eq!(processed.status, NotificationStatus::Error);
    }

    #[tokio::test]
    async fn sent_and_received_translate_messages() {
        let fixture = fixture(|_| {}).await;

        let inbound = inbound_message(vec![deleted_item(AttributeId::new())]);
        let received = fixture.controller.received(&inbound).await.unwrap();
        assert_eq!(received.status, NotificationStatus::Open);
        assert_eq!(received.peer, peer());
        assert_eq!(
            received.received_by_device,
            Some(fixture.account.device_id)
        );
        assert!(matches!(
            fixture.controller.received(&Message {
                is_own: true,
                ..inbound.clone()
            })
            .await
            .unwrap_err(),
            ConsumptionError::CannotStoreOwnNotificationAsReceived
        ));

        let own = Message {
            is_own: true,
            recipients: vec![peer()],
            created_by: fixture.account.address,
            created_at: Utc::now(),
            content: Notification {
                id: NotificationId::new(),
                items: vec![deleted_item(AttributeId::new())],
            },
        };
        let sent = fixture.controller.sent(&own).await.unwrap();
        assert_eq!(sent.status, NotificationStatus::Sent);
        assert!(sent.is_own);
        assert_eq!(sent.received_by_device, None);
        assert!(matches!(
            fixture.controller.sent(&inbound).await.unwrap_err(),
            ConsumptionError::CannotStoreForeignNotificationAsSent
        ));
    }

    #[tokio::test]
    async fn process_open_notifications_processes_only_this_device() {
        let fixture = fixture(|_| {}).await;

        let first = fixture
            .controller
            .received(&inbound_message(vec![deleted_item(AttributeId::new())]))
            .await
            .unwrap();
        let second = fixture
            .controller
            .received(&inbound_message(vec![deleted_item(AttributeId::new())]))
            .await
            .unwrap();

        // A notification received by another device is skipped.
        let foreign = LocalNotification {
            id: NotificationId::new(),
            is_own: false,
            peer: peer(),
            created_at: Utc::now(),
            status: NotificationStatus::Open,
            items: vec![],
            received_by_device: Some(DeviceId::new()),
        };
        fixture
            .controller
            .notifications
            .insert(&foreign.id.to_string(), &foreign)
            .await
            .unwrap();

        let processed = fixture
            .controller
            .process_open_notifications_received_by_current_device()
            .await
            .unwrap();
        let processed_ids: Vec<_> = processed.iter().map(|n| n.id).collect();
        assert_eq!(processed.len(), 2);
        assert!(processed_ids.contains(&first.id));
        assert!(processed_ids.contains(&second.id));
        assert!(processed
            .iter()
            .all(|n| n.status == NotificationStatus::Completed));

        let untouched = fixture
            .controller
            .get_notification(foreign.id)
            .await
            .unwrap();
        assert_eq!(untouched.status, NotificationStatus::Open);
    }

    #[tokio::test]
    async fn delete_notifications_exchanged_with_peer_removes_records() {
        let fixture = fixture(|_| {}).await;

        fixture
            .controller
            .received(&inbound_message(vec![deleted_item(AttributeId::new())]))
            .await
            .unwrap();
        let removed = fixture
            .controller
            .delete_notifications_exchanged_with_peer(&peer())
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let remaining = fixture
            .controller
            .get_notifications(&DocumentQuery::new())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
