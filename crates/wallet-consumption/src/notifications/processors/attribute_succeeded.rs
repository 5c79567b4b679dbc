//! Processor for peer-shared-attribute-succeeded notification items.
//!
//! The owner succeeded an attribute they had shared with us; we mirror the
//! succession on the local copy, creating the successor under the id fixed
//! by the owner so both sides keep identical ids.

use async_trait::async_trait;
use chrono::Utc;
use wallet_core::{ApplicationError, AttributeContent, AttributeId, ValidationResult};

use crate::attributes::{
    AttributeSuccessorParams, AttributesController, SharingReference,
};
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::events::ConsumptionEvent;
use crate::notifications::items::{NotificationItem, NotificationItemKind};
use crate::notifications::local_notification::LocalNotification;
use crate::notifications::processor::NotificationItemProcessor;

/// Handles `PeerSharedAttributeSucceeded` notification items.
pub struct AttributeSucceededProcessor {
    attributes: AttributesController,
}

impl AttributeSucceededProcessor {
    /// Creates the processor over the given attributes controller.
    #[must_use]
    pub fn new(attributes: AttributesController) -> Self {
        Self { attributes }
    }

    fn payload<'a>(
        &self,
        item: &'a NotificationItem,
    ) -> ConsumptionResult<(AttributeId, AttributeId, &'a AttributeContent)> {
        match item {
            NotificationItem::PeerSharedAttributeSucceeded {
                predecessor_id,
                successor_id,
                successor_content,
            } => Ok((*predecessor_id, *successor_id, successor_content)),
            other => Err(ConsumptionError::WrongItemKind {
                expected: NotificationItemKind::PeerSharedAttributeSucceeded.name(),
                actual: other.kind().name(),
            }),
        }
    }
}

#[async_trait]
impl NotificationItemProcessor for AttributeSucceededProcessor {
    fn kind(&self) -> NotificationItemKind {
        NotificationItemKind::PeerSharedAttributeSucceeded
    }

    async fn check_prerequisites(
        &self,
        item: &NotificationItem,
        _notification: &LocalNotification,
    ) -> ConsumptionResult<ValidationResult> {
        let (predecessor_id, _, _) = self.payload(item)?;

        let Some(predecessor) = self
            .attributes
            .get_local_attribute_opt(predecessor_id)
            .await?
        else {
            return Ok(ValidationResult::error(ApplicationError::new(
                "notifications.attribute_succeeded.predecessor_not_found",
                format!("There is no local attribute {predecessor_id}."),
            )));
        };
        if !predecessor.is_peer_shared() && !predecessor.is_third_party() {
            return Ok(ValidationResult::error(ApplicationError::new(
                "notifications.attribute_succeeded.wrong_kind",
                "Only peer-shared or third-party attribute copies can be succeeded by a peer.",
            )));
        }
        if predecessor.has_successor() {
            return Ok(ValidationResult::error(ApplicationError::new(
                "notifications.attribute_succeeded.already_succeeded",
                "The attribute already has a successor.",
            )));
        }

        Ok(ValidationResult::success())
    }

    async fn process(
        &self,
        item: &NotificationItem,
        notification: &LocalNotification,
    ) -> ConsumptionResult<Option<ConsumptionEvent>> {
        let (predecessor_id, successor_id, successor_content) = self.payload(item)?;
        let predecessor = self.attributes.get_local_attribute(predecessor_id).await?;

        let params = AttributeSuccessorParams {
            id: Some(successor_id),
            content: successor_content.clone(),
            peer: Some(notification.peer),
            reference: Some(SharingReference::Notification(notification.id)),
            source_attribute_id: None,
        };

        let pair = if predecessor.is_third_party() {
            self.attributes
                .succeed_third_party_relationship_attribute(predecessor_id, params)
                .await?
        } else if predecessor.content.is_identity() {
            self.attributes
                .succeed_peer_shared_identity_attribute(predecessor_id, params)
                .await?
        } else {
            self.attributes
                .succeed_peer_shared_relationship_attribute(predecessor_id, params)
                .await?
        };

        Ok(Some(ConsumptionEvent::PeerSharedAttributeSucceeded {
            predecessor_id: pair.predecessor.id,
            successor_id: pair.successor.id,
            timestamp: Utc::now(),
        }))
    }

    async fn rollback(
        &self,
        item: &NotificationItem,
        _notification: &LocalNotification,
    ) -> ConsumptionResult<()> {
        let (predecessor_id, successor_id, _) = self.payload(item)?;

        if self
            .attributes
            .get_local_attribute_opt(successor_id)
            .await?
            .is_some()
        {
            self.attributes.delete_attribute(successor_id).await?;
        }

        if let Some(mut predecessor) = self
            .attributes
            .get_local_attribute_opt(predecessor_id)
            .await?
        {
            if predecessor.succeeded_by == Some(successor_id) {
                predecessor.succeeded_by = None;
                self.attributes.update_attribute_unsafe(&predecessor).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_core::{
        Address, AttributeValue, DeviceId, IdentityAttribute, NotificationId, RequestId,
    };
    use wallet_store::{Database, MemoryDatabase, TypedCollection};

    use crate::account::AccountContext;
    use crate::attributes::CreatePeerSharedAttributeParams;
    use crate::notifications::local_notification::NotificationStatus;

    fn alice() -> Address {
        Address::from_bytes([1u8; 32])
    }

    fn bob() -> Address {
        Address::from_bytes([2u8; 32])
    }

    async fn controller_for(address: Address) -> AttributesController {
        let database = MemoryDatabase::new();
        let collection = TypedCollection::new(database.collection("attributes").await);
        AttributesController::new(collection, AccountContext::new(address, DeviceId::new()))
    }

    fn given_name(value: &str) -> AttributeContent {
        AttributeContent::Identity(IdentityAttribute::new(
            alice(),
            AttributeValue::GivenName {
                value: value.to_string(),
            },
        ))
    }

    fn notification_from(peer: Address, items: Vec<NotificationItem>) -> LocalNotification {
        LocalNotification {
            id: NotificationId::new(),
            is_own: false,
            peer,
            created_at: Utc::now(),
            status: NotificationStatus::Open,
            items,
            received_by_device: Some(DeviceId::new()),
        }
    }

    #[tokio::test]
    async fn process_succeeds_local_copy_and_emits_event() {
        let attributes = controller_for(bob()).await;
        let processor = AttributeSucceededProcessor::new(attributes.clone());

        let predecessor = attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: None,
                content: given_name("Heinz"),
                peer: alice(),
                reference: SharingReference::Request(RequestId::new()),
            })
            .await
            .unwrap();

        let successor_id = AttributeId::new();
        let item = NotificationItem::PeerSharedAttributeSucceeded {
            predecessor_id: predecessor.id,
            successor_id,
            successor_content: given_name("Heinrich"),
        };
        let notification = notification_from(alice(), vec![item.clone()]);

        let prereq = processor
            .check_prerequisites(&item, &notification)
            .await
            .unwrap();
        assert!(prereq.is_success());

        let event = processor
            .process(&item, &notification)
            .await
            .unwrap()
            .expect("succession emits an event");
        match event {
            ConsumptionEvent::PeerSharedAttributeSucceeded {
                predecessor_id, ..
            } => assert_eq!(predecessor_id, predecessor.id),
            other => panic!("unexpected event: {other:?}"),
        }

        let successor = attributes.get_local_attribute(successor_id).await.unwrap();
        assert!(successor.is_peer_shared());
        assert_eq!(successor.succeeds, Some(predecessor.id));
    }

    #[tokio::test]
    async fn prerequisites_fail_for_missing_or_succeeded_predecessor() {
        let attributes = controller_for(bob()).await;
        let processor = AttributeSucceededProcessor::new(attributes.clone());

        let item = NotificationItem::PeerSharedAttributeSucceeded {
            predecessor_id: AttributeId::new(),
            successor_id: AttributeId::new(),
            successor_content: given_name("Heinrich"),
        };
        let notification = notification_from(alice(), vec![item.clone()]);

        let result = processor
            .check_prerequisites(&item, &notification)
            .await
            .unwrap();
        assert_eq!(
            result.error_code(),
            Some("notifications.attribute_succeeded.predecessor_not_found")
        );
    }

    #[tokio::test]
    async fn rollback_restores_pre_process_state() {
        let attributes = controller_for(bob()).await;
        let processor = AttributeSucceededProcessor::new(attributes.clone());

        let predecessor = attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: None,
                content: given_name("Heinz"),
                peer: alice(),
                reference: SharingReference::Request(RequestId::new()),
            })
            .await
            .unwrap();

        let successor_id = AttributeId::new();
        let item = NotificationItem::PeerSharedAttributeSucceeded {
            predecessor_id: predecessor.id,
            successor_id,
            successor_content: given_name("Heinrich"),
        };
        let notification = notification_from(alice(), vec![item.clone()]);

        processor.process(&item, &notification).await.unwrap();
        processor.rollback(&item, &notification).await.unwrap();

        assert!(attributes
            .get_local_attribute_opt(successor_id)
            .await
            .unwrap()
            .is_none());
        let restored = attributes
            .get_local_attribute(predecessor.id)
            .await
            .unwrap();
        assert_eq!(restored.succeeded_by, None);
    }

    #[tokio::test]
    async fn rollback_without_process_is_a_no_op() {
        let attributes = controller_for(bob()).await;
        let processor = AttributeSucceededProcessor::new(attributes);

        let item = NotificationItem::PeerSharedAttributeSucceeded {
            predecessor_id: AttributeId::new(),
            successor_id: AttributeId::new(),
            successor_content: given_name("Heinrich"),
        };
        let notification = notification_from(alice(), vec![item.clone()]);

        processor.rollback(&item, &notification).await.unwrap();
    }
}
