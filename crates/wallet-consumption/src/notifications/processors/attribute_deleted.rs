//! Processor for attribute-deleted notification items.
//!
//! One parameterized deletion routine keyed by the stored attribute's
//! ownership kind: the peer deleting their side maps to `DeletedByPeer` on
//! own-shared and third-party copies and to `DeletedByOwner` on peer-shared
//! copies. The status is stamped down the predecessor chain, preserving
//! terminal statuses already present.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use wallet_core::{ApplicationError, AttributeId, ValidationResult};

use crate::attributes::{AttributesController, DeletionInfo};
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::events::ConsumptionEvent;
use crate::notifications::items::{NotificationItem, NotificationItemKind};
use crate::notifications::local_notification::LocalNotification;
use crate::notifications::processor::NotificationItemProcessor;

/// Handles `AttributeDeleted` notification items.
pub struct AttributeDeletedProcessor {
    attributes: AttributesController,
}

impl AttributeDeletedProcessor {
    /// Creates the processor over the given attributes controller.
    #[must_use]
    pub fn new(attributes: AttributesController) -> Self {
        Self { attributes }
    }

    fn payload(
        &self,
        item: &NotificationItem,
    ) -> ConsumptionResult<(AttributeId, DateTime<Utc>)> {
        match item {
            NotificationItem::AttributeDeleted {
                attribute_id,
                deletion_date,
            } => Ok((*attribute_id, *deletion_date)),
            other => Err(ConsumptionError::WrongItemKind {
                expected: NotificationItemKind::AttributeDeleted.name(),
                actual: other.kind().name(),
            }),
        }
    }
}

#[async_trait]
impl NotificationItemProcessor for AttributeDeletedProcessor {
    fn kind(&self) -> NotificationItemKind {
        NotificationItemKind::AttributeDeleted
    }

    async fn check_prerequisites(
        &self,
        item: &NotificationItem,
        _notification: &LocalNotification,
    ) -> ConsumptionResult<ValidationResult> {
        let (attribute_id, _) = self.payload(item)?;

        let Some(attribute) = self
            .attributes
            .get_local_attribute_opt(attribute_id)
            .await?
        else {
            return Ok(ValidationResult::error(ApplicationError::new(
                "notifications.attribute_deleted.attribute_not_found",
                format!("There is no local attribute {attribute_id}."),
            )));
        };
        if attribute.is_repository() {
            return Ok(ValidationResult::error(ApplicationError::new(
                "notifications.attribute_deleted.repository_attribute",
                "Peers cannot delete repository attributes.",
            )));
        }

        Ok(ValidationResult::success())
    }

    async fn process(
        &self,
        item: &NotificationItem,
        _notification: &LocalNotification,
    ) -> ConsumptionResult<Option<ConsumptionEvent>> {
        let (attribute_id, deletion_date) = self.payload(item)?;
        let attribute = self.attributes.get_local_attribute(attribute_id).await?;

        let Some(status) = attribute.kind.peer_deletion_status() else {
            return Err(ConsumptionError::CannotDeleteRepositoryAttribute(
                attribute_id,
            ));
        };

        self.attributes
            .set_peer_deletion_info_of_peer_attribute_and_predecessors(
                attribute_id,
                DeletionInfo::new(status, deletion_date),
            )
            .await?;

        Ok(Some(ConsumptionEvent::AttributeWasDeletedByPeer {
            attribute_id,
            status,
            timestamp: Utc::now(),
        }))
    }

    async fn rollback(
        &self,
        item: &NotificationItem,
        _notification: &LocalNotification,
    ) -> ConsumptionResult<()> {
        let (attribute_id, deletion_date) = self.payload(item)?;

        let Some(attribute) = self
            .attributes
            .get_local_attribute_opt(attribute_id)
            .await?
        else {
            return Ok(());
        };
        let Some(status) = attribute.kind.peer_deletion_status() else {
            return Ok(());
        };

        // Clear exactly the info this item stamped; records whose deletion
        // info differs (pre-existing terminal statuses among them) keep it.
        let stamped = DeletionInfo::new(status, deletion_date);
        self.attributes
            .clear_deletion_info_if_matches(attribute_id, stamped)
            .await?;
        for predecessor in self
            .attributes
            .get_predecessors_of_attribute(attribute_id)
            .await?
        {
            self.attributes
                .clear_deletion_info_if_matches(predecessor.id, stamped)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_core::{
        Address, AttributeContent, AttributeValue, DeviceId, IdentityAttribute, NotificationId,
        RequestId,
    };
    use wallet_store::{Database, MemoryDatabase, TypedCollection};

    use crate::account::AccountContext;
    use crate::attributes::{
        AttributeSuccessorParams, CreatePeerSharedAttributeParams, DeletionStatus,
        SharingReference,
    };
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

    fn notification() -> LocalNotification {
        LocalNotification {
            id: NotificationId::new(),
            is_own: false,
            peer: alice(),
            created_at: Utc::now(),
            status: NotificationStatus::Open,
            items: vec![],
            received_by_device: Some(DeviceId::new()),
        }
    }

    #[tokio::test]
    async fn process_stamps_chain_and_emits_event() {
        let attributes = controller_for(bob()).await;
        let processor = AttributeDeletedProcessor::new(attributes.clone());

        let predecessor = attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: None,
                content: given_name("Heinz"),
                peer: alice(),
                reference: SharingReference::Request(RequestId::new()),
            })
            .await
            .unwrap();
        let pair = attributes
            .succeed_peer_shared_identity_attribute(
                predecessor.id,
                AttributeSuccessorParams::from_content(given_name("Heinrich")),
            )
            .await
            .unwrap();

        let deletion_date = Utc::now();
        let item = NotificationItem::AttributeDeleted {
            attribute_id: pair.successor.id,
            deletion_date,
        };

        let event = processor
            .process(&item, &notification())
            .await
            .unwrap()
            .expect("deletion emits an event");
        match event {
            ConsumptionEvent::AttributeWasDeletedByPeer { status, .. } => {
                // Peer-shared copies deleted by their owner.
                assert_eq!(status, DeletionStatus::DeletedByOwner);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        for id in [pair.successor.id, pair.predecessor.id] {
            let stored = attributes.get_local_attribute(id).await.unwrap();
            assert_eq!(
                stored.deletion_info,
                Some(DeletionInfo::new(
                    DeletionStatus::DeletedByOwner,
                    deletion_date
                ))
            );
        }
    }

    #[tokio::test]
    async fn prerequisites_reject_missing_and_repository_attributes() {
        let attributes = controller_for(alice()).await;
        let processor = AttributeDeletedProcessor::new(attributes.clone());

        let item = NotificationItem::AttributeDeleted {
            attribute_id: AttributeId::new(),
            deletion_date: Utc::now(),
        };
        let result = processor
            .check_prerequisites(&item, &notification())
            .await
            .unwrap();
        assert_eq!(
            result.error_code(),
            Some("notifications.attribute_deleted.attribute_not_found")
        );

        let repository = attributes
            .create_repository_attribute(crate::attributes::CreateRepositoryAttributeParams {
                content: given_name("Heinz"),
            })
            .await
            .unwrap();
        let item = NotificationItem::AttributeDeleted {
            attribute_id: repository.id,
            deletion_date: Utc::now(),
        };
        let result = processor
            .check_prerequisites(&item, &notification())
            .await
            .unwrap();
        assert_eq!(
            result.error_code(),
            Some("notifications.attribute_deleted.repository_attribute")
        );
    }

    #[tokio::test]
    async fn rollback_clears_only_what_was_stamped() {
        let attributes = controller_for(bob()).await;
        let processor = AttributeDeletedProcessor::new(attributes.clone());

        let predecessor = attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: None,
                content: given_name("Heinz"),
                peer: alice(),
                reference: SharingReference::Request(RequestId::new()),
            })
            .await
            .unwrap();
        let pair = attributes
            .succeed_peer_shared_identity_attribute(
                predecessor.id,
                AttributeSuccessorParams::from_content(given_name("Heinrich")),
            )
            .await
            .unwrap();

        // The predecessor already carried ToBeDeleted from an earlier
        // deletion request.
        let prior = DeletionInfo::new(DeletionStatus::ToBeDeleted, Utc::now());
        attributes
            .set_deletion_info(pair.predecessor.id, prior)
            .await
            .unwrap();

        let deletion_date = Utc::now();
        let item = NotificationItem::AttributeDeleted {
            attribute_id: pair.successor.id,
            deletion_date,
        };
        processor.process(&item, &notification()).await.unwrap();
        processor.rollback(&item, &notification()).await.unwrap();

        // The successor's stamp is gone; the predecessor's stamp was also
        // applied by this item (overwriting the non-terminal prior state),
        // so rollback clears it too.
        let successor = attributes
            .get_local_attribute(pair.successor.id)
            .await
            .unwrap();
        assert_eq!(successor.deletion_info, None);
        let predecessor = attributes
            .get_local_attribute(pair.predecessor.id)
            .await
            .unwrap();
        assert_eq!(predecessor.deletion_info, None);
    }

    #[tokio::test]
    async fn rollback_preserves_terminal_status_it_did_not_stamp() {
        let attributes = controller_for(bob()).await;
        let processor = AttributeDeletedProcessor::new(attributes.clone());

        let predecessor = attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: None,
                content: given_name("Heinz"),
                peer: alice(),
                reference: SharingReference::Request(RequestId::new()),
            })
            .await
            .unwrap();
        let pair = attributes
            .succeed_peer_shared_identity_attribute(
                predecessor.id,
                AttributeSuccessorParams::from_content(given_name("Heinrich")),
            )
            .await
            .unwrap();

        // Terminal status from an earlier, unrelated deletion.
        let terminal = DeletionInfo::new(DeletionStatus::DeletedByOwner, Utc::now());
        attributes
            .set_deletion_info(pair.predecessor.id, terminal)
            .await
            .unwrap();

        let item = NotificationItem::AttributeDeleted {
            attribute_id: pair.successor.id,
            deletion_date: Utc::now(),
        };
        processor.process(&item, &notification()).await.unwrap();
        processor.rollback(&item, &notification()).await.unwrap();

        // The terminal predecessor info was neither overwritten nor
        // cleared.
        let stored = attributes
            .get_local_attribute(pair.predecessor.id)
            .await
            .unwrap();
        assert_eq!(stored.deletion_info, Some(terminal));
    }
}
