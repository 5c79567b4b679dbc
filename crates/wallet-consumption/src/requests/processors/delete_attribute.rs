//! Processor for delete-attribute request items.
//!
//! The data owner asks the peer to delete the shared copy. Accepting stamps
//! `ToBeDeleted` on the recipient's peer-shared chain and answers with the
//! planned deletion date; applying the response stamps the sender's
//! own-shared chain (`ToBeDeletedByPeer` on accept, `DeletionRequestRejected`
//! on reject).

use async_trait::async_trait;
use chrono::Utc;
use wallet_core::{Address, ApplicationError, AttributeId, ValidationResult};

use crate::attributes::{AttributesController, DeletionInfo, DeletionStatus};
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::requests::items::{
    AcceptRequestItemParams, RequestInfo, RequestItem, RequestItemKind, RequestItemPayload,
};
use crate::requests::processor::RequestItemProcessor;
use crate::requests::response::{AcceptResponseItem, ResponseItem};

/// Handles `DeleteAttribute` request items.
pub struct DeleteAttributeRequestItemProcessor {
    attributes: AttributesController,
}

impl DeleteAttributeRequestItemProcessor {
    /// Creates the processor over the given attributes controller.
    #[must_use]
    pub fn new(attributes: AttributesController) -> Self {
        Self { attributes }
    }

    fn attribute_id(&self, item: &RequestItem) -> ConsumptionResult<AttributeId> {
        match &item.payload {
            RequestItemPayload::DeleteAttribute { attribute_id } => Ok(*attribute_id),
            other => Err(ConsumptionError::WrongItemKind {
                expected: RequestItemKind::DeleteAttribute.name(),
                actual: other.kind().name(),
            }),
        }
    }
}

#[async_trait]
impl RequestItemProcessor for DeleteAttributeRequestItemProcessor {
    fn kind(&self) -> RequestItemKind {
        RequestItemKind::DeleteAttribute
    }

    async fn check_prerequisites_of_incoming_request_item(
        &self,
        item: &RequestItem,
        _info: &RequestInfo,
    ) -> ConsumptionResult<bool> {
        let attribute_id = self.attribute_id(item)?;
        Ok(self
            .attributes
            .get_local_attribute_opt(attribute_id)
            .await?
            .is_some_and(|attribute| attribute.is_peer_shared()))
    }

    async fn can_create_outgoing_request_item(
        &self,
        item: &RequestItem,
        recipient: Option<&Address>,
    ) -> ConsumptionResult<ValidationResult> {
        let attribute_id = self.attribute_id(item)?;

        let error = |code: &str, message: String| {
            Ok(ValidationResult::error(ApplicationError::new(
                format!("requests.delete_attribute.{code}"),
                message,
            )))
        };

        let Some(attribute) = self.attributes.get_local_attribute_opt(attribute_id).await? else {
            return error(
                "attribute_not_found",
                format!("There is no local attribute {attribute_id}."),
            );
        };
        if !attribute.is_own_shared() {
            return error(
                "not_own_shared",
                "Only own-shared attribute copies can be requested for deletion.".to_string(),
            );
        }
        if !attribute.is_owned_by(&self.attributes.account().address) {
            return error(
                "sender_not_owner",
                "Only the data owner can request deletion.".to_string(),
            );
        }
        if let Some(recipient) = recipient {
            if attribute.peer() != Some(recipient) {
                return error(
                    "peer_mismatch",
                    "The attribute is not shared with the request's recipient.".to_string(),
                );
            }
        }
        if attribute.has_deletion_status(DeletionStatus::ToBeDeletedByPeer)
            || attribute.has_deletion_status(DeletionStatus::DeletedByPeer)
        {
            return error(
                "already_deleted",
                "The peer already deleted or announced deleting this attribute.".to_string(),
            );
        }

        Ok(ValidationResult::success())
    }

    async fn accept(
        &self,
        item: &RequestItem,
        _params: &AcceptRequestItemParams,
        _info: &RequestInfo,
    ) -> ConsumptionResult<ResponseItem> {
        let attribute_id = self.attribute_id(item)?;

        let attribute = self.attributes.get_local_attribute(attribute_id).await?;
        if !attribute.is_peer_shared() {
            return Err(ConsumptionError::UnexpectedAttributeKind {
                id: attribute.id,
                expected: "peer-shared",
            });
        }

        let deletion_date = Utc::now();
        self.attributes
            .set_peer_deletion_info_of_peer_attribute_and_predecessors(
                attribute_id,
                DeletionInfo::new(DeletionStatus::ToBeDeleted, deletion_date),
            )
            .await?;

        Ok(ResponseItem::accepted(AcceptResponseItem::DeleteAttribute {
            deletion_date,
        }))
    }

    async fn apply_incoming_response_item(
        &self,
        response: &ResponseItem,
        item: &RequestItem,
        _info: &RequestInfo,
    ) -> ConsumptionResult<()> {
        let attribute_id = self.attribute_id(item)?;

        match response {
            ResponseItem::Accepted { payload } => {
                let AcceptResponseItem::DeleteAttribute { deletion_date } = payload else {
                    return Err(ConsumptionError::WrongItemKind {
                        expected: RequestItemKind::DeleteAttribute.name(),
                        actual: payload.name(),
                    });
                };
                self.attributes
                    .set_peer_deletion_info_of_peer_attribute_and_predecessors(
                        attribute_id,
                        DeletionInfo::new(DeletionStatus::ToBeDeletedByPeer, *deletion_date),
                    )
                    .await?;
            }
            ResponseItem::Rejected { .. } => {
                self.attributes
                    .set_deletion_info(
                        attribute_id,
                        DeletionInfo::new(DeletionStatus::DeletionRequestRejected, Utc::now()),
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
