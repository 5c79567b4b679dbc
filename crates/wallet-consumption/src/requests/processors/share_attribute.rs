//! Processor for share-attribute request items.
//!
//! The sender offers one of its repository attributes to the recipient.
//! Accepting creates the peer-shared copy; applying the accept response
//! creates the sender's own-shared copy, backed by the source repository
//! attribute and stored under the id the recipient assigned.

use async_trait::async_trait;
use wallet_core::{Address, ApplicationError, AttributeContent, AttributeId, ValidationResult};

use crate::attributes::{
    AttributesController, CreateOwnSharedAttributeParams, CreatePeerSharedAttributeParams,
    SharingReference,
};
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::requests::items::{
    AcceptRequestItemParams, RequestInfo, RequestItem, RequestItemKind, RequestItemPayload,
};
use crate::requests::processor::RequestItemProcessor;
use crate::requests::response::{AcceptResponseItem, ResponseItem};

/// Handles `ShareAttribute` request items.
pub struct ShareAttributeRequestItemProcessor {
    attributes: AttributesController,
}

impl ShareAttributeRequestItemProcessor {
    /// Creates the processor over the given attributes controller.
    #[must_use]
    pub fn new(attributes: AttributesController) -> Self {
        Self { attributes }
    }

    fn payload<'a>(
        &self,
        item: &'a RequestItem,
    ) -> ConsumptionResult<(AttributeId, &'a AttributeContent)> {
        match &item.payload {
            RequestItemPayload::ShareAttribute {
                source_attribute_id,
                attribute,
            } => Ok((*source_attribute_id, attribute)),
            other => Err(ConsumptionError::WrongItemKind {
                expected: RequestItemKind::ShareAttribute.name(),
                actual: other.kind().name(),
            }),
        }
    }
}

#[async_trait]
impl RequestItemProcessor for ShareAttributeRequestItemProcessor {
    fn kind(&self) -> RequestItemKind {
        RequestItemKind::ShareAttribute
    }

    async fn can_create_outgoing_request_item(
        &self,
        item: &RequestItem,
        _recipient: Option<&Address>,
    ) -> ConsumptionResult<ValidationResult> {
        let (source_attribute_id, attribute) = self.payload(item)?;

        let Some(source) = self
            .attributes
            .get_local_attribute_opt(source_attribute_id)
            .await?
        else {
            return Ok(ValidationResult::error(ApplicationError::new(
                "requests.share_attribute.attribute_not_found",
                format!("There is no local attribute {source_attribute_id}."),
            )));
        };
        if !source.is_repository() {
            return Ok(ValidationResult::error(ApplicationError::new(
                "requests.share_attribute.source_not_repository",
                "Only repository attributes can be shared.",
            )));
        }
        if !source.is_owned_by(&self.attributes.account().address) {
            return Ok(ValidationResult::error(ApplicationError::new(
                "requests.share_attribute.sender_not_owner",
                "Only own attributes can be shared.",
            )));
        }
        if &source.content != attribute {
            return Ok(ValidationResult::error(ApplicationError::new(
                "requests.share_attribute.content_mismatch",
                "The offered content does not match the source attribute.",
            )));
        }

        Ok(ValidationResult::success())
    }

    async fn accept(
        &self,
        item: &RequestItem,
        _params: &AcceptRequestItemParams,
        info: &RequestInfo,
    ) -> ConsumptionResult<ResponseItem> {
        let (_, attribute) = self.payload(item)?;

        let created = self
            .attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: None,
                content: attribute.clone(),
                peer: info.peer,
                reference: SharingReference::Request(info.id),
            })
            .await?;

        Ok(ResponseItem::accepted(AcceptResponseItem::ShareAttribute {
            attribute_id: created.id,
        }))
    }

    async fn apply_incoming_response_item(
        &self,
        response: &ResponseItem,
        item: &RequestItem,
        info: &RequestInfo,
    ) -> ConsumptionResult<()> {
        let Some(payload) = response.as_accepted() else {
            return Ok(());
        };
        let AcceptResponseItem::ShareAttribute { attribute_id } = payload else {
            return Err(ConsumptionError::WrongItemKind {
                expected: RequestItemKind::ShareAttribute.name(),
                actual: payload.name(),
            });
        };
        let (source_attribute_id, attribute) = self.payload(item)?;

        self.attributes
            .create_own_shared_local_attribute(CreateOwnSharedAttributeParams {
                id: Some(*attribute_id),
                content: attribute.clone(),
                peer: info.peer,
                reference: SharingReference::Request(info.id),
                source_attribute_id: Some(source_attribute_id),
            })
            .await?;
        Ok(())
    }
}
