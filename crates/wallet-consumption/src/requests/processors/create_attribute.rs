//! Processor for create-attribute request items.
//!
//! The sender asks the recipient to store a copy of an attribute the sender
//! owns. Accepting creates the peer-shared copy on the recipient; applying
//! the accept response creates the mirroring own-shared copy on the sender,
//! under the id the recipient assigned.

use async_trait::async_trait;
use wallet_core::{
    Address, ApplicationError, AttributeContent, ValidationResult,
};

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

/// Handles `CreateAttribute` request items.
pub struct CreateAttributeRequestItemProcessor {
    attributes: AttributesController,
}

impl CreateAttributeRequestItemProcessor {
    /// Creates the processor over the given attributes controller.
    #[must_use]
    pub fn new(attributes: AttributesController) -> Self {
        Self { attributes }
    }

    fn payload<'a>(&self, item: &'a RequestItem) -> ConsumptionResult<&'a AttributeContent> {
        match &item.payload {
            RequestItemPayload::CreateAttribute { attribute } => Ok(attribute),
            other => Err(ConsumptionError::WrongItemKind {
                expected: RequestItemKind::CreateAttribute.name(),
                actual: other.kind().name(),
            }),
        }
    }
}

#[async_trait]
impl RequestItemProcessor for CreateAttributeRequestItemProcessor {
    fn kind(&self) -> RequestItemKind {
        RequestItemKind::CreateAttribute
    }

    async fn can_create_outgoing_request_item(
        &self,
        item: &RequestItem,
        _recipient: Option<&Address>,
    ) -> ConsumptionResult<ValidationResult> {
        let attribute = self.payload(item)?;

        if attribute.owner() != &self.attributes.account().address {
            return Ok(ValidationResult::error(ApplicationError::new(
                "requests.create_attribute.sender_not_owner",
                "Only attributes owned by the sender can be sent for creation.",
            )));
        }
        if let AttributeContent::Relationship(relationship) = attribute {
            if relationship.confidentiality == wallet_core::Confidentiality::Private {
                return Ok(ValidationResult::error(ApplicationError::new(
                    "requests.create_attribute.confidentiality_private",
                    "Private relationship attributes must not leave the owner's side.",
                )));
            }
        }
        if let Err(error) = attribute.value().validate() {
            return Ok(ValidationResult::error(ApplicationError::new(
                "requests.create_attribute.invalid_value",
                error.to_string(),
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
        let attribute = self.payload(item)?;

        let created = self
            .attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: None,
                content: attribute.clone(),
                peer: info.peer,
                reference: SharingReference::Request(info.id),
            })
            .await?;

        Ok(ResponseItem::accepted(AcceptResponseItem::CreateAttribute {
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
        let AcceptResponseItem::CreateAttribute { attribute_id } = payload else {
            return Err(ConsumptionError::WrongItemKind {
                expected: RequestItemKind::CreateAttribute.name(),
                actual: payload.name(),
            });
        };
        let attribute = self.payload(item)?;

        self.attributes
            .create_own_shared_local_attribute(CreateOwnSharedAttributeParams {
                id: Some(*attribute_id),
                content: attribute.clone(),
                peer: info.peer,
                reference: SharingReference::Request(info.id),
                source_attribute_id: None,
            })
            .await?;
        Ok(())
    }
}
