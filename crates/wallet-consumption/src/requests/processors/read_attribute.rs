//! Processor for read-attribute request items.
//!
//! The sender asks the recipient to provide an attribute matching a query.
//! The decision parameters pick the answer (an existing repository
//! attribute or freshly provided content); the answer must satisfy the
//! query, checked by the pure [`validate_answer_to_query`] function before
//! any side effect runs.

use async_trait::async_trait;
use wallet_core::{
    Address, ApplicationError, AttributeContent, AttributeQuery, ValidationResult,
};

use crate::attributes::{
    AttributesController, CreateOwnSharedAttributeParams, CreatePeerSharedAttributeParams,
    CreateRepositoryAttributeParams, SharingReference,
};
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::requests::items::{
    AcceptRequestItemParams, ReadAttributeAnswer, RequestInfo, RequestItem, RequestItemKind,
    RequestItemPayload,
};
use crate::requests::processor::RequestItemProcessor;
use crate::requests::query_answer::validate_answer_to_query;
use crate::requests::response::{AcceptResponseItem, ResponseItem};

/// Handles `ReadAttribute` request items.
pub struct ReadAttributeRequestItemProcessor {
    attributes: AttributesController,
}

impl ReadAttributeRequestItemProcessor {
    /// Creates the processor over the given attributes controller.
    #[must_use]
    pub fn new(attributes: AttributesController) -> Self {
        Self { attributes }
    }

    fn query<'a>(&self, item: &'a RequestItem) -> ConsumptionResult<&'a AttributeQuery> {
        match &item.payload {
            RequestItemPayload::ReadAttribute { query } => Ok(query),
            other => Err(ConsumptionError::WrongItemKind {
                expected: RequestItemKind::ReadAttribute.name(),
                actual: other.kind().name(),
            }),
        }
    }

    fn answer<'a>(
        &self,
        params: &'a AcceptRequestItemParams,
    ) -> ConsumptionResult<&'a ReadAttributeAnswer> {
        match params {
            AcceptRequestItemParams::ReadAttribute { answer } => Ok(answer),
            other => Err(ConsumptionError::WrongAcceptParams {
                item: RequestItemKind::ReadAttribute.name(),
                params: other.name(),
            }),
        }
    }

    /// Resolves the chosen answer to content, if it can be resolved.
    async fn resolve_answer(
        &self,
        answer: &ReadAttributeAnswer,
    ) -> ConsumptionResult<Result<AttributeContent, ValidationResult>> {
        match answer {
            ReadAttributeAnswer::ExistingAttribute { attribute_id } => {
                match self.attributes.get_local_attribute_opt(*attribute_id).await? {
                    Some(attribute) => Ok(Ok(attribute.content)),
                    None => Ok(Err(ValidationResult::error(ApplicationError::new(
                        "requests.read_attribute.attribute_not_found",
                        format!("There is no local attribute {attribute_id}."),
                    )))),
                }
            }
            ReadAttributeAnswer::NewAttribute { attribute } => Ok(Ok(attribute.clone())),
        }
    }
}

#[async_trait]
impl RequestItemProcessor for ReadAttributeRequestItemProcessor {
    fn kind(&self) -> RequestItemKind {
        RequestItemKind::ReadAttribute
    }

    async fn can_create_outgoing_request_item(
        &self,
        item: &RequestItem,
        _recipient: Option<&Address>,
    ) -> ConsumptionResult<ValidationResult> {
        let query = self.query(item)?;

        let error = |code: &str, message: &str| {
            Ok(ValidationResult::error(ApplicationError::new(
                format!("requests.read_attribute.{code}"),
                message,
            )))
        };

        if query.value_type().is_empty() {
            return error("missing_value_type", "The query names no value type.");
        }
        match query {
            AttributeQuery::Identity(_) => {}
            AttributeQuery::Relationship(relationship) => {
                if relationship.key.trim().is_empty() {
                    return error("missing_key", "A relationship query requires a key.");
                }
            }
            AttributeQuery::ThirdPartyRelationship(third_party) => {
                if third_party.key.trim().is_empty() {
                    return error("missing_key", "A relationship query requires a key.");
                }
                if third_party.third_party.is_empty() {
                    return error(
                        "missing_third_party",
                        "A third-party query names no third party.",
                    );
                }
            }
        }

        Ok(ValidationResult::success())
    }

    async fn can_accept(
        &self,
        item: &RequestItem,
        params: &AcceptRequestItemParams,
        _info: &RequestInfo,
    ) -> ConsumptionResult<ValidationResult> {
        let query = self.query(item)?;
        let answer = self.answer(params)?;

        let content = match self.resolve_answer(answer).await? {
            Ok(content) => content,
            Err(validation) => return Ok(validation),
        };

        Ok(validate_answer_to_query(
            query,
            &content,
            &self.attributes.account().address,
        ))
    }

    async fn accept(
        &self,
        item: &RequestItem,
        params: &AcceptRequestItemParams,
        info: &RequestInfo,
    ) -> ConsumptionResult<ResponseItem> {
        self.query(item)?;
        let answer = self.answer(params)?;

        let (content, source_attribute_id) = match answer {
            ReadAttributeAnswer::ExistingAttribute { attribute_id } => {
                let source = self.attributes.get_local_attribute(*attribute_id).await?;
                (source.content.clone(), Some(source.id))
            }
            ReadAttributeAnswer::NewAttribute { attribute } => {
                // Identity answers owned by the responder become repository
                // attributes before being shared.
                let source = if attribute.is_identity() {
                    Some(
                        self.attributes
                            .create_repository_attribute(CreateRepositoryAttributeParams {
                                content: attribute.clone(),
                            })
                            .await?,
                    )
                } else {
                    None
                };
                (attribute.clone(), source.map(|s| s.id))
            }
        };

        let shared = self
            .attributes
            .create_own_shared_local_attribute(CreateOwnSharedAttributeParams {
                id: None,
                content: content.clone(),
                peer: info.peer,
                reference: SharingReference::Request(info.id),
                source_attribute_id,
            })
            .await?;

        Ok(ResponseItem::accepted(AcceptResponseItem::ReadAttribute {
            attribute_id: shared.id,
            attribute: content,
        }))
    }

    async fn apply_incoming_response_item(
        &self,
        response: &ResponseItem,
        _item: &RequestItem,
        info: &RequestInfo,
    ) -> ConsumptionResult<()> {
        let Some(payload) = response.as_accepted() else {
            return Ok(());
        };
        let AcceptResponseItem::ReadAttribute {
            attribute_id,
            attribute,
        } = payload
        else {
            return Err(ConsumptionError::WrongItemKind {
                expected: RequestItemKind::ReadAttribute.name(),
                actual: payload.name(),
            });
        };

        self.attributes
            .create_peer_shared_local_attribute(CreatePeerSharedAttributeParams {
                id: Some(*attribute_id),
                content: attribute.clone(),
                peer: info.peer,
                reference: SharingReference::Request(info.id),
            })
            .await?;
        Ok(())
    }
}
