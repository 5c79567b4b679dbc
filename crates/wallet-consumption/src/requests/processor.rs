//! The per-item-type request processor contract.
//!
//! Each request item kind has one processor implementing this trait. The
//! default method bodies supply the permissive generic behavior (everything
//! validates, accept/reject produce bare responses, applying a response is
//! a no-op); concrete processors override only what differs for their kind.
//!
//! Validation methods return `ValidationResult` as data; only broken state
//! (storage failures, kind mismatches) surfaces as an error.

use async_trait::async_trait;
use wallet_core::{Address, ValidationResult};

use crate::error::ConsumptionResult;
use crate::requests::items::{
    AcceptRequestItemParams, RejectRequestItemParams, RequestInfo, RequestItem, RequestItemKind,
};
use crate::requests::response::{AcceptResponseItem, ResponseItem};

/// Processor for one request item kind.
#[async_trait]
pub trait RequestItemProcessor: Send + Sync {
    /// The item kind this processor handles; the registry key.
    fn kind(&self) -> RequestItemKind;

    /// Cheap pre-check before an incoming item is surfaced to the
    /// decision-maker.
    async fn check_prerequisites_of_incoming_request_item(
        &self,
        _item: &RequestItem,
        _info: &RequestInfo,
    ) -> ConsumptionResult<bool> {
        Ok(true)
    }

    /// Validates an item before it is sent.
    async fn can_create_outgoing_request_item(
        &self,
        _item: &RequestItem,
        _recipient: Option<&Address>,
    ) -> ConsumptionResult<ValidationResult> {
        Ok(ValidationResult::success())
    }

    /// Validates accept parameters without side effects.
    async fn can_accept(
        &self,
        _item: &RequestItem,
        _params: &AcceptRequestItemParams,
        _info: &RequestInfo,
    ) -> ConsumptionResult<ValidationResult> {
        Ok(ValidationResult::success())
    }

    /// Validates reject parameters without side effects.
    async fn can_reject(
        &self,
        _item: &RequestItem,
        _params: &RejectRequestItemParams,
        _info: &RequestInfo,
    ) -> ConsumptionResult<ValidationResult> {
        Ok(ValidationResult::success())
    }

    /// Executes the item's effect and returns the accept response.
    ///
    /// Must not partially apply: either the full effect is persisted and a
    /// response returned, or an error is raised before any persistence.
    async fn accept(
        &self,
        _item: &RequestItem,
        _params: &AcceptRequestItemParams,
        _info: &RequestInfo,
    ) -> ConsumptionResult<ResponseItem> {
        Ok(ResponseItem::accepted(AcceptResponseItem::Generic))
    }

    /// Records the rejection; no side effects beyond the response.
    async fn reject(
        &self,
        _item: &RequestItem,
        params: &RejectRequestItemParams,
        _info: &RequestInfo,
    ) -> ConsumptionResult<ResponseItem> {
        Ok(ResponseItem::Rejected {
            code: params.code.clone(),
            message: params.message.clone(),
        })
    }

    /// Runs on the original sender once the peer's response arrives;
    /// mirrors the effect implied by an accept response. No-op for
    /// rejections.
    async fn apply_incoming_response_item(
        &self,
        _response: &ResponseItem,
        _item: &RequestItem,
        _info: &RequestInfo,
    ) -> ConsumptionResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn RequestItemProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestItemProcessor")
            .field("kind", &self.kind())
            .finish()
    }
}
