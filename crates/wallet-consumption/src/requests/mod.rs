//! The request-item processing pipeline.
//!
//! Items move through a per-item state machine: validated before sending,
//! pre-checked and decided (accept/reject) on the recipient, executed into a
//! response item, and finally mirrored on the sender by applying the
//! incoming response. Every step dispatches through the processor registry
//! by item kind.

pub mod items;
pub mod processor;
pub mod processors;
pub mod query_answer;
pub mod registry;
pub mod response;

pub use items::{
    AcceptRequestItemParams, ReadAttributeAnswer, RejectRequestItemParams, Request, RequestInfo,
    RequestItem, RequestItemGroup, RequestItemKind, RequestItemOrGroup, RequestItemPayload,
};
pub use processor::RequestItemProcessor;
pub use query_answer::validate_answer_to_query;
pub use registry::RequestItemProcessorRegistry;
pub use response::{AcceptResponseItem, ResponseItem};
