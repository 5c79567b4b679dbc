//! Registry mapping request item kinds to processors.
//!
//! The registry is populated at construction; a missing mapping at dispatch
//! time is a configuration error, and `register_processor` refuses to
//! silently override an existing mapping.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::attributes::AttributesController;
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::requests::items::{RequestItem, RequestItemKind};
use crate::requests::processor::RequestItemProcessor;
use crate::requests::processors::{
    CreateAttributeRequestItemProcessor, DeleteAttributeRequestItemProcessor,
    ReadAttributeRequestItemProcessor, ShareAttributeRequestItemProcessor,
};

/// Registry of request item processors, keyed by item kind.
pub struct RequestItemProcessorRegistry {
    processors: RwLock<BTreeMap<RequestItemKind, Arc<dyn RequestItemProcessor>>>,
}

impl RequestItemProcessorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            processors: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates a registry carrying the default processor for every item
    /// kind.
    #[must_use]
    pub fn with_defaults(attributes: AttributesController) -> Self {
        let mut processors: BTreeMap<RequestItemKind, Arc<dyn RequestItemProcessor>> =
            BTreeMap::new();
        let defaults: [Arc<dyn RequestItemProcessor>; 4] = [
            Arc::new(CreateAttributeRequestItemProcessor::new(attributes.clone())),
            Arc::new(ShareAttributeRequestItemProcessor::new(attributes.clone())),
            Arc::new(ReadAttributeRequestItemProcessor::new(attributes.clone())),
            Arc::new(DeleteAttributeRequestItemProcessor::new(attributes)),
        ];
        for processor in defaults {
            processors.insert(processor.kind(), processor);
        }
        Self {
            processors: RwLock::new(processors),
        }
    }

    /// Registers a processor under its kind.
    ///
    /// Fails if a mapping for that kind already exists; use
    /// [`Self::register_or_replace_processor`] to override deliberately.
    pub async fn register_processor(
        &self,
        processor: Arc<dyn RequestItemProcessor>,
    ) -> ConsumptionResult<()> {
        let kind = processor.kind();
        let mut processors = self.processors.write().await;
        if processors.contains_key(&kind) {
            return Err(ConsumptionError::ProcessorAlreadyRegistered(kind.name()));
        }
        processors.insert(kind, processor);
        Ok(())
    }

    /// Registers a processor under its kind, replacing any existing
    /// mapping. Never fails; the last registration wins.
    pub async fn register_or_replace_processor(&self, processor: Arc<dyn RequestItemProcessor>) {
        let kind = processor.kind();
        self.processors.write().await.insert(kind, processor);
    }

    /// The processor responsible for an item.
    pub async fn processor_for_item(
        &self,
        item: &RequestItem,
    ) -> ConsumptionResult<Arc<dyn RequestItemProcessor>> {
        self.processor_for_kind(item.kind()).await
    }

    /// The processor registered for a kind.
    pub async fn processor_for_kind(
        &self,
        kind: RequestItemKind,
    ) -> ConsumptionResult<Arc<dyn RequestItemProcessor>> {
        self.processors
            .read()
            .await
            .get(&kind)
            .cloned()
            .ok_or(ConsumptionError::NoProcessorRegistered(kind.name()))
    }

    /// The registered kinds, sorted.
    pub async fn registered_kinds(&self) -> Vec<RequestItemKind> {
        self.processors.read().await.keys().copied().collect()
    }
}

impl Default for RequestItemProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubProcessor(RequestItemKind);

    #[async_trait]
    impl RequestItemProcessor for StubProcessor {
        fn kind(&self) -> RequestItemKind {
            self.0
        }
    }

    #[tokio::test]
    async fn register_twice_fails() {
        let registry = RequestItemProcessorRegistry::new();
        registry
            .register_processor(Arc::new(StubProcessor(RequestItemKind::ShareAttribute)))
            .await
            .unwrap();

        let err = registry
            .register_processor(Arc::new(StubProcessor(RequestItemKind::ShareAttribute)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::ProcessorAlreadyRegistered("ShareAttribute")
        ));
    }

    #[tokio::test]
    async fn register_or_replace_always_succeeds() {
        let registry = RequestItemProcessorRegistry::new();
        registry
            .register_or_replace_processor(Arc::new(StubProcessor(
                RequestItemKind::ShareAttribute,
            )))
            .await;
        registry
            .register_or_replace_processor(Arc::new(StubProcessor(
                RequestItemKind::ShareAttribute,
            )))
            .await;

        assert_eq!(
            registry.registered_kinds().await,
            vec![RequestItemKind::ShareAttribute]
        );
    }

    #[tokio::test]
    async fn missing_processor_is_configuration_error() {
        let registry = RequestItemProcessorRegistry::new();
        let err = registry
            .processor_for_kind(RequestItemKind::ReadAttribute)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConsumptionError::NoProcessorRegistered("ReadAttribute")
        ));
    }
}
