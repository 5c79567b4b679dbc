//! Registry mapping notification item kinds to processors.
//!
//! Same discipline as the request-item registry: populated at
//! construction, duplicate registration is an error, a missing mapping at
//! dispatch is a configuration error.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::attributes::AttributesController;
use crate::error::{ConsumptionError, ConsumptionResult};
use crate::notifications::items::{NotificationItem, NotificationItemKind};
use crate::notifications::processor::NotificationItemProcessor;
use crate::notifications::processors::{AttributeDeletedProcessor, AttributeSucceededProcessor};

/// Registry of notification item processors, keyed by item kind.
pub struct NotificationItemProcessorRegistry {
    processors: RwLock<BTreeMap<NotificationItemKind, Arc<dyn NotificationItemProcessor>>>,
}

impl NotificationItemProcessorRegistry {
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
        let mut processors: BTreeMap<NotificationItemKind, Arc<dyn NotificationItemProcessor>> =
            BTreeMap::new();
        let defaults: [Arc<dyn NotificationItemProcessor>; 2] = [
            Arc::new(AttributeSucceededProcessor::new(attributes.clone())),
            Arc::new(AttributeDeletedProcessor::new(attributes)),
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
    /// Fails if a mapping for that kind already exists.
    pub async fn register_processor(
        &self,
        processor: Arc<dyn NotificationItemProcessor>,
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
    pub async fn register_or_replace_processor(
        &self,
        processor: Arc<dyn NotificationItemProcessor>,
    ) {
        let kind = processor.kind();
        self.processors.write().await.insert(kind, processor);
    }

    /// The processor responsible for an item.
    pub async fn processor_for_item(
        &self,
        item: &NotificationItem,
    ) -> ConsumptionResult<Arc<dyn NotificationItemProcessor>> {
        self.processor_for_kind(item.kind()).await
    }

    /// The processor registered for a kind.
    pub async fn processor_for_kind(
        &self,
        kind: NotificationItemKind,
    ) -> ConsumptionResult<Arc<dyn NotificationItemProcessor>> {
        self.processors
            .read()
            .await
            .get(&kind)
            .cloned()
            .ok_or(ConsumptionError::NoProcessorRegistered(kind.name()))
    }

    /// The registered kinds, sorted.
    pub async fn registered_kinds(&self) -> Vec<NotificationItemKind> {
        self.processors.read().await.keys().copied().collect()
    }
}

impl Default for NotificationItemProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
