//! Event broadcasting for attribute lifecycle changes.
//!
//! This module provides a pub/sub mechanism for broadcasting consumption
//! events to application-layer subscribers. Events are published when a
//! notification saga completes successfully, in item order.
//!
//! # Architecture
//!
//! - Uses `tokio::sync::broadcast` for multi-subscriber pub/sub
//! - One channel per consumption controller (per account)
//! - Publishing is best-effort: with no subscribers the event is dropped
//!
//! Owned by: agent-events

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use wallet_core::AttributeId;

use crate::attributes::DeletionStatus;

/// Default channel capacity for the broadcast channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// An event emitted by the consumption layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsumptionEvent {
    /// A peer succeeded an attribute it had shared with us; the local copy
    /// now has a successor version.
    PeerSharedAttributeSucceeded {
        /// The retired local version.
        predecessor_id: AttributeId,
        /// The new local version.
        successor_id: AttributeId,
        /// Timestamp of the event.
        timestamp: DateTime<Utc>,
    },

    /// A peer-side deletion was applied to a local attribute chain.
    AttributeWasDeletedByPeer {
        /// The newest affected record.
        attribute_id: AttributeId,
        /// The status stamped onto the chain.
        status: DeletionStatus,
        /// Timestamp of the event.
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for consumption events.
///
/// Cheap to clone; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ConsumptionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus with custom capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConsumptionEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that got the event; zero when
    /// nobody is subscribed, which is fine.
    pub fn publish(&self, event: ConsumptionEvent) -> usize {
        match self.sender.send(event) {
            Ok(count) => count,
            Err(_) => {
                tracing::trace!("No subscribers for consumption event");
                0
            }
        }
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
