//! Notification boundary and its broadcast implementation.
//!
//! The engine reports to the presentation layer through the
//! [`NotificationSink`] trait. [`EventBus`] implements it on top of a
//! [`tokio::sync::broadcast`] channel; every WebSocket connection subscribes
//! to receive filtered events.

use std::fmt::Debug;

use tokio::sync::broadcast;

use super::GiveawayEvent;

/// Receiver of engine events.
///
/// Delivery is best effort: the engine never waits for or retries a
/// notification.
pub trait NotificationSink: Debug + Send + Sync {
    /// Hands an event to the presentation layer.
    fn notify(&self, event: GiveawayEvent);
}

/// Broadcast bus for [`GiveawayEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GiveawayEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: GiveawayEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GiveawayEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for EventBus {
    fn notify(&self, event: GiveawayEvent) {
        let giveaway_id = event.giveaway_id();
        let event_type = event.event_type_str();
        let delivered = self.publish(event);
        tracing::debug!(%giveaway_id, event_type, delivered, "event published");
    }
}
