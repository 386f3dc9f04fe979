//! Fan-out of committed wrapper events.
//!
//! The service publishes a [`DexEvent`] only after a mutation has been
//! committed to the deployment, so a subscriber never sees an event for a
//! call that was rolled back. Each WebSocket connection holds its own
//! receiver and filters by [`super::EventTopic`].

use tokio::sync::broadcast;

use super::DexEvent;

/// Broadcast bus for [`DexEvent`]s.
///
/// A receiver that falls more than `capacity` events behind loses the
/// oldest ones and is told how many it missed.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DexEvent>,
}

impl EventBus {
    /// Creates a bus retaining up to `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes one committed event and returns how many receivers got it.
    ///
    /// With no connected receiver the event is dropped and `0` returned.
    pub fn publish(&self, event: DexEvent) -> usize {
        let topic = event.topic();
        let kind = event.event_type_str();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(%topic, kind, delivered, "event published");
        delivered
    }

    /// Publishes the events of one committed call in order.
    ///
    /// Receivers see them back to back, e.g. `pair_resolved` before the
    /// `liquidity_added` of the deposit that created the pair.
    pub fn publish_all(&self, events: impl IntoIterator<Item = DexEvent>) {
        for event in events {
            let _ = self.publish(event);
        }
    }

    /// A receiver for every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DexEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers, one per open WebSocket connection.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
