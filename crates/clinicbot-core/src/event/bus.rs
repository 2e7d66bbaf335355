//! Session event fan-out.
//!
//! The orchestrator publishes status changes, provisioning progress and
//! appended messages here; front-ends subscribe to render them while a
//! long-running transition (setup) holds the orchestrator mutably.

use clinicbot_types::event::SessionEvent;
use tokio::sync::broadcast;

/// Events kept for a subscriber that falls behind before it sees `Lagged`.
const DEFAULT_CAPACITY: usize = 256;

/// Broadcast channel of [`SessionEvent`]s. Clones share one channel.
#[derive(Clone)]
pub struct SessionEventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers. Nobody listening is not an error.
    pub fn publish(&self, event: SessionEvent) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(?event, "Session event dropped, no subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for SessionEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
