//! Event bus for notifying the rendering layer of state changes.

use tokio::sync::broadcast;
use tracing::trace;
use url::Url;

use crate::domain::{MessageId, Provider};

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// Something the rendering layer may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// The user should be sent to an external authorization page.
    NavigateExternally { provider: Provider, url: Url },
    /// A provider's connection state changed.
    ConnectionChanged { provider: Provider },
    /// New shop metrics were applied.
    MetricsUpdated,
    /// A new message set and statistics were applied.
    InboxUpdated { message_count: usize },
    /// The draft workflow moved for a message.
    DraftUpdated { message_id: Option<MessageId> },
    /// A backend operation failed.
    Error { message: String },
}

/// Broadcasts [`DashboardEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event. Returns how many subscribers received it.
    pub fn publish(&self, event: DashboardEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                trace!(?event, "No subscribers for event");
                0
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
