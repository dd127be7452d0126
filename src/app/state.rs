//! Dashboard state.
//!
//! [`DashboardState`] is the single mutable state object, owned by the
//! [`Dashboard`](super::Dashboard) and changed only through its intents.
//! [`DashboardSnapshot`] is the read-only copy handed to rendering.

use tracing::warn;

use crate::domain::{
    ConnectionState, InboxFilter, InboxStats, Message, MessageId, ShopMetrics, Tab,
};
use crate::services::{
    ConnectionStore, DraftState, DraftWorkflow, InboxStore, MetricsStore, Selection,
};

/// Everything the dashboard knows.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub connections: ConnectionStore,
    pub metrics: MetricsStore,
    pub inbox: InboxStore,
    pub selection: Selection,
    pub draft: DraftWorkflow,
    /// Most recent backend failure, shown as a banner.
    pub last_error: Option<String>,
    in_flight: u32,
}

impl DashboardState {
    /// Creates an empty state loading `page_size` messages at a time.
    pub fn new(page_size: u32) -> Self {
        Self {
            connections: ConnectionStore::new(),
            metrics: MetricsStore::new(),
            inbox: InboxStore::new(page_size),
            selection: Selection::new(),
            draft: DraftWorkflow::new(),
            last_error: None,
            in_flight: 0,
        }
    }

    /// Records a backend failure.
    pub fn record_error(&mut self, context: &str, error: impl std::fmt::Display) -> String {
        let message = format!("{}: {}", context, error);
        warn!(error = %message, "Dashboard error");
        self.last_error = Some(message.clone());
        message
    }

    /// Marks a backend operation as started.
    pub fn start_request(&mut self) {
        self.in_flight += 1;
    }

    /// Marks a backend operation as finished.
    pub fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Returns whether any backend operation is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Copies out what rendering needs.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            storefront: self.connections.storefront().clone(),
            mail: self.connections.mail().clone(),
            metrics: self.metrics.metrics().cloned(),
            messages: self.inbox.messages().to_vec(),
            total_messages: self.inbox.total(),
            stats: self.inbox.stats().cloned(),
            filter: self.inbox.filter(),
            tab: self.selection.tab(),
            selected: self.selection.selected().cloned(),
            draft: self.draft.state().clone(),
            last_error: self.last_error.clone(),
            loading: self.is_loading(),
            inbox_loaded: self.inbox.has_loaded(),
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(50)
    }
}

/// Point-in-time copy of [`DashboardState`] for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub storefront: ConnectionState,
    pub mail: ConnectionState,
    pub metrics: Option<ShopMetrics>,
    pub messages: Vec<Message>,
    /// Messages matching the filter on the backend, loaded or not.
    pub total_messages: u64,
    pub stats: Option<InboxStats>,
    pub filter: InboxFilter,
    pub tab: Tab,
    pub selected: Option<MessageId>,
    pub draft: DraftState,
    pub last_error: Option<String>,
    pub loading: bool,
    pub inbox_loaded: bool,
}

impl DashboardSnapshot {
    /// The selected message, if it is in the current set.
    pub fn selected_message(&self) -> Option<&Message> {
        let id = self.selected.as_ref()?;
        self.messages.iter().find(|m| &m.id == id)
    }
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        DashboardState::default().snapshot()
    }
}
