//! Dashboard orchestration.
//!
//! [`Dashboard`] owns the single [`DashboardState`] and exposes the intents
//! the rendering layer calls. Each intent takes the state lock only long
//! enough to begin or apply a request; backend calls are awaited with the
//! lock released, so independent intents interleave and rely on request
//! tags to drop superseded responses.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use super::events::{DashboardEvent, EventBus};
use super::state::{DashboardSnapshot, DashboardState};
use crate::api::{ApprovalAction, DashboardApi, MailSyncSummary};
use crate::config::DashboardConfig;
use crate::domain::{ConnectionState, DraftId, InboxFilter, MessageId, Provider, Tab};
use crate::error::{ApiError, DraftError};
use crate::services::{
    classify_connect, shop_id_for, wants_inbox_load, ClipboardSink, ConnectOutcome, DraftStart,
    DraftState, InboxTicket, RequestTag, Settled, SystemClipboard,
};

/// The dashboard core.
pub struct Dashboard<A> {
    api: Arc<A>,
    shop_id: String,
    state: RwLock<DashboardState>,
    events: EventBus,
    clipboard: Arc<dyn ClipboardSink>,
}

impl<A: DashboardApi> Dashboard<A> {
    /// Creates a dashboard over `api` with nothing loaded yet.
    pub fn new(api: Arc<A>, config: &DashboardConfig) -> Self {
        Self {
            api,
            shop_id: config.shop_id.clone(),
            state: RwLock::new(DashboardState::new(config.inbox_page_size)),
            events: EventBus::default(),
            clipboard: Arc::new(SystemClipboard),
        }
    }

    /// Replaces the clipboard sink.
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Subscribes to state change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Copies out the current state.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.state.read().await.snapshot()
    }

    /// Asks the backend whether it is up.
    pub async fn health(&self) -> Result<bool, ApiError> {
        self.api.health().await
    }

    /// Initial load and manual refresh.
    ///
    /// Refreshes both connection states, then fetches metrics if the
    /// storefront is connected or pending and loads the inbox if mail is
    /// connected. The two dependent fetches run concurrently, and a failed
    /// status query does not stop them.
    pub async fn refresh_all(&self) {
        info!("Refreshing dashboard");
        let tag = {
            let mut state = self.state.write().await;
            state.last_error = None;
            state.start_request();
            state.connections.begin_refresh()
        };

        let (storefront, mail) = tokio::join!(
            self.api.connection_status(Provider::Storefront),
            self.api.connection_status(Provider::Mail),
        );

        let (metrics, inbox) = {
            let mut state = self.state.write().await;
            state.finish_request();
            let outcome = state.connections.apply_refresh(tag, storefront, mail);
            for provider in &outcome.updated {
                self.events.publish(DashboardEvent::ConnectionChanged {
                    provider: *provider,
                });
            }
            for (provider, error) in &outcome.errors {
                let context = format!("Failed to check {} connection", provider.display_name());
                self.report(&mut state, &context, error);
            }
            self.plan_dependents(&mut state)
        };

        tokio::join!(
            async move {
                if let Some((tag, shop_id)) = metrics {
                    self.run_metrics(tag, shop_id).await;
                }
            },
            async move {
                if let Some(ticket) = inbox {
                    self.run_inbox(ticket).await;
                }
            },
        );
    }

    /// Starts the connect flow for a provider.
    ///
    /// A real authorization URL is published as
    /// [`DashboardEvent::NavigateExternally`]. A demo-mode answer installs a
    /// simulated connected state and loads the provider's data.
    pub async fn connect(&self, provider: Provider) -> Result<ConnectOutcome, ApiError> {
        self.state.write().await.start_request();
        let response = self.api.connect(provider).await;

        let mut state = self.state.write().await;
        state.finish_request();
        let outcome = match response.and_then(classify_connect) {
            Ok(outcome) => outcome,
            Err(e) => {
                let context = format!("Failed to connect {}", provider.display_name());
                self.report(&mut state, &context, &e);
                return Err(e);
            }
        };

        match &outcome {
            ConnectOutcome::Redirect(url) => {
                info!(%provider, %url, "Sending user to provider authorization");
                self.events.publish(DashboardEvent::NavigateExternally {
                    provider,
                    url: url.clone(),
                });
            }
            ConnectOutcome::Demo => {
                info!(%provider, "Backend is in demo mode, connecting locally");
                state
                    .connections
                    .install(ConnectionState::demo_connected(provider, Utc::now()));
                self.events
                    .publish(DashboardEvent::ConnectionChanged { provider });
                match provider {
                    Provider::Storefront => {
                        let (tag, shop_id) = self.begin_metrics(&mut state);
                        drop(state);
                        self.run_metrics(tag, shop_id).await;
                    }
                    Provider::Mail => {
                        let ticket = Self::begin_inbox(&mut state);
                        drop(state);
                        self.run_inbox(ticket).await;
                    }
                }
            }
        }
        Ok(outcome)
    }

    /// Disconnects a provider and drops the data that depended on it.
    pub async fn disconnect(&self, provider: Provider) -> Result<(), ApiError> {
        self.state.write().await.start_request();
        let result = self.api.disconnect(provider).await;

        let mut state = self.state.write().await;
        state.finish_request();
        if let Err(e) = result {
            let context = format!("Failed to disconnect {}", provider.display_name());
            self.report(&mut state, &context, &e);
            return Err(e);
        }

        info!(%provider, "Disconnected");
        state.connections.reset(provider);
        match provider {
            Provider::Storefront => state.metrics.clear(),
            Provider::Mail => Self::clear_mail_data(&mut state),
        }
        self.events
            .publish(DashboardEvent::ConnectionChanged { provider });
        Ok(())
    }

    /// Switches tab. Entering the inbox loads it the first time.
    pub async fn set_tab(&self, tab: Tab) {
        let ticket = {
            let mut state = self.state.write().await;
            state.selection.set_tab(tab);
            let wants = wants_inbox_load(
                tab,
                state.inbox.has_loaded(),
                state.connections.mail().connected,
            );
            wants.then(|| Self::begin_inbox(&mut state))
        };
        if let Some(ticket) = ticket {
            self.run_inbox(ticket).await;
        }
    }

    /// Changes the inbox filter and reloads the inbox for it.
    pub async fn set_filter(&self, filter: InboxFilter) {
        let ticket = {
            let mut state = self.state.write().await;
            state.inbox.set_filter(filter);
            if state.connections.mail().connected {
                Some(Self::begin_inbox(&mut state))
            } else {
                debug!(filter = filter.as_query(), "Mail not connected, filter kept for later");
                None
            }
        };
        if let Some(ticket) = ticket {
            self.run_inbox(ticket).await;
        }
    }

    /// Selects a message, discarding any draft.
    pub async fn select(&self, id: MessageId) {
        let mut state = self.state.write().await;
        let had_draft = *state.draft.state() != DraftState::Idle;
        state.selection.select(id);
        state.draft.dismiss();
        if had_draft {
            self.events
                .publish(DashboardEvent::DraftUpdated { message_id: None });
        }
    }

    /// Generates a reply draft for a message in the current inbox,
    /// selecting it first if needed.
    ///
    /// Refused without a backend call when the message does not need a
    /// reply. A backend failure is not an `Err` here; it leaves the draft in
    /// [`DraftState::Failed`] and sets the error banner.
    pub async fn generate_draft(&self, id: &MessageId) -> Result<(), DraftError> {
        let tag = {
            let mut state = self.state.write().await;
            let message = state
                .inbox
                .find(id)
                .cloned()
                .ok_or_else(|| DraftError::UnknownMessage(id.clone()))?;
            if !message.needs_reply {
                return Err(DraftError::NotEligible(id.clone()));
            }
            if state.selection.select(id.clone()) {
                state.draft.dismiss();
            }
            match state.draft.begin(&message)? {
                DraftStart::AlreadyGenerating => return Ok(()),
                DraftStart::Issued(tag) => {
                    state.start_request();
                    tag
                }
            }
        };
        self.events.publish(DashboardEvent::DraftUpdated {
            message_id: Some(id.clone()),
        });

        let result = self.api.generate_draft(id).await;

        let mut state = self.state.write().await;
        state.finish_request();
        match state.draft.apply(tag, result) {
            Settled::Applied => {
                self.events.publish(DashboardEvent::DraftUpdated {
                    message_id: Some(id.clone()),
                });
            }
            Settled::Stale => {}
            Settled::Failed(e) => {
                self.report(&mut state, "Failed to generate draft", &e);
                self.events.publish(DashboardEvent::DraftUpdated {
                    message_id: Some(id.clone()),
                });
            }
        }
        Ok(())
    }

    /// Copies the ready draft to the clipboard and tells the backend it was
    /// used. Neither a clipboard nor a backend failure is surfaced.
    pub async fn copy_result(&self) -> Result<(), DraftError> {
        let (message_id, draft_id, content) = self.ready_draft().await?;

        if let Err(e) = self.clipboard.write_text(&content) {
            warn!(error = %e, "Failed to copy draft");
            return Ok(());
        }
        info!(message_id = %message_id, "Draft copied to clipboard");

        if let Some(draft_id) = draft_id {
            if let Err(e) = self
                .api
                .approve_draft(&message_id, &draft_id, ApprovalAction::Copy)
                .await
            {
                warn!(error = %e, "Failed to record draft approval");
            }
        }
        Ok(())
    }

    /// Discards the draft.
    pub async fn dismiss_draft(&self) {
        self.state.write().await.draft.dismiss();
        self.events
            .publish(DashboardEvent::DraftUpdated { message_id: None });
    }

    /// Discards the ready draft and sends the seller's feedback on it.
    pub async fn reject_draft(&self, feedback: Option<String>) -> Result<(), DraftError> {
        let (message_id, draft_id, _) = self.ready_draft().await?;
        self.dismiss_draft().await;

        if let Some(draft_id) = draft_id {
            if let Err(e) = self.api.reject_draft(&message_id, &draft_id, feedback).await {
                warn!(error = %e, "Failed to record draft rejection");
            }
        }
        Ok(())
    }

    /// Pulls new mail into the backend, then reloads the inbox.
    pub async fn sync_mail(&self) -> Result<MailSyncSummary, ApiError> {
        self.state.write().await.start_request();
        let result = self.api.sync_mail().await;

        let (summary, ticket) = {
            let mut state = self.state.write().await;
            state.finish_request();
            let summary = match result {
                Ok(summary) => summary,
                Err(e) => {
                    self.report(&mut state, "Failed to sync mail", &e);
                    return Err(e);
                }
            };
            info!(
                fetched = summary.messages_fetched,
                new = summary.new_messages,
                "Mail synced"
            );
            let reload = state.connections.mail().connected;
            (summary, reload.then(|| Self::begin_inbox(&mut state)))
        };

        if let Some(ticket) = ticket {
            self.run_inbox(ticket).await;
        }
        Ok(summary)
    }

    async fn ready_draft(&self) -> Result<(MessageId, Option<DraftId>, String), DraftError> {
        match self.state.read().await.draft.state() {
            DraftState::Ready {
                message_id,
                draft_id,
                result,
            } => Ok((message_id.clone(), draft_id.clone(), result.content.clone())),
            _ => Err(DraftError::NoDraft),
        }
    }

    /// Issues the fetches the current connection states call for and drops
    /// data whose provider is gone.
    fn plan_dependents(
        &self,
        state: &mut DashboardState,
    ) -> (Option<(RequestTag, String)>, Option<InboxTicket>) {
        let metrics = if state.connections.storefront().is_connected_or_pending() {
            Some(self.begin_metrics(state))
        } else {
            state.metrics.clear();
            None
        };
        let inbox = if state.connections.mail().connected {
            Some(Self::begin_inbox(state))
        } else {
            Self::clear_mail_data(state);
            None
        };
        (metrics, inbox)
    }

    fn begin_metrics(&self, state: &mut DashboardState) -> (RequestTag, String) {
        state.start_request();
        let shop_id = shop_id_for(state.connections.storefront(), &self.shop_id);
        (state.metrics.begin_fetch(&shop_id), shop_id)
    }

    async fn run_metrics(&self, tag: RequestTag, shop_id: String) {
        let result = self.api.shop_metrics(&shop_id).await;

        let mut state = self.state.write().await;
        state.finish_request();
        let settled = state.metrics.apply(tag, result);
        self.settle(
            &mut state,
            settled,
            "Failed to load shop metrics",
            DashboardEvent::MetricsUpdated,
        );
    }

    fn begin_inbox(state: &mut DashboardState) -> InboxTicket {
        state.start_request();
        let filter = state.inbox.filter();
        state.inbox.begin_load(filter)
    }

    async fn run_inbox(&self, ticket: InboxTicket) {
        let (messages, stats) = tokio::join!(
            self.api.inbox_messages(ticket.query),
            self.api.inbox_stats(),
        );
        let result = messages.and_then(|page| stats.map(|stats| (page, stats)));

        let mut state = self.state.write().await;
        state.finish_request();
        let settled = state.inbox.apply_load(ticket, result);
        let message_count = state.inbox.messages().len();
        self.settle(
            &mut state,
            settled,
            "Failed to load inbox",
            DashboardEvent::InboxUpdated { message_count },
        );
    }

    fn clear_mail_data(state: &mut DashboardState) {
        state.inbox.clear();
        state.selection.clear();
        state.draft.dismiss();
    }

    fn settle(
        &self,
        state: &mut DashboardState,
        settled: Settled,
        context: &str,
        applied: DashboardEvent,
    ) {
        match settled {
            Settled::Applied => {
                self.events.publish(applied);
            }
            Settled::Stale => {}
            Settled::Failed(e) => self.report(state, context, &e),
        }
    }

    fn report(&self, state: &mut DashboardState, context: &str, error: &ApiError) {
        let message = state.record_error(context, error);
        self.events.publish(DashboardEvent::Error { message });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::fake::{connected, message, FailPoint, FakeApi, GateKey};
    use crate::api::{ConnectResponse, GeneratedDraft, InboxPage, MockDashboardApi};
    use crate::domain::{ConnectionStatus, DraftResult, InboxStats, ShopMetrics};
    use crate::error::ClipboardError;
    use crate::services::MemoryClipboard;

    fn dashboard<A: DashboardApi>(api: Arc<A>) -> Dashboard<A> {
        Dashboard::new(api, &DashboardConfig::default())
            .with_clipboard(Arc::new(MemoryClipboard::new()))
    }

    fn drain(rx: &mut broadcast::Receiver<DashboardEvent>) -> Vec<DashboardEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn ids(snapshot: &DashboardSnapshot) -> Vec<String> {
        snapshot.messages.iter().map(|m| m.id.0.clone()).collect()
    }

    /// Mail connected with a mixed inbox; storefront connected as `shop_1`.
    fn stocked_fake() -> Arc<FakeApi> {
        let fake = Arc::new(FakeApi::new());
        fake.set_status(connected(Provider::Storefront, "shop_1"));
        fake.set_status(connected(Provider::Mail, "seller@example.com"));
        fake.set_metrics(ShopMetrics {
            orders: 142,
            gmv: 3456.78,
            ..Default::default()
        });
        fake.set_messages(vec![
            message("m1", true, false),
            message("m2", true, true),
            message("m3", false, false),
            message("m4", true, true),
        ]);
        fake
    }

    #[test]
    fn new_dashboard_starts_empty() {
        let dashboard = dashboard(Arc::new(FakeApi::new()));
        let snapshot = tokio_test::block_on(dashboard.snapshot());
        assert_eq!(snapshot, DashboardSnapshot::default());
    }

    #[tokio::test]
    async fn both_disconnected_fetches_no_data() {
        let mut api = MockDashboardApi::new();
        api.expect_connection_status()
            .times(2)
            .returning(|provider| Ok(ConnectionState::disconnected(provider)));
        api.expect_shop_metrics().times(0);
        api.expect_inbox_messages().times(0);
        api.expect_inbox_stats().times(0);

        let dashboard = dashboard(Arc::new(api));
        dashboard.refresh_all().await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.storefront.status(), ConnectionStatus::Disconnected);
        assert_eq!(snapshot.mail.status(), ConnectionStatus::Disconnected);
        assert!(snapshot.metrics.is_none());
        assert!(snapshot.messages.is_empty());
        assert!(snapshot.last_error.is_none());
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn pending_storefront_and_mail_with_three_messages() {
        let fake = Arc::new(FakeApi::new());
        fake.set_status(ConnectionState {
            pending: true,
            ..ConnectionState::disconnected(Provider::Storefront)
        });
        fake.set_status(connected(Provider::Mail, "seller@example.com"));
        fake.set_messages(vec![
            message("m1", true, false),
            message("m2", false, false),
            message("m3", true, true),
        ]);

        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        assert_eq!(fake.count("metrics:demo_shop"), 1);
        assert_eq!(fake.count("messages:all"), 1);
        assert_eq!(fake.count("stats"), 1);

        let snapshot = dashboard.snapshot().await;
        assert!(snapshot.metrics.is_some());
        assert_eq!(snapshot.stats.as_ref().map(|s| s.total_messages), Some(3));
        assert_eq!(ids(&snapshot), vec!["m1", "m2", "m3"]);
        assert_eq!(snapshot.filter, InboxFilter::All);
        assert!(snapshot.inbox_loaded);
    }

    #[tokio::test]
    async fn metrics_use_reported_shop_id() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        assert_eq!(fake.count("metrics:shop_1"), 1);
        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.metrics.map(|m| m.orders), Some(142));
    }

    #[tokio::test]
    async fn failed_status_query_does_not_stop_dependents() {
        let fake = stocked_fake();
        fake.fail(FailPoint::Status(Provider::Storefront));

        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.storefront.status(), ConnectionStatus::Disconnected);
        assert_eq!(fake.count("metrics:"), 0);
        assert_eq!(snapshot.messages.len(), 4);
        assert!(snapshot
            .last_error
            .as_deref()
            .is_some_and(|e| e.contains("Etsy")));
    }

    #[tokio::test]
    async fn refresh_all_is_idempotent() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());

        dashboard.refresh_all().await;
        let first = dashboard.snapshot().await;
        dashboard.refresh_all().await;
        let second = dashboard.snapshot().await;

        assert_eq!(first, second);
        assert_eq!(fake.count("stats"), 2);
    }

    #[tokio::test]
    async fn refresh_clears_previous_error() {
        let fake = stocked_fake();
        fake.fail(FailPoint::Metrics);
        let dashboard = dashboard(fake.clone());

        dashboard.refresh_all().await;
        assert!(dashboard.snapshot().await.last_error.is_some());

        fake.recover(FailPoint::Metrics);
        dashboard.refresh_all().await;
        let snapshot = dashboard.snapshot().await;
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.metrics.is_some());
    }

    #[tokio::test]
    async fn coupled_inbox_load_applies_nothing_on_partial_failure() {
        let fake = stocked_fake();
        fake.fail(FailPoint::Stats);
        let dashboard = dashboard(fake.clone());
        let mut rx = dashboard.subscribe();

        dashboard.refresh_all().await;

        let snapshot = dashboard.snapshot().await;
        assert!(snapshot.messages.is_empty());
        assert!(snapshot.stats.is_none());
        assert!(!snapshot.inbox_loaded);
        assert!(snapshot
            .last_error
            .as_deref()
            .is_some_and(|e| e.starts_with("Failed to load inbox")));
        assert!(drain(&mut rx)
            .iter()
            .any(|e| matches!(e, DashboardEvent::Error { .. })));
    }

    #[tokio::test]
    async fn filter_change_loads_matching_pair() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        dashboard.set_filter(InboxFilter::NeedsReply).await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.filter, InboxFilter::NeedsReply);
        assert_eq!(ids(&snapshot), vec!["m1", "m2", "m4"]);
        assert_eq!(fake.count("messages:needs_reply"), 1);
        assert_eq!(fake.count("stats"), 2);
    }

    #[tokio::test]
    async fn overlapping_filter_changes_apply_only_latest() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        fake.hold(GateKey::Inbox(InboxFilter::NeedsReply));
        tokio::join!(dashboard.set_filter(InboxFilter::NeedsReply), async {
            fake.wait_for_call("messages:needs_reply").await;
            dashboard.set_filter(InboxFilter::Refunds).await;
            fake.release(GateKey::Inbox(InboxFilter::NeedsReply));
        });

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.filter, InboxFilter::Refunds);
        assert_eq!(ids(&snapshot), vec!["m2", "m4"]);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn inbox_page_is_limited_by_configured_size() {
        let fake = stocked_fake();
        let config = DashboardConfig {
            inbox_page_size: 2,
            ..DashboardConfig::default()
        };
        let dashboard = Dashboard::new(fake.clone(), &config)
            .with_clipboard(Arc::new(MemoryClipboard::new()));
        dashboard.refresh_all().await;

        let snapshot = dashboard.snapshot().await;
        assert_eq!(ids(&snapshot), vec!["m1", "m2"]);
        assert_eq!(snapshot.total_messages, 4);
    }

    #[tokio::test]
    async fn filter_change_without_mail_only_stores_filter() {
        let fake = Arc::new(FakeApi::new());
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        dashboard.set_filter(InboxFilter::Refunds).await;

        assert_eq!(fake.count("messages:"), 0);
        assert_eq!(dashboard.snapshot().await.filter, InboxFilter::Refunds);
    }

    #[tokio::test]
    async fn inbox_tab_loads_lazily_once() {
        let fake = stocked_fake();
        fake.fail(FailPoint::Messages);
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;
        assert!(!dashboard.snapshot().await.inbox_loaded);

        fake.recover(FailPoint::Messages);
        dashboard.set_tab(Tab::Inbox).await;
        assert!(dashboard.snapshot().await.inbox_loaded);

        dashboard.set_tab(Tab::Analytics).await;
        dashboard.set_tab(Tab::Inbox).await;

        assert_eq!(fake.count("messages:"), 2);
        assert_eq!(dashboard.snapshot().await.tab, Tab::Inbox);
    }

    #[tokio::test]
    async fn other_tabs_fetch_nothing() {
        let fake = Arc::new(FakeApi::new());
        let dashboard = dashboard(fake.clone());

        dashboard.set_tab(Tab::Products).await;
        dashboard.set_tab(Tab::Inbox).await;

        assert!(fake.calls().is_empty());
        assert_eq!(dashboard.snapshot().await.tab, Tab::Inbox);
    }

    #[tokio::test]
    async fn draft_becomes_ready() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.selected, Some(MessageId::from("m1")));
        match snapshot.draft {
            DraftState::Ready { result, draft_id, .. } => {
                assert_eq!(result.content, "Draft for m1");
                assert_eq!(draft_id, Some(DraftId::from("d_m1")));
            }
            other => panic!("unexpected draft state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn late_draft_after_selection_change_is_discarded() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;
        dashboard.select(MessageId::from("m1")).await;

        let m1 = MessageId::from("m1");
        fake.hold(GateKey::Draft(m1.clone()));
        let (generated, ()) = tokio::join!(dashboard.generate_draft(&m1), async {
            fake.wait_for_call("draft:m1").await;
            dashboard.select(MessageId::from("m2")).await;
            fake.release(GateKey::Draft(m1.clone()));
        });
        generated.unwrap();

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.selected, Some(MessageId::from("m2")));
        assert_eq!(snapshot.draft, DraftState::Idle);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn duplicate_generate_makes_one_call() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        let m1 = MessageId::from("m1");
        fake.hold(GateKey::Draft(m1.clone()));
        let (first, second) = tokio::join!(dashboard.generate_draft(&m1), async {
            fake.wait_for_call("draft:m1").await;
            let second = dashboard.generate_draft(&m1).await;
            fake.release(GateKey::Draft(m1.clone()));
            second
        });

        assert_eq!(first, Ok(()));
        assert_eq!(second, Ok(()));
        assert_eq!(fake.count("draft:"), 1);
        assert!(matches!(
            dashboard.snapshot().await.draft,
            DraftState::Ready { .. }
        ));
    }

    #[tokio::test]
    async fn generate_for_message_without_reply_is_rejected_without_call() {
        let mut api = MockDashboardApi::new();
        api.expect_connection_status().returning(|provider| {
            Ok(match provider {
                Provider::Storefront => ConnectionState::disconnected(provider),
                Provider::Mail => connected(provider, "seller@example.com"),
            })
        });
        api.expect_inbox_messages().returning(|_| {
            Ok(InboxPage {
                messages: vec![message("newsletter", false, false)],
                total: 1,
            })
        });
        api.expect_inbox_stats()
            .returning(|| Ok(InboxStats::default()));
        api.expect_generate_draft().times(0);

        let dashboard = dashboard(Arc::new(api));
        dashboard.refresh_all().await;

        let err = dashboard
            .generate_draft(&MessageId::from("newsletter"))
            .await
            .unwrap_err();

        assert_eq!(err, DraftError::NotEligible(MessageId::from("newsletter")));
        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.draft, DraftState::Idle);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn generate_for_unknown_message_is_rejected() {
        let dashboard = dashboard(Arc::new(FakeApi::new()));
        let err = dashboard
            .generate_draft(&MessageId::from("missing"))
            .await
            .unwrap_err();
        assert_eq!(err, DraftError::UnknownMessage(MessageId::from("missing")));
    }

    #[tokio::test]
    async fn draft_failure_is_retryable() {
        let fake = stocked_fake();
        fake.fail(FailPoint::Draft);
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();
        let snapshot = dashboard.snapshot().await;
        assert!(matches!(snapshot.draft, DraftState::Failed { .. }));
        assert!(snapshot.last_error.is_some());

        fake.recover(FailPoint::Draft);
        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();
        assert!(matches!(
            dashboard.snapshot().await.draft,
            DraftState::Ready { .. }
        ));
        assert_eq!(fake.count("draft:m1"), 2);
    }

    #[tokio::test]
    async fn draft_for_another_message_fails_and_can_be_retried() {
        let mut api = MockDashboardApi::new();
        api.expect_connection_status().returning(|provider| {
            Ok(match provider {
                Provider::Storefront => ConnectionState::disconnected(provider),
                Provider::Mail => connected(provider, "seller@example.com"),
            })
        });
        api.expect_inbox_messages().returning(|_| {
            Ok(InboxPage {
                messages: vec![message("m1", true, false)],
                total: 1,
            })
        });
        api.expect_inbox_stats()
            .returning(|| Ok(InboxStats::default()));
        api.expect_generate_draft().times(2).returning(|_| {
            Ok(GeneratedDraft {
                draft_id: None,
                message_id: MessageId::from("other"),
                result: DraftResult {
                    content: "Hi".to_string(),
                    confidence_score: 0.5,
                    rationale: "Wrong thread".to_string(),
                },
            })
        });

        let dashboard = dashboard(Arc::new(api));
        dashboard.refresh_all().await;
        let m1 = MessageId::from("m1");

        dashboard.generate_draft(&m1).await.unwrap();
        let snapshot = dashboard.snapshot().await;
        assert!(matches!(snapshot.draft, DraftState::Failed { .. }));
        assert!(snapshot.last_error.is_some());
        assert!(!snapshot.loading);

        dashboard.generate_draft(&m1).await.unwrap();
        assert!(matches!(
            dashboard.snapshot().await.draft,
            DraftState::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn select_discards_ready_draft() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;
        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();
        let mut rx = dashboard.subscribe();

        dashboard.select(MessageId::from("m2")).await;

        assert_eq!(dashboard.snapshot().await.draft, DraftState::Idle);
        assert_eq!(
            drain(&mut rx),
            vec![DashboardEvent::DraftUpdated { message_id: None }]
        );
    }

    #[tokio::test]
    async fn copy_result_writes_clipboard_and_records_approval() {
        let fake = stocked_fake();
        let clipboard = Arc::new(MemoryClipboard::new());
        let dashboard = Dashboard::new(fake.clone(), &DashboardConfig::default())
            .with_clipboard(clipboard.clone());
        dashboard.refresh_all().await;
        dashboard.generate_draft(&MessageId::from("m2")).await.unwrap();

        dashboard.copy_result().await.unwrap();

        assert_eq!(clipboard.contents().as_deref(), Some("Draft for m2"));
        assert_eq!(
            fake.approvals(),
            vec![(
                MessageId::from("m2"),
                DraftId::from("d_m2"),
                ApprovalAction::Copy
            )]
        );
    }

    struct BrokenClipboard;

    impl ClipboardSink for BrokenClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("no display".to_string()))
        }
    }

    #[tokio::test]
    async fn clipboard_failure_is_only_logged() {
        let fake = stocked_fake();
        let dashboard = Dashboard::new(fake.clone(), &DashboardConfig::default())
            .with_clipboard(Arc::new(BrokenClipboard));
        dashboard.refresh_all().await;
        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();

        assert_eq!(dashboard.copy_result().await, Ok(()));

        let snapshot = dashboard.snapshot().await;
        assert!(snapshot.last_error.is_none());
        assert!(matches!(snapshot.draft, DraftState::Ready { .. }));
        assert!(fake.approvals().is_empty());
        assert_eq!(fake.count("approve:"), 0);
    }

    #[tokio::test]
    async fn approval_failure_is_not_surfaced() {
        let fake = stocked_fake();
        fake.fail(FailPoint::Approve);
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;
        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();

        assert_eq!(dashboard.copy_result().await, Ok(()));
        assert!(dashboard.snapshot().await.last_error.is_none());
    }

    #[tokio::test]
    async fn copy_without_draft_is_refused() {
        let dashboard = dashboard(Arc::new(FakeApi::new()));
        assert_eq!(dashboard.copy_result().await, Err(DraftError::NoDraft));
        assert_eq!(dashboard.reject_draft(None).await, Err(DraftError::NoDraft));
    }

    #[tokio::test]
    async fn reject_sends_feedback_and_dismisses() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;
        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();

        dashboard
            .reject_draft(Some("Too formal".to_string()))
            .await
            .unwrap();

        assert_eq!(dashboard.snapshot().await.draft, DraftState::Idle);
        assert_eq!(
            fake.rejections(),
            vec![(
                MessageId::from("m1"),
                DraftId::from("d_m1"),
                Some("Too formal".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn mock_connect_installs_demo_state_and_fetches_metrics() {
        let fake = Arc::new(FakeApi::new());
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        let outcome = dashboard.connect(Provider::Storefront).await.unwrap();

        assert_eq!(outcome, ConnectOutcome::Demo);
        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.storefront.status(), ConnectionStatus::DemoConnected);
        assert!(snapshot.storefront.simulated);
        assert!(snapshot.metrics.is_some());
        assert_eq!(fake.count("metrics:demo_shop"), 1);
    }

    #[tokio::test]
    async fn mock_connect_for_mail_loads_inbox() {
        let fake = Arc::new(FakeApi::new());
        fake.set_connect(
            Provider::Mail,
            ConnectResponse {
                auth_url: Some("mock://gmail".to_string()),
                mock_auth_url: None,
            },
        );
        fake.set_messages(vec![message("m1", true, false)]);
        let dashboard = dashboard(fake.clone());

        dashboard.connect(Provider::Mail).await.unwrap();

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.mail.status(), ConnectionStatus::DemoConnected);
        assert_eq!(ids(&snapshot), vec!["m1"]);
        assert_eq!(fake.count("messages:all"), 1);
    }

    #[tokio::test]
    async fn real_connect_publishes_navigation_only() {
        let fake = Arc::new(FakeApi::new());
        fake.set_connect(
            Provider::Storefront,
            ConnectResponse {
                auth_url: Some("https://www.etsy.com/oauth/connect?state=abc".to_string()),
                mock_auth_url: None,
            },
        );
        let dashboard = dashboard(fake.clone());
        let mut rx = dashboard.subscribe();

        let outcome = dashboard.connect(Provider::Storefront).await.unwrap();

        assert!(matches!(outcome, ConnectOutcome::Redirect(_)));
        let events = drain(&mut rx);
        assert!(matches!(
            events.as_slice(),
            [DashboardEvent::NavigateExternally {
                provider: Provider::Storefront,
                ..
            }]
        ));
        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.storefront.status(), ConnectionStatus::Disconnected);
        assert_eq!(fake.count("metrics:"), 0);
    }

    #[tokio::test]
    async fn unusable_connect_url_is_an_error() {
        let fake = Arc::new(FakeApi::new());
        fake.set_connect(Provider::Mail, ConnectResponse::default());
        let dashboard = dashboard(fake);

        assert!(dashboard.connect(Provider::Mail).await.is_err());
        assert!(dashboard.snapshot().await.last_error.is_some());
    }

    #[tokio::test]
    async fn disconnect_mail_drops_inbox_and_selection() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;
        dashboard.generate_draft(&MessageId::from("m1")).await.unwrap();

        dashboard.disconnect(Provider::Mail).await.unwrap();

        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.mail.status(), ConnectionStatus::Disconnected);
        assert!(snapshot.messages.is_empty());
        assert!(snapshot.stats.is_none());
        assert!(snapshot.selected.is_none());
        assert_eq!(snapshot.draft, DraftState::Idle);
        assert!(snapshot.metrics.is_some());
    }

    #[tokio::test]
    async fn sync_mail_reloads_inbox() {
        let fake = stocked_fake();
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        fake.set_messages(vec![
            message("m1", true, false),
            message("m5", true, false),
        ]);
        let summary = dashboard.sync_mail().await.unwrap();

        assert_eq!(summary.messages_fetched, 2);
        assert_eq!(ids(&dashboard.snapshot().await), vec!["m1", "m5"]);
    }

    #[tokio::test]
    async fn sync_failure_keeps_inbox() {
        let fake = stocked_fake();
        fake.fail(FailPoint::Sync);
        let dashboard = dashboard(fake.clone());
        dashboard.refresh_all().await;

        assert!(dashboard.sync_mail().await.is_err());
        let snapshot = dashboard.snapshot().await;
        assert_eq!(snapshot.messages.len(), 4);
        assert!(snapshot.last_error.is_some());
    }
}
