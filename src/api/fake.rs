//! In-memory [`DashboardApi`] for tests.
//!
//! Responses are configured up front and every call is logged. Calls can be
//! held at a gate until the test releases them, which is how interleavings
//! between intents are forced deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use super::{
    ApprovalAction, ConnectResponse, DashboardApi, GeneratedDraft, InboxPage, InboxQuery,
    MailSyncSummary,
};
use crate::domain::{
    ConnectionState, DraftId, DraftResult, InboxFilter, InboxStats, Message, MessageId, Provider,
    ReplyPriority, ShopMetrics, ThreadId,
};
use crate::error::ApiError;

/// A call that can be held until released.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum GateKey {
    Status(Provider),
    Metrics,
    Inbox(InboxFilter),
    Draft(MessageId),
}

/// A call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum FailPoint {
    Status(Provider),
    Metrics,
    Messages,
    Stats,
    Draft,
    Approve,
    Sync,
}

#[derive(Debug)]
struct Backend {
    storefront: ConnectionState,
    mail: ConnectionState,
    connect: HashMap<Provider, ConnectResponse>,
    metrics: ShopMetrics,
    messages: Vec<Message>,
    failures: HashSet<FailPoint>,
    calls: Vec<String>,
    approvals: Vec<(MessageId, DraftId, ApprovalAction)>,
    rejections: Vec<(MessageId, DraftId, Option<String>)>,
}

pub(crate) struct FakeApi {
    backend: Mutex<Backend>,
    gates: Mutex<HashMap<GateKey, Arc<Notify>>>,
}

impl FakeApi {
    /// Both providers disconnected, empty inbox, demo-mode connect answers.
    pub fn new() -> Self {
        let connect = Provider::all()
            .iter()
            .map(|p| {
                (
                    *p,
                    ConnectResponse {
                        auth_url: None,
                        mock_auth_url: Some(format!("mock://{}", p.source_key())),
                    },
                )
            })
            .collect();
        Self {
            backend: Mutex::new(Backend {
                storefront: ConnectionState::disconnected(Provider::Storefront),
                mail: ConnectionState::disconnected(Provider::Mail),
                connect,
                metrics: ShopMetrics::default(),
                messages: Vec::new(),
                failures: HashSet::new(),
                calls: Vec::new(),
                approvals: Vec::new(),
                rejections: Vec::new(),
            }),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_status(&self, state: ConnectionState) {
        let mut backend = self.backend.lock().unwrap();
        match state.provider {
            Provider::Storefront => backend.storefront = state,
            Provider::Mail => backend.mail = state,
        }
    }

    pub fn set_connect(&self, provider: Provider, response: ConnectResponse) {
        self.backend.lock().unwrap().connect.insert(provider, response);
    }

    pub fn set_metrics(&self, metrics: ShopMetrics) {
        self.backend.lock().unwrap().metrics = metrics;
    }

    pub fn set_messages(&self, messages: Vec<Message>) {
        self.backend.lock().unwrap().messages = messages;
    }

    pub fn fail(&self, point: FailPoint) {
        self.backend.lock().unwrap().failures.insert(point);
    }

    pub fn recover(&self, point: FailPoint) {
        self.backend.lock().unwrap().failures.remove(&point);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.backend.lock().unwrap().calls.clone()
    }

    /// How many logged calls start with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn approvals(&self) -> Vec<(MessageId, DraftId, ApprovalAction)> {
        self.backend.lock().unwrap().approvals.clone()
    }

    pub fn rejections(&self) -> Vec<(MessageId, DraftId, Option<String>)> {
        self.backend.lock().unwrap().rejections.clone()
    }

    /// Holds the next call matching `key` until [`release`](Self::release).
    pub fn hold(&self, key: GateKey) {
        self.gates
            .lock()
            .unwrap()
            .insert(key, Arc::new(Notify::new()));
    }

    /// Lets a held call through. Works whether or not it is waiting yet.
    pub fn release(&self, key: GateKey) {
        if let Some(gate) = self.gates.lock().unwrap().remove(&key) {
            gate.notify_one();
        }
    }

    /// Yields until a call starting with `prefix` has been logged.
    pub async fn wait_for_call(&self, prefix: &str) {
        for _ in 0..1000 {
            if self.count(prefix) > 0 {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("no call matching `{prefix}` was made: {:?}", self.calls());
    }

    fn record(&self, call: String) {
        self.backend.lock().unwrap().calls.push(call);
    }

    fn check(&self, point: FailPoint) -> Result<(), ApiError> {
        if self.backend.lock().unwrap().failures.contains(&point) {
            return Err(ApiError::Status {
                status: 500,
                body: format!("injected failure: {:?}", point),
            });
        }
        Ok(())
    }

    async fn pass_gate(&self, key: GateKey) {
        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn connection_status(&self, provider: Provider) -> Result<ConnectionState, ApiError> {
        self.record(format!("status:{}", provider.source_key()));
        self.pass_gate(GateKey::Status(provider)).await;
        self.check(FailPoint::Status(provider))?;
        let backend = self.backend.lock().unwrap();
        Ok(match provider {
            Provider::Storefront => backend.storefront.clone(),
            Provider::Mail => backend.mail.clone(),
        })
    }

    async fn connect(&self, provider: Provider) -> Result<ConnectResponse, ApiError> {
        self.record(format!("connect:{}", provider.source_key()));
        let backend = self.backend.lock().unwrap();
        Ok(backend.connect.get(&provider).cloned().unwrap_or_default())
    }

    async fn disconnect(&self, provider: Provider) -> Result<(), ApiError> {
        self.record(format!("disconnect:{}", provider.source_key()));
        self.set_status(ConnectionState::disconnected(provider));
        Ok(())
    }

    async fn shop_metrics(&self, shop_id: &str) -> Result<ShopMetrics, ApiError> {
        self.record(format!("metrics:{}", shop_id));
        self.pass_gate(GateKey::Metrics).await;
        self.check(FailPoint::Metrics)?;
        Ok(self.backend.lock().unwrap().metrics.clone())
    }

    async fn inbox_messages(&self, query: InboxQuery) -> Result<InboxPage, ApiError> {
        self.record(format!("messages:{}", query.filter.as_query()));
        self.pass_gate(GateKey::Inbox(query.filter)).await;
        self.check(FailPoint::Messages)?;
        let backend = self.backend.lock().unwrap();
        let matching: Vec<Message> = backend
            .messages
            .iter()
            .filter(|m| query.filter.matches(m))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        Ok(InboxPage {
            messages: matching
                .into_iter()
                .skip(query.offset as usize)
                .take(query.limit as usize)
                .collect(),
            total,
        })
    }

    async fn inbox_stats(&self) -> Result<InboxStats, ApiError> {
        self.record("stats".to_string());
        self.check(FailPoint::Stats)?;
        let backend = self.backend.lock().unwrap();
        let messages = &backend.messages;
        let count = |f: fn(&Message) -> bool| messages.iter().filter(|m| f(m)).count() as u64;
        let mut stats = InboxStats {
            total_messages: messages.len() as u64,
            unread_count: count(|m| m.is_unread),
            needs_reply_count: count(|m| m.needs_reply),
            refund_requests: count(|m| m.is_refund_related),
            linked_to_orders: count(|m| m.linked_order_id.is_some()),
            ..Default::default()
        };
        stats
            .source_counts
            .insert(Provider::Mail, messages.len() as u64);
        Ok(stats)
    }

    async fn generate_draft(&self, message_id: &MessageId) -> Result<GeneratedDraft, ApiError> {
        self.record(format!("draft:{}", message_id));
        self.pass_gate(GateKey::Draft(message_id.clone())).await;
        self.check(FailPoint::Draft)?;
        Ok(GeneratedDraft {
            draft_id: Some(DraftId::from(format!("d_{}", message_id))),
            message_id: message_id.clone(),
            result: DraftResult {
                content: format!("Draft for {}", message_id),
                confidence_score: 0.9,
                rationale: "Polite reply".to_string(),
            },
        })
    }

    async fn approve_draft(
        &self,
        message_id: &MessageId,
        draft_id: &DraftId,
        action: ApprovalAction,
    ) -> Result<(), ApiError> {
        self.record(format!("approve:{}", message_id));
        self.check(FailPoint::Approve)?;
        self.backend
            .lock()
            .unwrap()
            .approvals
            .push((message_id.clone(), draft_id.clone(), action));
        Ok(())
    }

    async fn reject_draft(
        &self,
        message_id: &MessageId,
        draft_id: &DraftId,
        feedback: Option<String>,
    ) -> Result<(), ApiError> {
        self.record(format!("reject:{}", message_id));
        self.backend
            .lock()
            .unwrap()
            .rejections
            .push((message_id.clone(), draft_id.clone(), feedback));
        Ok(())
    }

    async fn sync_mail(&self) -> Result<MailSyncSummary, ApiError> {
        self.record("sync".to_string());
        self.check(FailPoint::Sync)?;
        let fetched = self.backend.lock().unwrap().messages.len() as u64;
        Ok(MailSyncSummary {
            messages_fetched: fetched,
            new_messages: 0,
            last_sync: Some(Utc::now()),
        })
    }

    async fn health(&self) -> Result<bool, ApiError> {
        self.record("health".to_string());
        Ok(true)
    }
}

/// Builds an inbox message for tests.
pub(crate) fn message(id: &str, needs_reply: bool, refund: bool) -> Message {
    Message {
        id: MessageId::from(id),
        thread_id: ThreadId::from(format!("thread_{}", id)),
        from_email: format!("{}@example.com", id),
        from_name: None,
        subject: format!("Subject {}", id),
        snippet: format!("Snippet {}", id),
        is_unread: true,
        internal_date: Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap(),
        linked_order_id: None,
        has_storefront_links: false,
        needs_reply,
        reply_priority: if refund {
            ReplyPriority::Urgent
        } else {
            ReplyPriority::Normal
        },
        is_refund_related: refund,
    }
}

/// A live (not simulated) connected state.
pub(crate) fn connected(provider: Provider, identity: &str) -> ConnectionState {
    ConnectionState {
        connected: true,
        identity: Some(identity.to_string()),
        ..ConnectionState::disconnected(provider)
    }
}
