//! JSON shapes exchanged with the backend and their conversion into domain
//! types.
//!
//! The backend speaks snake_case and names the storefront after its vendor
//! (`etsy_receipt_id`, `has_etsy_links`). Conversion is strict about fields
//! the dashboard cannot render without, lenient about everything else.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::trace;

use super::{ConnectResponse, GeneratedDraft, InboxPage, MailSyncSummary};
use crate::domain::{
    ConnectionState, DraftResult, InboxStats, Message, MessageId, Provider, ReplyPriority,
    ThreadId,
};
use crate::error::ApiError;

/// `GET /auth/status` and `GET /auth/gmail/status`.
#[derive(Debug, Deserialize)]
pub struct WireAuthStatus {
    pub connected: bool,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl WireAuthStatus {
    pub fn into_state(self, provider: Provider) -> ConnectionState {
        let identity = match provider {
            Provider::Storefront => self.shop_id,
            Provider::Mail => self.email,
        };
        ConnectionState {
            provider,
            connected: self.connected,
            pending: self.pending,
            identity,
            last_sync: self.last_sync,
            simulated: false,
        }
    }
}

/// `POST /auth/{provider}/connect`.
#[derive(Debug, Deserialize)]
pub struct WireConnect {
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub mock_auth_url: Option<String>,
}

impl From<WireConnect> for ConnectResponse {
    fn from(wire: WireConnect) -> Self {
        Self {
            auth_url: wire.auth_url,
            mock_auth_url: wire.mock_auth_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub id: String,
    pub thread_id: String,
    pub from_email: String,
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub is_unread: bool,
    pub internal_date: DateTime<Utc>,
    #[serde(default)]
    pub etsy_receipt_id: Option<String>,
    #[serde(default)]
    pub has_etsy_links: bool,
    #[serde(default)]
    pub needs_reply: bool,
    #[serde(default)]
    pub reply_priority: ReplyPriority,
    #[serde(default)]
    pub is_refund_related: bool,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Self {
            id: MessageId(wire.id),
            thread_id: ThreadId(wire.thread_id),
            from_email: wire.from_email,
            from_name: wire.from_name,
            subject: wire.subject,
            snippet: wire.snippet,
            is_unread: wire.is_unread,
            internal_date: wire.internal_date,
            linked_order_id: wire.etsy_receipt_id,
            has_storefront_links: wire.has_etsy_links,
            needs_reply: wire.needs_reply,
            reply_priority: wire.reply_priority,
            is_refund_related: wire.is_refund_related,
        }
    }
}

/// `GET /inbox/messages`.
#[derive(Debug, Deserialize)]
pub struct WireMessagesPage {
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl From<WireMessagesPage> for InboxPage {
    fn from(wire: WireMessagesPage) -> Self {
        let messages: Vec<Message> = wire.messages.into_iter().map(Message::from).collect();
        let total = wire.total.unwrap_or(messages.len() as u64);
        Self { messages, total }
    }
}

/// `GET /inbox/stats`.
#[derive(Debug, Deserialize)]
pub struct WireInboxStats {
    pub total_messages: u64,
    pub unread_count: u64,
    pub needs_reply_count: u64,
    pub refund_requests: u64,
    pub linked_to_orders: u64,
    #[serde(default)]
    pub sources: HashMap<String, u64>,
    #[serde(default)]
    pub avg_response_time_hours: Option<f64>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl From<WireInboxStats> for InboxStats {
    fn from(wire: WireInboxStats) -> Self {
        let mut source_counts = HashMap::new();
        for (key, count) in wire.sources {
            match Provider::from_source_key(&key) {
                Some(provider) => {
                    source_counts.insert(provider, count);
                }
                None => trace!(source = %key, "Ignoring unknown inbox source"),
            }
        }
        Self {
            total_messages: wire.total_messages,
            unread_count: wire.unread_count,
            needs_reply_count: wire.needs_reply_count,
            refund_requests: wire.refund_requests,
            linked_to_orders: wire.linked_to_orders,
            source_counts,
            avg_response_time_hours: wire.avg_response_time_hours,
            last_sync: wire.last_sync,
        }
    }
}

/// `POST /inbox/messages/{id}/draft`. Every field optional on the wire so a
/// partial payload is reported by name instead of as a parse failure.
#[derive(Debug, Deserialize)]
pub struct WireDraft {
    #[serde(default)]
    pub draft_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub draft_content: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

impl WireDraft {
    /// Validates the payload for the message it was requested for.
    pub fn into_draft(self, requested: &MessageId) -> Result<GeneratedDraft, ApiError> {
        let content = self.draft_content.ok_or_else(|| missing("draft_content"))?;
        let rationale = self.rationale.ok_or_else(|| missing("rationale"))?;
        let confidence_score = self.confidence_score.ok_or_else(|| missing("confidence_score"))?;
        if !(0.0..=1.0).contains(&confidence_score) {
            return Err(ApiError::InvalidField {
                field: "confidence_score",
                reason: format!("{} is outside [0, 1]", confidence_score),
            });
        }
        if let Some(echoed) = &self.message_id {
            if echoed != &requested.0 {
                return Err(ApiError::InvalidField {
                    field: "message_id",
                    reason: format!("expected {}, got {}", requested, echoed),
                });
            }
        }

        Ok(GeneratedDraft {
            draft_id: self.draft_id.map(Into::into),
            message_id: requested.clone(),
            result: DraftResult {
                content,
                confidence_score,
                rationale,
            },
        })
    }
}

fn missing(field: &'static str) -> ApiError {
    ApiError::InvalidField {
        field,
        reason: "missing".to_string(),
    }
}

/// `POST /inbox/gmail/sync`.
#[derive(Debug, Deserialize)]
pub struct WireSync {
    #[serde(default)]
    pub messages_fetched: u64,
    #[serde(default)]
    pub new_messages: u64,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl From<WireSync> for MailSyncSummary {
    fn from(wire: WireSync) -> Self {
        Self {
            messages_fetched: wire.messages_fetched,
            new_messages: wire.new_messages,
            last_sync: wire.last_sync,
        }
    }
}

/// `GET /health`. Older backends answer `{"ok": true}`, newer ones
/// `{"status": "healthy"}`.
#[derive(Debug, Deserialize)]
pub struct WireHealth {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
}

impl WireHealth {
    pub fn is_healthy(&self) -> bool {
        self.ok.unwrap_or(false) || self.status.as_deref() == Some("healthy")
    }
}
