//! Inbox messages, filters and statistics.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Provider;

/// Unique message identifier assigned by the mail provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Conversation thread identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How urgently a message wants an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPriority {
    Urgent,
    High,
    #[default]
    Normal,
    Low,
}

impl ReplyPriority {
    /// Returns the badge label.
    pub fn label(&self) -> &'static str {
        match self {
            ReplyPriority::Urgent => "Urgent",
            ReplyPriority::High => "High",
            ReplyPriority::Normal => "Normal",
            ReplyPriority::Low => "Low",
        }
    }
}

/// Which subset of the inbox to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxFilter {
    #[default]
    All,
    NeedsReply,
    Refunds,
}

impl InboxFilter {
    /// Returns all filters in display order.
    pub fn all() -> &'static [InboxFilter] {
        &[InboxFilter::All, InboxFilter::NeedsReply, InboxFilter::Refunds]
    }

    /// Value of the `filter_type` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            InboxFilter::All => "all",
            InboxFilter::NeedsReply => "needs_reply",
            InboxFilter::Refunds => "refunds",
        }
    }

    /// Parses a `filter_type` query value.
    pub fn from_query(value: &str) -> Option<InboxFilter> {
        Self::all().iter().copied().find(|f| f.as_query() == value)
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            InboxFilter::All => "All",
            InboxFilter::NeedsReply => "Needs Reply",
            InboxFilter::Refunds => "Refunds",
        }
    }

    /// Returns whether a message belongs to this filter.
    pub fn matches(&self, message: &Message) -> bool {
        match self {
            InboxFilter::All => true,
            InboxFilter::NeedsReply => message.needs_reply,
            InboxFilter::Refunds => message.is_refund_related,
        }
    }
}

/// An inbox message header with triage annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub from_email: String,
    pub from_name: Option<String>,
    pub subject: String,
    pub snippet: String,
    pub is_unread: bool,
    pub internal_date: DateTime<Utc>,
    /// Storefront order this message refers to, if any.
    pub linked_order_id: Option<String>,
    pub has_storefront_links: bool,
    pub needs_reply: bool,
    pub reply_priority: ReplyPriority,
    pub is_refund_related: bool,
}

impl Message {
    /// Returns the sender name, falling back to the address.
    pub fn sender_display(&self) -> &str {
        self.from_name.as_deref().unwrap_or(&self.from_email)
    }
}

/// Aggregate counts over the inbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboxStats {
    pub total_messages: u64,
    pub unread_count: u64,
    pub needs_reply_count: u64,
    pub refund_requests: u64,
    pub linked_to_orders: u64,
    pub source_counts: HashMap<Provider, u64>,
    pub avg_response_time_hours: Option<f64>,
    pub last_sync: Option<DateTime<Utc>>,
}

impl InboxStats {
    /// Message count for one source, zero when the backend did not report it.
    pub fn source_count(&self, provider: Provider) -> u64 {
        self.source_counts.get(&provider).copied().unwrap_or(0)
    }
}
