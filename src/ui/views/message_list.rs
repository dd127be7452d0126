//! Message list view.
//!
//! Displays the inbox messages for the active filter, with filter tabs
//! showing how many messages each filter holds.

use crate::app::DashboardSnapshot;
use crate::domain::{InboxFilter, InboxStats, Message, MessageId, ReplyPriority};

/// Row for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: MessageId,
    pub sender: String,
    pub subject: String,
    pub snippet: String,
    pub timestamp: String,
    pub is_unread: bool,
    pub is_selected: bool,
    /// Priority badge, only for messages awaiting a reply.
    pub priority: Option<&'static str>,
    /// Linked storefront order, shown as a chip.
    pub order: Option<String>,
    pub is_refund: bool,
}

impl MessageRow {
    fn from_message(message: &Message, selected: Option<&MessageId>) -> Self {
        Self {
            id: message.id.clone(),
            sender: message.sender_display().to_string(),
            subject: message.subject.clone(),
            snippet: message.snippet.clone(),
            timestamp: message.internal_date.format("%b %d %H:%M").to_string(),
            is_unread: message.is_unread,
            is_selected: selected == Some(&message.id),
            priority: message
                .needs_reply
                .then(|| message.reply_priority.label()),
            order: message.linked_order_id.as_ref().map(|id| format!("Order #{}", id)),
            is_refund: message.is_refund_related,
        }
    }

    /// Returns whether the row should be highlighted as urgent.
    pub fn is_urgent(&self) -> bool {
        self.priority == Some(ReplyPriority::Urgent.label())
    }
}

/// One filter tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTab {
    pub filter: InboxFilter,
    pub label: String,
    pub active: bool,
}

/// Builds the filter tabs, with counts once statistics are known.
pub fn filter_tabs(active: InboxFilter, stats: Option<&InboxStats>) -> Vec<FilterTab> {
    InboxFilter::all()
        .iter()
        .map(|filter| {
            let count = stats.map(|s| match filter {
                InboxFilter::All => s.total_messages,
                InboxFilter::NeedsReply => s.needs_reply_count,
                InboxFilter::Refunds => s.refund_requests,
            });
            let label = match count {
                Some(count) => format!("{} ({})", filter.label(), count),
                None => filter.label().to_string(),
            };
            FilterTab {
                filter: *filter,
                label,
                active: *filter == active,
            }
        })
        .collect()
}

/// Message list view model.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageList {
    pub tabs: Vec<FilterTab>,
    pub rows: Vec<MessageRow>,
    /// Matches on the backend, beyond the loaded page.
    pub total: u64,
    pub loading: bool,
}

impl MessageList {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        Self {
            tabs: filter_tabs(snapshot.filter, snapshot.stats.as_ref()),
            rows: snapshot
                .messages
                .iter()
                .map(|m| MessageRow::from_message(m, snapshot.selected.as_ref()))
                .collect(),
            total: snapshot.total_messages,
            loading: snapshot.loading,
        }
    }

    /// Header line. Mentions the backend total when only a page is loaded.
    pub fn header(&self) -> String {
        let shown = self.rows.len();
        if self.total > shown as u64 {
            return format!("{} of {} messages", shown, self.total);
        }
        match shown {
            1 => "1 message".to_string(),
            n => format!("{} messages", n),
        }
    }

    /// Text shown instead of rows.
    pub fn empty_state(&self) -> Option<&'static str> {
        if !self.rows.is_empty() {
            None
        } else if self.loading {
            Some("Loading messages...")
        } else {
            Some("No messages")
        }
    }

    /// Id of the row after the selected one, or the first row.
    pub fn next_id(&self) -> Option<&MessageId> {
        match self.rows.iter().position(|r| r.is_selected) {
            Some(i) => self.rows.get(i + 1).or(self.rows.get(i)),
            None => self.rows.first(),
        }
        .map(|r| &r.id)
    }

    /// Id of the row before the selected one, or the first row.
    pub fn previous_id(&self) -> Option<&MessageId> {
        match self.rows.iter().position(|r| r.is_selected) {
            Some(i) => self.rows.get(i.saturating_sub(1)),
            None => self.rows.first(),
        }
        .map(|r| &r.id)
    }
}
