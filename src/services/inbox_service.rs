//! Inbox messages and statistics.
//!
//! Messages for the active filter and the inbox statistics are fetched as a
//! pair and applied together, so the list and the counters shown next to it
//! always come from the same load. Overlapping loads are tagged; only the
//! latest one lands.

use tracing::{debug, info, warn};

use super::request_tag::{RequestTag, Settled, TagSequence};
use crate::api::{InboxPage, InboxQuery};
use crate::domain::{InboxFilter, InboxStats, Message, MessageId};
use crate::error::ApiError;

/// An issued inbox load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxTicket {
    pub tag: RequestTag,
    pub query: InboxQuery,
}

/// Owner of the message set, its statistics and the active filter.
#[derive(Debug, Clone)]
pub struct InboxStore {
    messages: Vec<Message>,
    total: u64,
    stats: Option<InboxStats>,
    filter: InboxFilter,
    loaded_filter: Option<InboxFilter>,
    page_size: u32,
    requests: TagSequence,
}

impl InboxStore {
    /// Creates an empty store requesting `page_size` messages per load.
    pub fn new(page_size: u32) -> Self {
        Self {
            messages: Vec::new(),
            total: 0,
            stats: None,
            filter: InboxFilter::default(),
            loaded_filter: None,
            page_size,
            requests: TagSequence::new(),
        }
    }

    /// Messages from the latest applied load.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Matches reported by the backend before pagination.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Statistics from the latest applied load.
    pub fn stats(&self) -> Option<&InboxStats> {
        self.stats.as_ref()
    }

    /// Active filter.
    pub fn filter(&self) -> InboxFilter {
        self.filter
    }

    /// Filter the current message set was loaded for.
    pub fn loaded_filter(&self) -> Option<InboxFilter> {
        self.loaded_filter
    }

    /// Returns whether any load has succeeded since the store was created
    /// or cleared.
    pub fn has_loaded(&self) -> bool {
        self.loaded_filter.is_some()
    }

    /// Looks a message up by id in the current set.
    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Changes the active filter. Returns whether it changed.
    pub fn set_filter(&mut self, filter: InboxFilter) -> bool {
        if self.filter == filter {
            return false;
        }
        debug!(from = ?self.filter, to = ?filter, "Inbox filter changed");
        self.filter = filter;
        true
    }

    /// Starts a load for `filter`, superseding any load in flight.
    pub fn begin_load(&mut self, filter: InboxFilter) -> InboxTicket {
        let tag = self.requests.issue();
        debug!(tag = tag.get(), filter = filter.as_query(), "Loading inbox");
        InboxTicket {
            tag,
            query: InboxQuery::first_page(filter, self.page_size),
        }
    }

    /// Applies a load result. Stale when a newer load was issued or the
    /// filter moved on since this one was issued.
    pub fn apply_load(
        &mut self,
        ticket: InboxTicket,
        result: Result<(InboxPage, InboxStats), ApiError>,
    ) -> Settled {
        if !self.requests.is_current(ticket.tag) || ticket.query.filter != self.filter {
            debug!(
                tag = ticket.tag.get(),
                filter = ticket.query.filter.as_query(),
                "Dropping superseded inbox response"
            );
            return Settled::Stale;
        }

        match result {
            Ok((page, stats)) => {
                info!(
                    filter = ticket.query.filter.as_query(),
                    messages = page.messages.len(),
                    total = stats.total_messages,
                    "Inbox loaded"
                );
                self.messages = page.messages;
                self.total = page.total;
                self.stats = Some(stats);
                self.loaded_filter = Some(ticket.query.filter);
                Settled::Applied
            }
            Err(e) => {
                warn!(error = %e, "Inbox load failed");
                Settled::Failed(e)
            }
        }
    }

    /// Drops all messages and statistics and supersedes in-flight loads.
    /// The filter is kept.
    pub fn clear(&mut self) {
        self.requests.invalidate();
        self.messages.clear();
        self.total = 0;
        self.stats = None;
        self.loaded_filter = None;
    }
}

impl Default for InboxStore {
    fn default() -> Self {
        Self::new(50)
    }
}
