//! Selected message and active tab.

use tracing::debug;

use super::inbox_service::InboxStore;
use crate::domain::{Message, MessageId, Tab};

/// Owner of the selected message id and the active tab.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    selected: Option<MessageId>,
    tab: Tab,
}

impl Selection {
    /// Creates a selection on the default tab with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected message id.
    pub fn selected(&self) -> Option<&MessageId> {
        self.selected.as_ref()
    }

    /// Active tab.
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Selects a message. Returns whether the selection changed.
    pub fn select(&mut self, id: MessageId) -> bool {
        if self.selected.as_ref() == Some(&id) {
            return false;
        }
        debug!(message_id = %id, "Message selected");
        self.selected = Some(id);
        true
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Switches tab. Returns the previous one.
    pub fn set_tab(&mut self, tab: Tab) -> Tab {
        let previous = self.tab;
        if previous != tab {
            debug!(from = previous.key(), to = tab.key(), "Tab changed");
        }
        self.tab = tab;
        previous
    }

    /// Looks the selected message up in the inbox. `None` when nothing is
    /// selected or the message is not part of the current set.
    pub fn selected_message<'a>(&self, inbox: &'a InboxStore) -> Option<&'a Message> {
        self.selected.as_ref().and_then(|id| inbox.find(id))
    }
}

/// Returns whether entering `tab` should trigger the lazy first inbox load.
pub fn wants_inbox_load(tab: Tab, inbox_loaded: bool, mail_connected: bool) -> bool {
    tab == Tab::Inbox && !inbox_loaded && mail_connected
}
