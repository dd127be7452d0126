//! Reply draft panel shown beside the selected message.

use crate::app::DashboardSnapshot;
use crate::services::DraftState;

/// What the draft panel shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftPanel {
    /// No message selected.
    Hidden,
    /// The selected message does not need a reply.
    NotNeeded,
    /// Offer to generate a draft.
    Generate,
    Generating,
    Ready {
        content: String,
        /// e.g. "85% confident".
        confidence: String,
        rationale: String,
    },
    Failed {
        error: String,
    },
}

impl DraftPanel {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let Some(message) = snapshot.selected_message() else {
            return DraftPanel::Hidden;
        };

        // Leftover from a message that is no longer selected.
        if snapshot.draft.message_id() != Some(&message.id) {
            return if message.needs_reply {
                DraftPanel::Generate
            } else {
                DraftPanel::NotNeeded
            };
        }

        match &snapshot.draft {
            DraftState::Idle => DraftPanel::Generate,
            DraftState::Generating { .. } => DraftPanel::Generating,
            DraftState::Ready { result, .. } => DraftPanel::Ready {
                content: result.content.clone(),
                confidence: format!("{}% confident", result.confidence_percent()),
                rationale: result.rationale.clone(),
            },
            DraftState::Failed { error, .. } => DraftPanel::Failed {
                error: error.clone(),
            },
        }
    }

    /// Label of the primary action button, if any.
    pub fn action_label(&self) -> Option<&'static str> {
        match self {
            DraftPanel::Hidden | DraftPanel::NotNeeded => None,
            DraftPanel::Generate => Some("Generate Reply"),
            DraftPanel::Generating => Some("Generating..."),
            DraftPanel::Ready { .. } => Some("Copy Reply"),
            DraftPanel::Failed { .. } => Some("Try Again"),
        }
    }
}
