//! Reply draft generation workflow.
//!
//! ```text
//! Idle ──generate──▶ Generating ──ok──▶ Ready
//!   ▲                    │                 │
//!   │                    └──err──▶ Failed  │
//!   └──── dismiss / select (from any) ─────┘
//! ```
//!
//! Ready and Failed may generate again. A second generate for the message
//! already generating is a no-op; for another message it supersedes the
//! first, whose result is then dropped on arrival.

use tracing::{debug, info, warn};

use super::request_tag::{RequestTag, Settled, TagSequence};
use crate::api::GeneratedDraft;
use crate::domain::{DraftId, DraftResult, Message, MessageId};
use crate::error::{ApiError, DraftError};

/// Where the draft workflow currently is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DraftState {
    #[default]
    Idle,
    Generating {
        message_id: MessageId,
        tag: RequestTag,
    },
    Ready {
        message_id: MessageId,
        draft_id: Option<DraftId>,
        result: DraftResult,
    },
    Failed {
        message_id: MessageId,
        error: String,
    },
}

impl DraftState {
    /// Message the state refers to, if any.
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            DraftState::Idle => None,
            DraftState::Generating { message_id, .. }
            | DraftState::Ready { message_id, .. }
            | DraftState::Failed { message_id, .. } => Some(message_id),
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, DraftState::Generating { .. })
    }
}

/// How a generate request was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftStart {
    /// A backend call should be made with this tag.
    Issued(RequestTag),
    /// The same message is already generating; nothing to do.
    AlreadyGenerating,
}

/// Owner of the [`DraftState`].
#[derive(Debug, Clone, Default)]
pub struct DraftWorkflow {
    state: DraftState,
    requests: TagSequence,
}

impl DraftWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    /// Starts generating a draft for `message`.
    ///
    /// Messages that do not need a reply are refused without touching the
    /// current state.
    pub fn begin(&mut self, message: &Message) -> Result<DraftStart, DraftError> {
        if !message.needs_reply {
            return Err(DraftError::NotEligible(message.id.clone()));
        }

        if let DraftState::Generating { message_id, .. } = &self.state {
            if message_id == &message.id {
                debug!(message_id = %message.id, "Draft already generating");
                return Ok(DraftStart::AlreadyGenerating);
            }
            debug!(
                abandoned = %message_id,
                message_id = %message.id,
                "Superseding draft generation"
            );
        }

        let tag = self.requests.issue();
        debug!(tag = tag.get(), message_id = %message.id, "Generating draft");
        self.state = DraftState::Generating {
            message_id: message.id.clone(),
            tag,
        };
        Ok(DraftStart::Issued(tag))
    }

    /// Applies a generation result. Stale unless it answers the request the
    /// workflow is currently waiting on.
    pub fn apply(&mut self, tag: RequestTag, result: Result<GeneratedDraft, ApiError>) -> Settled {
        let message_id = match &self.state {
            DraftState::Generating {
                message_id,
                tag: waiting,
            } if *waiting == tag && self.requests.is_current(tag) => message_id.clone(),
            _ => {
                debug!(tag = tag.get(), "Dropping superseded draft result");
                return Settled::Stale;
            }
        };

        match result {
            Ok(draft) if draft.message_id != message_id => {
                warn!(
                    expected = %message_id,
                    got = %draft.message_id,
                    "Draft answered another message"
                );
                let error = ApiError::InvalidField {
                    field: "message_id",
                    reason: format!("expected {}, got {}", message_id, draft.message_id),
                };
                self.state = DraftState::Failed {
                    message_id,
                    error: error.to_string(),
                };
                Settled::Failed(error)
            }
            Ok(draft) => {
                info!(
                    message_id = %message_id,
                    confidence = draft.result.confidence_percent(),
                    "Draft ready"
                );
                self.state = DraftState::Ready {
                    message_id,
                    draft_id: draft.draft_id,
                    result: draft.result,
                };
                Settled::Applied
            }
            Err(e) => {
                warn!(message_id = %message_id, error = %e, "Draft generation failed");
                self.state = DraftState::Failed {
                    message_id,
                    error: e.to_string(),
                };
                Settled::Failed(e)
            }
        }
    }

    /// Returns to Idle, abandoning any generation in flight.
    pub fn dismiss(&mut self) {
        self.requests.invalidate();
        if self.state != DraftState::Idle {
            debug!("Draft dismissed");
        }
        self.state = DraftState::Idle;
    }
}
