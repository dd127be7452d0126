//! Request tags for stale-response rejection.
//!
//! Every suspendable backend call is issued with a tag from the owning
//! store's [`TagSequence`]. When the response arrives the store applies it
//! only if the tag is still the latest one issued; anything older is dropped.

use crate::error::ApiError;

/// Identifies one in-flight request within a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTag(u64);

impl RequestTag {
    /// Raw sequence number, for logging.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Monotonically increasing tag source owned by one store.
#[derive(Debug, Clone, Default)]
pub struct TagSequence {
    last_issued: u64,
}

impl TagSequence {
    /// Creates a sequence with nothing issued yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next tag, superseding every earlier one.
    pub fn issue(&mut self) -> RequestTag {
        self.last_issued += 1;
        RequestTag(self.last_issued)
    }

    /// Returns whether `tag` is the most recently issued tag.
    pub fn is_current(&self, tag: RequestTag) -> bool {
        tag.0 == self.last_issued
    }

    /// Supersedes every outstanding tag without issuing a new request.
    pub fn invalidate(&mut self) {
        self.last_issued += 1;
    }
}

/// What happened when a response came back.
#[derive(Debug)]
pub enum Settled {
    /// The response was current and has been applied.
    Applied,
    /// The response was superseded and dropped.
    Stale,
    /// The response was current but carried an error; state was left as is.
    Failed(ApiError),
}

impl Settled {
    /// Returns whether state changed.
    pub fn is_applied(&self) -> bool {
        matches!(self, Settled::Applied)
    }

    /// Returns whether the response was dropped as stale.
    pub fn is_stale(&self) -> bool {
        matches!(self, Settled::Stale)
    }
}
