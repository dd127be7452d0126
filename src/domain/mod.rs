//! Domain types shared by the services, the orchestrator and the views.
//!
//! Everything in here is plain data: no I/O, no async. Values coming off the
//! wire are converted into these types in [`crate::api::wire`].

mod connection;
mod draft;
mod inbox;
mod metrics;
mod tab;

pub use connection::{ConnectionState, ConnectionStatus, Provider};
pub use draft::{DraftId, DraftResult};
pub use inbox::{InboxFilter, InboxStats, Message, MessageId, ReplyPriority, ThreadId};
pub use metrics::{KpiDeltas, ShopMetrics};
pub use tab::Tab;
