//! Stores and workflows behind the dashboard.
//!
//! Each store owns one slice of dashboard state and splits every backend
//! interaction into a synchronous `begin` step, which issues a request tag,
//! and an `apply` step, which lands the response only if its tag is still
//! current. The orchestrator awaits the backend in between without holding
//! any lock.

pub mod clipboard;
pub mod connection_service;
pub mod draft_service;
pub mod inbox_service;
pub mod metrics_service;
pub mod request_tag;
pub mod selection;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use connection_service::{classify_connect, ConnectOutcome, ConnectionStore, RefreshOutcome};
pub use draft_service::{DraftStart, DraftState, DraftWorkflow};
pub use inbox_service::{InboxStore, InboxTicket};
pub use metrics_service::{shop_id_for, MetricsStore};
pub use request_tag::{RequestTag, Settled, TagSequence};
pub use selection::{wants_inbox_load, Selection};
