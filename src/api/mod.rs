//! Backend API surface.
//!
//! [`DashboardApi`] is the seam between the dashboard core and the remote
//! service. [`HttpDashboardApi`] talks JSON over HTTP; tests substitute a
//! mock or a gated fake.

mod http;
pub mod wire;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ConnectionState, DraftId, DraftResult, InboxFilter, InboxStats, Message, MessageId, Provider,
    ShopMetrics,
};
use crate::error::ApiError;

pub use http::HttpDashboardApi;

/// Parameters for an inbox page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxQuery {
    pub filter: InboxFilter,
    pub limit: u32,
    pub offset: u32,
}

impl InboxQuery {
    /// First page for a filter.
    pub fn first_page(filter: InboxFilter, limit: u32) -> Self {
        Self {
            filter,
            limit,
            offset: 0,
        }
    }
}

/// One page of inbox messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxPage {
    pub messages: Vec<Message>,
    /// Matches before pagination.
    pub total: u64,
}

/// Answer to a connect request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectResponse {
    /// OAuth authorization URL to navigate to.
    pub auth_url: Option<String>,
    /// Sentinel handed out by backends running without real OAuth.
    pub mock_auth_url: Option<String>,
}

/// A draft as returned by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDraft {
    pub draft_id: Option<DraftId>,
    pub message_id: MessageId,
    pub result: DraftResult,
}

/// What the seller did with an approved draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    Copy,
}

impl ApprovalAction {
    /// Value of the `action` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            ApprovalAction::Copy => "copy",
        }
    }
}

/// Result of a manual mailbox sync.
#[derive(Debug, Clone, PartialEq)]
pub struct MailSyncSummary {
    pub messages_fetched: u64,
    pub new_messages: u64,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Remote operations the dashboard depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Current connection state of a provider.
    async fn connection_status(&self, provider: Provider) -> Result<ConnectionState, ApiError>;

    /// Starts the connect flow for a provider.
    async fn connect(&self, provider: Provider) -> Result<ConnectResponse, ApiError>;

    /// Drops the provider's session on the backend.
    async fn disconnect(&self, provider: Provider) -> Result<(), ApiError>;

    /// Shop-level KPIs.
    async fn shop_metrics(&self, shop_id: &str) -> Result<ShopMetrics, ApiError>;

    /// One page of inbox messages.
    async fn inbox_messages(&self, query: InboxQuery) -> Result<InboxPage, ApiError>;

    /// Aggregate inbox statistics.
    async fn inbox_stats(&self) -> Result<InboxStats, ApiError>;

    /// Generates a reply draft for a message.
    async fn generate_draft(&self, message_id: &MessageId) -> Result<GeneratedDraft, ApiError>;

    /// Records that a draft was used.
    async fn approve_draft(
        &self,
        message_id: &MessageId,
        draft_id: &DraftId,
        action: ApprovalAction,
    ) -> Result<(), ApiError>;

    /// Records that a draft was thrown away.
    async fn reject_draft(
        &self,
        message_id: &MessageId,
        draft_id: &DraftId,
        feedback: Option<String>,
    ) -> Result<(), ApiError>;

    /// Pulls new mail into the backend.
    async fn sync_mail(&self) -> Result<MailSyncSummary, ApiError>;

    /// Returns whether the backend reports itself healthy.
    async fn health(&self) -> Result<bool, ApiError>;
}
