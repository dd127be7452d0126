//! JSON-over-HTTP implementation of [`DashboardApi`].

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::wire::{
    WireAuthStatus, WireConnect, WireDraft, WireHealth, WireInboxStats, WireMessagesPage,
    WireSync,
};
use super::{
    ApprovalAction, ConnectResponse, DashboardApi, GeneratedDraft, InboxPage, InboxQuery,
    MailSyncSummary,
};
use crate::config::DashboardConfig;
use crate::domain::{ConnectionState, DraftId, InboxStats, MessageId, Provider, ShopMetrics};
use crate::error::ApiError;

/// Dashboard backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: Client,
    base: Url,
}

impl HttpDashboardApi {
    /// Builds a client for the configured backend.
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("shopdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config.api_base_url.clone()))
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    /// Returns the backend base address.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves path segments below the base address, percent-encoding each.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn auth_segment(provider: Provider) -> &'static str {
        match provider {
            Provider::Storefront => "etsy",
            Provider::Mail => "gmail",
        }
    }

    async fn send(&self, method: Method, url: Url) -> Result<Response, ApiError> {
        debug!(%method, %url, "Backend request");
        let response = self.client.request(method, url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T, ApiError> {
        let response = self.send(method, url).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn connection_status(&self, provider: Provider) -> Result<ConnectionState, ApiError> {
        let url = match provider {
            Provider::Storefront => self.endpoint(&["auth", "status"]),
            Provider::Mail => self.endpoint(&["auth", "gmail", "status"]),
        };
        let wire: WireAuthStatus = self.json(Method::GET, url).await?;
        Ok(wire.into_state(provider))
    }

    async fn connect(&self, provider: Provider) -> Result<ConnectResponse, ApiError> {
        let url = self.endpoint(&["auth", Self::auth_segment(provider), "connect"]);
        let wire: WireConnect = self.json(Method::POST, url).await?;
        Ok(wire.into())
    }

    async fn disconnect(&self, provider: Provider) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", Self::auth_segment(provider), "disconnect"]);
        self.send(Method::POST, url).await?;
        Ok(())
    }

    async fn shop_metrics(&self, shop_id: &str) -> Result<ShopMetrics, ApiError> {
        let mut url = self.endpoint(&["metrics", "shop"]);
        url.query_pairs_mut().append_pair("shop_id", shop_id);
        self.json(Method::GET, url).await
    }

    async fn inbox_messages(&self, query: InboxQuery) -> Result<InboxPage, ApiError> {
        let mut url = self.endpoint(&["inbox", "messages"]);
        url.query_pairs_mut()
            .append_pair("filter_type", query.filter.as_query())
            .append_pair("limit", &query.limit.to_string())
            .append_pair("offset", &query.offset.to_string());
        let wire: WireMessagesPage = self.json(Method::GET, url).await?;
        Ok(wire.into())
    }

    async fn inbox_stats(&self) -> Result<InboxStats, ApiError> {
        let wire: WireInboxStats = self
            .json(Method::GET, self.endpoint(&["inbox", "stats"]))
            .await?;
        Ok(wire.into())
    }

    async fn generate_draft(&self, message_id: &MessageId) -> Result<GeneratedDraft, ApiError> {
        let url = self.endpoint(&["inbox", "messages", &message_id.0, "draft"]);
        let wire: WireDraft = self.json(Method::POST, url).await?;
        wire.into_draft(message_id)
    }

    async fn approve_draft(
        &self,
        message_id: &MessageId,
        draft_id: &DraftId,
        action: ApprovalAction,
    ) -> Result<(), ApiError> {
        let mut url = self.endpoint(&[
            "inbox",
            "messages",
            &message_id.0,
            "draft",
            &draft_id.0,
            "approve",
        ]);
        url.query_pairs_mut().append_pair("action", action.as_query());
        self.send(Method::POST, url).await?;
        Ok(())
    }

    async fn reject_draft(
        &self,
        message_id: &MessageId,
        draft_id: &DraftId,
        feedback: Option<String>,
    ) -> Result<(), ApiError> {
        let mut url = self.endpoint(&[
            "inbox",
            "messages",
            &message_id.0,
            "draft",
            &draft_id.0,
            "reject",
        ]);
        if let Some(feedback) = feedback.as_deref() {
            url.query_pairs_mut().append_pair("feedback", feedback);
        }
        self.send(Method::POST, url).await?;
        Ok(())
    }

    async fn sync_mail(&self) -> Result<MailSyncSummary, ApiError> {
        let wire: WireSync = self
            .json(Method::POST, self.endpoint(&["inbox", "gmail", "sync"]))
            .await?;
        Ok(wire.into())
    }

    async fn health(&self) -> Result<bool, ApiError> {
        let wire: WireHealth = self.json(Method::GET, self.endpoint(&["health"])).await?;
        Ok(wire.is_healthy())
    }
}
