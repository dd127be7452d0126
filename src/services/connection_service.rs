//! Provider connection states.
//!
//! Holds the storefront and mail [`ConnectionState`] pair. A refresh queries
//! both providers and applies whatever came back in a single write, so
//! readers never see one provider updated and the other not yet. A provider
//! whose query failed keeps its previous state.

use tracing::{debug, info, warn};
use url::Url;

use super::request_tag::{RequestTag, TagSequence};
use crate::api::ConnectResponse;
use crate::domain::{ConnectionState, Provider};
use crate::error::ApiError;

/// URL scheme the backend uses for its demo-mode connect sentinel.
const MOCK_SCHEME: &str = "mock";

/// Where a connect request leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Navigate the user to the provider's authorization page.
    Redirect(Url),
    /// Backend has no real OAuth; connect locally in demo mode.
    Demo,
}

/// Interprets a connect response.
pub fn classify_connect(response: ConnectResponse) -> Result<ConnectOutcome, ApiError> {
    if response.mock_auth_url.is_some() {
        return Ok(ConnectOutcome::Demo);
    }

    let raw = response.auth_url.ok_or_else(|| ApiError::InvalidField {
        field: "auth_url",
        reason: "missing".to_string(),
    })?;
    let url = Url::parse(&raw).map_err(|e| ApiError::InvalidField {
        field: "auth_url",
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(ConnectOutcome::Redirect(url)),
        MOCK_SCHEME => Ok(ConnectOutcome::Demo),
        other => Err(ApiError::InvalidField {
            field: "auth_url",
            reason: format!("unusable scheme `{}`", other),
        }),
    }
}

/// Result of applying a status refresh.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    /// False when the refresh was superseded and nothing was applied.
    pub applied: bool,
    /// Providers whose state was replaced.
    pub updated: Vec<Provider>,
    /// Providers whose query failed, with the error.
    pub errors: Vec<(Provider, ApiError)>,
}

/// Owner of the two provider connection states.
#[derive(Debug, Clone)]
pub struct ConnectionStore {
    storefront: ConnectionState,
    mail: ConnectionState,
    refreshes: TagSequence,
}

impl ConnectionStore {
    /// Creates a store with both providers disconnected.
    pub fn new() -> Self {
        Self {
            storefront: ConnectionState::disconnected(Provider::Storefront),
            mail: ConnectionState::disconnected(Provider::Mail),
            refreshes: TagSequence::new(),
        }
    }

    /// Storefront state.
    pub fn storefront(&self) -> &ConnectionState {
        &self.storefront
    }

    /// Mail state.
    pub fn mail(&self) -> &ConnectionState {
        &self.mail
    }

    /// Starts a refresh of both providers.
    pub fn begin_refresh(&mut self) -> RequestTag {
        let tag = self.refreshes.issue();
        debug!(tag = tag.get(), "Refreshing connection status");
        tag
    }

    /// Applies the results of a refresh. Successful providers are replaced
    /// wholesale, failed ones keep their previous state.
    pub fn apply_refresh(
        &mut self,
        tag: RequestTag,
        storefront: Result<ConnectionState, ApiError>,
        mail: Result<ConnectionState, ApiError>,
    ) -> RefreshOutcome {
        if !self.refreshes.is_current(tag) {
            debug!(tag = tag.get(), "Dropping superseded connection refresh");
            return RefreshOutcome::default();
        }

        let mut outcome = RefreshOutcome {
            applied: true,
            ..Default::default()
        };
        for (provider, result) in [(Provider::Storefront, storefront), (Provider::Mail, mail)] {
            match result {
                Ok(state) => {
                    self.replace(provider, state);
                    outcome.updated.push(provider);
                }
                Err(e) => {
                    warn!(%provider, error = %e, "Connection status query failed");
                    outcome.errors.push((provider, e));
                }
            }
        }
        outcome
    }

    /// Installs a state for its provider, superseding in-flight refreshes.
    pub fn install(&mut self, state: ConnectionState) {
        self.refreshes.invalidate();
        info!(provider = %state.provider, status = ?state.status(), "Connection state installed");
        let provider = state.provider;
        self.replace(provider, state);
    }

    /// Resets a provider to disconnected.
    pub fn reset(&mut self, provider: Provider) {
        self.install(ConnectionState::disconnected(provider));
    }

    fn replace(&mut self, provider: Provider, mut state: ConnectionState) {
        if state.provider != provider {
            warn!(
                expected = %provider,
                got = %state.provider,
                "Status reported for wrong provider"
            );
            state.provider = provider;
        }
        if state.connected && state.pending && !state.simulated {
            debug!(%provider, "Backend reported connected and pending at once");
        }
        match provider {
            Provider::Storefront => self.storefront = state,
            Provider::Mail => self.mail = state,
        }
    }
}

impl Default for ConnectionStore {
    fn default() -> Self {
        Self::new()
    }
}
