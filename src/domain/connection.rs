//! Provider connection state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External account the dashboard can be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// The storefront (shop analytics, orders).
    Storefront,
    /// The seller's mailbox.
    Mail,
}

impl Provider {
    /// Returns both providers in display order.
    pub fn all() -> &'static [Provider] {
        &[Provider::Storefront, Provider::Mail]
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Storefront => "Etsy",
            Provider::Mail => "Gmail",
        }
    }

    /// Returns the key used for this provider in inbox source counts.
    pub fn source_key(&self) -> &'static str {
        match self {
            Provider::Storefront => "etsy",
            Provider::Mail => "gmail",
        }
    }

    /// Looks a provider up by its source key.
    pub fn from_source_key(key: &str) -> Option<Provider> {
        match key {
            "etsy" => Some(Provider::Storefront),
            "gmail" => Some(Provider::Mail),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Coarse connection status derived from a [`ConnectionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not connected and nothing pending.
    Disconnected,
    /// Backend runs in demo mode; data is available but not live.
    Pending,
    /// Connected to the real provider.
    Connected,
    /// Connected locally after the backend handed out a mock redirect.
    DemoConnected,
}

impl ConnectionStatus {
    /// Returns the badge label shown in the header.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Not Connected",
            ConnectionStatus::Pending | ConnectionStatus::DemoConnected => "Demo Mode",
            ConnectionStatus::Connected => "Live Data",
        }
    }
}

/// Snapshot of one provider's connection.
///
/// Replaced wholesale on every status refresh; never merged field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub provider: Provider,
    pub connected: bool,
    pub pending: bool,
    /// Shop id for the storefront, email address for the mailbox.
    pub identity: Option<String>,
    pub last_sync: Option<DateTime<Utc>>,
    /// Set when this state was synthesized locally instead of reported by
    /// the backend.
    #[serde(default)]
    pub simulated: bool,
}

impl ConnectionState {
    /// Creates a disconnected state for a provider.
    pub fn disconnected(provider: Provider) -> Self {
        Self {
            provider,
            connected: false,
            pending: false,
            identity: None,
            last_sync: None,
            simulated: false,
        }
    }

    /// Creates the locally-synthesized state installed by the demo shortcut.
    pub fn demo_connected(provider: Provider, now: DateTime<Utc>) -> Self {
        let identity = match provider {
            Provider::Storefront => "demo_shop",
            Provider::Mail => "demo@localhost",
        };
        Self {
            provider,
            connected: true,
            pending: false,
            identity: Some(identity.to_string()),
            last_sync: Some(now),
            simulated: true,
        }
    }

    /// Returns whether data may be requested for this provider in demo or
    /// live mode.
    pub fn is_connected_or_pending(&self) -> bool {
        self.connected || self.pending
    }

    /// Derives the coarse status.
    pub fn status(&self) -> ConnectionStatus {
        match (self.connected, self.pending, self.simulated) {
            (true, _, true) => ConnectionStatus::DemoConnected,
            (true, _, false) => ConnectionStatus::Connected,
            (false, true, _) => ConnectionStatus::Pending,
            (false, false, _) => ConnectionStatus::Disconnected,
        }
    }
}
