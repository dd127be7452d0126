//! Shop metrics.
//!
//! Only fetched while the storefront is connected or pending; the
//! orchestrator enforces that before issuing a request.

use tracing::{debug, warn};

use super::request_tag::{RequestTag, Settled, TagSequence};
use crate::domain::{ConnectionState, ShopMetrics};
use crate::error::ApiError;

/// Picks the shop to request metrics for: the id the storefront reported,
/// else the configured fallback.
pub fn shop_id_for(storefront: &ConnectionState, fallback: &str) -> String {
    storefront
        .identity
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Owner of the latest [`ShopMetrics`].
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    metrics: Option<ShopMetrics>,
    requests: TagSequence,
}

impl MetricsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest metrics, `None` until the first successful fetch.
    pub fn metrics(&self) -> Option<&ShopMetrics> {
        self.metrics.as_ref()
    }

    /// Starts a fetch.
    pub fn begin_fetch(&mut self, shop_id: &str) -> RequestTag {
        let tag = self.requests.issue();
        debug!(tag = tag.get(), shop_id, "Fetching shop metrics");
        tag
    }

    /// Applies a fetch result if it is still the latest request.
    pub fn apply(&mut self, tag: RequestTag, result: Result<ShopMetrics, ApiError>) -> Settled {
        if !self.requests.is_current(tag) {
            debug!(tag = tag.get(), "Dropping superseded metrics response");
            return Settled::Stale;
        }
        match result {
            Ok(metrics) => {
                self.metrics = Some(metrics);
                Settled::Applied
            }
            Err(e) => {
                warn!(error = %e, "Metrics fetch failed");
                Settled::Failed(e)
            }
        }
    }

    /// Drops cached metrics and supersedes in-flight fetches.
    pub fn clear(&mut self) {
        self.requests.invalidate();
        self.metrics = None;
    }
}
