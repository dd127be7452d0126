//! Aggregate shop metrics.

use serde::{Deserialize, Serialize};

/// Period-over-period change for each KPI, as a percentage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiDeltas {
    pub orders: Option<f64>,
    pub gmv: Option<f64>,
    pub visits: Option<f64>,
    pub views: Option<f64>,
    pub conversion_rate: Option<f64>,
    pub favorites: Option<f64>,
    pub cart_adds: Option<f64>,
    pub refunds: Option<f64>,
}

/// Shop-level KPIs for the selected period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopMetrics {
    pub orders: u64,
    /// Gross merchandise value.
    pub gmv: f64,
    pub visits: u64,
    pub views: u64,
    /// Percentage, 0-100.
    pub conversion_rate: f64,
    pub favorites: u64,
    pub cart_adds: u64,
    pub refunds: u64,
    #[serde(default)]
    pub deltas: KpiDeltas,
}
