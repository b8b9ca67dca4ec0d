//! Types for the filter-join-rank engine

use serde::{Deserialize, Serialize};

/// A protocol's total value locked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvlRow {
    pub protocol: String,
    pub category: Option<String>,
    pub tvl_usd: Option<f64>,
}

/// Revenue retained by a protocol over each window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRow {
    pub protocol: String,
    pub revenue_24h_usd: Option<f64>,
    pub revenue_7d_usd: Option<f64>,
    pub revenue_30d_usd: Option<f64>,
    pub revenue_total_usd: Option<f64>,
}

/// Fees charged by a protocol over each window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeesRow {
    pub protocol: String,
    pub fees_24h_usd: Option<f64>,
    pub fees_7d_usd: Option<f64>,
    pub fees_30d_usd: Option<f64>,
    pub fees_total_usd: Option<f64>,
}

/// Token market data for a protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub protocol: String,
    pub market_cap_usd: Option<f64>,
    pub current_price_usd: Option<f64>,
}

/// Which optional columns the source tables carry.
///
/// Computed once when the tables are loaded; the engine consults this instead
/// of probing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCapabilities {
    pub has_category: bool,
    pub has_market_cap: bool,
    pub has_current_price: bool,
}

impl Default for SchemaCapabilities {
    fn default() -> Self {
        Self {
            has_category: true,
            has_market_cap: true,
            has_current_price: true,
        }
    }
}

/// The four source tables, validated and immutable for the dashboard's lifetime
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProtocolTables {
    pub tvl: Vec<TvlRow>,
    pub revenue: Vec<RevenueRow>,
    pub fees: Vec<FeesRow>,
    pub market: Vec<MarketRow>,
    pub capabilities: SchemaCapabilities,
}

/// Tunables for one dashboard computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rows kept in each ranking (default: 10)
    pub top_n: usize,
    /// Protocols pre-selected when the caller gives no selection (default: 5)
    pub default_protocol_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            default_protocol_count: 5,
        }
    }
}

/// Missing or NaN metric values count as zero in sums and rankings
pub fn metric_value(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}
