//! Headline figures over the filtered tables

use serde::Serialize;

use crate::filter::FilteredTables;
use crate::format::format_currency;
use crate::types::{metric_value, SchemaCapabilities};

/// Aggregates over the current filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub protocol_count: usize,
    pub total_tvl_usd: f64,
    pub total_market_cap_usd: f64,
}

/// A labelled KPI value ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    /// Style hook for the renderer
    pub accent: &'static str,
}

pub fn compute_kpis(filtered: &FilteredTables, capabilities: &SchemaCapabilities) -> Kpis {
    let total_tvl_usd: f64 = filtered.tvl.iter().map(|r| metric_value(r.tvl_usd)).sum();

    let total_market_cap_usd: f64 = if capabilities.has_market_cap {
        filtered
            .market
            .iter()
            .map(|r| metric_value(r.market_cap_usd))
            .sum()
    } else {
        0.0
    };

    Kpis {
        protocol_count: filtered.tvl.len(),
        total_tvl_usd,
        total_market_cap_usd,
    }
}

impl Kpis {
    pub fn cards(&self) -> Vec<MetricCard> {
        vec![
            MetricCard {
                title: "Total Protocols",
                value: self.protocol_count.to_string(),
                accent: "orange1",
            },
            MetricCard {
                title: "Total TVL",
                value: format_currency(Some(self.total_tvl_usd)),
                accent: "orange2",
            },
            MetricCard {
                title: "Total Market Cap",
                value: format_currency(Some(self.total_market_cap_usd)),
                accent: "orange3",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarketRow, TvlRow};

    fn tvl(protocol: &str, value: Option<f64>) -> TvlRow {
        TvlRow {
            protocol: protocol.into(),
            category: None,
            tvl_usd: value,
        }
    }

    fn market(protocol: &str, cap: Option<f64>) -> MarketRow {
        MarketRow {
            protocol: protocol.into(),
            market_cap_usd: cap,
            current_price_usd: None,
        }
    }

    #[test]
    fn test_sums_treat_null_as_zero() {
        let filtered = FilteredTables {
            tvl: vec![
                tvl("Nest", Some(1_500.0)),
                tvl("Rooster", None),
                tvl("Mystic", Some(f64::NAN)),
                tvl("Ambient", Some(500.0)),
            ],
            market: vec![market("Nest", Some(2_000_000.0)), market("Ambient", None)],
            ..Default::default()
        };

        let kpis = compute_kpis(&filtered, &SchemaCapabilities::default());

        assert_eq!(kpis.protocol_count, 4);
        assert_eq!(kpis.total_tvl_usd, 2_000.0);
        assert_eq!(kpis.total_market_cap_usd, 2_000_000.0);
    }

    #[test]
    fn test_empty_filter_is_all_zero() {
        let kpis = compute_kpis(&FilteredTables::default(), &SchemaCapabilities::default());

        assert_eq!(
            kpis,
            Kpis {
                protocol_count: 0,
                total_tvl_usd: 0.0,
                total_market_cap_usd: 0.0,
            }
        );
        let values: Vec<_> = kpis.cards().into_iter().map(|c| c.value).collect();
        assert_eq!(values, vec!["0", "$0", "$0"]);
    }

    #[test]
    fn test_market_cap_zero_without_column() {
        let filtered = FilteredTables {
            tvl: vec![tvl("Nest", Some(1.0))],
            market: vec![market("Nest", None)],
            ..Default::default()
        };
        let capabilities = SchemaCapabilities {
            has_market_cap: false,
            ..Default::default()
        };

        assert_eq!(compute_kpis(&filtered, &capabilities).total_market_cap_usd, 0.0);
    }

    #[test]
    fn test_cards_labels_and_formatting() {
        let kpis = Kpis {
            protocol_count: 12,
            total_tvl_usd: 2_500_000_000.0,
            total_market_cap_usd: 45_000.0,
        };
        let cards = kpis.cards();

        assert_eq!(cards[0].title, "Total Protocols");
        assert_eq!(cards[0].value, "12");
        assert_eq!(cards[1].title, "Total TVL");
        assert_eq!(cards[1].value, "$2.50B");
        assert_eq!(cards[2].title, "Total Market Cap");
        assert_eq!(cards[2].value, "$45.00K");
    }
}
