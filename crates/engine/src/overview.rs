//! Protocol overview: TVL left-joined with market data

use persistence::schema::{COL_CATEGORY, COL_CURRENT_PRICE, COL_MARKET_CAP, COL_PROTOCOL, COL_TVL};
use serde::Serialize;
use std::collections::HashMap;

use crate::filter::FilteredTables;
use crate::format::format_currency;
use crate::types::{MarketRow, SchemaCapabilities};

/// One overview line per filtered TVL row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub protocol: String,
    pub category: Option<String>,
    pub tvl_usd: Option<f64>,
    pub tvl_display: String,
    pub market_cap_usd: Option<f64>,
    pub market_cap_display: Option<String>,
    pub current_price_usd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewTable {
    /// Columns to show, in order; optional ones only when the source has them
    pub columns: Vec<&'static str>,
    pub rows: Vec<OverviewRow>,
}

/// Left-join the filtered TVL rows with the filtered market rows on Protocol.
///
/// Every TVL row appears exactly once. Unmatched market fields stay `None`; when
/// a protocol has several market rows the first one wins.
pub fn build_overview(filtered: &FilteredTables, capabilities: &SchemaCapabilities) -> OverviewTable {
    let mut columns = vec![COL_PROTOCOL];
    if capabilities.has_category {
        columns.push(COL_CATEGORY);
    }
    columns.push(COL_TVL);
    if capabilities.has_market_cap {
        columns.push(COL_MARKET_CAP);
    }
    if capabilities.has_current_price {
        columns.push(COL_CURRENT_PRICE);
    }

    let mut market_by_protocol: HashMap<&str, &MarketRow> = HashMap::new();
    for row in &filtered.market {
        market_by_protocol.entry(row.protocol.as_str()).or_insert(row);
    }

    let rows = filtered
        .tvl
        .iter()
        .map(|tvl| {
            let market = market_by_protocol.get(tvl.protocol.as_str());
            let market_cap_usd = market.and_then(|m| m.market_cap_usd);
            OverviewRow {
                protocol: tvl.protocol.clone(),
                category: tvl.category.clone(),
                tvl_usd: tvl.tvl_usd,
                tvl_display: format_currency(tvl.tvl_usd),
                market_cap_usd,
                // no market row: nothing to display, unlike a real zero cap
                market_cap_display: market
                    .filter(|_| capabilities.has_market_cap)
                    .map(|_| format_currency(market_cap_usd)),
                current_price_usd: market.and_then(|m| m.current_price_usd),
            }
        })
        .collect();

    OverviewTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TvlRow;

    fn tvl(protocol: &str, category: &str, value: f64) -> TvlRow {
        TvlRow {
            protocol: protocol.into(),
            category: Some(category.into()),
            tvl_usd: Some(value),
        }
    }

    fn market(protocol: &str, cap: f64, price: f64) -> MarketRow {
        MarketRow {
            protocol: protocol.into(),
            market_cap_usd: Some(cap),
            current_price_usd: Some(price),
        }
    }

    #[test]
    fn test_every_tvl_row_appears_once() {
        let filtered = FilteredTables {
            tvl: vec![
                tvl("Nest", "RWA", 1_200_000.0),
                tvl("Rooster", "Dexs", 800.0),
                tvl("Mystic", "Lending", 0.0),
            ],
            market: vec![
                market("Rooster", 3_000_000.0, 0.25),
                market("Rooster", 9.0, 9.0),
            ],
            ..Default::default()
        };

        let overview = build_overview(&filtered, &SchemaCapabilities::default());

        let names: Vec<_> = overview.rows.iter().map(|r| r.protocol.as_str()).collect();
        assert_eq!(names, vec!["Nest", "Rooster", "Mystic"]);

        let nest = &overview.rows[0];
        assert_eq!(nest.tvl_display, "$1.20M");
        assert_eq!(nest.market_cap_usd, None);
        assert_eq!(nest.market_cap_display, None);
        assert_eq!(nest.current_price_usd, None);

        let rooster = &overview.rows[1];
        assert_eq!(rooster.market_cap_usd, Some(3_000_000.0));
        assert_eq!(rooster.market_cap_display.as_deref(), Some("$3.00M"));
        assert_eq!(rooster.current_price_usd, Some(0.25));

        assert_eq!(overview.rows[2].tvl_display, "$0");
    }

    #[test]
    fn test_columns_follow_capabilities() {
        let full = build_overview(&FilteredTables::default(), &SchemaCapabilities::default());
        assert_eq!(
            full.columns,
            vec![
                "Protocol",
                "Category",
                "TVL (USD)",
                "Market Cap (USD)",
                "Current Price (USD)"
            ]
        );
        assert!(full.rows.is_empty());

        let capabilities = SchemaCapabilities {
            has_category: false,
            has_market_cap: false,
            has_current_price: true,
        };
        let reduced = build_overview(&FilteredTables::default(), &capabilities);
        assert_eq!(
            reduced.columns,
            vec!["Protocol", "TVL (USD)", "Current Price (USD)"]
        );
    }

    #[test]
    fn test_market_cap_display_absent_without_column() {
        let filtered = FilteredTables {
            tvl: vec![tvl("Nest", "RWA", 10.0)],
            ..Default::default()
        };
        let capabilities = SchemaCapabilities {
            has_market_cap: false,
            ..Default::default()
        };

        let overview = build_overview(&filtered, &capabilities);
        assert_eq!(overview.rows[0].market_cap_display, None);
    }

    #[test]
    fn test_matched_row_without_cap_displays_zero() {
        let filtered = FilteredTables {
            tvl: vec![tvl("Nest", "RWA", 10.0), tvl("Rooster", "Dexs", 20.0)],
            market: vec![MarketRow {
                protocol: "Nest".into(),
                market_cap_usd: None,
                current_price_usd: Some(1.0),
            }],
            ..Default::default()
        };

        let overview = build_overview(&filtered, &SchemaCapabilities::default());
        assert_eq!(overview.rows[0].market_cap_display.as_deref(), Some("$0"));
        assert_eq!(overview.rows[1].market_cap_display, None);
    }
}
