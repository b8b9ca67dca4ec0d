//! Protocol / category selection and the consistent four-table filter

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::types::*;

/// The choices offered to the user, with their defaults
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOptions {
    /// Unique protocol names of the TVL table, sorted
    pub protocols: Vec<String>,
    /// Unique non-null categories, sorted (empty without a Category column)
    pub categories: Vec<String>,
    pub default_protocols: Vec<String>,
    pub default_categories: Vec<String>,
}

impl SelectionOptions {
    pub fn from_tables(tables: &ProtocolTables, config: &EngineConfig) -> Self {
        let protocols: Vec<String> = tables
            .tvl
            .iter()
            .map(|r| r.protocol.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let categories: Vec<String> = if tables.capabilities.has_category {
            tables
                .tvl
                .iter()
                .filter_map(|r| r.category.clone())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        } else {
            Vec::new()
        };

        let default_protocols = protocols
            .iter()
            .take(config.default_protocol_count)
            .cloned()
            .collect();
        let default_categories = categories.clone();

        Self {
            protocols,
            categories,
            default_protocols,
            default_categories,
        }
    }
}

/// What the user picked. `None` falls back to the default for that axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub protocols: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}

impl Selection {
    pub fn resolve(&self, options: &SelectionOptions) -> ResolvedSelection {
        let protocols = self
            .protocols
            .clone()
            .unwrap_or_else(|| options.default_protocols.clone());
        let categories = self
            .categories
            .clone()
            .unwrap_or_else(|| options.default_categories.clone());

        ResolvedSelection {
            protocols: protocols.into_iter().collect(),
            categories: categories.into_iter().collect(),
        }
    }
}

/// A selection after defaulting
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedSelection {
    pub protocols: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

/// Row subsets of the four source tables, in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredTables {
    pub tvl: Vec<TvlRow>,
    pub revenue: Vec<RevenueRow>,
    pub fees: Vec<FeesRow>,
    pub market: Vec<MarketRow>,
}

/// Filter TVL by protocol then category, and the other three tables by the
/// protocols that survived.
///
/// An empty category set means no category filtering, and so does a TVL
/// table without a Category column.
pub fn filter_tables(tables: &ProtocolTables, selection: &ResolvedSelection) -> FilteredTables {
    let filter_by_category =
        tables.capabilities.has_category && !selection.categories.is_empty();

    let tvl: Vec<TvlRow> = tables
        .tvl
        .iter()
        .filter(|r| selection.protocols.contains(&r.protocol))
        .filter(|r| {
            !filter_by_category
                || r.category
                    .as_ref()
                    .is_some_and(|c| selection.categories.contains(c))
        })
        .cloned()
        .collect();

    let keys: HashSet<&str> = tvl.iter().map(|r| r.protocol.as_str()).collect();

    let revenue = retain_keys(&tables.revenue, &keys, |r| &r.protocol);
    let fees = retain_keys(&tables.fees, &keys, |r| &r.protocol);
    let market = retain_keys(&tables.market, &keys, |r| &r.protocol);

    debug!(
        protocols = selection.protocols.len(),
        categories = selection.categories.len(),
        tvl = tvl.len(),
        revenue = revenue.len(),
        fees = fees.len(),
        market = market.len(),
        "Filtered protocol tables"
    );

    FilteredTables {
        tvl,
        revenue,
        fees,
        market,
    }
}

fn retain_keys<R: Clone>(rows: &[R], keys: &HashSet<&str>, key: impl Fn(&R) -> &String) -> Vec<R> {
    rows.iter()
        .filter(|r| keys.contains(key(*r).as_str()))
        .cloned()
        .collect()
}
