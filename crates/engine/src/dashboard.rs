//! One full dashboard recomputation: filter → KPIs → overview → rankings
//!
//! A pure function of the loaded tables and the current selection. Nothing is
//! cached between calls; each filter change recomputes everything.

use serde::Serialize;
use tracing::debug;

use crate::filter::{filter_tables, FilteredTables, ResolvedSelection, Selection, SelectionOptions};
use crate::kpi::{compute_kpis, Kpis, MetricCard};
use crate::overview::{build_overview, OverviewTable};
use crate::ranking::{rank_table, RankedTable};
use crate::types::*;

pub const DASHBOARD_TITLE: &str = "Plume DeFi Fees & Revenue Tracker";

/// Attribution shown alongside the figures
pub const DATA_SOURCES: &[&str] = &["DefiLlama API", "CoinGecko API"];

/// Everything the renderer needs for one page
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub capabilities: SchemaCapabilities,
    pub selection: ResolvedSelection,
    pub kpis: Kpis,
    pub cards: Vec<MetricCard>,
    pub overview: OverviewTable,
    pub top_tvl: Option<RankedTable<TvlRow>>,
    pub top_revenue: Option<RankedTable<RevenueRow>>,
    pub top_fees: Option<RankedTable<FeesRow>>,
    /// Market section is hidden when this is empty
    pub filtered: FilteredTables,
}

pub fn build_dashboard(
    tables: &ProtocolTables,
    selection: &Selection,
    config: &EngineConfig,
) -> DashboardView {
    let options = SelectionOptions::from_tables(tables, config);
    let resolved = selection.resolve(&options);

    let filtered = filter_tables(tables, &resolved);
    let kpis = compute_kpis(&filtered, &tables.capabilities);
    let overview = build_overview(&filtered, &tables.capabilities);

    let top_tvl = rank_table(&filtered.tvl, config.top_n, &tables.capabilities);
    let top_revenue = rank_table(&filtered.revenue, config.top_n, &tables.capabilities);
    let top_fees = rank_table(&filtered.fees, config.top_n, &tables.capabilities);

    debug!(
        protocols = kpis.protocol_count,
        total_tvl = kpis.total_tvl_usd,
        total_market_cap = kpis.total_market_cap_usd,
        "Dashboard recomputed"
    );

    DashboardView {
        title: DASHBOARD_TITLE,
        capabilities: tables.capabilities,
        selection: resolved,
        cards: kpis.cards(),
        kpis,
        overview,
        top_tvl,
        top_revenue,
        top_fees,
        filtered,
    }
}
