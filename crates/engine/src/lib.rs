//! DeFi dashboard engine — filter, join and rank protocol metrics
//!
//! Provides:
//! - Load-time validation of the four source tables (TVL, revenue, fees, market data)
//! - Protocol / category selection with defaults
//! - KPI aggregation, the TVL × market overview join, and top-N rankings
//! - Currency formatting for display

pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod format;
pub mod kpi;
pub mod overview;
pub mod ranking;
pub mod types;

// Re-exports for convenience
pub use dashboard::{build_dashboard, DashboardView, DASHBOARD_TITLE, DATA_SOURCES};
pub use dataset::load_tables;
pub use error::{EngineError, EngineResult};
pub use filter::{filter_tables, FilteredTables, ResolvedSelection, Selection, SelectionOptions};
pub use format::format_currency;
pub use kpi::{compute_kpis, Kpis, MetricCard};
pub use overview::{build_overview, OverviewRow, OverviewTable};
pub use ranking::{rank_table, top_n, BarPoint, BarSeries, RankedTable, Rankable, RankingMetric};
pub use types::*;
