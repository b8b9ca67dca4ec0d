//! Top-N rankings and their bar-chart series

use persistence::schema::{
    COL_CATEGORY, COL_FEES_24H, COL_FEES_30D, COL_FEES_7D, COL_FEES_TOTAL, COL_PROTOCOL,
    COL_REVENUE_24H, COL_REVENUE_30D, COL_REVENUE_7D, COL_REVENUE_TOTAL, COL_TVL,
};
use serde::Serialize;

use crate::types::{metric_value, FeesRow, RevenueRow, SchemaCapabilities, TvlRow};

/// The column a ranking orders by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankingMetric {
    Tvl,
    Revenue24h,
    Fees24h,
}

impl RankingMetric {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Tvl => COL_TVL,
            Self::Revenue24h => COL_REVENUE_24H,
            Self::Fees24h => COL_FEES_24H,
        }
    }

    pub fn chart_title(&self) -> &'static str {
        match self {
            Self::Tvl => "Top Protocols by TVL",
            Self::Revenue24h => "24h Revenue",
            Self::Fees24h => "24h Fees",
        }
    }

    /// Fixed bar colour; TVL bars are coloured by category instead
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Self::Tvl => None,
            Self::Revenue24h => Some("#11998e"),
            Self::Fees24h => Some("#f5576c"),
        }
    }

    /// Columns of the ranked table as displayed; Category only when the source has it
    pub fn display_columns(&self, capabilities: &SchemaCapabilities) -> Vec<&'static str> {
        match self {
            Self::Tvl if capabilities.has_category => vec![COL_PROTOCOL, COL_CATEGORY, COL_TVL],
            Self::Tvl => vec![COL_PROTOCOL, COL_TVL],
            Self::Revenue24h => vec![
                COL_PROTOCOL,
                COL_REVENUE_24H,
                COL_REVENUE_7D,
                COL_REVENUE_30D,
                COL_REVENUE_TOTAL,
            ],
            Self::Fees24h => vec![
                COL_PROTOCOL,
                COL_FEES_24H,
                COL_FEES_7D,
                COL_FEES_30D,
                COL_FEES_TOTAL,
            ],
        }
    }
}

/// A row that can be ranked and plotted
pub trait Rankable {
    const METRIC: RankingMetric;

    fn protocol(&self) -> &str;
    fn rank_value(&self) -> f64;
    /// Colour group on the bar chart
    fn group(&self) -> Option<&str> {
        None
    }
}

impl Rankable for TvlRow {
    const METRIC: RankingMetric = RankingMetric::Tvl;

    fn protocol(&self) -> &str {
        &self.protocol
    }

    fn rank_value(&self) -> f64 {
        metric_value(self.tvl_usd)
    }

    fn group(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl Rankable for RevenueRow {
    const METRIC: RankingMetric = RankingMetric::Revenue24h;

    fn protocol(&self) -> &str {
        &self.protocol
    }

    fn rank_value(&self) -> f64 {
        metric_value(self.revenue_24h_usd)
    }
}

impl Rankable for FeesRow {
    const METRIC: RankingMetric = RankingMetric::Fees24h;

    fn protocol(&self) -> &str {
        &self.protocol
    }

    fn rank_value(&self) -> f64 {
        metric_value(self.fees_24h_usd)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub protocol: String,
    pub value: f64,
    pub group: Option<String>,
}

/// Descending bar chart: x = Protocol, y = ranking column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub color: Option<&'static str>,
    pub points: Vec<BarPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTable<R> {
    pub metric: RankingMetric,
    pub columns: Vec<&'static str>,
    pub rows: Vec<R>,
    pub series: BarSeries,
}

/// The `n` largest rows by their ranking column, descending; equal values keep
/// source order
pub fn top_n<R: Rankable + Clone>(rows: &[R], n: usize) -> Vec<R> {
    let mut ranked: Vec<&R> = rows.iter().collect();
    // sort_by is stable, so ties stay in source order
    ranked.sort_by(|a, b| b.rank_value().total_cmp(&a.rank_value()));
    ranked.into_iter().take(n).cloned().collect()
}

/// Rank a filtered table; `None` when there is nothing to show
pub fn rank_table<R: Rankable + Clone>(
    rows: &[R],
    n: usize,
    capabilities: &SchemaCapabilities,
) -> Option<RankedTable<R>> {
    if rows.is_empty() {
        return None;
    }

    let metric = R::METRIC;
    let top = top_n(rows, n);
    let points = top
        .iter()
        .map(|r| BarPoint {
            protocol: r.protocol().to_string(),
            value: r.rank_value(),
            group: r.group().map(String::from),
        })
        .collect();

    Some(RankedTable {
        metric,
        columns: metric.display_columns(capabilities),
        rows: top,
        series: BarSeries {
            title: metric.chart_title(),
            x_label: COL_PROTOCOL,
            y_label: metric.column(),
            color: metric.color(),
            points,
        },
    })
}
