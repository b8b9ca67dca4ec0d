//! Load-time validation: stored snapshots → typed, capability-tagged tables

use persistence::repository::metrics::{
    FeesRecord, MarketRecord, MetricsRepository, RevenueRecord, TableSnapshot, TvlRecord,
};
use persistence::schema::{COL_CATEGORY, COL_CURRENT_PRICE, COL_MARKET_CAP, COL_PROTOCOL};
use persistence::Database;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::types::*;

/// Load all four source tables once and validate them
pub async fn load_tables(db: &Database) -> EngineResult<ProtocolTables> {
    let repo = MetricsRepository::new(db.pool());

    let tvl = repo.fetch_tvl().await?;
    let revenue = repo.fetch_revenue().await?;
    let fees = repo.fetch_fees().await?;
    let market = repo.fetch_market().await?;

    let tables = ProtocolTables::from_snapshots(tvl, revenue, fees, market)?;
    info!(
        tvl = tables.tvl.len(),
        revenue = tables.revenue.len(),
        fees = tables.fees.len(),
        market = tables.market.len(),
        has_category = tables.capabilities.has_category,
        has_market_cap = tables.capabilities.has_market_cap,
        "Protocol tables loaded"
    );

    Ok(tables)
}

impl ProtocolTables {
    /// Run the schema capability check and convert records into rows.
    ///
    /// Fails only when the TVL table has no `Protocol` column.
    pub fn from_snapshots(
        tvl: TableSnapshot<TvlRecord>,
        revenue: TableSnapshot<RevenueRecord>,
        fees: TableSnapshot<FeesRecord>,
        market: TableSnapshot<MarketRecord>,
    ) -> EngineResult<Self> {
        if !tvl.has_column(COL_PROTOCOL) {
            return Err(EngineError::MissingKeyColumn {
                table: tvl.table,
                column: COL_PROTOCOL,
            });
        }

        let capabilities = SchemaCapabilities {
            has_category: tvl.has_column(COL_CATEGORY),
            has_market_cap: market.has_column(COL_MARKET_CAP),
            has_current_price: market.has_column(COL_CURRENT_PRICE),
        };

        let tvl_rows = keyed_rows(tvl, |r| {
            let protocol = r.protocol?;
            Some(TvlRow {
                protocol,
                category: r.category.filter(|_| capabilities.has_category),
                tvl_usd: r.tvl_usd,
            })
        });

        let revenue_rows = keyed_rows(revenue, |r| {
            Some(RevenueRow {
                protocol: r.protocol?,
                revenue_24h_usd: r.revenue_24h_usd,
                revenue_7d_usd: r.revenue_7d_usd,
                revenue_30d_usd: r.revenue_30d_usd,
                revenue_total_usd: r.revenue_total_usd,
            })
        });

        let fees_rows = keyed_rows(fees, |r| {
            Some(FeesRow {
                protocol: r.protocol?,
                fees_24h_usd: r.fees_24h_usd,
                fees_7d_usd: r.fees_7d_usd,
                fees_30d_usd: r.fees_30d_usd,
                fees_total_usd: r.fees_total_usd,
            })
        });

        let market_rows = keyed_rows(market, |r| {
            Some(MarketRow {
                protocol: r.protocol?,
                market_cap_usd: r.market_cap_usd.filter(|_| capabilities.has_market_cap),
                current_price_usd: r
                    .current_price_usd
                    .filter(|_| capabilities.has_current_price),
            })
        });

        Ok(Self {
            tvl: tvl_rows,
            revenue: revenue_rows,
            fees: fees_rows,
            market: market_rows,
            capabilities,
        })
    }
}

/// Convert records, dropping the ones that can never match a protocol key.
///
/// A table without a `Protocol` column loads as empty.
fn keyed_rows<R, T>(snapshot: TableSnapshot<R>, convert: impl Fn(R) -> Option<T>) -> Vec<T> {
    let table = snapshot.table;
    if !snapshot.rows.is_empty() && !snapshot.has_column(COL_PROTOCOL) {
        warn!(
            table,
            rows = snapshot.rows.len(),
            "Table has no Protocol column, no rows can be matched"
        );
        return Vec::new();
    }

    let total = snapshot.rows.len();
    let rows: Vec<T> = snapshot.rows.into_iter().filter_map(convert).collect();
    let dropped = total - rows.len();
    if dropped > 0 {
        warn!(table, dropped, "Dropped rows with a null Protocol");
    }
    rows
}
