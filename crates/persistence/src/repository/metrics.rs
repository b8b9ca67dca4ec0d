//! Protocol metrics repository — read-only access to the four source tables
//!
//! Source tables are written by external exporters, so any optional column
//! may be missing. Every canonical column is still projected (as NULL when
//! absent) and the caller gets the list of columns actually present, which is
//! what the engine's one-time capability check runs on.

use crate::schema::{self, quote_ident};
use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

/// A row of `df_protocols_tvl`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TvlRecord {
    pub protocol: Option<String>,
    pub category: Option<String>,
    pub tvl_usd: Option<f64>,
}

/// A row of `df_protocols_revenue`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RevenueRecord {
    pub protocol: Option<String>,
    pub revenue_24h_usd: Option<f64>,
    pub revenue_7d_usd: Option<f64>,
    pub revenue_30d_usd: Option<f64>,
    pub revenue_total_usd: Option<f64>,
}

/// A row of `df_protocols_fees`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeesRecord {
    pub protocol: Option<String>,
    pub fees_24h_usd: Option<f64>,
    pub fees_7d_usd: Option<f64>,
    pub fees_30d_usd: Option<f64>,
    pub fees_total_usd: Option<f64>,
}

/// A row of `df_protocols_market_data`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketRecord {
    pub protocol: Option<String>,
    pub market_cap_usd: Option<f64>,
    pub current_price_usd: Option<f64>,
}

/// Rows of one source table plus the columns the stored table actually has
#[derive(Debug, Clone)]
pub struct TableSnapshot<R> {
    pub table: &'static str,
    pub columns: Vec<String>,
    pub rows: Vec<R>,
}

impl<R> TableSnapshot<R> {
    pub fn empty(table: &'static str) -> Self {
        Self {
            table,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

#[derive(Debug, Clone, Copy)]
enum SqlKind {
    Text,
    Real,
}

/// One projected column: stored header → record field
struct Projection {
    column: &'static str,
    alias: &'static str,
    kind: SqlKind,
}

const fn text(column: &'static str, alias: &'static str) -> Projection {
    Projection {
        column,
        alias,
        kind: SqlKind::Text,
    }
}

const fn real(column: &'static str, alias: &'static str) -> Projection {
    Projection {
        column,
        alias,
        kind: SqlKind::Real,
    }
}

const TVL_COLUMNS: &[Projection] = &[
    text(schema::COL_PROTOCOL, "protocol"),
    text(schema::COL_CATEGORY, "category"),
    real(schema::COL_TVL, "tvl_usd"),
];

const REVENUE_COLUMNS: &[Projection] = &[
    text(schema::COL_PROTOCOL, "protocol"),
    real(schema::COL_REVENUE_24H, "revenue_24h_usd"),
    real(schema::COL_REVENUE_7D, "revenue_7d_usd"),
    real(schema::COL_REVENUE_30D, "revenue_30d_usd"),
    real(schema::COL_REVENUE_TOTAL, "revenue_total_usd"),
];

const FEES_COLUMNS: &[Projection] = &[
    text(schema::COL_PROTOCOL, "protocol"),
    real(schema::COL_FEES_24H, "fees_24h_usd"),
    real(schema::COL_FEES_7D, "fees_7d_usd"),
    real(schema::COL_FEES_30D, "fees_30d_usd"),
    real(schema::COL_FEES_TOTAL, "fees_total_usd"),
];

const MARKET_COLUMNS: &[Projection] = &[
    text(schema::COL_PROTOCOL, "protocol"),
    real(schema::COL_MARKET_CAP, "market_cap_usd"),
    real(schema::COL_CURRENT_PRICE, "current_price_usd"),
];

/// Build the SELECT list, substituting NULL for columns the table lacks
fn build_projection(present: &[String], wanted: &[Projection]) -> String {
    wanted
        .iter()
        .map(|p| {
            if present.iter().any(|c| c == p.column) {
                let sql_type = match p.kind {
                    SqlKind::Text => "TEXT",
                    SqlKind::Real => "REAL",
                };
                format!("CAST({} AS {}) AS {}", quote_ident(p.column), sql_type, p.alias)
            } else {
                format!("NULL AS {}", p.alias)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository for the protocol metric source tables
pub struct MetricsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MetricsRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Column names of a table in declaration order (empty if the table is missing)
    pub async fn table_columns(&self, table: &str) -> DbResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM pragma_table_info(?) ORDER BY cid")
                .bind(table)
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    pub async fn fetch_tvl(&self) -> DbResult<TableSnapshot<TvlRecord>> {
        self.fetch_snapshot(schema::TVL_TABLE, TVL_COLUMNS).await
    }

    pub async fn fetch_revenue(&self) -> DbResult<TableSnapshot<RevenueRecord>> {
        self.fetch_snapshot(schema::REVENUE_TABLE, REVENUE_COLUMNS).await
    }

    pub async fn fetch_fees(&self) -> DbResult<TableSnapshot<FeesRecord>> {
        self.fetch_snapshot(schema::FEES_TABLE, FEES_COLUMNS).await
    }

    pub async fn fetch_market(&self) -> DbResult<TableSnapshot<MarketRecord>> {
        self.fetch_snapshot(schema::MARKET_TABLE, MARKET_COLUMNS).await
    }

    /// Read a whole table in storage order
    async fn fetch_snapshot<R>(
        &self,
        table: &'static str,
        wanted: &[Projection],
    ) -> DbResult<TableSnapshot<R>>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let columns = self.table_columns(table).await?;
        if columns.is_empty() {
            warn!(table, "Source table not found, treating as empty");
            return Ok(TableSnapshot::empty(table));
        }

        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            build_projection(&columns, wanted),
            quote_ident(table)
        );
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(self.pool).await?;

        debug!(table, rows = rows.len(), columns = columns.len(), "Loaded source table");

        Ok(TableSnapshot {
            table,
            columns,
            rows,
        })
    }
}
