//! Database schema definitions
//!
//! The four source tables are produced outside this workspace (dataframe
//! exports), so their column names are the human-readable headers verbatim
//! and must always be double-quoted in SQL.

pub const TVL_TABLE: &str = "df_protocols_tvl";
pub const REVENUE_TABLE: &str = "df_protocols_revenue";
pub const FEES_TABLE: &str = "df_protocols_fees";
pub const MARKET_TABLE: &str = "df_protocols_market_data";

pub const COL_PROTOCOL: &str = "Protocol";
pub const COL_CATEGORY: &str = "Category";
pub const COL_TVL: &str = "TVL (USD)";

pub const COL_REVENUE_24H: &str = "24h Revenue (USD)";
pub const COL_REVENUE_7D: &str = "7d Revenue (USD)";
pub const COL_REVENUE_30D: &str = "30d Revenue (USD)";
pub const COL_REVENUE_TOTAL: &str = "Total Revenue (USD)";

pub const COL_FEES_24H: &str = "24h Fees (USD)";
pub const COL_FEES_7D: &str = "7d Fees (USD)";
pub const COL_FEES_30D: &str = "30d Fees (USD)";
pub const COL_FEES_TOTAL: &str = "Total Fees (USD)";

pub const COL_MARKET_CAP: &str = "Market Cap (USD)";
pub const COL_CURRENT_PRICE: &str = "Current Price (USD)";

/// SQL to create all tables
/// NOTE: only runs for tables that do not exist yet; an externally written
/// table keeps whatever columns its producer gave it.
pub const CREATE_TABLES: &str = r#"
-- Total value locked per protocol
CREATE TABLE IF NOT EXISTS df_protocols_tvl (
    "Protocol" TEXT NOT NULL,
    "Category" TEXT,
    "TVL (USD)" REAL
);

-- Protocol revenue by window
CREATE TABLE IF NOT EXISTS df_protocols_revenue (
    "Protocol" TEXT NOT NULL,
    "24h Revenue (USD)" REAL,
    "7d Revenue (USD)" REAL,
    "30d Revenue (USD)" REAL,
    "Total Revenue (USD)" REAL
);

-- Protocol fees by window
CREATE TABLE IF NOT EXISTS df_protocols_fees (
    "Protocol" TEXT NOT NULL,
    "24h Fees (USD)" REAL,
    "7d Fees (USD)" REAL,
    "30d Fees (USD)" REAL,
    "Total Fees (USD)" REAL
);

-- Token market data
CREATE TABLE IF NOT EXISTS df_protocols_market_data (
    "Protocol" TEXT NOT NULL,
    "Market Cap (USD)" REAL,
    "Current Price (USD)" REAL
)
"#;

/// Quote a column name for use as a SQLite identifier
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
