//! Persistence layer for the DeFi dashboard
//!
//! Read access to the SQLite file holding the four protocol metric tables
//! (TVL, revenue, fees, market data).

pub mod repository;
pub mod schema;

pub use sqlx::sqlite::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the metrics database at `path`
    pub async fn new(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let url = format!("sqlite:{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;
        db.configure_pragmas().await?;

        Ok(db)
    }

    /// Open an existing metrics database without writing to it.
    ///
    /// Nothing is created: a missing file is an error, and neither migrations
    /// nor the WAL switch run, so read-only files and mounts work.
    pub async fn open_read_only(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DbError::Connection(format!(
                "database file not found: {}",
                path.display()
            )));
        }

        let url = format!("sqlite:{}?mode=ro", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        debug!("Opened {} read-only", path.display());
        Ok(Self { pool })
    }

    /// Create an in-memory database (for testing)
    pub async fn in_memory() -> DbResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;
        db.configure_pragmas().await?;

        Ok(db)
    }

    /// Create any missing source tables (execute each statement individually)
    async fn run_migrations(&self) -> DbResult<()> {
        for statement in schema::CREATE_TABLES.split(';') {
            // Strip comment-only lines, then check if any SQL remains
            let sql: String = statement
                .lines()
                .filter(|line| !line.trim().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n");
            let sql = sql.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::Migration(format!("{e}: {sql}")))?;
        }

        debug!("Source tables ensured");
        Ok(())
    }

    async fn configure_pragmas(&self) -> DbResult<()> {
        // WAL mode: the exporting notebooks may write while the dashboard reads
        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Connection(format!("WAL pragma failed: {e}")))?;

        sqlx::query("PRAGMA synchronous=NORMAL")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Connection(format!("synchronous pragma failed: {e}")))?;

        // 8 MB cache size (negative = KiB)
        sqlx::query("PRAGMA cache_size=-8000")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Connection(format!("cache_size pragma failed: {e}")))?;

        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("defi-dashboard-{}-{}", name, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[tokio::test]
    async fn test_read_only_open_rejects_missing_file() {
        let dir = scratch_dir("missing");
        let path = dir.join("protocols.db");

        let err = Database::open_read_only(&path).await.err().unwrap();
        assert!(matches!(err, DbError::Connection(ref msg) if msg.contains("not found")));
        assert!(!path.exists());
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_read_only_open_reads_existing_file() {
        let dir = scratch_dir("existing");
        let path = dir.join("protocols.db");
        {
            let db = Database::new(&path).await.unwrap();
            sqlx::query(
                r#"INSERT INTO df_protocols_tvl ("Protocol", "Category", "TVL (USD)") VALUES ('Nest', 'RWA', 5.0)"#,
            )
            .execute(db.pool())
            .await
            .unwrap();
            db.pool().close().await;
        }

        let db = Database::open_read_only(&path).await.unwrap();
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM df_protocols_tvl")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 1);

        // writes are refused on a read-only connection
        let write = sqlx::query("DELETE FROM df_protocols_tvl").execute(db.pool()).await;
        assert!(write.is_err());

        db.pool().close().await;
        std::fs::remove_dir_all(&dir).ok();
    }
}
