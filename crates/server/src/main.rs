//! DeFi Dashboard — protocol TVL, revenue, fees and market data
//!
//! Usage:
//!   defi-dashboard serve --port 3001                  — Launch web server with UI
//!   defi-dashboard report --protocols Nest,Rooster    — Print the dashboard to the terminal

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use engine::{
    build_dashboard, format_currency, load_tables, DashboardView, EngineConfig, ProtocolTables,
    RankedTable, Rankable, Selection, SelectionOptions, DATA_SOURCES,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

const DEFAULT_DB_PATH: &str = "database/protocols.db";

#[derive(Parser)]
#[command(name = "defi-dashboard")]
#[command(about = "Dashboard for DeFi protocol TVL, revenue, fees and market data", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the dashboard web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3001)]
        port: u16,
    },
    /// Print the dashboard to the terminal (no web server)
    Report {
        /// Protocols to include (comma-separated, default: first 5 alphabetically)
        #[arg(long, value_delimiter = ',')]
        protocols: Option<Vec<String>>,
        /// Categories to include (comma-separated, default: all)
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,
        /// Number of rows in each ranking
        #[arg(long, default_value_t = 10)]
        top_n: usize,
        /// Optional JSON export path
        #[arg(long)]
        export: Option<String>,
    },
}

/// Query string of `/api/dashboard`; an absent key falls back to the default selection
#[derive(Debug, Default, Deserialize)]
struct DashboardParams {
    protocols: Option<String>,
    categories: Option<String>,
}

impl DashboardParams {
    fn selection(&self) -> Selection {
        Selection {
            protocols: self.protocols.as_deref().map(parse_list),
            categories: self.categories.as_deref().map(parse_list),
        }
    }
}

#[derive(Clone)]
struct AppState {
    tables: Arc<ProtocolTables>,
    config: Arc<EngineConfig>,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,engine=debug,persistence=debug,defi_dashboard=debug")
    } else {
        EnvFilter::new("info,engine=info,persistence=info,defi_dashboard=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

fn db_path() -> String {
    std::env::var("DEFI_DASHBOARD_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string())
}

/// Open the existing database read-only and load the four source tables once
async fn open_tables(db_path: &str) -> anyhow::Result<ProtocolTables> {
    let db = persistence::Database::open_read_only(db_path).await.map_err(|e| {
        error!("Failed to open database: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;
    info!("Database opened: {}", db_path);

    let tables = load_tables(&db).await.map_err(|e| {
        error!("Failed to load protocol tables: {}", e);
        anyhow::anyhow!("Loading protocol tables failed: {}", e)
    })?;

    Ok(tables)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&host, port).await?;
        }
        Commands::Report {
            protocols,
            categories,
            top_n,
            export,
        } => {
            let selection = Selection {
                protocols,
                categories,
            };
            cmd_report(selection, top_n, export).await?;
        }
    }

    Ok(())
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    info!("DeFi Dashboard v{} starting...", APP_VERSION);

    let db_path = db_path();
    let tables = open_tables(&db_path).await?;

    let state = AppState {
        tables: Arc::new(tables),
        config: Arc::new(EngineConfig::default()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Determine static files directory
    let exe_path = std::env::current_exe().unwrap_or_default();
    let exe_dir = exe_path.parent().unwrap_or(std::path::Path::new("."));
    let dist_dir = exe_dir.join("dist");
    let static_dir = if dist_dir.exists() {
        dist_dir
    } else {
        std::path::PathBuf::from("dist")
    };

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/options", get(api_options))
        .route("/dashboard", get(api_dashboard))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(&static_dir))
        .layer(cors);

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== DeFi Dashboard v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health              - Health check");
    println!("  GET  /api/options             - Selectable protocols and categories");
    println!("  GET  /api/dashboard           - Dashboard (?protocols=A,B&categories=X)");
    println!("\n  Database: {}", db_path);
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Report command — terminal rendering
// ============================================================================

async fn cmd_report(
    selection: Selection,
    top_n: usize,
    export: Option<String>,
) -> anyhow::Result<()> {
    println!("\n=== DeFi Dashboard v{} ===", APP_VERSION);

    let db_path = db_path();
    let tables = open_tables(&db_path).await?;
    let config = EngineConfig {
        top_n,
        ..Default::default()
    };

    let view = build_dashboard(&tables, &selection, &config);
    print_dashboard(&view);

    if let Some(export_path) = export {
        let json = serde_json::to_string_pretty(&export_json(&view))?;
        std::fs::write(&export_path, &json)?;
        println!("\nDashboard exported to {}", export_path);
    }

    Ok(())
}

fn print_dashboard(view: &DashboardView) {
    println!("{}", view.title);
    println!(
        "Protocols: {}",
        view.selection
            .protocols
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );
    if view.capabilities.has_category {
        println!(
            "Categories: {}",
            view.selection
                .categories
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!();

    for card in &view.cards {
        println!("  {:<18} {:>12}", card.title, card.value);
    }

    println!("\nProtocol Overview:");
    println!(
        "  {:<24} {:<18} {:>12} {:>12} {:>14}",
        "Protocol", "Category", "TVL", "Market Cap", "Price"
    );
    println!("  {}", "-".repeat(84));
    for row in &view.overview.rows {
        println!(
            "  {:<24} {:<18} {:>12} {:>12} {:>14}",
            row.protocol,
            row.category.as_deref().unwrap_or("-"),
            row.tvl_display,
            row.market_cap_display.as_deref().unwrap_or("-"),
            row.current_price_usd
                .map(|p| format!("{:.4}", p))
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    print_ranking(view.top_tvl.as_ref());
    print_ranking(view.top_revenue.as_ref());
    print_ranking(view.top_fees.as_ref());

    if !view.filtered.market.is_empty() {
        println!("\nMarket Data: {} rows", view.filtered.market.len());
    }

    println!("\nData sources: {}", DATA_SOURCES.join(", "));
}

fn print_ranking<R: Rankable>(ranked: Option<&RankedTable<R>>) {
    let Some(ranked) = ranked else {
        return;
    };

    println!("\n{}:", ranked.series.title);
    for (i, row) in ranked.rows.iter().enumerate() {
        println!(
            "  {:>3}  {:<24} {:>12}",
            i + 1,
            row.protocol(),
            format_currency(Some(row.rank_value()))
        );
    }
}

fn export_json(view: &DashboardView) -> serde_json::Value {
    serde_json::json!({
        "generated_at": Utc::now().to_rfc3339(),
        "version": APP_VERSION,
        "sources": DATA_SOURCES,
        "dashboard": view,
    })
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health
async fn api_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "defi-dashboard",
        "version": APP_VERSION,
        "protocols_loaded": state.tables.tvl.len(),
    }))
}

/// GET /api/options — sidebar choices and their defaults
async fn api_options(State(state): State<AppState>) -> Json<serde_json::Value> {
    let options = SelectionOptions::from_tables(&state.tables, &state.config);
    Json(serde_json::json!({
        "success": true,
        "options": options,
        "capabilities": state.tables.capabilities,
    }))
}

/// GET /api/dashboard — recompute the full dashboard for a selection
async fn api_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Json<serde_json::Value> {
    let selection = params.selection();
    debug!(?selection, "Dashboard requested");

    let view = build_dashboard(&state.tables, &selection, &state.config);
    let mut body = export_json(&view);
    body["success"] = serde_json::Value::Bool(true);
    Json(body)
}

// ============================================================================
// Helpers
// ============================================================================

/// Split a comma-separated query value; an empty value is an empty selection
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::TvlRow;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("Nest, Rooster ,Mystic"), vec!["Nest", "Rooster", "Mystic"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_dashboard_params_selection() {
        let params: DashboardParams =
            serde_json::from_value(serde_json::json!({ "protocols": "Nest,Rooster" })).unwrap();
        let selection = params.selection();
        assert_eq!(selection.protocols, Some(vec!["Nest".to_string(), "Rooster".to_string()]));
        assert_eq!(selection.categories, None);

        // present but empty is an explicit empty selection, not the default
        let params: DashboardParams =
            serde_json::from_value(serde_json::json!({ "protocols": "", "categories": "" })).unwrap();
        let selection = params.selection();
        assert_eq!(selection.protocols, Some(Vec::new()));
        assert_eq!(selection.categories, Some(Vec::new()));

        let selection = DashboardParams::default().selection();
        assert!(selection.protocols.is_none() && selection.categories.is_none());
    }

    #[tokio::test]
    async fn test_open_tables_does_not_create_missing_db() {
        let dir = std::env::temp_dir().join(format!("defi-dashboard-serve-{}", std::process::id()));
        let path = dir.join("protocols.db");
        std::fs::remove_dir_all(&dir).ok();

        assert!(open_tables(&path.display().to_string()).await.is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn test_export_json_shape() {
        let tables = ProtocolTables {
            tvl: vec![TvlRow {
                protocol: "Nest".into(),
                category: Some("RWA".into()),
                tvl_usd: Some(42_000.0),
            }],
            ..Default::default()
        };
        let view = build_dashboard(&tables, &Selection::default(), &EngineConfig::default());

        let json = export_json(&view);
        assert_eq!(json["sources"][0], "DefiLlama API");
        assert_eq!(json["dashboard"]["cards"][1]["value"], "$42.00K");
        assert_eq!(json["dashboard"]["overview"]["rows"][0]["protocol"], "Nest");
    }
}
