//! Leaderboard — score service for the dashboard site
//!
//! Usage:
//!   leaderboard serve --port 3001              — Launch the HTTP API
//!   leaderboard list                           — Print the current top scores
//!   leaderboard submit --name Ava --score 42   — Submit a score from the CLI

mod api;
mod config;

use api::{AppState, APP_VERSION};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use config::{Backend, StoreConfig};
use leaderboard::{ScoreEntry, Submission, DEFAULT_CAPACITY};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "leaderboard")]
#[command(about = "Top-N score leaderboard backed by a single JSON document", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Storage backend (env: LEADERBOARD_BACKEND, default: file)
    #[arg(long, value_enum, global = true)]
    backend: Option<Backend>,

    /// Document location (env: LEADERBOARD_DATA_PATH)
    #[arg(long, global = true)]
    data_path: Option<PathBuf>,

    /// Number of entries kept on the board
    #[arg(long, default_value_t = DEFAULT_CAPACITY, global = true)]
    capacity: usize,

    /// Serialize submits in this process to avoid lost updates
    #[arg(long, global = true)]
    serialize_writes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the leaderboard web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3001)]
        port: u16,
        /// Directory of dashboard static files served at `/`
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Print the leaderboard
    List,
    /// Submit a score
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        score: f64,
    },
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,leaderboard=debug,persistence=debug,sqlx=warn")
    } else {
        EnvFilter::new("info,leaderboard=info,persistence=info,sqlx=warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    let config = StoreConfig::resolve(
        cli.backend,
        cli.data_path,
        cli.capacity,
        cli.serialize_writes,
    );

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            cmd_serve(&config, &host, port, static_dir).await?;
        }
        Commands::List => {
            cmd_list(&config).await?;
        }
        Commands::Submit { name, score } => {
            cmd_submit(&config, name, score).await?;
        }
    }

    Ok(())
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(
    config: &StoreConfig,
    host: &str,
    port: u16,
    static_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    info!("Leaderboard v{} starting...", APP_VERSION);

    let store = config.open_store().await?;
    let state = AppState {
        store: Arc::new(store),
    };
    let app = api::router(state, static_dir.as_deref());

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Leaderboard v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health        - Health check");
    println!("  GET  /api/leaderboard   - Top scores, best first");
    println!("  POST /api/leaderboard   - Submit {{ name, score }}");
    println!("\n  Storage: {}", config.location());
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Ctrl+C received, shutting down");
        })
        .await?;

    Ok(())
}

// ============================================================================
// CLI commands — no web server
// ============================================================================

async fn cmd_list(config: &StoreConfig) -> anyhow::Result<()> {
    let store = config.open_store().await?;
    let entries = store.list().await;
    if entries.is_empty() {
        println!("No scores yet.");
        return Ok(());
    }
    print_entries(&entries);
    Ok(())
}

async fn cmd_submit(config: &StoreConfig, name: String, score: f64) -> anyhow::Result<()> {
    let store = config.open_store().await?;
    store
        .submit(Submission::new(name, score))
        .await
        .map_err(|e| anyhow::anyhow!("Submit failed: {}", e))?;
    print_entries(&store.list().await);
    Ok(())
}

fn print_entries(entries: &[ScoreEntry]) {
    println!("\nTop {} Scores:", entries.len());
    println!("  {:>3}  {:<24} {:>10} {:<25}", "#", "Name", "Score", "Submitted");
    println!("  {}", "-".repeat(66));
    for (i, e) in entries.iter().enumerate() {
        let submitted = DateTime::from_timestamp_millis(e.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>3}  {:<24} {:>10} {:<25}",
            i + 1,
            e.name,
            e.score,
            submitted
        );
    }
}
