//! stretchsheet server
//!
//! A small web service around the stretchsheet rendering core. One CSV
//! upload of `name`/`number` rows produces two landscape-A4 PDF sheets
//! in which every entry is stretched to fill its printed cell. Endpoints:
//!
//! - Upload form and sample-CSV download
//! - Combined JSON rendering (both documents, base64)
//! - Direct PDF downloads (`names.pdf`, `numbers_full_stretch.pdf`)

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stretchsheet_core::font;
use stretchsheet_core::SheetFont;

mod api;
mod error;

use api::{
    handle_generate, handle_health, handle_index, handle_names_pdf, handle_numbers_pdf,
    handle_sample,
};

/// Command-line arguments for the stretchsheet server
#[derive(Parser, Debug)]
#[command(name = "stretchsheet-server")]
#[command(about = "Web server rendering stretched name/number PDF sheets")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// TrueType font used for all sheet text
    #[arg(long, default_value = "assets/Teko-SemiBold.ttf")]
    font: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// The process-wide sheet font, installed once at startup.
    pub font: &'static SheetFont,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The font is the one mandatory external resource: load it before
    // binding anything, and refuse to start without it.
    let font = SheetFont::load(&args.font).map_err(|e| {
        anyhow::anyhow!("cannot load sheet font '{}': {e}", args.font.display())
    })?;
    info!(name = font.postscript_name(), "sheet font installed");

    let state = AppState {
        font: font::install(font),
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Upload form
        .route("/", get(handle_index))
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/sample", get(handle_sample))
        .route("/api/sheets", post(handle_generate))
        .route("/api/sheets/names", post(handle_names_pdf))
        .route("/api/sheets/numbers", post(handle_numbers_pdf))
        // Apply middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
