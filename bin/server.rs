// Ud'hiyath - Web Server
// REST API over one in-memory allocation session

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use udhiyath::api::{router, AppState};
use udhiyath::{import_into, AppConfig, Session};

const LOG_ENV: &str = "UDHIYATH_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    println!("🌐 Ud'hiyath Allocation - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = AppConfig::load(None)?;
    let mut session = Session::from_app_config(&config);

    // Optional weight sheet to start from
    if let Some(csv_path) = std::env::args().nth(1).map(PathBuf::from) {
        let stats = import_into(&mut session, &csv_path)?;
        println!(
            "✓ Loaded {} animals from {:?} ({} entries skipped)",
            stats.animals(),
            csv_path,
            stats.entries_skipped
        );
    }

    let addr = config.server_addr.clone();
    let app = router(AppState::new(session, config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "server listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/animals", addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
