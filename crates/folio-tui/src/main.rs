mod action;
mod app;
mod app_state;
mod component;
mod components;
mod theme;
mod widgets;
mod workspace;

use folio_proto::client::ListClient;
use folio_proto::config::Config;
use folio_proto::protocol::ListingKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = folio_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("folio.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("folio log: {}", log_path.display());

    tracing::info!("folio starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load()
        .unwrap_or_else(|e| {
            tracing::warn!("config load failed, using defaults: {}", e);
            Config::default()
        })
        .with_env_overrides();
    for kind in [ListingKind::Books, ListingKind::Quotes] {
        tracing::info!("[{}] endpoint {}", kind.path(), config.listing(kind).endpoint());
    }

    let client = ListClient::new(config.timeout())?;

    // ── Run TUI ──────────────────────────────────────────────────────────────
    app::App::new(&config, client).run().await
}
