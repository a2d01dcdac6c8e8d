use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use masthead_server::{app, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "masthead_server=info,tower_http=debug".into()),
        )
        .init();

    // load config: explicit MASTHEAD_CONFIG path > ~/.masthead/masthead.toml
    let config_path = std::env::var("MASTHEAD_CONFIG").ok();
    let config = masthead_core::MastheadConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        masthead_core::MastheadConfig::default()
    });

    let bind = config.server.bind.clone();
    let port = config.server.port;

    // initialize SQLite database — one file, one connection per subsystem
    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    masthead_store::db::init_db(&db)?;
    info!("database migrations complete");

    let store = masthead_store::Store::new(rusqlite::Connection::open(db_path)?)?;
    let mailer = masthead_mail::mailer_from_config(&config.mail)?;

    // the publisher gets its own store so the loop never blocks a handler
    let publisher_store = masthead_store::Store::new(rusqlite::Connection::open(db_path)?)?;
    let publisher = masthead_publisher::Publisher::new(
        publisher_store,
        Arc::clone(&mailer),
        config.site.clone(),
        config.publisher.interval_secs,
    );

    // a second publisher serves the HTTP trigger and immediate-publish notify
    let handler_store = masthead_store::Store::new(rusqlite::Connection::open(db_path)?)?;
    let handler_publisher = masthead_publisher::Publisher::new(
        handler_store,
        Arc::clone(&mailer),
        config.site.clone(),
        config.publisher.interval_secs,
    );

    let publisher_enabled = config.publisher.enabled;
    let state = Arc::new(app::AppState::new(config, store, handler_publisher));
    let router = build_router(Arc::clone(&state));

    // spawn the background publish loop
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    if publisher_enabled {
        tokio::spawn(async move { publisher.run(shutdown_rx).await });
    }

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Masthead listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    // signal the publisher loop to stop
    let _ = shutdown_tx.send(true);
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
}
