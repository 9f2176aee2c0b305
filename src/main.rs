use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use todo_share_api::config::config;
use todo_share_api::database::{DatabaseManager, MemoryStore, PgStore, TodoStore};
use todo_share_api::media::LocalMediaStore;
use todo_share_api::observer::{EventDispatcher, TopicHub};
use todo_share_api::{app, is_production, AppState};

#[derive(Parser)]
#[command(name = "todo-share-api")]
#[command(about = "Shared to-do list API server")]
#[command(version)]
struct Args {
    #[arg(long, env = "PORT", help = "Port to listen on")]
    port: Option<u16>,

    #[arg(long, env = "MEDIA_ROOT_DIR", help = "Directory for uploaded media")]
    media_dir: Option<PathBuf>,

    #[arg(long, help = "Use the in-memory store even if DATABASE_URL is set")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config();
    tracing::info!("Starting todo-share-api in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }
    if is_production!() && config.database.url.is_none() {
        tracing::warn!("No DATABASE_URL in production; lists will not survive a restart");
    }

    let (store, pool) = match (&config.database.url, args.in_memory) {
        (Some(_), false) => {
            let pool = DatabaseManager::connect(&config.database).await?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            let store: Arc<dyn TodoStore> = Arc::new(PgStore::new(pool.clone()));
            (store, Some(pool))
        }
        _ => {
            tracing::info!("Using in-memory store");
            let store: Arc<dyn TodoStore> = Arc::new(MemoryStore::new());
            (store, None)
        }
    };

    let media_dir = args.media_dir.unwrap_or_else(|| PathBuf::from(&config.media.root_dir));
    let media = Arc::new(LocalMediaStore::new(media_dir.clone(), &config.media.url_prefix));

    let hub = Arc::new(TopicHub::new(config.notification.channel_capacity));
    let events = EventDispatcher::spawn(
        hub,
        config.notification.channel_capacity,
        Duration::from_millis(config.notification.sink_timeout_ms),
    );

    let state = AppState::new(store, media, events, &config.security.jwt_secret, pool);
    let media_route = format!("/{}", config.media.url_prefix.trim_matches('/'));
    let router = app(state).nest_service(&media_route, ServeDir::new(&media_dir));

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("todo-share-api listening on http://{}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
