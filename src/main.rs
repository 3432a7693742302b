use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use calendar_server::config::Config;
use calendar_server::routes::create_routes;
use calendar_server::store::{EventStore, InMemoryEventStore, PgEventStore};
use calendar_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn EventStore> = match &config.database_url {
        Some(url) => {
            let store = PgEventStore::connect(url, config.max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Successfully connected to database");

            store
                .run_migrations()
                .await
                .context("Failed to run migrations")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, events are kept in memory only");
            Arc::new(InMemoryEventStore::new())
        }
    };

    let app: Router = create_routes(AppState::new(store), &config.cors_allowed_origins);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
