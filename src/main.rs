use anyhow::{Context, Result};
use std::sync::Arc;
use tagbus::api::{create_router, ApiState};
use tagbus::card::CardMonitor;
use tagbus::config::{load_config, TagbusConfig};
use tagbus::store::TagStore;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagbus=info".into()),
        )
        .init();

    info!("tagbus starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => TagbusConfig::default(),
    };

    let store = Arc::new(TagStore::with_config(&config.store));

    let card_monitor = CardMonitor::new(&config.card);
    if card_monitor.is_enabled() {
        warn!("Card monitoring enabled but no reader driver is bundled; card.uid is only set by embedding applications");
    } else {
        info!("Card monitoring disabled");
    }

    // Log every published point at debug level
    let mut points = store.watch();
    tokio::spawn(async move {
        loop {
            match points.recv().await {
                Ok(point) => {
                    debug!(tag = %point.tag, value = %point.value, "Data point published");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Point logger lagged, skipped points");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let app = create_router(Arc::new(ApiState {
        store: Arc::clone(&store),
    }));

    let listener = tokio::net::TcpListener::bind(&config.api.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.api.bind))?;
    info!(bind = %config.api.bind, "Query API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Query API server failed")?;

    info!("tagbus stopped");
    Ok(())
}
