use anyhow::Result;
use bcon_client::BconClient;
use std::sync::Arc;
use tagbus::config::{load_config, TagbusConfig};
use tagbus::store::TagStore;
use tracing::{error, info};

/// Fetch server resources into a fresh store and print it.
///
/// Usage: bcon-client [--config <path>] [<path>...]
/// With no paths, fetches /games, /players and /prizes.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bcon_client=info,tagbus=info".into()),
        )
        .init();

    let mut args = std::env::args().skip(1).peekable();

    let config = if args.peek().map(String::as_str) == Some("--config") {
        args.next();
        match args.next() {
            Some(path) => load_config(&path)?,
            None => anyhow::bail!("--config requires a path"),
        }
    } else {
        TagbusConfig::default()
    };

    let mut paths: Vec<String> = args.collect();
    if paths.is_empty() {
        paths = vec!["/games".into(), "/players".into(), "/prizes".into()];
    }

    let store = Arc::new(TagStore::with_config(&config.store));
    let client = BconClient::new(&config.server, Arc::clone(&store))?;
    info!(server = %config.server.url, "Fetching {} resource(s)", paths.len());

    for path in &paths {
        match client.fetch(path).await {
            Ok(points) => info!(path = %path, points = points, "Fetched"),
            Err(e) => error!(path = %path, error = %e, "Fetch failed"),
        }
    }

    for point in store.snapshot() {
        if point.is_valid() {
            println!("{} = {}", point.tag, point.value);
        }
    }

    Ok(())
}
