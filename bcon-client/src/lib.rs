//! REST client for the BCON arcade server.
//!
//! Every reply is flattened into a [`TagStore`] instead of being returned to
//! the caller; consumers read results by tag (e.g. `game.tokenCost`) or by
//! subscribing.

mod games;
mod players;
mod prizes;

pub use games::GameUpdate;
pub use players::PlayerUpdate;
pub use prizes::PrizeUpdate;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method};
use serde::Serialize;
use std::sync::Arc;
use tagbus::config::ServerConfig;
use tagbus::ingest::ingest_reply;
use tagbus::store::TagStore;
use tracing::{debug, error};

const CUSTOM_USER_AGENT: &str = "X-Custom-User-Agent";

/// HTTP client for the BCON server.
///
/// Sends `User-Agent` and `X-Custom-User-Agent` on every request.
pub struct BconClient {
    http_client: Client,
    base_url: String,
    store: Arc<TagStore>,
}

impl BconClient {
    /// Create a client from the `[server]` configuration section.
    pub fn new(config: &ServerConfig, store: Arc<TagStore>) -> Result<Self> {
        Self::with_base_url(&config.url, &config.user_agent, store)
    }

    /// Create a client with an explicit base URL (for testing with a mock server).
    pub fn with_base_url(base_url: &str, user_agent: &str, store: Arc<TagStore>) -> Result<Self> {
        let agent = header::HeaderValue::from_str(user_agent)
            .with_context(|| format!("Invalid user agent '{}'", user_agent))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(CUSTOM_USER_AGENT, agent.clone());

        let http_client = Client::builder()
            .user_agent(agent)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// Store that receives flattened replies.
    pub fn store(&self) -> &Arc<TagStore> {
        &self.store
    }

    /// GET an arbitrary server path and ingest the reply.
    pub async fn fetch(&self, path: &str) -> Result<usize> {
        self.send::<()>(Method::GET, path, None).await
    }

    /// Send a request and hand the reply to the store.
    ///
    /// Returns the number of points published from the reply. Transport
    /// failures are errors; HTTP error statuses are not.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<usize> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http_client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(method = %method, url = %url, error = %e, "Request failed");
                return Err(e).with_context(|| format!("Failed to send {} {}", method, url));
            }
        };

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read reply from {}", url))?;

        let points = ingest_reply(&self.store, status, &bytes);
        debug!(method = %method, url = %url, status = status, points = points, "Reply ingested");

        Ok(points)
    }
}
