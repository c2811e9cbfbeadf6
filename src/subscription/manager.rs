use crate::point::DataPoint;
use crate::store::{TagStore, TagSubscriber};
use crate::subscription::protocol::{ClientMessage, DataPointMessage, ErrorMessage};
use axum::extract::ws::{Message, WebSocket};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Points queued per connection before new ones are dropped
const FORWARD_CAPACITY: usize = 256;

/// Store subscriber that hands points to a connection task.
///
/// Never blocks the publisher: when the connection falls behind, points are
/// dropped and logged.
pub struct Forwarder {
    tx: mpsc::Sender<DataPoint>,
}

impl TagSubscriber for Forwarder {
    fn handle_data(&self, point: &DataPoint) {
        if let Err(e) = self.tx.try_send(point.clone()) {
            warn!(tag = %point.tag, error = %e, "WebSocket lagged, dropped data point");
        }
    }
}

/// Manages a single WebSocket connection with tag subscriptions
pub struct ConnectionManager {
    store: Arc<TagStore>,
    forwarder: Arc<Forwarder>,
    rx: mpsc::Receiver<DataPoint>,
}

impl ConnectionManager {
    pub fn new(store: Arc<TagStore>) -> Self {
        let (tx, rx) = mpsc::channel(FORWARD_CAPACITY);

        Self {
            store,
            forwarder: Arc::new(Forwarder { tx }),
            rx,
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(mut self, mut socket: WebSocket) {
        info!("WebSocket connection established");

        loop {
            tokio::select! {
                // Handle incoming client messages
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Err(e) = self.handle_client_message(&mut socket, &text).await {
                                error!(error = %e, "Error handling client message");
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Points forwarded by the store subscriber
                Some(point) = self.rx.recv() => {
                    if let Err(e) = send_json(&mut socket, &DataPointMessage::from(point)).await {
                        error!(error = %e, "Failed to send data point");
                        break;
                    }
                }

                else => {
                    break;
                }
            }
        }

        self.store.unsubscribe_all(&self.forwarder);
        info!("WebSocket connection closed");
    }

    /// Handle client message (subscribe/unsubscribe)
    async fn handle_client_message(
        &mut self,
        socket: &mut WebSocket,
        text: &str,
    ) -> anyhow::Result<()> {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                send_json(socket, &ErrorMessage::new(format!("invalid message: {}", e))).await?;
                return Ok(());
            }
        };

        self.apply(msg);
        Ok(())
    }

    /// Apply a subscription change to the store
    pub fn apply(&self, msg: ClientMessage) {
        match msg {
            ClientMessage::Subscribe { tag } => {
                info!(tag = %tag, "Client subscribed to tag");
                self.store.subscribe(&tag, &self.forwarder);
            }
            ClientMessage::Unsubscribe { tag } => {
                info!(tag = %tag, "Client unsubscribed from tag");
                self.store.unsubscribe(&tag, &self.forwarder);
            }
        }
    }
}

async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, msg: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string(msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
