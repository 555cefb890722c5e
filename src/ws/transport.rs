//! WebSocket side of the event transport.

use std::sync::Arc;

use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::EventBus;

#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("conexión websocket: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
}

/// One server frame: an event name plus its JSON payload.
#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Owns the read loop of a live connection; dropping or disconnecting it
/// stops delivery.
pub struct WsTransport {
    reader: JoinHandle<()>,
}

impl WsTransport {
    /// Connect to the game feed and publish every decoded frame to `bus`.
    pub async fn connect(url: &str, bus: Arc<EventBus>) -> Result<WsTransport, WsError> {
        let (mut stream, _) = connect_async(url).await?;
        tracing::info!(%url, "transporte de eventos conectado");

        let reader = tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<Frame>(&text) {
                        Ok(frame) => bus.publish(&frame.event, &frame.payload),
                        Err(err) => {
                            tracing::warn!(%err, "trama de evento no reconocida");
                        }
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("el servidor cerró el transporte");
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(%err, "transporte de eventos caído");
                        break;
                    }
                }
            }
        });

        Ok(WsTransport { reader })
    }

    pub fn disconnect(&self) {
        self.reader.abort();
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
