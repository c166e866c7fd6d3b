//! Tokio-based WebSocket transport for sakura-inbox.
//!
//! Concrete implementation of the core `Transport` trait over
//! `tokio-tungstenite`. The dashboard push service speaks plain JSON text
//! frames, so there is no binary framing layer here.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use inboxcore::net::{Transport, TransportEvent, TransportFactory};
use log::{debug, warn};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type RawWs = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<RawWs, Message>;
type WsStream = SplitStream<RawWs>;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tokio WebSocket transport. The send half lives here; the receive half
/// is pumped into the event channel by a background task.
pub struct TokioWebSocketTransport {
    ws_sink: Arc<Mutex<Option<WsSink>>>,
}

impl TokioWebSocketTransport {
    fn new(sink: WsSink) -> Self {
        Self {
            ws_sink: Arc::new(Mutex::new(Some(sink))),
        }
    }
}

#[async_trait]
impl Transport for TokioWebSocketTransport {
    async fn send_text(&self, text: &str) -> Result<(), anyhow::Error> {
        let mut sink_guard = self.ws_sink.lock().await;
        let sink = sink_guard
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Socket is closed"))?;

        debug!(target: "Transport", "--> Sending frame: {} bytes", text.len());
        sink.send(Message::text(text))
            .await
            .map_err(|e| anyhow::anyhow!("WebSocket send error: {e}"))?;
        Ok(())
    }

    async fn disconnect(&self) {
        let mut sink_guard = self.ws_sink.lock().await;
        if let Some(mut sink) = sink_guard.take() {
            if let Err(e) = sink.send(Message::Close(None)).await {
                debug!(target: "Transport", "Error sending close frame: {e}");
            }
        }
    }
}

async fn read_loop(mut stream: WsStream, events: mpsc::Sender<TransportEvent>) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(Message::Text(text)) => {
                debug!(target: "Transport", "<-- Received frame: {} bytes", text.len());
                if events
                    .send(TransportEvent::MessageReceived(text.to_string()))
                    .await
                    .is_err()
                {
                    // Receiver dropped; nobody is listening anymore.
                    return;
                }
            }
            Ok(Message::Close(_)) => break,
            // tungstenite answers pings internally on the next flush.
            Ok(_) => {}
            Err(e) => {
                warn!(target: "Transport", "WebSocket read error: {e}");
                break;
            }
        }
    }
    let _ = events.send(TransportEvent::Disconnected).await;
}

/// Factory that dials the dashboard WebSocket service.
#[derive(Debug, Default, Clone)]
pub struct TokioWebSocketTransportFactory;

impl TokioWebSocketTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for TokioWebSocketTransportFactory {
    async fn create_transport(
        &self,
        url: &str,
    ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), anyhow::Error> {
        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| anyhow::anyhow!("WebSocket connect to {url} failed: {e}"))?;
        debug!(target: "Transport", "Connected to {url}");

        let (sink, stream) = ws.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        // The connected event must be queued before any frame the reader
        // produces.
        event_tx
            .send(TransportEvent::Connected)
            .await
            .map_err(|_| anyhow::anyhow!("Transport event receiver dropped"))?;
        tokio::spawn(read_loop(stream, event_tx));

        Ok((Arc::new(TokioWebSocketTransport::new(sink)), event_rx))
    }
}
