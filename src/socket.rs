use crate::client::SyncClient;
use crate::types::events::ConnectionUpdate;
use inboxcore::net::TransportEvent;
use inboxcore::types::wire::{ChatUpdate, ClientFrame, ServerFrame};
use log::{debug, info, warn};
use rand::Rng;
use scopeguard::defer;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::sleep;

/// Keepalive cadence while the subscription is live.
const PING_INTERVAL: Duration = Duration::from_secs(30);
const RECONNECT_BASE_DELAY: Duration = Duration::from_secs(1);
const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(30);
const RECONNECT_MAX_ATTEMPTS: u32 = 5;
const SUBSCRIPTION_TOPIC: &str = "chat_updates";

impl SyncClient {
    /// Runs the push-subscription loop until `shutdown()` or the reconnect
    /// budget is exhausted. Subscribes to the `chat_updates` topic on every
    /// (re)connect; the subscription only exists while the transport
    /// reports itself connected.
    pub async fn run(self: Arc<Self>) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            warn!(target: "Client/Socket", "Run loop already active");
            return;
        }
        let this = self.clone();
        defer! {
            this.is_running.store(false, Ordering::Release);
            this.is_connected.store(false, Ordering::Release);
        }

        let mut attempts: u32 = 0;
        loop {
            if !self.is_running.load(Ordering::Acquire) {
                return;
            }

            match self
                .transport_factory
                .create_transport(&self.config.ws_url)
                .await
            {
                Ok((transport, mut events)) => {
                    *self.transport.lock().await = Some(transport.clone());
                    let mut ping = tokio::time::interval(PING_INTERVAL);
                    // The first tick fires immediately; skip it.
                    ping.tick().await;

                    loop {
                        tokio::select! {
                            _ = self.shutdown_notifier.notified() => {
                                info!(target: "Client/Socket", "Shutdown requested");
                                transport.disconnect().await;
                                *self.transport.lock().await = None;
                                return;
                            }
                            _ = ping.tick() => {
                                if self.is_connected()
                                    && let Err(e) = transport.send_text(&ClientFrame::ping()).await
                                {
                                    warn!(target: "Client/Socket", "Keepalive ping failed: {e}");
                                }
                            }
                            event = events.recv() => match event {
                                Some(TransportEvent::Connected) => {
                                    info!(target: "Client/Socket", "Push channel connected");
                                    self.is_connected.store(true, Ordering::Release);
                                    attempts = 0;
                                    let _ = self
                                        .event_bus
                                        .connection
                                        .send(Arc::new(ConnectionUpdate::Connected));
                                    let frame = ClientFrame::subscribe(SUBSCRIPTION_TOPIC);
                                    if let Err(e) = transport.send_text(&frame).await {
                                        warn!(target: "Client/Socket", "Subscribe failed: {e}");
                                    }
                                }
                                Some(TransportEvent::MessageReceived(text)) => {
                                    self.handle_frame(&text).await;
                                }
                                Some(TransportEvent::Disconnected) | None => {
                                    warn!(target: "Client/Socket", "Push channel disconnected");
                                    break;
                                }
                            }
                        }
                    }

                    self.is_connected.store(false, Ordering::Release);
                    let _ = self
                        .event_bus
                        .connection
                        .send(Arc::new(ConnectionUpdate::Disconnected));
                    *self.transport.lock().await = None;
                }
                Err(e) => {
                    warn!(target: "Client/Socket", "Connect failed: {e}");
                }
            }

            if !self.is_running.load(Ordering::Acquire) {
                return;
            }
            attempts += 1;
            if attempts > RECONNECT_MAX_ATTEMPTS {
                warn!(
                    target: "Client/Socket",
                    "Giving up after {RECONNECT_MAX_ATTEMPTS} reconnect attempts"
                );
                return;
            }
            let backoff = RECONNECT_BASE_DELAY
                .saturating_mul(1 << (attempts - 1).min(5))
                .min(RECONNECT_MAX_DELAY);
            let jitter = Duration::from_millis(rand::rng().random_range(0..500));
            let delay = backoff + jitter;
            info!(
                target: "Client/Socket",
                "Reconnecting in {delay:?} (attempt {attempts}/{RECONNECT_MAX_ATTEMPTS})"
            );
            tokio::select! {
                _ = self.shutdown_notifier.notified() => return,
                _ = sleep(delay) => {}
            }
        }
    }

    /// Stops the run loop and closes the transport. Idempotent.
    pub async fn shutdown(&self) {
        self.is_running.store(false, Ordering::Release);
        // notify_one keeps a permit if the loop is mid-frame rather than
        // parked in select, so the stop is never missed.
        self.shutdown_notifier.notify_one();
        if let Some(transport) = self.transport.lock().await.take() {
            transport.disconnect().await;
        }
    }

    /// Dispatches one server frame. Unknown shapes are logged and ignored,
    /// never surfaced as errors.
    pub(crate) async fn handle_frame(&self, text: &str) {
        let frame: ServerFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(target: "Client/Socket", "Unparseable frame ({e}): {text}");
                return;
            }
        };

        match frame {
            ServerFrame::Connected { connection_id } => {
                info!(
                    target: "Client/Socket",
                    "Connection confirmed (id: {})",
                    connection_id.as_deref().unwrap_or("unknown")
                );
            }
            ServerFrame::Subscribed { subscription_type } => {
                info!(
                    target: "Client/Socket",
                    "Subscribed to {}",
                    subscription_type.as_deref().unwrap_or(SUBSCRIPTION_TOPIC)
                );
                let _ = self
                    .event_bus
                    .connection
                    .send(Arc::new(ConnectionUpdate::Subscribed));
            }
            ServerFrame::Pong => debug!(target: "Client/Socket", "Pong received"),
            ServerFrame::ChatUpdates { data } => match data {
                ChatUpdate::Notification {
                    chat_id,
                    message_role,
                    ..
                } => {
                    // Simplest-correct choice: a full re-fetch instead of a
                    // local patch, trading bandwidth for consistency.
                    info!(
                        target: "Client/Socket",
                        "New {message_role} message in chat {chat_id}, reloading"
                    );
                    self.load_chats().await;
                }
                ChatUpdate::Snapshot { users } => {
                    self.apply_snapshot(users).await;
                }
            },
            ServerFrame::Unknown => {
                debug!(target: "Client/Socket", "Ignoring unhandled frame: {text}");
            }
        }
    }
}
