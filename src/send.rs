use crate::client::SyncClient;
use inboxcore::net::HttpRequest;
use inboxcore::types::view::{ChatMessage, DeliveryStatus};
use log::{debug, warn};
use std::sync::Arc;

impl SyncClient {
    /// Sends a message into the currently selected chat.
    ///
    /// The message is attributed to a human agent regardless of which
    /// inbox view is active, appended optimistically before the network
    /// call, and never rolled back: a failed send settles to
    /// `DeliveryStatus::Failed` so presentation can flag it, but the load
    /// error state is untouched.
    ///
    /// No-op when the trimmed content is empty or nothing is selected;
    /// the UI is expected to guard the call, this double-checks.
    pub async fn send_message(&self, content: &str) {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return;
        }

        let now = chrono::Utc::now();
        let message = ChatMessage {
            id: format!("local-{}", now.timestamp_millis()),
            content: trimmed.to_string(),
            sender: "Agent".to_string(),
            timestamp: now.to_rfc3339(),
            read: true,
            role: "agent".to_string(),
            delivery: DeliveryStatus::Pending,
        };

        // Optimistic local patch, synchronous relative to this call: the
        // selected instance lives in the collection, so one mutation
        // updates both views of it.
        let chat_id = {
            let mut state = self.state.write().await;
            let Some(selected) = state.selected.clone() else {
                return;
            };
            let Some(instance) = state.chats.iter_mut().find(|c| c.id() == selected) else {
                debug!(target: "Client/Send", "Selected chat {selected} vanished, dropping send");
                return;
            };
            instance.messages.push(message.clone());
            instance.summary.last_message = message.content.clone();
            instance.summary.timestamp = message.timestamp.clone();
            selected
        };
        let _ = self.event_bus.message_sent.send(Arc::new(message.clone()));

        let url = format!(
            "{}/api/dashboard/chats/{}/send",
            self.config.api_base, chat_id
        );
        let body = serde_json::json!({ "content": trimmed, "role": "agent" });
        let request = HttpRequest::post(url).with_json_body(body.to_string().into_bytes());

        let delivery = match self.http_client.execute(request).await {
            Ok(response) if response.is_success() => DeliveryStatus::Confirmed,
            Ok(response) => {
                warn!(
                    target: "Client/Send",
                    "Send to chat {chat_id} rejected: HTTP {}",
                    response.status_code
                );
                DeliveryStatus::Failed
            }
            Err(e) => {
                warn!(target: "Client/Send", "Send to chat {chat_id} failed: {e}");
                DeliveryStatus::Failed
            }
        };
        self.settle_delivery(&chat_id, &message.id, delivery).await;
    }

    async fn settle_delivery(&self, chat_id: &str, message_id: &str, delivery: DeliveryStatus) {
        let mut state = self.state.write().await;
        if let Some(instance) = state.chats.iter_mut().find(|c| c.id() == chat_id)
            && let Some(message) = instance.messages.iter_mut().find(|m| m.id == message_id)
        {
            message.delivery = delivery;
        }
    }

    /// Zeroes the unread counter for a chat. Local-only, no backend call.
    pub async fn mark_as_read(&self, chat_id: &str) {
        let mut state = self.state.write().await;
        if let Some(instance) = state.chats.iter_mut().find(|c| c.id() == chat_id) {
            instance.summary.unread_count = 0;
        }
    }
}
