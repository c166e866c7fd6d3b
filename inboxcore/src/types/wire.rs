use crate::types::raw::RawUser;
use serde::{Deserialize, Serialize};

/// Envelope the dashboard WebSocket service wraps every frame in.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Sent once right after the socket opens.
    Connected {
        #[serde(default)]
        connection_id: Option<String>,
    },
    /// Acknowledges a subscribe request.
    Subscribed {
        #[serde(default)]
        subscription_type: Option<String>,
    },
    /// Keepalive response.
    Pong,
    /// A push on the `chat_updates` topic.
    ChatUpdates { data: ChatUpdate },
    /// Anything we do not handle; logged and ignored.
    #[serde(other)]
    Unknown,
}

/// The two payload shapes carried on the `chat_updates` topic.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatUpdate {
    /// Lightweight "new message" notice; the client answers with a full
    /// re-fetch rather than patching locally.
    Notification {
        chat_id: String,
        message_role: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
    /// A complete users-with-chats snapshot, reconciled in place.
    Snapshot { users: Vec<RawUser> },
}

/// Frames the client sends to the service.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe { subscription_type: String },
    Ping,
}

impl ClientFrame {
    pub fn subscribe(topic: &str) -> String {
        serde_json::to_string(&ClientFrame::Subscribe {
            subscription_type: topic.to_string(),
        })
        .unwrap_or_default()
    }

    pub fn ping() -> String {
        serde_json::to_string(&ClientFrame::Ping).unwrap_or_default()
    }
}
