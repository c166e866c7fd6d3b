use serde::{Deserialize, Serialize};

/// Online indicator for the chat list. Derived from the chat's own status
/// ("active" means the visitor session is live).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Online,
    Offline,
}

/// Delivery state of a single message. Messages fetched from the backend
/// are `Confirmed`; locally sent messages start `Pending` and settle to
/// `Confirmed` or `Failed` once the send call resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Confirmed,
    Pending,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    /// Display label: "Agent" for agent/assistant roles, otherwise the
    /// visitor's name.
    pub sender: String,
    pub timestamp: String,
    pub read: bool,
    pub role: String,
    pub delivery: DeliveryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    pub name: String,
    pub last_message: String,
    pub timestamp: String,
    pub unread_count: u32,
    /// Single-glyph avatar fallback.
    pub avatar: String,
    pub presence: Presence,
    pub section: String,
}

/// Denormalized profile fields for the contact side panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub location: String,
    pub avatar: String,
    pub status: String,
    pub chat_id: String,
    pub total_messages: u32,
}

/// Denormalized device/location/acquisition fields for the details panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendUserData {
    pub name: String,
    pub email: String,
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub timezone: String,
    pub device_type: String,
    pub device_os: String,
    pub device_browser: String,
    pub referrer: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
}

/// The display-ready composite the synchronizer produces. Rebuilt wholesale
/// on every sync; presentation only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatInstance {
    pub summary: ChatSummary,
    pub messages: Vec<ChatMessage>,
    pub contact: ContactInfo,
    pub user_data: BackendUserData,
}

impl ChatInstance {
    pub fn id(&self) -> &str {
        &self.summary.id
    }
}
