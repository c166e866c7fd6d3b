use serde::{Deserialize, Deserializer, Serialize};

/// Backend documents are loosely shaped: Mongo ids arrive as strings or
/// numbers depending on how the record was seeded. Coerce both to `String`
/// so ownership comparisons are plain string equality.
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Envelope of `GET /api/debug/users-chats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersPayload {
    pub users: Vec<RawUser>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(rename = "_id", default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Links a visitor record to the dashboard account that owns it.
    #[serde(default, deserialize_with = "flexible_id")]
    pub dashboard_user_id: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    /// Inbox classification. Absent means "agent-inbox" for filtering
    /// purposes; the default is applied in the pipeline, not here, so raw
    /// records stay a faithful mirror of the wire.
    #[serde(default)]
    pub category: Option<String>,
    /// Lifecycle state. Absent means "active" for filtering purposes.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub location: RawLocation,
    #[serde(default)]
    pub device: RawDevice,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub utm: RawUtm,
    #[serde(default)]
    pub chats: Vec<RawChat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDevice {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUtm {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChat {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub total_messages: Option<u32>,
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    /// "user", "agent" or "assistant".
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub read: Option<bool>,
}
