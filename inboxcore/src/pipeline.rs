use crate::section::{self, SectionPredicate};
use crate::types::raw::{RawChat, RawUser};
use crate::types::view::{
    BackendUserData, ChatInstance, ChatMessage, ChatSummary, ContactInfo, DeliveryStatus, Presence,
};
use std::collections::HashMap;

/// Admin/agent accounts see every tenant's inbox; their email does not
/// constrain ownership.
pub const SENTINEL_EMAILS: [&str; 2] = ["admin@heirs.com", "agent@heirs.com"];

/// Business rule carried over verbatim from the dashboard: records without
/// a category belong to the AI agent's inbox, records without a status are
/// treated as live.
pub const DEFAULT_CATEGORY: &str = "agent-inbox";
pub const DEFAULT_STATUS: &str = "active";

pub fn is_sentinel_email(email: &str) -> bool {
    SENTINEL_EMAILS
        .iter()
        .any(|sentinel| sentinel.eq_ignore_ascii_case(email))
}

/// Ownership filter. `user_id` takes priority over the email when present,
/// unless the email is a sentinel ("show all" admin view).
pub fn passes_ownership(user: &RawUser, email: &str, user_id: Option<&str>) -> bool {
    if is_sentinel_email(email) {
        return true;
    }
    if let Some(owner_id) = user_id {
        return user.dashboard_user_id.as_deref() == Some(owner_id);
    }
    match user.email.as_deref() {
        Some(user_email) => user_email.eq_ignore_ascii_case(email),
        None => false,
    }
}

/// Section predicate match. Status is read from the user document, not the
/// chat; the user record is the source of truth for a chat's display
/// status in this model.
pub fn matches_section(user: &RawUser, predicate: &SectionPredicate) -> bool {
    let category_match = match predicate.category {
        None => true,
        Some(wanted) => user.category.as_deref().unwrap_or(DEFAULT_CATEGORY) == wanted,
    };
    let status_match = match predicate.status {
        None => true,
        Some(wanted) => user
            .status
            .as_deref()
            .unwrap_or(DEFAULT_STATUS)
            .eq_ignore_ascii_case(wanted),
    };
    category_match && status_match
}

fn avatar_glyph(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "U".to_string())
}

fn location_line(user: &RawUser) -> String {
    format!(
        "{}, {}",
        user.location.city.as_deref().unwrap_or("Unknown"),
        user.location.country.as_deref().unwrap_or("Unknown")
    )
}

/// Builds the display-ready composite for one (user, chat) pair.
pub fn build_chat_instance(user: &RawUser, chat: &RawChat, section: &str) -> ChatInstance {
    let chat_id = chat
        .chat_id
        .clone()
        .unwrap_or_else(|| "unknown".to_string());
    let name = user
        .name
        .clone()
        .unwrap_or_else(|| "Unknown User".to_string());
    let avatar = avatar_glyph(&name);
    let now = || chrono::Utc::now().to_rfc3339();

    let messages: Vec<ChatMessage> = chat
        .messages
        .iter()
        .enumerate()
        .map(|(index, msg)| {
            let role = msg.role.clone().unwrap_or_else(|| "user".to_string());
            let sender = if role == "assistant" || role == "agent" {
                "Agent".to_string()
            } else {
                name.clone()
            };
            ChatMessage {
                id: format!("{chat_id}-{index}"),
                content: msg.text.clone().unwrap_or_default(),
                sender,
                timestamp: msg.timestamp.clone().unwrap_or_else(now),
                read: msg.read.unwrap_or(true),
                role,
                delivery: DeliveryStatus::Confirmed,
            }
        })
        .collect();

    let unread_count = messages.iter().filter(|m| !m.read).count() as u32;
    let last_message = messages
        .last()
        .map(|m| m.content.clone())
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| "No messages".to_string());
    let timestamp = chat
        .last_activity
        .clone()
        .or_else(|| chat.created_at.clone())
        .unwrap_or_else(now);
    let online = chat.status.as_deref() == Some("active");
    let presence = if online {
        Presence::Online
    } else {
        Presence::Offline
    };

    ChatInstance {
        summary: ChatSummary {
            id: chat_id.clone(),
            name: name.clone(),
            last_message,
            timestamp,
            unread_count,
            avatar: avatar.clone(),
            presence,
            section: section.to_string(),
        },
        messages,
        contact: ContactInfo {
            name: name.clone(),
            email: user.email.clone().unwrap_or_default(),
            location: location_line(user),
            avatar,
            status: if online { "Online" } else { "Offline" }.to_string(),
            chat_id,
            total_messages: chat
                .total_messages
                .unwrap_or(chat.messages.len() as u32),
        },
        user_data: BackendUserData {
            name,
            email: user.email.clone().unwrap_or_default(),
            ip: user.ip.clone().unwrap_or_else(|| "Unknown".to_string()),
            city: user
                .location
                .city
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            region: user
                .location
                .region
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            country: user
                .location
                .country
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            timezone: user
                .location
                .timezone
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            device_type: user
                .device
                .kind
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            device_os: user
                .device
                .os
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            device_browser: user
                .device
                .browser
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            referrer: user.referrer.clone().unwrap_or_default(),
            utm_source: user.utm.source.clone().unwrap_or_default(),
            utm_medium: user.utm.medium.clone().unwrap_or_default(),
            utm_campaign: user.utm.campaign.clone().unwrap_or_default(),
        },
    }
}

/// The full filter/transform/dedup run. Backs both the initial load and
/// snapshot reconciliation.
///
/// A chat id can be referenced by more than one user document; on
/// collision the candidate with the larger message list wins, keeping
/// first-seen output order. Unknown sections produce an empty set.
pub fn synchronize(
    users: &[RawUser],
    email: &str,
    user_id: Option<&str>,
    section: &str,
) -> Vec<ChatInstance> {
    let Some(predicate) = section::categorization(section) else {
        log::warn!(target: "Core/Pipeline", "Unknown section: {section:?}");
        return Vec::new();
    };

    let mut instances: Vec<ChatInstance> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    for user in users {
        if user.chats.is_empty() || !passes_ownership(user, email, user_id) {
            continue;
        }
        if !matches_section(user, &predicate) {
            continue;
        }
        for chat in &user.chats {
            let candidate = build_chat_instance(user, chat, section);
            match index_by_id.get(candidate.id()) {
                Some(&existing) => {
                    if candidate.messages.len() > instances[existing].messages.len() {
                        instances[existing] = candidate;
                    }
                }
                None => {
                    index_by_id.insert(candidate.id().to_string(), instances.len());
                    instances.push(candidate);
                }
            }
        }
    }

    instances
}
