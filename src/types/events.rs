use crate::client::Phase;
use inboxcore::types::view::{ChatInstance, ChatMessage};
use std::sync::Arc;
use tokio::sync::broadcast;

// The size of the broadcast channel buffer.
const CHANNEL_CAPACITY: usize = 100;

/// Connectivity transitions of the push subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionUpdate {
    Connected,
    Subscribed,
    Disconnected,
}

// Macro to generate EventBus fields and constructor
macro_rules! define_event_bus {
    ($(($field:ident, $type:ty)),* $(,)?) => {
        /// Typed event bus with a separate broadcast channel per event
        /// type. Lagging receivers drop the oldest events; the core never
        /// blocks on a slow consumer.
        #[derive(Debug)]
        pub struct EventBus {
            $(
                pub $field: broadcast::Sender<$type>,
            )*
        }

        impl EventBus {
            pub fn new() -> Self {
                Self {
                    $(
                        $field: broadcast::channel(CHANNEL_CAPACITY).0,
                    )*
                }
            }
        }
    };
}

define_event_bus! {
    // The view-model collection was rebuilt (load or snapshot reconcile)
    (chats_refreshed, Arc<Vec<ChatInstance>>),
    // idle -> loading -> {ready, error} transitions
    (state_changed, Arc<Phase>),
    // An optimistic send was applied locally
    (message_sent, Arc<ChatMessage>),
    // Push-channel connectivity
    (connection, Arc<ConnectionUpdate>),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
