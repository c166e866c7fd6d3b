// Re-export the platform-agnostic core
pub use inboxcore::{net, pipeline, section};

// Core types are re-exported; events (with EventBus) remain here
pub mod types {
    pub use inboxcore::types::*;
    pub mod events;
}

pub mod agent;
pub mod client;
pub mod config;
pub mod error;
pub mod send;
pub mod socket;
pub mod sync;
pub mod transport;
