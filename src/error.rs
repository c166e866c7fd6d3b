use thiserror::Error;

/// Everything that can go wrong while loading chats. All variants are
/// caught at the synchronizer boundary and stored as a display string in
/// the view-model state; none escape to callers as `Err`.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The 30-second client-side budget elapsed. Distinct from a generic
    /// network failure so operators know to check the backend/database.
    #[error(
        "Request timed out. Verify the backend service and its database are reachable."
    )]
    Timeout,

    /// Non-2xx response; the message carries the backend's `detail` field
    /// when present, else the raw body, else the status line.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The response parsed but was not the expected users array shape.
    #[error("Unexpected response shape: {0}")]
    Malformed(String),

    /// Any other transport-level failure.
    #[error("Network error: {0}")]
    Network(String),
}
