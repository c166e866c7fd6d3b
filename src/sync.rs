use crate::client::{Phase, SyncClient};
use crate::error::SyncError;
use inboxcore::net::{HttpRequest, HttpResponse};
use inboxcore::pipeline;
use inboxcore::types::raw::{RawUser, UsersPayload};
use inboxcore::types::view::ChatInstance;
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Client-side budget for the aggregate users-with-chats fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Pulls a usable message out of a non-2xx response: the backend's JSON
/// `detail` field, else the raw body, else the status line.
fn backend_error_message(response: &HttpResponse) -> String {
    if let Ok(value) = response.json::<serde_json::Value>()
        && let Some(detail) = value.get("detail").and_then(|d| d.as_str())
    {
        return detail.to_string();
    }
    let body = response.body_string();
    if !body.trim().is_empty() {
        return body;
    }
    format!("HTTP {}", response.status_code)
}

impl SyncClient {
    /// Full load: fetch, filter, transform, dedup, commit.
    ///
    /// Never returns an error; every failure is folded into the error
    /// state with an emptied collection and cleared selection. Safe to
    /// call concurrently with itself; only the latest invocation commits.
    pub async fn load_chats(&self) {
        let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_phase(Phase::Loading).await;

        let result = self.fetch_and_build().await;

        match result {
            Ok(chats) => {
                info!(target: "Client/Sync", "Loaded {} chats", chats.len());
                self.commit_ready(chats, None, Some(generation)).await;
            }
            Err(e) => {
                let mut state = self.state.write().await;
                if self.is_stale(generation) {
                    return;
                }
                warn!(target: "Client/Sync", "Load failed: {e}");
                state.chats = Vec::new();
                state.selected = None;
                state.error = Some(e.to_string());
                state.phase = Phase::Error;
                drop(state);
                let _ = self
                    .event_bus
                    .state_changed
                    .send(Arc::new(Phase::Error));
            }
        }
    }

    /// Must be called with the state write lock held, so the check and the
    /// subsequent state mutation are a single atomic step with respect to
    /// competing loads.
    fn is_stale(&self, generation: u64) -> bool {
        if self.load_generation.load(Ordering::SeqCst) != generation {
            info!(
                target: "Client/Sync",
                "Discarding stale load result (generation {generation})"
            );
            return true;
        }
        false
    }

    async fn fetch_and_build(&self) -> Result<Vec<ChatInstance>, SyncError> {
        let url = format!("{}/api/debug/users-chats", self.config.api_base);
        let response = tokio::time::timeout(
            FETCH_TIMEOUT,
            self.http_client.execute(HttpRequest::get(url)),
        )
        .await
        .map_err(|_| SyncError::Timeout)?
        .map_err(|e| SyncError::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(SyncError::Backend(backend_error_message(&response)));
        }

        let payload: UsersPayload = response
            .json()
            .map_err(|e| SyncError::Malformed(e.to_string()))?;

        let params = self.params.read().await.clone();
        Ok(pipeline::synchronize(
            &payload.users,
            &params.user_email,
            params.user_id.as_deref(),
            &params.section,
        ))
    }

    /// Reconciles a full snapshot pushed over the WebSocket. Runs the same
    /// pipeline as `load_chats`, then preserves the user's selection when
    /// the previously selected chat survives the refresh.
    pub(crate) async fn apply_snapshot(&self, users: Vec<RawUser>) {
        let params = self.params.read().await.clone();
        let chats = pipeline::synchronize(
            &users,
            &params.user_email,
            params.user_id.as_deref(),
            &params.section,
        );
        info!(
            target: "Client/Sync",
            "Reconciled snapshot: {} chats in section {:?}",
            chats.len(),
            params.section
        );
        let previous = self.state.read().await.selected.clone();
        self.commit_ready(chats, previous, None).await;
    }

    /// Installs a freshly built collection. Selection falls back to the
    /// first entry when the preferred id is absent, or clears when the set
    /// is empty. When a generation token is given it is re-checked under
    /// the state write lock, so a stale result can never land after a
    /// newer load has already committed.
    async fn commit_ready(
        &self,
        chats: Vec<ChatInstance>,
        preferred: Option<String>,
        generation: Option<u64>,
    ) {
        let selected = preferred
            .filter(|id| chats.iter().any(|chat| chat.id() == id))
            .or_else(|| chats.first().map(|chat| chat.id().to_string()));

        let shared = Arc::new(chats.clone());
        {
            let mut state = self.state.write().await;
            if let Some(generation) = generation
                && self.is_stale(generation)
            {
                return;
            }
            state.chats = chats;
            state.selected = selected;
            state.error = None;
            state.phase = Phase::Ready;
        }
        let _ = self.event_bus.chats_refreshed.send(shared);
        let _ = self.event_bus.state_changed.send(Arc::new(Phase::Ready));
    }
}
