use crate::config::ClientConfig;
use crate::types::events::EventBus;
use inboxcore::net::{HttpClient, TransportFactory};
use inboxcore::types::view::ChatInstance;
use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};
use tokio::sync::{Mutex, Notify, RwLock};

/// Which inbox view this synchronizer serves. Informational tag only; it
/// does not filter by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxType {
    Human,
    Agent,
}

/// Construction parameters. A section or identity change updates these and
/// triggers a full reload.
#[derive(Debug, Clone)]
pub struct InboxParams {
    pub inbox_type: InboxType,
    pub user_email: String,
    /// Takes priority over the email for ownership filtering when present
    /// and the email is not a sentinel.
    pub user_id: Option<String>,
    pub section: String,
}

/// Load lifecycle. `Ready` and `Error` both accept a new load; there is no
/// retrying state; failures are terminal until the next explicit trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// The view-model state presentation reads. Rebuilt wholesale, never
/// patched field-by-field; on any load error it is empty with a cleared
/// selection, never partial.
#[derive(Debug, Clone)]
pub struct InboxState {
    pub phase: Phase,
    pub chats: Vec<ChatInstance>,
    pub selected: Option<String>,
    pub error: Option<String>,
}

impl InboxState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            chats: Vec::new(),
            selected: None,
            error: None,
        }
    }

    /// The currently selected instance, if any.
    pub fn selected_chat(&self) -> Option<&ChatInstance> {
        let id = self.selected.as_deref()?;
        self.chats.iter().find(|chat| chat.id() == id)
    }
}

/// The unified chat view-model synchronizer.
///
/// Owns the `ChatInstance` collection and the selection pointer
/// exclusively; presentation components read snapshots and invoke the
/// mutation methods.
pub struct SyncClient {
    pub(crate) config: ClientConfig,
    pub(crate) params: RwLock<InboxParams>,
    pub(crate) http_client: Arc<dyn HttpClient>,
    pub(crate) transport_factory: Arc<dyn TransportFactory>,

    pub(crate) state: RwLock<InboxState>,
    /// Monotonically increasing load token. A finished load only commits
    /// when its token is still the latest issued, so a stale in-flight
    /// result can never overwrite a newer one.
    pub(crate) load_generation: AtomicU64,

    pub(crate) is_connected: AtomicBool,
    pub(crate) is_running: AtomicBool,
    pub(crate) shutdown_notifier: Notify,
    pub(crate) transport: Mutex<Option<Arc<dyn inboxcore::net::Transport>>>,

    pub event_bus: EventBus,
}

impl SyncClient {
    pub fn new(
        config: ClientConfig,
        params: InboxParams,
        http_client: Arc<dyn HttpClient>,
        transport_factory: Arc<dyn TransportFactory>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            params: RwLock::new(params),
            http_client,
            transport_factory,
            state: RwLock::new(InboxState::new()),
            load_generation: AtomicU64::new(0),
            is_connected: AtomicBool::new(false),
            is_running: AtomicBool::new(false),
            shutdown_notifier: Notify::new(),
            transport: Mutex::new(None),
            event_bus: EventBus::new(),
        })
    }

    /// Cheap clone of the current view-model state.
    pub async fn snapshot(&self) -> InboxState {
        self.state.read().await.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(std::sync::atomic::Ordering::Acquire)
    }

    /// Swaps the section/identity parameters and reloads. Equivalent to
    /// the dashboard remounting the inbox with new props.
    pub async fn update_params(&self, params: InboxParams) {
        {
            let mut guard = self.params.write().await;
            debug!(
                target: "Client/Sync",
                "Parameter change: section {:?} -> {:?}",
                guard.section, params.section
            );
            *guard = params;
        }
        self.load_chats().await;
    }

    /// Moves the selection pointer. Unknown ids are ignored.
    pub async fn select_chat(&self, chat_id: &str) {
        let mut state = self.state.write().await;
        if state.chats.iter().any(|chat| chat.id() == chat_id) {
            state.selected = Some(chat_id.to_string());
        } else {
            debug!(target: "Client/Sync", "Ignoring selection of unknown chat {chat_id}");
        }
    }

    pub(crate) async fn set_phase(&self, phase: Phase) {
        self.state.write().await.phase = phase;
        let _ = self.event_bus.state_changed.send(Arc::new(phase));
    }
}
