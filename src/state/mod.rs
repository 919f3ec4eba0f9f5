pub mod gate;
pub mod session;
mod sse;
pub mod watchdog;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::community_store::CommunityStore,
    error::ServiceError,
    services::sse_events,
};

pub use self::gate::{GatePolicy, PanelGate, PanelGrant};
pub use self::session::{GameSession, SessionInner};
pub use self::sse::SseHub;
use self::sse::SseState;

pub type SharedState = Arc<AppState>;

/// Central application state: backend handle, SSE hubs, mounted game sessions
/// and the panel gate.
pub struct AppState {
    store: RwLock<Option<Arc<dyn CommunityStore>>>,
    sse: SseState,
    sessions: DashMap<Uuid, Arc<GameSession>>,
    panel: PanelGate,
    config: AppConfig,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let sse = SseState::new(64, 64);
        let panel = PanelGate::new(
            GatePolicy {
                ttl: config.panel_unlock_ttl,
                idle_timeout: config.panel_idle_timeout,
                idle_warning: config.panel_idle_warning,
            },
            sse.admin().clone(),
        );
        Arc::new(Self {
            store: RwLock::new(None),
            sse,
            sessions: DashMap::new(),
            panel,
            config,
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn CommunityStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] when none is usable.
    pub async fn require_store(&self) -> Result<Arc<dyn CommunityStore>, ServiceError> {
        if *self.degraded.borrow() {
            return Err(ServiceError::Degraded);
        }
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_store(&self, store: Arc<dyn CommunityStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        let changed = self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if changed {
            sse_events::broadcast_system_status(self.public_sse(), value);
        }
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Broadcast hub used for the panel SSE stream.
    pub fn admin_sse(&self) -> &SseHub {
        self.sse.admin()
    }

    /// Two-factor gate protecting the admin panel.
    pub fn panel(&self) -> &PanelGate {
        &self.panel
    }

    /// Registry of mounted game sessions.
    pub fn sessions(&self) -> &DashMap<Uuid, Arc<GameSession>> {
        &self.sessions
    }

    /// Look up a mounted session.
    pub fn session(&self, id: Uuid) -> Option<Arc<GameSession>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }
}
