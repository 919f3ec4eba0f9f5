use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already-encoded payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`public`, `admin` or `game`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

/// Why a panel session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PanelExpiryReason {
    /// No gated request within the idle timeout.
    Idle,
    /// Hard lifetime elapsed.
    Ttl,
    /// Explicitly locked.
    Locked,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent on the admin stream shortly before an idle panel session is dropped.
pub struct PanelSessionWarning {
    pub session_id: Uuid,
    pub remaining_secs: u64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent on the admin stream once a panel session is gone.
pub struct PanelSessionExpired {
    pub session_id: Uuid,
    pub reason: PanelExpiryReason,
}

/// Why a game session stream is closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameCloseReason {
    /// Unmounted by the idle watchdog.
    Idle,
    /// Unmounted on request.
    Unmounted,
}

#[derive(Debug, Serialize, ToSchema)]
/// Sent on a game stream shortly before an idle session is unmounted.
pub struct GameIdleWarning {
    pub session_id: Uuid,
    pub remaining_secs: u64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Last event of a game stream.
pub struct GameClosed {
    pub session_id: Uuid,
    pub reason: GameCloseReason,
}
