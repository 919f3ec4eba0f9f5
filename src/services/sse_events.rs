use std::time::Duration;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::{
        application::ApplicationResponse,
        games::SessionSnapshot,
        sse::{
            GameCloseReason, GameClosed, GameIdleWarning, PanelExpiryReason, PanelSessionExpired,
            PanelSessionWarning, ServerEvent, SystemStatus,
        },
    },
    state::SseHub,
};

const EVENT_SYSTEM_STATUS: &str = "system.status";
const EVENT_APPLICATION_SUBMITTED: &str = "application.submitted";
const EVENT_APPLICATION_UPDATED: &str = "application.updated";
const EVENT_PANEL_WARNING: &str = "panel.session_warning";
const EVENT_PANEL_EXPIRED: &str = "panel.session_expired";
const EVENT_GAME_STATE: &str = "game.state";
const EVENT_GAME_IDLE_WARNING: &str = "game.idle_warning";
const EVENT_GAME_CLOSED: &str = "game.closed";

/// Broadcast a degraded mode change on the public stream.
pub fn broadcast_system_status(hub: &SseHub, degraded: bool) {
    send_event(hub, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Tell panel subscribers a new application arrived.
pub fn broadcast_application_submitted(hub: &SseHub, application: &ApplicationResponse) {
    send_event(hub, EVENT_APPLICATION_SUBMITTED, application);
}

/// Tell panel subscribers an application changed status.
pub fn broadcast_application_updated(hub: &SseHub, application: &ApplicationResponse) {
    send_event(hub, EVENT_APPLICATION_UPDATED, application);
}

/// Warn a panel session that it is about to be dropped for inactivity.
pub fn broadcast_panel_warning(hub: &SseHub, session_id: Uuid, remaining: Duration) {
    let payload = PanelSessionWarning {
        session_id,
        remaining_secs: remaining.as_secs(),
    };
    send_event(hub, EVENT_PANEL_WARNING, &payload);
}

/// Announce the end of a panel session.
pub fn broadcast_panel_expired(hub: &SseHub, session_id: Uuid, reason: PanelExpiryReason) {
    let payload = PanelSessionExpired { session_id, reason };
    send_event(hub, EVENT_PANEL_EXPIRED, &payload);
}

/// Publish the latest state of a game session.
pub fn broadcast_game_state(hub: &SseHub, snapshot: &SessionSnapshot) {
    send_event(hub, EVENT_GAME_STATE, snapshot);
}

/// Warn a game session that it is about to be unmounted for inactivity.
pub fn broadcast_game_idle_warning(hub: &SseHub, session_id: Uuid, remaining: Duration) {
    let payload = GameIdleWarning {
        session_id,
        remaining_secs: remaining.as_secs(),
    };
    send_event(hub, EVENT_GAME_IDLE_WARNING, &payload);
}

/// Final event of a game session stream.
pub fn broadcast_game_closed(hub: &SseHub, session_id: Uuid, reason: GameCloseReason) {
    send_event(hub, EVENT_GAME_CLOSED, &GameClosed { session_id, reason });
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
