use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report degraded mode and session counts while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    let game_sessions = state.sessions().len();
    let panel_sessions = state.panel().active_sessions();
    if state.is_degraded().await {
        HealthResponse::degraded(game_sessions, panel_sessions)
    } else {
        HealthResponse::ok(game_sessions, panel_sessions)
    }
}
