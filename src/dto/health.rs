use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Mounted mini-game sessions.
    pub game_sessions: usize,
    /// Unlocked panel sessions.
    pub panel_sessions: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(game_sessions: usize, panel_sessions: usize) -> Self {
        Self {
            status: "ok".to_string(),
            game_sessions,
            panel_sessions,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(game_sessions: usize, panel_sessions: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            game_sessions,
            panel_sessions,
        }
    }
}
