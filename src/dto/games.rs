use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_system_time,
    games::{GameKind, Phase},
};

/// Catalogue entry describing a playable mini-game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameCatalogEntry {
    pub kind: GameKind,
    pub title: String,
    pub description: String,
}

impl From<GameKind> for GameCatalogEntry {
    fn from(kind: GameKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            description: kind.description().to_string(),
        }
    }
}

/// Mount request for a new game session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub kind: GameKind,
    /// Fixed RNG seed, for reproducible rounds.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Game-specific action object, tagged by `type`, e.g. `{"type": "start"}`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct GameActionRequest(pub Value);

/// Full state of a mounted session as seen by the player.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub kind: GameKind,
    pub phase: Phase,
    /// Increments on every phase transition.
    pub version: usize,
    /// True while a timer drives the game.
    pub ticking: bool,
    pub created_at: String,
    /// Game-specific view.
    #[schema(value_type = Object)]
    pub view: Value,
}

impl SessionSnapshot {
    pub(crate) fn new(
        id: Uuid,
        kind: GameKind,
        phase: Phase,
        version: usize,
        ticking: bool,
        created_at: std::time::SystemTime,
        view: Value,
    ) -> Self {
        Self {
            id,
            kind,
            phase,
            version,
            ticking,
            created_at: format_system_time(created_at),
            view,
        }
    }
}
