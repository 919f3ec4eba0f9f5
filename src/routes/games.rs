use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::{get, post},
};
use futures::Stream;
use uuid::Uuid;

use crate::{
    dto::games::{CreateSessionRequest, GameActionRequest, GameCatalogEntry, SessionSnapshot},
    error::AppError,
    services::{
        game_service,
        sse_service::{self, StreamKind},
    },
    state::SharedState,
};

/// Mini-game catalogue and session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/sessions", post(mount_session))
        .route(
            "/games/sessions/{id}",
            get(get_session).delete(unmount_session),
        )
        .route("/games/sessions/{id}/actions", post(apply_action))
        .route("/games/sessions/{id}/reset", post(reset_session))
        .route("/games/sessions/{id}/events", get(session_events))
}

/// List the playable mini-games.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses((status = 200, description = "Game catalogue", body = [GameCatalogEntry]))
)]
pub async fn list_games() -> Json<Vec<GameCatalogEntry>> {
    Json(game_service::catalogue())
}

/// Mount a new game session.
#[utoipa::path(
    post,
    path = "/games/sessions",
    tag = "games",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session mounted", body = SessionSnapshot),
        (status = 409, description = "Too many sessions")
    )
)]
pub async fn mount_session(
    State(state): State<SharedState>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let snapshot = game_service::mount(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Current snapshot of one session.
#[utoipa::path(
    get,
    path = "/games/sessions/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Current session state", body = SessionSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(game_service::get(&state, id).await?))
}

/// Apply a player action.
#[utoipa::path(
    post,
    path = "/games/sessions/{id}/actions",
    tag = "games",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = GameActionRequest,
    responses(
        (status = 200, description = "State after the action", body = SessionSnapshot),
        (status = 400, description = "Action rejected by the game"),
        (status = 409, description = "Action not allowed in the current phase")
    )
)]
pub async fn apply_action(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(GameActionRequest(action)): Json<GameActionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(game_service::act(&state, id, action).await?))
}

/// Return the session to its initial state.
#[utoipa::path(
    post,
    path = "/games/sessions/{id}/reset",
    tag = "games",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses((status = 200, description = "Session reset", body = SessionSnapshot))
)]
pub async fn reset_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(game_service::reset(&state, id).await?))
}

/// Unmount a session, stopping its timer.
#[utoipa::path(
    delete,
    path = "/games/sessions/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session unmounted"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn unmount_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    game_service::unmount(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stream `game.state` snapshots of one session.
#[utoipa::path(
    get,
    path = "/games/sessions/{id}/events",
    tag = "games",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses((status = 200, description = "Session SSE stream", content_type = "text/event-stream", body = String))
)]
pub async fn session_events(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let receiver = sse_service::subscribe_game(&state, id)?;
    let greeting = sse_service::handshake(&state, StreamKind::Game(id)).await;
    Ok(sse_service::to_sse_stream(
        receiver,
        StreamKind::Game(id),
        greeting,
        None,
    ))
}
