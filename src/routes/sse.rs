use std::convert::Infallible;

use axum::{
    Extension, Router,
    extract::State,
    middleware,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;

use crate::{
    error::AppError,
    routes::panel::{PanelToken, require_panel_token},
    services::sse_service::{self, StreamKind},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Public SSE stream", content_type = "text/event-stream", body = String))
)]
/// Stream realtime public events to connected frontends.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = sse_service::subscribe_public(&state);
    let greeting = sse_service::handshake(&state, StreamKind::Public).await;
    sse_service::to_sse_stream(receiver, StreamKind::Public, greeting, None)
}

#[utoipa::path(
    get,
    path = "/sse/admin",
    tag = "sse",
    params(("panel_token" = String, Query, description = "Token issued by /panel/unlock")),
    responses(
        (status = 200, description = "Panel SSE stream", content_type = "text/event-stream", body = String),
        (status = 401, description = "Missing or expired token")
    )
)]
/// Stream panel events: new applications, status changes and session expiry.
/// The stream ends once the panel session that opened it is gone.
pub async fn admin_stream(
    State(state): State<SharedState>,
    Extension(PanelToken(token)): Extension<PanelToken>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let closed = state
        .panel()
        .closed_signal(&token)
        .ok_or_else(|| AppError::Unauthorized("panel session expired".into()))?;
    let receiver = sse_service::subscribe_admin(&state);
    let greeting = sse_service::handshake(&state, StreamKind::Admin).await;
    Ok(sse_service::to_sse_stream(
        receiver,
        StreamKind::Admin,
        greeting,
        Some(closed),
    ))
}

/// Configure the SSE endpoints.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/public", get(public_stream))
        .route(
            "/sse/admin",
            get(admin_stream).route_layer(middleware::from_fn_with_state(
                state,
                require_panel_token,
            )),
        )
}
