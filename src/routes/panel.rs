use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_valid::Valid;
use serde::Deserialize;

use crate::{
    dto::panel::{PanelSessionResponse, UnlockRequest},
    error::AppError,
    services::panel_service,
    state::SharedState,
};

const PANEL_TOKEN_HEADER: &str = "x-panel-token";

/// Token of the current panel session, inserted by [`require_panel_token`].
#[derive(Clone, Debug)]
pub struct PanelToken(pub String);

#[derive(Deserialize)]
struct PanelTokenQuery {
    panel_token: Option<String>,
}

/// Panel unlock and session management.
pub fn router(state: SharedState) -> Router<SharedState> {
    let gated = Router::new()
        .route("/panel/session", get(session))
        .route("/panel/lock", post(lock))
        .route_layer(middleware::from_fn_with_state(state, require_panel_token));

    Router::new().route("/panel/unlock", post(unlock)).merge(gated)
}

/// Exchange the second-factor code for a panel token.
#[utoipa::path(
    post,
    path = "/panel/unlock",
    tag = "panel",
    request_body = UnlockRequest,
    responses(
        (status = 200, description = "Panel unlocked", body = PanelSessionResponse),
        (status = 400, description = "Malformed code"),
        (status = 401, description = "Wrong code or gate disabled")
    )
)]
pub async fn unlock(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<UnlockRequest>>,
) -> Result<Json<PanelSessionResponse>, AppError> {
    Ok(Json(panel_service::unlock(&state, &payload)?))
}

/// Describe the current panel session.
#[utoipa::path(
    get,
    path = "/panel/session",
    tag = "panel",
    params(("X-Panel-Token" = String, Header, description = "Token issued by /panel/unlock")),
    responses(
        (status = 200, description = "Session is active", body = PanelSessionResponse),
        (status = 401, description = "Missing or expired token")
    )
)]
pub async fn session(
    State(state): State<SharedState>,
    Extension(PanelToken(token)): Extension<PanelToken>,
) -> Result<Json<PanelSessionResponse>, AppError> {
    Ok(Json(panel_service::status(&state, &token)?))
}

/// Lock the panel, dropping the current token.
#[utoipa::path(
    post,
    path = "/panel/lock",
    tag = "panel",
    params(("X-Panel-Token" = String, Header, description = "Token issued by /panel/unlock")),
    responses((status = 204, description = "Panel locked"))
)]
pub async fn lock(
    State(state): State<SharedState>,
    Extension(PanelToken(token)): Extension<PanelToken>,
) -> Result<StatusCode, AppError> {
    panel_service::lock(&state, &token)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reject requests without a live panel token. The `panel_token` query
/// parameter is accepted for clients that cannot set headers (EventSource).
pub async fn require_panel_token(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let from_header = req
        .headers()
        .get(PANEL_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned());
    let provided = from_header
        .or_else(|| {
            Query::<PanelTokenQuery>::try_from_uri(req.uri())
                .ok()
                .and_then(|Query(query)| query.panel_token)
        })
        .ok_or_else(|| {
            AppError::Unauthorized("missing panel token header `X-Panel-Token`".into())
        })?;

    if state.panel().verify(&provided).is_none() {
        return Err(AppError::Unauthorized("panel session expired".into()));
    }

    req.extensions_mut().insert(PanelToken(provided));
    Ok(next.run(req).await)
}
