use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::application::{
        ApplicationResponse, ApplicationStatsResponse, ListApplicationsQuery, UpdateStatusRequest,
    },
    error::AppError,
    routes::panel::require_panel_token,
    services::application_service,
    state::SharedState,
};

/// Review endpoints, only reachable with an unlocked panel.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/applications", get(list_applications))
        .route("/admin/applications/stats", get(application_stats))
        .route("/admin/applications/{id}", get(get_application))
        .route(
            "/admin/applications/{id}/status",
            post(update_status).put(update_status),
        )
        .route_layer(middleware::from_fn_with_state(state, require_panel_token))
}

/// Review queue, newest first.
#[utoipa::path(
    get,
    path = "/admin/applications",
    tag = "admin",
    params(
        ("X-Panel-Token" = String, Header, description = "Token issued by /panel/unlock"),
        ListApplicationsQuery
    ),
    responses((status = 200, description = "Matching applications", body = [ApplicationResponse]))
)]
pub async fn list_applications(
    State(state): State<SharedState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationResponse>>, AppError> {
    Ok(Json(application_service::list(&state, query.into()).await?))
}

/// Count of applications per status.
#[utoipa::path(
    get,
    path = "/admin/applications/stats",
    tag = "admin",
    params(("X-Panel-Token" = String, Header, description = "Token issued by /panel/unlock")),
    responses((status = 200, description = "Status counts", body = ApplicationStatsResponse))
)]
pub async fn application_stats(
    State(state): State<SharedState>,
) -> Result<Json<ApplicationStatsResponse>, AppError> {
    Ok(Json(application_service::stats(&state).await?))
}

/// Retrieve an application by its identifier.
#[utoipa::path(
    get,
    path = "/admin/applications/{id}",
    tag = "admin",
    params(
        ("X-Panel-Token" = String, Header, description = "Token issued by /panel/unlock"),
        ("id" = Uuid, Path, description = "Identifier of the application")
    ),
    responses(
        (status = 200, description = "Application", body = ApplicationResponse),
        (status = 404, description = "Unknown application")
    )
)]
pub async fn get_application(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationResponse>, AppError> {
    Ok(Json(application_service::get(&state, id).await?))
}

/// Record a reviewer decision and optionally notify the applicant.
#[utoipa::path(
    post,
    path = "/admin/applications/{id}/status",
    tag = "admin",
    params(
        ("X-Panel-Token" = String, Header, description = "Token issued by /panel/unlock"),
        ("id" = Uuid, Path, description = "Identifier of the application")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated application", body = ApplicationResponse),
        (status = 400, description = "Invalid transition payload"),
        (status = 404, description = "Unknown application")
    )
)]
pub async fn update_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateStatusRequest>>,
) -> Result<Json<ApplicationResponse>, AppError> {
    Ok(Json(
        application_service::update_status(&state, id, payload).await?,
    ))
}
