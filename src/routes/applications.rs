use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::application::{ApplicationResponse, SubmitApplicationRequest},
    error::AppError,
    services::application_service,
    state::SharedState,
};

/// Public application and appeal forms.
pub fn router() -> Router<SharedState> {
    Router::new().route("/applications", post(submit_application))
}

/// Submit a whitelist, staff, creator or ban appeal form.
#[utoipa::path(
    post,
    path = "/applications",
    tag = "applications",
    request_body = SubmitApplicationRequest,
    responses(
        (status = 201, description = "Application received", body = ApplicationResponse),
        (status = 400, description = "Form failed validation"),
        (status = 503, description = "Backend unavailable")
    )
)]
pub async fn submit_application(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubmitApplicationRequest>>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    let created = application_service::submit(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
