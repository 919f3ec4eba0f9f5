use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the RP portal backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::mount_session,
        crate::routes::games::get_session,
        crate::routes::games::apply_action,
        crate::routes::games::reset_session,
        crate::routes::games::unmount_session,
        crate::routes::games::session_events,
        crate::routes::applications::submit_application,
        crate::routes::panel::unlock,
        crate::routes::panel::session,
        crate::routes::panel::lock,
        crate::routes::admin::list_applications,
        crate::routes::admin::application_stats,
        crate::routes::admin::get_application,
        crate::routes::admin::update_status,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::games::GameCatalogEntry,
            crate::dto::games::CreateSessionRequest,
            crate::dto::games::GameActionRequest,
            crate::dto::games::SessionSnapshot,
            crate::dto::application::SubmitApplicationRequest,
            crate::dto::application::UpdateStatusRequest,
            crate::dto::application::ApplicationResponse,
            crate::dto::application::StatusCountDto,
            crate::dto::application::ApplicationStatsResponse,
            crate::dto::panel::UnlockRequest,
            crate::dto::panel::PanelSessionResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::PanelSessionWarning,
            crate::dto::sse::PanelSessionExpired,
            crate::dto::sse::GameIdleWarning,
            crate::dto::sse::GameClosed,
            crate::dao::models::ApplicationKind,
            crate::dao::models::ApplicationStatus,
            crate::games::GameKind,
            crate::games::Phase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Mini-game catalogue and sessions"),
        (name = "applications", description = "Public application and appeal forms"),
        (name = "panel", description = "Two-factor unlock of the admin panel"),
        (name = "admin", description = "Application review, panel token required"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
