//! Applications and appeals: public submission plus the panel review flow
//! (fetch, act, optionally notify, refetch).

use std::{sync::Arc, time::SystemTime};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        community_store::CommunityStore,
        models::{ApplicationEntity, ApplicationFilter, ApplicationStatus, NotificationEntity},
    },
    dto::application::{
        ApplicationResponse, ApplicationStatsResponse, SubmitApplicationRequest,
        UpdateStatusRequest,
    },
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

const NOTIFY_SUBMITTED: &str = "application.submitted";
const NOTIFY_REVIEWED: &str = "application.reviewed";

/// Store a new application in the pending state.
pub async fn submit(
    state: &SharedState,
    request: SubmitApplicationRequest,
) -> Result<ApplicationResponse, ServiceError> {
    let store = state.require_store().await?;

    let now = SystemTime::now();
    let entity = ApplicationEntity {
        id: Uuid::new_v4(),
        kind: request.kind,
        applicant_handle: request.applicant_handle.trim().to_string(),
        character_name: request
            .character_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        age: request.age,
        answers: request.answers,
        status: ApplicationStatus::Pending,
        reviewer_note: None,
        created_at: now,
        updated_at: now,
    };

    let stored = store.insert_application(entity).await?;
    info!(application_id = %stored.id, kind = stored.kind.as_str(), "application submitted");

    notify(state, &store, &stored, NOTIFY_SUBMITTED, None).await;

    let response = ApplicationResponse::from(stored);
    sse_events::broadcast_application_submitted(state.admin_sse(), &response);
    Ok(response)
}

/// Review queue, newest first.
pub async fn list(
    state: &SharedState,
    filter: ApplicationFilter,
) -> Result<Vec<ApplicationResponse>, ServiceError> {
    let store = state.require_store().await?;
    let rows = store.list_applications(filter).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// One application by id.
pub async fn get(state: &SharedState, id: Uuid) -> Result<ApplicationResponse, ServiceError> {
    let store = state.require_store().await?;
    store
        .find_application(id)
        .await?
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("application {id}")))
}

/// Record a reviewer decision. Concurrent reviews overwrite each other.
pub async fn update_status(
    state: &SharedState,
    id: Uuid,
    request: UpdateStatusRequest,
) -> Result<ApplicationResponse, ServiceError> {
    let store = state.require_store().await?;
    let note = request
        .reviewer_note
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty());

    let updated = store
        .update_application_status(id, request.status, note.clone())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("application {id}")))?;
    info!(
        application_id = %id,
        status = request.status.as_str(),
        "application status updated"
    );

    if request.notify_applicant {
        notify(state, &store, &updated, NOTIFY_REVIEWED, note).await;
    }

    let refreshed = store.find_application(id).await?.unwrap_or(updated);
    let response = ApplicationResponse::from(refreshed);
    sse_events::broadcast_application_updated(state.admin_sse(), &response);
    Ok(response)
}

/// Count of applications per status.
pub async fn stats(state: &SharedState) -> Result<ApplicationStatsResponse, ServiceError> {
    let store = state.require_store().await?;
    Ok(store.application_stats().await?.into())
}

/// Fire the notification function. Failures are logged and otherwise ignored.
async fn notify(
    state: &SharedState,
    store: &Arc<dyn CommunityStore>,
    application: &ApplicationEntity,
    event: &str,
    message: Option<String>,
) {
    let function = &state.config().notification_function;
    let notification = NotificationEntity {
        event: event.to_string(),
        application_id: application.id,
        applicant_handle: application.applicant_handle.clone(),
        kind: application.kind,
        status: application.status,
        message,
    };
    if let Err(err) = store.notify(function, notification).await {
        warn!(
            application_id = %application.id,
            function = %function,
            error = %err,
            "notification failed"
        );
    }
}
