pub mod memory;
#[cfg(feature = "rest-store")]
pub mod rest;

use crate::dao::models::{
    ApplicationEntity, ApplicationFilter, ApplicationStatus, NotificationEntity, StatusCount,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Narrow repository over the community backend: application rows, review
/// statistics and outbound notifications.
pub trait CommunityStore: Send + Sync {
    /// Store a new application and return the stored row.
    fn insert_application(
        &self,
        application: ApplicationEntity,
    ) -> BoxFuture<'static, StorageResult<ApplicationEntity>>;
    /// Fetch one application by id.
    fn find_application(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ApplicationEntity>>>;
    /// Newest first.
    fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<ApplicationEntity>>>;
    /// Overwrites status and note unconditionally; `None` when the row does not exist.
    fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        reviewer_note: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<ApplicationEntity>>>;
    /// Application counts per status.
    fn application_stats(&self) -> BoxFuture<'static, StorageResult<Vec<StatusCount>>>;
    /// Invoke the backend function `function` with a notification payload.
    fn notify(
        &self,
        function: &str,
        notification: NotificationEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap round-trip to check the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failure.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
