//! Process-local community store used when no backend is configured and in tests.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dao::{
    community_store::CommunityStore,
    models::{
        ApplicationEntity, ApplicationFilter, ApplicationStatus, NotificationEntity, StatusCount,
    },
    storage::{StorageError, StorageResult},
};

/// Failures simulated by the in-memory store.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// The store was switched offline.
    #[error("in-memory store is offline")]
    Offline,
    /// Notification delivery was switched off.
    #[error("notification function `{function}` is unreachable")]
    NotificationFailed { function: String },
}

impl From<MemoryStoreError> for StorageError {
    fn from(err: MemoryStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// In-process store used by tests and local runs without a backend.
#[derive(Clone, Default)]
pub struct MemoryCommunityStore {
    applications: Arc<DashMap<Uuid, ApplicationEntity>>,
    notifications: Arc<Mutex<Vec<(String, NotificationEntity)>>>,
    offline: Arc<AtomicBool>,
    notifications_down: Arc<AtomicBool>,
}

impl MemoryCommunityStore {
    /// Empty store, online.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make notification calls fail while leaving the tables reachable.
    pub fn set_notifications_down(&self, down: bool) {
        self.notifications_down.store(down, Ordering::SeqCst);
    }

    /// Notifications delivered so far, with the function they were sent to.
    pub async fn sent_notifications(&self) -> Vec<(String, NotificationEntity)> {
        self.notifications.lock().await.clone()
    }

    fn ensure_online(&self) -> Result<(), MemoryStoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(MemoryStoreError::Offline)
        } else {
            Ok(())
        }
    }
}

impl CommunityStore for MemoryCommunityStore {
    fn insert_application(
        &self,
        application: ApplicationEntity,
    ) -> BoxFuture<'static, StorageResult<ApplicationEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store
                .applications
                .insert(application.id, application.clone());
            Ok(application)
        })
    }

    fn find_application(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ApplicationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.applications.get(&id).map(|entry| entry.clone()))
        })
    }

    fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<ApplicationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut rows: Vec<ApplicationEntity> = store
                .applications
                .iter()
                .filter(|entry| filter.matches(entry.value()))
                .map(|entry| entry.value().clone())
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if let Some(limit) = filter.limit {
                rows.truncate(limit);
            }
            Ok(rows)
        })
    }

    fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        reviewer_note: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<ApplicationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.applications.get_mut(&id).map(|mut entry| {
                entry.status = status;
                entry.reviewer_note = reviewer_note;
                entry.updated_at = SystemTime::now();
                entry.clone()
            }))
        })
    }

    fn application_stats(&self) -> BoxFuture<'static, StorageResult<Vec<StatusCount>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(ApplicationStatus::ALL
                .into_iter()
                .map(|status| StatusCount {
                    status,
                    count: store
                        .applications
                        .iter()
                        .filter(|entry| entry.status == status)
                        .count() as u64,
                })
                .filter(|count| count.count > 0)
                .collect())
        })
    }

    fn notify(
        &self,
        function: &str,
        notification: NotificationEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let function = function.to_string();
        Box::pin(async move {
            store.ensure_online()?;
            if store.notifications_down.load(Ordering::SeqCst) {
                return Err(MemoryStoreError::NotificationFailed { function }.into());
            }
            store.notifications.lock().await.push((function, notification));
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online().map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}
