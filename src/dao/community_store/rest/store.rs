use std::{sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::{
    community_store::CommunityStore,
    models::{
        ApplicationEntity, ApplicationFilter, ApplicationStatus, NotificationEntity, StatusCount,
    },
    storage::{StorageError, StorageResult},
};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
    models::{
        APPLICATIONS_TABLE, ApplicationRow, STATUS_COUNTS_PROCEDURE, StatusCountRow, StatusPatch,
    },
};

const REST_PREFIX: &str = "rest/v1";
const FUNCTIONS_PREFIX: &str = "functions/v1";
const RETURN_REPRESENTATION: (&str, &str) = ("Prefer", "return=representation");

/// Community store backed by a hosted PostgREST-style gateway.
#[derive(Clone)]
pub struct RestCommunityStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
    schema: Option<Arc<str>>,
}

impl RestCommunityStore {
    /// Build the client and make sure the gateway answers.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::<str>::from(config.api_key),
            schema: config.schema.map(Arc::<str>::from),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self
            .client
            .request(method.clone(), url)
            .header("apikey", self.api_key.as_ref())
            .bearer_auth(self.api_key.as_ref());
        match self.schema {
            Some(ref schema) if method == Method::GET => {
                builder.header("Accept-Profile", schema.as_ref())
            }
            Some(ref schema) => builder.header("Content-Profile", schema.as_ref()),
            None => builder,
        }
    }

    async fn send(path: &str, builder: RequestBuilder) -> RestResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RestDaoError::RequestStatus {
                path: path.to_string(),
                status: response.status(),
            })
        }
    }

    async fn decode<T>(path: &str, response: Response) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        response
            .json::<T>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn select_rows(&self, query: &[(&str, String)]) -> RestResult<Vec<ApplicationRow>> {
        let path = format!("{REST_PREFIX}/{APPLICATIONS_TABLE}");
        let builder = self
            .request(Method::GET, &path)
            .query(&[("select", "*")])
            .query(query);
        let response = Self::send(&path, builder).await?;
        Self::decode(&path, response).await
    }

    async fn ping(&self) -> RestResult<()> {
        let path = format!("{REST_PREFIX}/");
        Self::send(&path, self.request(Method::GET, &path))
            .await
            .map(|_| ())
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

impl CommunityStore for RestCommunityStore {
    fn insert_application(
        &self,
        application: ApplicationEntity,
    ) -> BoxFuture<'static, StorageResult<ApplicationEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let path = format!("{REST_PREFIX}/{APPLICATIONS_TABLE}");
            let row = ApplicationRow::from_entity(application);
            let builder = store
                .request(Method::POST, &path)
                .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
                .json(&row);
            let response = Self::send(&path, builder).await?;
            let rows: Vec<ApplicationRow> = Self::decode(&path, response).await?;
            rows.into_iter()
                .next()
                .map(ApplicationRow::into_entity)
                .ok_or_else(|| StorageError::from(RestDaoError::EmptyRepresentation { path }))
        })
    }

    fn find_application(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ApplicationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store.select_rows(&[("id", eq(id))]).await?;
            Ok(rows.into_iter().next().map(ApplicationRow::into_entity))
        })
    }

    fn list_applications(
        &self,
        filter: ApplicationFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<ApplicationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query = vec![("order", "created_at.desc".to_string())];
            if let Some(kind) = filter.kind {
                query.push(("kind", eq(kind.as_str())));
            }
            if let Some(status) = filter.status {
                query.push(("status", eq(status.as_str())));
            }
            if let Some(limit) = filter.limit {
                query.push(("limit", limit.to_string()));
            }

            let rows = store.select_rows(&query).await?;
            Ok(rows.into_iter().map(ApplicationRow::into_entity).collect())
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
            let path = format!("{REST_PREFIX}/{APPLICATIONS_TABLE}");
            let patch = StatusPatch {
                status,
                reviewer_note,
                updated_at: OffsetDateTime::from(SystemTime::now()),
            };
            let builder = store
                .request(Method::PATCH, &path)
                .query(&[("id", eq(id))])
                .header(RETURN_REPRESENTATION.0, RETURN_REPRESENTATION.1)
                .json(&patch);
            let response = Self::send(&path, builder).await?;
            let rows: Vec<ApplicationRow> = Self::decode(&path, response).await?;
            Ok(rows.into_iter().next().map(ApplicationRow::into_entity))
        })
    }

    fn application_stats(&self) -> BoxFuture<'static, StorageResult<Vec<StatusCount>>> {
        let store = self.clone();
        Box::pin(async move {
            let path = format!("{REST_PREFIX}/rpc/{STATUS_COUNTS_PROCEDURE}");
            let builder = store
                .request(Method::POST, &path)
                .json(&serde_json::json!({}));
            let response = Self::send(&path, builder).await?;
            let rows: Vec<StatusCountRow> = Self::decode(&path, response).await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn notify(
        &self,
        function: &str,
        notification: NotificationEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let path = format!("{FUNCTIONS_PREFIX}/{function}");
        Box::pin(async move {
            let builder = store.request(Method::POST, &path).json(&notification);
            Self::send(&path, builder).await?;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}
