use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{
        ApplicationEntity, ApplicationFilter, ApplicationKind, ApplicationStatus, StatusCount,
    },
    dto::{
        format_system_time,
        validation::{validate_answers, validate_handle},
    },
};

/// Upper bound on rows returned by one listing call.
const MAX_PAGE: usize = 200;

/// Application or appeal submitted from one of the public forms.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitApplicationRequest {
    pub kind: ApplicationKind,
    #[validate(
        length(min = 2, max = 64),
        custom(function = "validate_handle")
    )]
    pub applicant_handle: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub character_name: Option<String>,
    #[serde(default)]
    #[validate(range(min = 13, max = 99))]
    pub age: Option<u8>,
    /// Question → answer, in the order the form asked them.
    #[validate(custom(function = "validate_answers"))]
    #[schema(value_type = Object)]
    pub answers: IndexMap<String, String>,
}

/// Reviewer decision on an application.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub reviewer_note: Option<String>,
    /// Send the applicant a notification about the decision.
    #[serde(default)]
    pub notify_applicant: bool,
}

/// Listing filters for the review queue.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListApplicationsQuery {
    pub kind: Option<ApplicationKind>,
    pub status: Option<ApplicationStatus>,
    /// Defaults to and is capped at 200.
    pub limit: Option<usize>,
}

impl From<ListApplicationsQuery> for ApplicationFilter {
    fn from(query: ListApplicationsQuery) -> Self {
        Self {
            kind: query.kind,
            status: query.status,
            limit: Some(query.limit.unwrap_or(MAX_PAGE).min(MAX_PAGE)),
        }
    }
}

/// Application as exposed over HTTP.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub kind: ApplicationKind,
    pub applicant_handle: String,
    pub character_name: Option<String>,
    pub age: Option<u8>,
    #[schema(value_type = Object)]
    pub answers: IndexMap<String, String>,
    pub status: ApplicationStatus,
    pub reviewer_note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ApplicationEntity> for ApplicationResponse {
    fn from(entity: ApplicationEntity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind,
            applicant_handle: entity.applicant_handle,
            character_name: entity.character_name,
            age: entity.age,
            answers: entity.answers,
            status: entity.status,
            reviewer_note: entity.reviewer_note,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Count of applications in one status.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCountDto {
    pub status: ApplicationStatus,
    pub count: u64,
}

/// Review queue statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicationStatsResponse {
    pub total: u64,
    /// One entry per status, zero counts included.
    pub by_status: Vec<StatusCountDto>,
}

impl From<Vec<StatusCount>> for ApplicationStatsResponse {
    fn from(counts: Vec<StatusCount>) -> Self {
        let by_status: Vec<StatusCountDto> = ApplicationStatus::ALL
            .into_iter()
            .map(|status| StatusCountDto {
                status,
                count: counts
                    .iter()
                    .filter(|entry| entry.status == status)
                    .map(|entry| entry.count)
                    .sum(),
            })
            .collect();
        Self {
            total: by_status.iter().map(|entry| entry.count).sum(),
            by_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(handle: &str, age: Option<u8>, answers: &[(&str, &str)]) -> SubmitApplicationRequest {
        SubmitApplicationRequest {
            kind: ApplicationKind::Whitelist,
            applicant_handle: handle.into(),
            character_name: None,
            age,
            answers: answers
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
        }
    }

    #[test]
    fn well_formed_request_passes() {
        assert!(request("night_owl", Some(19), &[("why", "fun")]).validate().is_ok());
    }

    #[test]
    fn bounds_are_enforced() {
        assert!(request("x", None, &[("why", "fun")]).validate().is_err());
        assert!(request("night owl", None, &[("why", "fun")]).validate().is_err());
        assert!(request("night_owl", Some(12), &[("why", "fun")]).validate().is_err());
        assert!(request("night_owl", Some(100), &[("why", "fun")]).validate().is_err());
        assert!(request("night_owl", None, &[]).validate().is_err());
    }

    #[test]
    fn stats_fill_missing_statuses() {
        let stats = ApplicationStatsResponse::from(vec![
            StatusCount {
                status: ApplicationStatus::Pending,
                count: 4,
            },
            StatusCount {
                status: ApplicationStatus::OnHold,
                count: 1,
            },
        ]);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.by_status.len(), ApplicationStatus::ALL.len());
        assert_eq!(stats.by_status[0].count, 4);
        assert_eq!(stats.by_status[1].count, 0);
    }

    #[test]
    fn listing_limit_is_capped() {
        let filter: ApplicationFilter = ListApplicationsQuery {
            limit: Some(10_000),
            ..ListApplicationsQuery::default()
        }
        .into();
        assert_eq!(filter.limit, Some(MAX_PAGE));
    }
}
