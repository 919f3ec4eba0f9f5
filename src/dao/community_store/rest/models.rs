use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{ApplicationEntity, ApplicationKind, ApplicationStatus, StatusCount};

pub(super) const APPLICATIONS_TABLE: &str = "applications";
pub(super) const STATUS_COUNTS_PROCEDURE: &str = "application_status_counts";

/// Row shape of the `applications` table.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ApplicationRow {
    pub id: Uuid,
    pub kind: ApplicationKind,
    pub applicant_handle: String,
    #[serde(default)]
    pub character_name: Option<String>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub answers: IndexMap<String, String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub reviewer_note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ApplicationRow {
    pub fn from_entity(entity: ApplicationEntity) -> Self {
        Self {
            id: entity.id,
            kind: entity.kind,
            applicant_handle: entity.applicant_handle,
            character_name: entity.character_name,
            age: entity.age,
            answers: entity.answers,
            status: entity.status,
            reviewer_note: entity.reviewer_note,
            created_at: entity.created_at.into(),
            updated_at: entity.updated_at.into(),
        }
    }

    pub fn into_entity(self) -> ApplicationEntity {
        ApplicationEntity {
            id: self.id,
            kind: self.kind,
            applicant_handle: self.applicant_handle,
            character_name: self.character_name,
            age: self.age,
            answers: self.answers,
            status: self.status,
            reviewer_note: self.reviewer_note,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

/// Partial update sent when a reviewer changes the status.
#[derive(Debug, Serialize)]
pub(super) struct StatusPatch {
    pub status: ApplicationStatus,
    pub reviewer_note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// One row returned by the status count procedure.
#[derive(Debug, Deserialize)]
pub(super) struct StatusCountRow {
    pub status: ApplicationStatus,
    pub count: i64,
}

impl From<StatusCountRow> for StatusCount {
    fn from(row: StatusCountRow) -> Self {
        Self {
            status: row.status,
            count: u64::try_from(row.count).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_decodes_rfc3339_timestamps_and_text_statuses() {
        let row: ApplicationRow = serde_json::from_value(serde_json::json!({
            "id": "9b2f6c1e-3d4a-4b5c-8d9e-0f1a2b3c4d5e",
            "kind": "ban_appeal",
            "applicant_handle": "rook",
            "answers": { "what happened": "misunderstanding" },
            "status": "on_hold",
            "created_at": "2024-03-01T12:00:00Z",
            "updated_at": "2024-03-02T08:30:00+01:00"
        }))
        .unwrap();

        let entity = row.into_entity();
        assert_eq!(entity.kind, ApplicationKind::BanAppeal);
        assert_eq!(entity.status, ApplicationStatus::OnHold);
        assert_eq!(entity.age, None);
        assert!(entity.updated_at > entity.created_at);
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let count: StatusCount = StatusCountRow {
            status: ApplicationStatus::Closed,
            count: -3,
        }
        .into();
        assert_eq!(count.count, 0);
    }
}
