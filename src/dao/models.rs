use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Which form an application was submitted through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    /// Server whitelist request.
    Whitelist,
    /// Staff recruitment.
    Staff,
    /// Content creator partnership.
    Creator,
    /// Appeal against a ban.
    BanAppeal,
}

/// Review status of an application.
///
/// The remote column is free text; `on_hold` and `closed` are accepted alongside
/// the three review outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Awaiting review.
    Pending,
    /// Accepted by a reviewer.
    Approved,
    /// Refused by a reviewer.
    Rejected,
    /// Parked until more information is available.
    OnHold,
    /// Archived without a decision.
    Closed,
}

impl ApplicationStatus {
    /// Every status in display order.
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::OnHold,
        ApplicationStatus::Closed,
    ];

    /// Wire name used in filters and notifications.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::OnHold => "on_hold",
            ApplicationStatus::Closed => "closed",
        }
    }
}

impl ApplicationKind {
    /// Wire name used in filters and notifications.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationKind::Whitelist => "whitelist",
            ApplicationKind::Staff => "staff",
            ApplicationKind::Creator => "creator",
            ApplicationKind::BanAppeal => "ban_appeal",
        }
    }
}

/// Application or appeal as stored in the community backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationEntity {
    /// Stable identifier.
    pub id: Uuid,
    /// Form the application came from.
    pub kind: ApplicationKind,
    /// Community handle of the applicant.
    pub applicant_handle: String,
    /// In-game character the application is about, if any.
    pub character_name: Option<String>,
    /// Declared age.
    pub age: Option<u8>,
    /// Free-form answers keyed by question, in submission order.
    pub answers: IndexMap<String, String>,
    /// Current review status.
    pub status: ApplicationStatus,
    /// Note left by the last reviewer.
    pub reviewer_note: Option<String>,
    /// Submission time.
    pub created_at: SystemTime,
    /// Last status change.
    pub updated_at: SystemTime,
}

/// Optional filters applied when listing applications.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFilter {
    /// Restrict to one form.
    pub kind: Option<ApplicationKind>,
    /// Restrict to one status.
    pub status: Option<ApplicationStatus>,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
}

impl ApplicationFilter {
    /// Whether an entity passes the kind and status filters.
    pub fn matches(&self, entity: &ApplicationEntity) -> bool {
        self.kind.is_none_or(|kind| kind == entity.kind)
            && self.status.is_none_or(|status| status == entity.status)
    }
}

/// Number of applications currently in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    /// Status being counted.
    pub status: ApplicationStatus,
    /// Number of applications in that status.
    pub count: u64,
}

/// Message handed to the notification function.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NotificationEntity {
    /// What happened (`application.submitted`, `application.reviewed`).
    pub event: String,
    /// Application concerned.
    pub application_id: Uuid,
    /// Recipient handle.
    pub applicant_handle: String,
    /// Form of the application.
    pub kind: ApplicationKind,
    /// Status after the event.
    pub status: ApplicationStatus,
    /// Optional human-readable message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
