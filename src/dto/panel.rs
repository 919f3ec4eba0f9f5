use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{dto::ceil_secs, state::PanelGrant};

/// Second-factor code submitted to unlock the panel.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UnlockRequest {
    #[validate(length(min = 1, max = 128))]
    pub code: String,
}

/// Unlocked panel session.
#[derive(Debug, Serialize, ToSchema)]
pub struct PanelSessionResponse {
    pub session_id: Uuid,
    /// Present only in the unlock response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub expires_in_secs: u64,
    pub idle_timeout_secs: u64,
}

impl PanelSessionResponse {
    /// Response for a fresh unlock, carrying the token.
    pub fn unlocked(grant: PanelGrant) -> Self {
        let mut response = Self::status(&grant);
        response.token = Some(grant.token);
        response
    }

    /// Response for a status query; the token is not echoed back.
    pub fn status(grant: &PanelGrant) -> Self {
        Self {
            session_id: grant.session_id,
            token: None,
            expires_in_secs: ceil_secs(grant.expires_in),
            idle_timeout_secs: ceil_secs(grant.idle_timeout),
        }
    }
}
