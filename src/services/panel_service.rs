//! Second-factor unlock of the admin panel.

use tracing::{info, warn};

use crate::{
    dto::panel::{PanelSessionResponse, UnlockRequest},
    error::ServiceError,
    state::SharedState,
};

/// Check the panel code and hand out a short-lived token.
pub fn unlock(
    state: &SharedState,
    request: &UnlockRequest,
) -> Result<PanelSessionResponse, ServiceError> {
    let Some(expected) = state.config().panel_code.as_deref() else {
        warn!("panel unlock attempted while no panel code is configured");
        return Err(ServiceError::Unauthorized("panel gate disabled".into()));
    };

    if !codes_match(expected, request.code.trim()) {
        warn!("panel unlock rejected: wrong code");
        return Err(ServiceError::Unauthorized("invalid panel code".into()));
    }

    let grant = state.panel().issue();
    info!(session_id = %grant.session_id, "panel unlocked");
    Ok(PanelSessionResponse::unlocked(grant))
}

/// Describe the session behind a token, counting as activity.
pub fn status(state: &SharedState, token: &str) -> Result<PanelSessionResponse, ServiceError> {
    state
        .panel()
        .verify(token)
        .map(|grant| PanelSessionResponse::status(&grant))
        .ok_or_else(|| ServiceError::Unauthorized("panel session expired".into()))
}

/// Drop a token before its expiry.
pub fn lock(state: &SharedState, token: &str) -> Result<(), ServiceError> {
    if state.panel().revoke(token) {
        info!("panel locked");
        Ok(())
    } else {
        Err(ServiceError::Unauthorized("panel session expired".into()))
    }
}

// Compares every byte so the running time does not depend on the matching prefix.
fn codes_match(expected: &str, given: &str) -> bool {
    let (expected, given) = (expected.as_bytes(), given.as_bytes());
    expected.len() == given.len()
        && expected
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn request(code: &str) -> UnlockRequest {
        UnlockRequest { code: code.into() }
    }

    #[tokio::test]
    async fn gate_stays_closed_without_a_code() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            unlock(&state, &request("anything")),
            Err(ServiceError::Unauthorized(_))
        ));
        assert_eq!(state.panel().active_sessions(), 0);
    }

    #[tokio::test]
    async fn unlock_status_and_lock() {
        let state = AppState::new(AppConfig {
            panel_code: Some("4242".into()),
            ..AppConfig::default()
        });

        assert!(unlock(&state, &request("4243")).is_err());
        assert!(unlock(&state, &request("42")).is_err());

        let unlocked = unlock(&state, &request(" 4242 ")).unwrap();
        let token = unlocked.token.clone().unwrap();

        let current = status(&state, &token).unwrap();
        assert_eq!(current.session_id, unlocked.session_id);
        assert!(current.token.is_none());

        lock(&state, &token).unwrap();
        assert!(status(&state, &token).is_err());
        assert!(lock(&state, &token).is_err());
    }

    #[test]
    fn code_comparison() {
        assert!(codes_match("abc", "abc"));
        assert!(!codes_match("abc", "abd"));
        assert!(!codes_match("abc", "abcd"));
        assert!(!codes_match("", "a"));
    }
}
