//! Two-factor panel gate: short-lived tokens issued after the second factor
//! was checked, each dropped on a hard TTL or after an idle period.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use tokio::{sync::watch, time::Instant};
use uuid::Uuid;

use crate::{dto::sse::PanelExpiryReason, services::sse_events};

use super::{SseHub, watchdog::IdleWatchdog};

/// Token lifetimes applied by the gate.
#[derive(Debug, Clone, Copy)]
pub struct GatePolicy {
    /// Hard lifetime regardless of activity.
    pub ttl: Duration,
    /// Inactivity before the token is dropped.
    pub idle_timeout: Duration,
    /// Lead time of the idle warning.
    pub idle_warning: Duration,
}

/// Public view of an unlocked panel session.
#[derive(Debug, Clone)]
pub struct PanelGrant {
    /// Identifier safe to share on the admin stream.
    pub session_id: Uuid,
    /// Bearer token presented on gated requests.
    pub token: String,
    /// Time left before the hard TTL.
    pub expires_in: Duration,
    /// Inactivity allowed between two requests.
    pub idle_timeout: Duration,
}

struct PanelSession {
    session_id: Uuid,
    expires_at: Instant,
    watchdog: IdleWatchdog,
    // dropped with the session; receivers see the channel close
    closed: watch::Sender<()>,
}

/// Issues panel tokens and tracks their TTL and idle expiry.
pub struct PanelGate {
    policy: GatePolicy,
    sessions: Arc<DashMap<String, PanelSession>>,
    hub: SseHub,
}

impl PanelGate {
    /// Build a gate publishing its lifecycle events on `hub`.
    pub fn new(policy: GatePolicy, hub: SseHub) -> Self {
        Self {
            policy,
            sessions: Arc::new(DashMap::new()),
            hub,
        }
    }

    /// Issue a fresh token. The caller is responsible for checking the second factor first.
    pub fn issue(&self) -> PanelGrant {
        let token = Uuid::new_v4().simple().to_string();
        let session_id = Uuid::new_v4();

        let warn_hub = self.hub.clone();
        let expire_hub = self.hub.clone();
        let sessions = Arc::downgrade(&self.sessions);
        let expired_token = token.clone();
        let watchdog = IdleWatchdog::spawn(
            self.policy.idle_timeout,
            self.policy.idle_warning,
            move |remaining| sse_events::broadcast_panel_warning(&warn_hub, session_id, remaining),
            move || {
                if let Some(sessions) = sessions.upgrade() {
                    sessions.remove(&expired_token);
                }
                sse_events::broadcast_panel_expired(
                    &expire_hub,
                    session_id,
                    PanelExpiryReason::Idle,
                );
            },
        );

        self.sessions.insert(
            token.clone(),
            PanelSession {
                session_id,
                expires_at: Instant::now() + self.policy.ttl,
                watchdog,
                closed: watch::Sender::new(()),
            },
        );

        PanelGrant {
            session_id,
            token,
            expires_in: self.policy.ttl,
            idle_timeout: self.policy.idle_timeout,
        }
    }

    /// Check a token and record activity on it.
    pub fn verify(&self, token: &str) -> Option<PanelGrant> {
        let now = Instant::now();
        let expired = {
            let session = self.sessions.get(token)?;
            if now < session.expires_at {
                session.watchdog.touch();
                return Some(PanelGrant {
                    session_id: session.session_id,
                    token: token.to_string(),
                    expires_in: session.expires_at - now,
                    idle_timeout: self.policy.idle_timeout,
                });
            }
            session.session_id
        };

        self.sessions.remove(token);
        sse_events::broadcast_panel_expired(&self.hub, expired, PanelExpiryReason::Ttl);
        None
    }

    /// Drop a token immediately. Returns whether it was active.
    pub fn revoke(&self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some((_, session)) => {
                sse_events::broadcast_panel_expired(
                    &self.hub,
                    session.session_id,
                    PanelExpiryReason::Locked,
                );
                true
            }
            None => false,
        }
    }

    /// Signal that resolves once the session behind `token` is locked or expires.
    pub fn closed_signal(&self, token: &str) -> Option<watch::Receiver<()>> {
        self.sessions
            .get(token)
            .map(|session| session.closed.subscribe())
    }

    /// Number of currently unlocked sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::advance;

    use super::*;

    fn gate() -> (PanelGate, SseHub) {
        let hub = SseHub::new(16);
        let gate = PanelGate::new(
            GatePolicy {
                ttl: Duration::from_secs(60),
                idle_timeout: Duration::from_secs(20),
                idle_warning: Duration::from_secs(5),
            },
            hub.clone(),
        );
        (gate, hub)
    }

    #[tokio::test(start_paused = true)]
    async fn issued_token_verifies_until_revoked() {
        let (gate, _hub) = gate();
        let grant = gate.issue();

        let seen = gate.verify(&grant.token).expect("fresh token is valid");
        assert_eq!(seen.session_id, grant.session_id);
        assert!(gate.verify("not-a-token").is_none());

        assert!(gate.revoke(&grant.token));
        assert!(!gate.revoke(&grant.token));
        assert!(gate.verify(&grant.token).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_token_warns_then_expires() {
        let (gate, hub) = gate();
        let mut events = hub.subscribe();
        let grant = gate.issue();
        tokio::task::yield_now().await;

        advance(Duration::from_secs(16)).await;
        tokio::task::yield_now().await;
        let warning = events.try_recv().expect("warning sent");
        assert_eq!(warning.event.as_deref(), Some("panel.session_warning"));

        advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        let expired = events.try_recv().expect("expiry sent");
        assert_eq!(expired.event.as_deref(), Some("panel.session_expired"));
        assert!(gate.verify(&grant.token).is_none());
        assert_eq!(gate.active_sessions(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_signal_fires_on_lock() {
        let (gate, _hub) = gate();
        let grant = gate.issue();
        let mut closed = gate.closed_signal(&grant.token).expect("live token");
        assert!(gate.closed_signal("not-a-token").is_none());

        assert!(gate.revoke(&grant.token));
        assert!(closed.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_signal_fires_on_idle_expiry() {
        let (gate, _hub) = gate();
        let grant = gate.issue();
        let mut closed = gate.closed_signal(&grant.token).expect("live token");
        tokio::task::yield_now().await;

        advance(Duration::from_secs(21)).await;
        tokio::task::yield_now().await;
        assert!(closed.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_signal_fires_on_ttl() {
        let (gate, _hub) = gate();
        let grant = gate.issue();
        let mut closed = gate.closed_signal(&grant.token).expect("live token");

        for _ in 0..6 {
            advance(Duration::from_secs(10)).await;
            tokio::task::yield_now().await;
            if gate.verify(&grant.token).is_none() {
                break;
            }
        }
        assert!(closed.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn activity_cannot_outlive_the_ttl() {
        let (gate, _hub) = gate();
        let grant = gate.issue();

        for _ in 0..6 {
            advance(Duration::from_secs(10)).await;
            tokio::task::yield_now().await;
            if gate.verify(&grant.token).is_none() {
                break;
            }
        }

        assert!(gate.verify(&grant.token).is_none());
        assert_eq!(gate.active_sessions(), 0);
    }
}
