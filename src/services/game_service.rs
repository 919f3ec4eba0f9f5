use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use rand::SeedableRng;
use serde_json::Value;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        games::{CreateSessionRequest, GameCatalogEntry, SessionSnapshot},
        sse::GameCloseReason,
    },
    error::ServiceError,
    games::{GameKind, GameRng},
    services::sse_events,
    state::{GameSession, SessionInner, SharedState, SseHub, watchdog::IdleWatchdog},
};

const SESSION_EVENT_CAPACITY: usize = 32;

/// Every playable mini-game.
pub fn catalogue() -> Vec<GameCatalogEntry> {
    GameKind::ALL.into_iter().map(Into::into).collect()
}

/// Mount a new game session in its setup phase.
pub async fn mount(
    state: &SharedState,
    request: CreateSessionRequest,
) -> Result<SessionSnapshot, ServiceError> {
    let limit = state.config().max_game_sessions;
    let over_capacity =
        || ServiceError::Capacity(format!("at most {limit} game sessions can run at once"));
    if state.sessions().len() >= limit {
        return Err(over_capacity());
    }

    let id = Uuid::new_v4();
    let rng = match request.seed {
        Some(seed) => GameRng::seed_from_u64(seed),
        None => GameRng::from_os_rng(),
    };
    let hub = SseHub::new(SESSION_EVENT_CAPACITY);
    let watchdog = idle_watchdog(state, id, hub.clone());
    let session = Arc::new(GameSession::new(
        id,
        request.kind.create(),
        rng,
        hub,
        watchdog,
    ));
    state.sessions().insert(id, session.clone());
    // concurrent mounts may all pass the check above; the loser backs out
    if state.sessions().len() > limit {
        state.sessions().remove(&id);
        return Err(over_capacity());
    }
    info!(session_id = %id, kind = ?request.kind, seeded = request.seed.is_some(), "game session mounted");

    let inner = session.inner().lock().await;
    Ok(snapshot(&session, &inner))
}

/// Current state of a session.
pub async fn get(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    let session = find(state, id)?;
    session.touch();
    let inner = session.inner().lock().await;
    Ok(snapshot(&session, &inner))
}

/// Apply a player action. A rejected action leaves the game as it was.
pub async fn act(
    state: &SharedState,
    id: Uuid,
    action: Value,
) -> Result<SessionSnapshot, ServiceError> {
    let session = find(state, id)?;
    session.touch();

    let mut inner = session.inner().lock().await;
    if let Err(err) = inner.act(action) {
        debug!(session_id = %id, error = %err, "game action rejected");
        return Err(err.into());
    }
    ensure_ticker(&session, &mut inner);

    let snapshot = snapshot(&session, &inner);
    sse_events::broadcast_game_state(session.hub(), &snapshot);
    Ok(snapshot)
}

/// Return a session to its initial state, cancelling any running timer.
pub async fn reset(state: &SharedState, id: Uuid) -> Result<SessionSnapshot, ServiceError> {
    let session = find(state, id)?;
    session.touch();

    let mut inner = session.inner().lock().await;
    inner.reset();
    ensure_ticker(&session, &mut inner);

    let snapshot = snapshot(&session, &inner);
    sse_events::broadcast_game_state(session.hub(), &snapshot);
    Ok(snapshot)
}

/// Discard a session and its timer.
pub async fn unmount(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    if evict(state, id, GameCloseReason::Unmounted).await {
        info!(session_id = %id, "game session unmounted");
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("game session {id}")))
    }
}

fn find(state: &SharedState, id: Uuid) -> Result<Arc<GameSession>, ServiceError> {
    state
        .session(id)
        .ok_or_else(|| ServiceError::NotFound(format!("game session {id}")))
}

async fn evict(state: &SharedState, id: Uuid, reason: GameCloseReason) -> bool {
    let Some((_, session)) = state.sessions().remove(&id) else {
        return false;
    };
    session.inner().lock().await.stop_ticker();
    sse_events::broadcast_game_closed(session.hub(), id, reason);
    true
}

fn idle_watchdog(state: &SharedState, id: Uuid, hub: SseHub) -> IdleWatchdog {
    let config = state.config();
    let state = Arc::downgrade(state);
    IdleWatchdog::spawn(
        config.game_idle_timeout,
        config.game_idle_warning,
        move |remaining| sse_events::broadcast_game_idle_warning(&hub, id, remaining),
        move || {
            let Some(state) = state.upgrade() else {
                return;
            };
            tokio::spawn(async move {
                if evict(&state, id, GameCloseReason::Idle).await {
                    info!(session_id = %id, "idle game session unmounted");
                }
            });
        },
    )
}

/// Start the session timer if the game wants ticks and none is running yet.
fn ensure_ticker(session: &Arc<GameSession>, inner: &mut SessionInner) {
    if inner.has_ticker() {
        return;
    }
    let Some(period) = inner.game().tick_interval() else {
        return;
    };
    inner.set_ticker(tokio::spawn(run_ticker(Arc::downgrade(session), period)));
}

async fn run_ticker(session: Weak<GameSession>, period: Duration) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let Some(session) = session.upgrade() else {
            return;
        };
        let mut inner = session.inner().lock().await;
        inner.tick();

        let done = inner.game().tick_interval().is_none();
        if done {
            inner.release_ticker();
        }
        let snapshot = snapshot(&session, &inner);
        sse_events::broadcast_game_state(session.hub(), &snapshot);

        if done {
            debug!(session_id = %session.id(), phase = ?snapshot.phase, "game timer finished");
            return;
        }
    }
}

fn snapshot(session: &GameSession, inner: &SessionInner) -> SessionSnapshot {
    let game = inner.game();
    let view = game.view_json().unwrap_or_else(|err| {
        warn!(session_id = %session.id(), error = %err, "failed to render game view");
        Value::Null
    });
    SessionSnapshot::new(
        session.id(),
        session.kind(),
        game.phase(),
        game.epoch(),
        inner.has_ticker(),
        session.created_at(),
        view,
    )
}
