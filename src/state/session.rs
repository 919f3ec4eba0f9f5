use std::time::SystemTime;

use serde_json::Value;
use tokio::{sync::Mutex, task::JoinHandle};
use uuid::Uuid;

use crate::games::{DynGame, GameError, GameKind, GameRng};

use super::{SseHub, watchdog::IdleWatchdog};

/// A mounted mini-game: its state, its event stream and its idle watchdog.
pub struct GameSession {
    /// Identifier handed to the client at mount time.
    id: Uuid,
    /// Which mini-game runs in this session.
    kind: GameKind,
    /// Mount time, reported in snapshots.
    created_at: SystemTime,
    hub: SseHub,
    watchdog: IdleWatchdog,
    inner: Mutex<SessionInner>,
}

impl GameSession {
    /// Wrap a freshly created game.
    pub fn new(
        id: Uuid,
        game: Box<dyn DynGame>,
        rng: GameRng,
        hub: SseHub,
        watchdog: IdleWatchdog,
    ) -> Self {
        Self {
            id,
            kind: game.kind(),
            created_at: SystemTime::now(),
            hub,
            watchdog,
            inner: Mutex::new(SessionInner {
                game,
                rng,
                ticker: None,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Per-session stream of state snapshots.
    pub fn hub(&self) -> &SseHub {
        &self.hub
    }

    /// Record user activity on the session.
    pub fn touch(&self) {
        self.watchdog.touch();
    }

    /// Exclusive access to the game, its RNG and its ticker slot.
    pub fn inner(&self) -> &Mutex<SessionInner> {
        &self.inner
    }
}

/// Mutable part of a session, guarded by a single lock so that actions, resets
/// and ticks never interleave.
pub struct SessionInner {
    /// The game state machine itself.
    game: Box<dyn DynGame>,
    rng: GameRng,
    ticker: Option<JoinHandle<()>>,
}

impl SessionInner {
    pub fn game(&self) -> &dyn DynGame {
        self.game.as_ref()
    }

    /// Apply a JSON action. On error the game is left untouched.
    pub fn act(&mut self, action: Value) -> Result<(), GameError> {
        self.game.act_json(action, &mut self.rng)
    }

    /// Advance the game by one timer step.
    pub fn tick(&mut self) {
        self.game.tick(&mut self.rng);
    }

    /// Cancel any running timer and return the game to its initial state.
    pub fn reset(&mut self) {
        self.stop_ticker();
        self.game.reset();
    }

    /// Whether a timer task currently drives the game.
    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    /// Register the timer task driving the game.
    pub fn set_ticker(&mut self, handle: JoinHandle<()>) {
        self.stop_ticker();
        self.ticker = Some(handle);
    }

    /// Forget the timer handle without aborting it; used by the timer itself
    /// when the game no longer needs ticks.
    pub fn release_ticker(&mut self) {
        self.ticker = None;
    }

    /// Abort the timer task, if any.
    pub fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
