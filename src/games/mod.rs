//! Browser mini-games modelled as timed probability challenges.
//!
//! Every game shares the same [`PhaseMachine`] and is driven through the
//! [`Challenge`] trait: user actions arrive as JSON, timers call
//! [`Challenge::tick`] at the interval the game asks for, and outcomes are
//! decided with uniform draws from the session's [`GameRng`].

pub mod heist;
pub mod karma_wheel;
pub mod lockpick;
pub mod mystery_box;
pub mod phase;
pub mod smuggle_run;
pub mod survival;
pub mod trivia;

use std::time::Duration;

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

pub use self::phase::{InvalidTransition, Phase, PhaseEvent, PhaseMachine};

/// Random source owned by a single game session.
pub type GameRng = StdRng;

/// Lower bound of every clamped stat.
pub const STAT_MIN: i32 = 0;
/// Upper bound of every clamped stat.
pub const STAT_MAX: i32 = 100;

/// Identifies one of the available mini-games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Plan and run a heist.
    Heist,
    /// Time a marker into a green zone across three lock levels.
    Lockpick,
    /// Spin a wheel of fortune for karma.
    KarmaWheel,
    /// Survive 24 in-game hours balancing money, heat, trust and health.
    Survival,
    /// Pick one of nine boxes.
    MysteryBox,
    /// Answer a round of server-lore questions against the clock.
    Trivia,
    /// Run contraband with a chosen risk level.
    SmuggleRun,
}

impl GameKind {
    /// Every game in catalogue order.
    pub const ALL: [GameKind; 7] = [
        GameKind::Heist,
        GameKind::Lockpick,
        GameKind::KarmaWheel,
        GameKind::Survival,
        GameKind::MysteryBox,
        GameKind::Trivia,
        GameKind::SmuggleRun,
    ];

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            GameKind::Heist => "Heist Planner",
            GameKind::Lockpick => "Lockpick",
            GameKind::KarmaWheel => "Karma Wheel",
            GameKind::Survival => "24 Hours",
            GameKind::MysteryBox => "Mystery Box",
            GameKind::Trivia => "City Trivia",
            GameKind::SmuggleRun => "Smuggle Run",
        }
    }

    /// One-line pitch shown on the game selector.
    pub fn description(self) -> &'static str {
        match self {
            GameKind::Heist => "Pick an approach, crew, ride and exit, then see if the plan holds.",
            GameKind::Lockpick => "Hit the sweet spot three times before you run out of picks.",
            GameKind::KarmaWheel => "Spin and let the city decide what you deserve.",
            GameKind::Survival => "Make it through a full day on the streets without getting caught.",
            GameKind::MysteryBox => "Nine boxes, one jackpot. Choose wisely.",
            GameKind::Trivia => "Five questions about the city. Fifteen seconds each.",
            GameKind::SmuggleRun => "The bigger the cargo, the bigger the risk.",
        }
    }

    /// Mount a fresh instance of this game.
    pub fn create(self) -> Box<dyn DynGame> {
        match self {
            GameKind::Heist => Box::new(heist::Heist::new()),
            GameKind::Lockpick => Box::new(lockpick::Lockpick::new()),
            GameKind::KarmaWheel => Box::new(karma_wheel::KarmaWheel::new()),
            GameKind::Survival => Box::new(survival::Survival::new()),
            GameKind::MysteryBox => Box::new(mystery_box::MysteryBox::new()),
            GameKind::Trivia => Box::new(trivia::Trivia::new()),
            GameKind::SmuggleRun => Box::new(smuggle_run::SmuggleRun::new()),
        }
    }
}

/// Errors raised while applying a player action.
#[derive(Debug, Error)]
pub enum GameError {
    /// The action was rejected by the game rules.
    #[error("invalid action: {0}")]
    InvalidAction(String),
    /// The action exists but is not available at this point of the round.
    #[error("action not available now: {0}")]
    OutOfPhase(String),
    /// The action would require an impossible phase change.
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    /// The action payload does not match the game's action schema.
    #[error("malformed action payload")]
    Payload(#[source] serde_json::Error),
}

/// A mini-game: phases, actions, an optional timer and a view.
pub trait Challenge: Send + 'static {
    /// Player actions accepted by this game.
    type Action: DeserializeOwned;
    /// Serializable projection sent to the browser.
    type View: Serialize;

    /// Catalogue identifier.
    const KIND: GameKind;

    /// Phase tracker of this game.
    fn machine(&self) -> &PhaseMachine;

    /// Apply a player action.
    fn act(&mut self, action: Self::Action, rng: &mut GameRng) -> Result<(), GameError>;

    /// Interval at which [`Challenge::tick`] must be called, or `None` when no
    /// timer should be running.
    fn tick_interval(&self) -> Option<Duration> {
        None
    }

    /// Advance timer-driven state by one interval.
    fn tick(&mut self, _rng: &mut GameRng) {}

    /// Return every field to its initial value.
    fn reset(&mut self);

    /// Current projection.
    fn view(&self) -> Self::View;
}

/// Object-safe wrapper over [`Challenge`] exchanging JSON with callers.
pub trait DynGame: Send {
    /// Catalogue identifier.
    fn kind(&self) -> GameKind;
    /// Current phase.
    fn phase(&self) -> Phase;
    /// Phase machine version, bumped on every transition.
    fn epoch(&self) -> usize;
    /// Decode and apply a JSON action.
    fn act_json(&mut self, action: Value, rng: &mut GameRng) -> Result<(), GameError>;
    /// See [`Challenge::tick_interval`].
    fn tick_interval(&self) -> Option<Duration>;
    /// See [`Challenge::tick`].
    fn tick(&mut self, rng: &mut GameRng);
    /// See [`Challenge::reset`].
    fn reset(&mut self);
    /// Serialize the current view.
    fn view_json(&self) -> serde_json::Result<Value>;
}

impl<T: Challenge> DynGame for T {
    fn kind(&self) -> GameKind {
        T::KIND
    }

    fn phase(&self) -> Phase {
        self.machine().phase()
    }

    fn epoch(&self) -> usize {
        self.machine().version()
    }

    fn act_json(&mut self, action: Value, rng: &mut GameRng) -> Result<(), GameError> {
        let action = serde_json::from_value(action).map_err(GameError::Payload)?;
        self.act(action, rng)
    }

    fn tick_interval(&self) -> Option<Duration> {
        Challenge::tick_interval(self)
    }

    fn tick(&mut self, rng: &mut GameRng) {
        Challenge::tick(self, rng);
    }

    fn reset(&mut self) {
        Challenge::reset(self);
    }

    fn view_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.view())
    }
}

/// Draw uniformly in `0..100` and succeed when the draw is below `success_pct`.
pub fn roll(rng: &mut GameRng, success_pct: u8) -> bool {
    rng.random_range(0..100u8) < success_pct
}

/// Clamp a stat into `[STAT_MIN, STAT_MAX]`.
pub fn clamp_stat(value: i32) -> i32 {
    value.clamp(STAT_MIN, STAT_MAX)
}
