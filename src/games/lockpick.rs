//! Lockpick timing game: a marker sweeps across the lock and the player tries
//! to stop it inside the green zone, three levels deep.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Challenge, GameError, GameKind, GameRng, Phase, PhaseEvent, PhaseMachine};

const TICK: Duration = Duration::from_millis(16);
const TRACK_MAX: i32 = 100;
const PICKS: u8 = 3;
const INITIAL_ZONE_START: i32 = 40;

/// Green zone width and marker speed per level.
const LEVELS: [(i32, i32); 3] = [(20, 2), (12, 3), (6, 4)];

/// How the lock ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockOutcome {
    /// All three levels cleared.
    Unlocked,
    /// Ran out of picks.
    Broken,
}

/// Player actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LockpickAction {
    /// Insert the pick.
    Start,
    /// Try to turn the lock at the current marker position.
    Attempt,
}

/// Client view of the lock.
#[derive(Debug, Serialize)]
pub struct LockpickView {
    phase: Phase,
    level: u8,
    marker: i32,
    zone_start: i32,
    zone_end: i32,
    picks_left: u8,
    outcome: Option<LockOutcome>,
}

/// Lockpick state.
#[derive(Debug)]
pub struct Lockpick {
    machine: PhaseMachine,
    level: u8,
    marker: i32,
    direction: i32,
    zone_start: i32,
    picks_left: u8,
    outcome: Option<LockOutcome>,
}

impl Default for Lockpick {
    fn default() -> Self {
        Self {
            machine: PhaseMachine::new(),
            level: 1,
            marker: 0,
            direction: 1,
            zone_start: INITIAL_ZONE_START,
            picks_left: PICKS,
            outcome: None,
        }
    }
}

impl Lockpick {
    /// Fresh lock at level one.
    pub fn new() -> Self {
        Self::default()
    }

    fn level_params(&self) -> (i32, i32) {
        LEVELS[usize::from(self.level.clamp(1, 3)) - 1]
    }

    fn zone_end(&self) -> i32 {
        self.zone_start + self.level_params().0
    }

    fn in_zone(&self) -> bool {
        (self.zone_start..=self.zone_end()).contains(&self.marker)
    }

    fn place_zone(&mut self, rng: &mut GameRng) {
        let width = self.level_params().0;
        self.zone_start = rng.random_range(10..=(TRACK_MAX - 10 - width));
    }

    fn finish(&mut self, outcome: LockOutcome) {
        self.outcome = Some(outcome);
        let _ = self.machine.apply(PhaseEvent::Finish);
    }
}

impl Challenge for Lockpick {
    type Action = LockpickAction;
    type View = LockpickView;

    const KIND: GameKind = GameKind::Lockpick;

    fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    fn act(&mut self, action: LockpickAction, rng: &mut GameRng) -> Result<(), GameError> {
        match action {
            LockpickAction::Start => {
                self.machine.apply(PhaseEvent::Start)?;
                self.place_zone(rng);
                Ok(())
            }
            LockpickAction::Attempt => {
                if !self.machine.is(Phase::Running) {
                    return Err(GameError::OutOfPhase("the lock is not in play".into()));
                }
                if self.in_zone() {
                    if usize::from(self.level) == LEVELS.len() {
                        self.finish(LockOutcome::Unlocked);
                    } else {
                        self.level += 1;
                        self.place_zone(rng);
                    }
                } else {
                    self.picks_left = self.picks_left.saturating_sub(1);
                    if self.picks_left == 0 {
                        self.finish(LockOutcome::Broken);
                    }
                }
                Ok(())
            }
        }
    }

    fn tick_interval(&self) -> Option<Duration> {
        self.machine.is(Phase::Running).then_some(TICK)
    }

    fn tick(&mut self, _rng: &mut GameRng) {
        if !self.machine.is(Phase::Running) {
            return;
        }
        let speed = self.level_params().1;
        let mut next = self.marker + self.direction * speed;
        if next > TRACK_MAX {
            next = 2 * TRACK_MAX - next;
            self.direction = -1;
        } else if next < 0 {
            next = -next;
            self.direction = 1;
        }
        self.marker = next.clamp(0, TRACK_MAX);
    }

    fn reset(&mut self) {
        let mut machine = std::mem::take(&mut self.machine);
        let _ = machine.apply(PhaseEvent::Reset);
        *self = Self {
            machine,
            ..Self::default()
        };
    }

    fn view(&self) -> LockpickView {
        LockpickView {
            phase: self.machine.phase(),
            level: self.level,
            marker: self.marker,
            zone_start: self.zone_start,
            zone_end: self.zone_end(),
            picks_left: self.picks_left,
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn started(seed: u64) -> (Lockpick, GameRng) {
        let mut rng = GameRng::seed_from_u64(seed);
        let mut lock = Lockpick::new();
        lock.act(LockpickAction::Start, &mut rng).unwrap();
        (lock, rng)
    }

    #[test]
    fn marker_never_leaves_the_track() {
        let (mut lock, mut rng) = started(1);
        for level in 1..=3u8 {
            lock.level = level;
            for _ in 0..1_000 {
                lock.tick(&mut rng);
                assert!((0..=100).contains(&lock.marker), "marker at {}", lock.marker);
            }
        }
    }

    #[test]
    fn hitting_the_zone_advances_then_unlocks() {
        let (mut lock, mut rng) = started(2);
        for expected_level in 1..=3u8 {
            assert_eq!(lock.level, expected_level);
            lock.marker = lock.zone_start + 1;
            lock.act(LockpickAction::Attempt, &mut rng).unwrap();
        }
        assert_eq!(lock.outcome, Some(LockOutcome::Unlocked));
        assert_eq!(lock.machine.phase(), Phase::Result);
        assert_eq!(lock.picks_left, PICKS);
    }

    #[test]
    fn zone_edges_count_as_hits() {
        let (mut lock, mut rng) = started(3);
        lock.marker = lock.zone_end();
        lock.act(LockpickAction::Attempt, &mut rng).unwrap();
        assert_eq!(lock.level, 2);
    }

    #[test]
    fn three_misses_break_the_lock() {
        let (mut lock, mut rng) = started(4);
        for _ in 0..3 {
            lock.marker = 0;
            lock.act(LockpickAction::Attempt, &mut rng).unwrap();
        }
        assert_eq!(lock.outcome, Some(LockOutcome::Broken));
        assert!(lock.tick_interval().is_none());
        assert!(lock.act(LockpickAction::Attempt, &mut rng).is_err());
    }

    #[test]
    fn attempt_before_start_is_rejected() {
        let mut rng = GameRng::seed_from_u64(5);
        let mut lock = Lockpick::new();
        let err = lock.act(LockpickAction::Attempt, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::OutOfPhase(_)));
    }

    #[test]
    fn reset_restores_initial_state() {
        let (mut lock, mut rng) = started(6);
        for _ in 0..40 {
            lock.tick(&mut rng);
        }
        lock.marker = lock.zone_start;
        lock.act(LockpickAction::Attempt, &mut rng).unwrap();
        let version_before = lock.machine.version();
        lock.reset();

        assert_eq!(lock.machine.phase(), Phase::Setup);
        assert!(lock.machine.version() > version_before);
        assert_eq!(lock.level, 1);
        assert_eq!(lock.marker, 0);
        assert_eq!(lock.direction, 1);
        assert_eq!(lock.zone_start, INITIAL_ZONE_START);
        assert_eq!(lock.picks_left, PICKS);
        assert!(lock.outcome.is_none());
    }
}
