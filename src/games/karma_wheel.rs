//! Karma wheel: a spin eases out over a fixed number of frames and the final
//! angle picks the segment.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Challenge, GameError, GameKind, GameRng, Phase, PhaseEvent, PhaseMachine};

const TICK: Duration = Duration::from_millis(16);
const SPIN_TICKS: u32 = 180;
const MIN_TURNS: u32 = 5;
const MAX_TURNS: u32 = 8;

/// A slice of the wheel.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Segment {
    /// Display label.
    pub label: &'static str,
    /// Karma awarded when the wheel stops here.
    pub karma: i32,
}

static SEGMENTS: [Segment; 8] = [
    Segment { label: "Blessed", karma: 50 },
    Segment { label: "Good deed", karma: 20 },
    Segment { label: "Neutral", karma: 0 },
    Segment { label: "Bad luck", karma: -10 },
    Segment { label: "Jackpot", karma: 100 },
    Segment { label: "Cursed", karma: -50 },
    Segment { label: "Small favour", karma: 10 },
    Segment { label: "Taxed", karma: -20 },
];

/// Segment under the pointer for a wheel resting at `rotation` degrees.
pub fn segment_index(rotation: f64, segment_count: usize) -> usize {
    let per_segment = 360.0 / segment_count as f64;
    let index = (rotation.rem_euclid(360.0) / per_segment).floor() as usize;
    index % segment_count
}

/// Player actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KarmaWheelAction {
    /// Spin the wheel (again).
    Spin,
}

/// Client view of the wheel and its last spin.
#[derive(Debug, Serialize)]
pub struct KarmaWheelView {
    phase: Phase,
    segments: &'static [Segment],
    rotation: f64,
    karma: i32,
    spins: u32,
    landed: Option<usize>,
}

/// Wheel state. Karma accumulates across spins until reset.
#[derive(Debug, Default)]
pub struct KarmaWheel {
    machine: PhaseMachine,
    rotation: f64,
    spin_from: f64,
    spin_to: f64,
    elapsed_ticks: u32,
    karma: i32,
    spins: u32,
    landed: Option<usize>,
}

impl KarmaWheel {
    /// Wheel at rest at zero degrees with no karma.
    pub fn new() -> Self {
        Self::default()
    }

    fn land(&mut self) {
        self.rotation = self.spin_to;
        let index = segment_index(self.spin_to, SEGMENTS.len());
        self.karma += SEGMENTS[index].karma;
        self.spins += 1;
        self.landed = Some(index);
        let _ = self.machine.apply(PhaseEvent::Finish);
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

impl Challenge for KarmaWheel {
    type Action = KarmaWheelAction;
    type View = KarmaWheelView;

    const KIND: GameKind = GameKind::KarmaWheel;

    fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    fn act(&mut self, action: KarmaWheelAction, rng: &mut GameRng) -> Result<(), GameError> {
        match action {
            KarmaWheelAction::Spin => {
                let event = if self.machine.is(Phase::Result) {
                    PhaseEvent::Restart
                } else {
                    PhaseEvent::Start
                };
                self.machine.apply(event)?;

                let turns = rng.random_range(MIN_TURNS..=MAX_TURNS);
                let offset = rng.random_range(0.0..360.0);
                self.spin_from = self.rotation;
                self.spin_to = self.rotation + f64::from(turns) * 360.0 + offset;
                self.elapsed_ticks = 0;
                self.landed = None;
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
        self.elapsed_ticks += 1;
        if self.elapsed_ticks >= SPIN_TICKS {
            self.land();
            return;
        }
        let t = f64::from(self.elapsed_ticks) / f64::from(SPIN_TICKS);
        self.rotation = self.spin_from + (self.spin_to - self.spin_from) * ease_out_cubic(t);
    }

    fn reset(&mut self) {
        let mut machine = std::mem::take(&mut self.machine);
        let _ = machine.apply(PhaseEvent::Reset);
        *self = Self {
            machine,
            ..Self::default()
        };
    }

    fn view(&self) -> KarmaWheelView {
        KarmaWheelView {
            phase: self.machine.phase(),
            segments: &SEGMENTS,
            rotation: self.rotation,
            karma: self.karma,
            spins: self.spins,
            landed: self.landed,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn spin_to_rest(wheel: &mut KarmaWheel, rng: &mut GameRng) {
        wheel.act(KarmaWheelAction::Spin, rng).unwrap();
        while wheel.machine.is(Phase::Running) {
            wheel.tick(rng);
        }
    }

    #[test]
    fn index_follows_the_rotation_formula() {
        assert_eq!(segment_index(0.0, 8), 0);
        assert_eq!(segment_index(44.999, 8), 0);
        assert_eq!(segment_index(45.0, 8), 1);
        assert_eq!(segment_index(359.999, 8), 7);
        assert_eq!(segment_index(360.0, 8), 0);
        assert_eq!(segment_index(2_000.0, 8), 4);
        assert_eq!(segment_index(-10.0, 8), 7);
        assert_eq!(segment_index(130.0, 3), 1);
    }

    #[test]
    fn index_is_always_in_bounds() {
        for count in 1..=12 {
            let mut angle = -1_080.0;
            while angle < 3_600.0 {
                assert!(segment_index(angle, count) < count);
                angle += 7.3;
            }
        }
    }

    #[test]
    fn spin_lands_on_the_segment_under_the_final_angle() {
        let mut rng = GameRng::seed_from_u64(21);
        let mut wheel = KarmaWheel::new();
        spin_to_rest(&mut wheel, &mut rng);

        assert_eq!(wheel.machine.phase(), Phase::Result);
        assert_eq!(wheel.elapsed_ticks, SPIN_TICKS);
        let landed = wheel.landed.expect("wheel landed");
        assert_eq!(landed, segment_index(wheel.rotation, SEGMENTS.len()));
        assert_eq!(wheel.karma, SEGMENTS[landed].karma);
        assert!(wheel.rotation >= f64::from(MIN_TURNS) * 360.0);
    }

    #[test]
    fn karma_accumulates_over_spins() {
        let mut rng = GameRng::seed_from_u64(4);
        let mut wheel = KarmaWheel::new();
        let mut expected = 0;
        for _ in 0..3 {
            spin_to_rest(&mut wheel, &mut rng);
            expected += SEGMENTS[wheel.landed.unwrap()].karma;
        }
        assert_eq!(wheel.spins, 3);
        assert_eq!(wheel.karma, expected);
    }

    #[test]
    fn cannot_spin_while_spinning() {
        let mut rng = GameRng::seed_from_u64(8);
        let mut wheel = KarmaWheel::new();
        wheel.act(KarmaWheelAction::Spin, &mut rng).unwrap();
        let err = wheel.act(KarmaWheelAction::Spin, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::Transition(_)));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut rng = GameRng::seed_from_u64(13);
        let mut wheel = KarmaWheel::new();
        spin_to_rest(&mut wheel, &mut rng);
        wheel.act(KarmaWheelAction::Spin, &mut rng).unwrap();
        wheel.tick(&mut rng);
        wheel.reset();

        assert_eq!(wheel.machine.phase(), Phase::Setup);
        assert_eq!(wheel.rotation, 0.0);
        assert_eq!(wheel.karma, 0);
        assert_eq!(wheel.spins, 0);
        assert!(wheel.landed.is_none());
        assert!(wheel.tick_interval().is_none());
    }
}
