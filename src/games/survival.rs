//! Twenty-four hours on the street: one event per hour, every choice moves
//! money, heat, trust and survival.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    Challenge, GameError, GameKind, GameRng, Phase, PhaseEvent, PhaseMachine, STAT_MAX, clamp_stat,
};

const HOURS: u8 = 24;
const FATIGUE_PER_HOUR: i32 = 2;

/// Tracked stats. Money is unbounded; the rest stay within 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Cash on hand, may go negative (debt).
    pub money: i32,
    /// Police attention; 100 means busted.
    pub heat: i32,
    /// Standing with the street.
    pub trust: i32,
    /// Health and stamina; 0 means dead.
    pub survival: i32,
}

const INITIAL_STATS: Stats = Stats {
    money: 500,
    heat: 10,
    trust: 50,
    survival: 100,
};

impl Stats {
    fn apply(&mut self, option: &EventOption) {
        self.money += option.money;
        self.heat = clamp_stat(self.heat + option.heat);
        self.trust = clamp_stat(self.trust + option.trust);
        self.survival = clamp_stat(self.survival + option.survival - FATIGUE_PER_HOUR);
    }
}

/// A choice offered by an hourly event, expressed as stat deltas.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EventOption {
    /// Display label.
    pub label: &'static str,
    /// Money delta.
    pub money: i32,
    /// Heat delta.
    pub heat: i32,
    /// Trust delta.
    pub trust: i32,
    /// Survival delta.
    pub survival: i32,
}

const fn choice(label: &'static str, money: i32, heat: i32, trust: i32, survival: i32) -> EventOption {
    EventOption {
        label,
        money,
        heat,
        trust,
        survival,
    }
}

/// Something that happens during an hour.
#[derive(Debug, Serialize)]
pub struct HourEvent {
    /// What the player is facing.
    pub prompt: &'static str,
    /// Possible reactions.
    pub options: &'static [EventOption],
}

static EVENTS: [HourEvent; 8] = [
    HourEvent {
        prompt: "A patrol car slows down next to you.",
        options: &[
            choice("Keep walking", 0, 5, 0, 0),
            choice("Run", 0, 20, 0, -5),
            choice("Slip them some cash", -200, -15, 0, 0),
        ],
    },
    HourEvent {
        prompt: "Your stomach growls.",
        options: &[
            choice("Buy food", -50, 0, 0, 15),
            choice("Steal a sandwich", 0, 15, 0, 10),
            choice("Ignore it", 0, 0, 0, -15),
        ],
    },
    HourEvent {
        prompt: "A fixer offers a quick job.",
        options: &[
            choice("Take it", 400, 25, 10, 0),
            choice("Decline", 0, 0, -5, 0),
            choice("Tip off the cops", 0, -20, -30, 0),
        ],
    },
    HourEvent {
        prompt: "A rival crew is posted on your corner.",
        options: &[
            choice("Fight for it", 0, 15, 15, -30),
            choice("Negotiate", -100, 0, 5, 0),
            choice("Walk away", 0, 0, -10, 0),
        ],
    },
    HourEvent {
        prompt: "Rain starts pouring.",
        options: &[
            choice("Find shelter", -30, 0, 0, 5),
            choice("Keep hustling", 100, 0, 0, -10),
        ],
    },
    HourEvent {
        prompt: "A friend needs cash.",
        options: &[
            choice("Lend it", -150, 0, 20, 0),
            choice("Refuse", 0, 0, -15, 0),
        ],
    },
    HourEvent {
        prompt: "The block is getting raided.",
        options: &[
            choice("Hide in a basement", 0, -10, 0, -5),
            choice("Floor it out of there", -50, 30, 0, 0),
        ],
    },
    HourEvent {
        prompt: "A street medic offers to patch you up.",
        options: &[
            choice("Pay up", -200, 0, 0, 30),
            choice("Tough it out", 0, 0, 0, -5),
        ],
    },
];

/// How the day ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Made it through all 24 hours.
    Survived,
    /// Survival reached zero.
    Dead,
    /// Heat reached the maximum.
    Busted,
}

/// Player actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurvivalAction {
    /// Begin the day.
    Start,
    /// React to the current event.
    Choose {
        /// Index into the current event's options.
        option: usize,
    },
}

/// Client view of the survivor at the current hour.
#[derive(Debug, Serialize)]
pub struct SurvivalView {
    phase: Phase,
    hour: u8,
    hours_total: u8,
    stats: Stats,
    event: Option<&'static HourEvent>,
    ending: Option<Ending>,
}

/// Survival game state.
#[derive(Debug)]
pub struct Survival {
    machine: PhaseMachine,
    hour: u8,
    stats: Stats,
    event: Option<usize>,
    ending: Option<Ending>,
}

impl Default for Survival {
    fn default() -> Self {
        Self {
            machine: PhaseMachine::new(),
            hour: 0,
            stats: INITIAL_STATS,
            event: None,
            ending: None,
        }
    }
}

impl Survival {
    /// Day not yet started, initial stats.
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_event(&mut self, rng: &mut GameRng) {
        self.event = Some(rng.random_range(0..EVENTS.len()));
    }

    fn end(&mut self, ending: Ending) {
        self.ending = Some(ending);
        self.event = None;
        let _ = self.machine.apply(PhaseEvent::Finish);
    }
}

impl Challenge for Survival {
    type Action = SurvivalAction;
    type View = SurvivalView;

    const KIND: GameKind = GameKind::Survival;

    fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    fn act(&mut self, action: SurvivalAction, rng: &mut GameRng) -> Result<(), GameError> {
        match action {
            SurvivalAction::Start => {
                self.machine.apply(PhaseEvent::Start)?;
                self.draw_event(rng);
                Ok(())
            }
            SurvivalAction::Choose { option } => {
                let event = match (self.machine.phase(), self.event) {
                    (Phase::Running, Some(event)) => &EVENTS[event],
                    _ => {
                        return Err(GameError::OutOfPhase(
                            "there is nothing to react to right now".into(),
                        ));
                    }
                };
                let chosen = event.options.get(option).ok_or_else(|| {
                    GameError::InvalidAction(format!("option {option} does not exist"))
                })?;

                self.stats.apply(chosen);
                if self.stats.survival <= 0 {
                    self.end(Ending::Dead);
                } else if self.stats.heat >= STAT_MAX {
                    self.end(Ending::Busted);
                } else {
                    self.hour += 1;
                    if self.hour >= HOURS {
                        self.end(Ending::Survived);
                    } else {
                        self.draw_event(rng);
                    }
                }
                Ok(())
            }
        }
    }

    fn reset(&mut self) {
        let mut machine = std::mem::take(&mut self.machine);
        let _ = machine.apply(PhaseEvent::Reset);
        *self = Self {
            machine,
            ..Self::default()
        };
    }

    fn view(&self) -> SurvivalView {
        SurvivalView {
            phase: self.machine.phase(),
            hour: self.hour,
            hours_total: HOURS,
            stats: self.stats,
            event: self.event.map(|index| &EVENTS[index]),
            ending: self.ending,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn started(seed: u64) -> (Survival, GameRng) {
        let mut rng = GameRng::seed_from_u64(seed);
        let mut game = Survival::new();
        game.act(SurvivalAction::Start, &mut rng).unwrap();
        (game, rng)
    }

    fn bounded(value: i32) -> bool {
        (0..=100).contains(&value)
    }

    #[test]
    fn random_play_keeps_stats_bounded_and_ends_before_the_hour_moves() {
        for seed in 0..200 {
            let (mut game, mut rng) = started(seed);
            while game.machine.is(Phase::Running) {
                let options = EVENTS[game.event.unwrap()].options.len();
                let hour_before = game.hour;
                let pick = rng.random_range(0..options);
                game.act(SurvivalAction::Choose { option: pick }, &mut rng)
                    .unwrap();

                let stats = game.stats;
                assert!(bounded(stats.heat) && bounded(stats.trust) && bounded(stats.survival));
                match game.ending {
                    Some(Ending::Dead) => {
                        assert_eq!(stats.survival, 0);
                        assert_eq!(game.hour, hour_before);
                    }
                    Some(Ending::Busted) => {
                        assert_eq!(stats.heat, 100);
                        assert_eq!(game.hour, hour_before);
                    }
                    Some(Ending::Survived) => assert_eq!(game.hour, HOURS),
                    None => assert_eq!(game.hour, hour_before + 1),
                }
            }
        }
    }

    #[test]
    fn max_heat_busts_before_the_hour_increments() {
        let (mut game, mut rng) = started(1);
        game.stats.heat = 90;
        game.event = Some(0);
        game.act(SurvivalAction::Choose { option: 1 }, &mut rng)
            .unwrap();
        assert_eq!(game.stats.heat, 100);
        assert_eq!(game.ending, Some(Ending::Busted));
        assert_eq!(game.hour, 0);
        assert_eq!(game.machine.phase(), Phase::Result);
    }

    #[test]
    fn zero_survival_is_fatal_even_with_low_heat() {
        let (mut game, mut rng) = started(2);
        game.hour = 7;
        game.stats.survival = 20;
        game.event = Some(3);
        game.act(SurvivalAction::Choose { option: 0 }, &mut rng)
            .unwrap();
        assert_eq!(game.stats.survival, 0);
        assert_eq!(game.ending, Some(Ending::Dead));
        assert_eq!(game.hour, 7);
    }

    #[test]
    fn money_may_go_negative() {
        let (mut game, mut rng) = started(3);
        game.stats.money = 0;
        game.event = Some(5);
        game.act(SurvivalAction::Choose { option: 0 }, &mut rng)
            .unwrap();
        assert_eq!(game.stats.money, -150);
    }

    #[test]
    fn last_hour_survived_wins() {
        let (mut game, mut rng) = started(4);
        game.hour = HOURS - 1;
        game.event = Some(4);
        game.act(SurvivalAction::Choose { option: 0 }, &mut rng)
            .unwrap();
        assert_eq!(game.ending, Some(Ending::Survived));
        assert!(game.event.is_none());
    }

    #[test]
    fn out_of_range_option_is_rejected() {
        let (mut game, mut rng) = started(5);
        game.event = Some(4);
        let err = game
            .act(SurvivalAction::Choose { option: 9 }, &mut rng)
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidAction(_)));
        assert_eq!(game.stats, INITIAL_STATS);
    }

    #[test]
    fn reset_restores_initial_state() {
        let (mut game, mut rng) = started(6);
        game.act(SurvivalAction::Choose { option: 0 }, &mut rng)
            .unwrap();
        game.reset();
        assert_eq!(game.machine.phase(), Phase::Setup);
        assert_eq!(game.hour, 0);
        assert_eq!(game.stats, INITIAL_STATS);
        assert!(game.event.is_none());
        assert!(game.ending.is_none());
    }
}
