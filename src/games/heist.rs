//! Heist planner: four planning choices feed a clamped success chance, then a
//! progress bar runs to completion before the roll.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Challenge, GameError, GameKind, GameRng, Phase, PhaseEvent, PhaseMachine, roll};

const TICK: Duration = Duration::from_millis(100);
const PROGRESS_STEP: u8 = 5;
const BASE_CHANCE: i32 = 50;
const MIN_CHANCE: i32 = 5;
const MAX_CHANCE: i32 = 95;
const BASE_PAYOUT: u32 = 10_000;
const PAYOUT_PER_RISK: u32 = 500;

/// Planning categories, in the order they are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeistCategory {
    /// How the crew gets in.
    Approach,
    /// How many people go in.
    Crew,
    /// Getaway vehicle.
    Vehicle,
    /// Exit route.
    Escape,
}

impl HeistCategory {
    const ALL: [HeistCategory; 4] = [
        HeistCategory::Approach,
        HeistCategory::Crew,
        HeistCategory::Vehicle,
        HeistCategory::Escape,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Options offered for this category.
    pub fn options(self) -> &'static [HeistOption] {
        match self {
            HeistCategory::Approach => &APPROACHES,
            HeistCategory::Crew => &CREWS,
            HeistCategory::Vehicle => &VEHICLES,
            HeistCategory::Escape => &ESCAPES,
        }
    }
}

/// One selectable planning option and its factors.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeistOption {
    /// Identifier sent back by the client.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Raises the odds of getting caught.
    pub risk: i32,
    /// Lowers the odds of being noticed.
    pub stealth: i32,
    /// Shortens exposure time.
    pub speed: i32,
}

const fn option(id: &'static str, label: &'static str, risk: i32, stealth: i32, speed: i32) -> HeistOption {
    HeistOption {
        id,
        label,
        risk,
        stealth,
        speed,
    }
}

static APPROACHES: [HeistOption; 3] = [
    option("ghost", "Silent entry", 5, 70, 0),
    option("loud", "Guns blazing", 45, -20, 30),
    option("inside", "Inside man", 20, 40, 10),
];

static CREWS: [HeistOption; 3] = [
    option("solo", "Lone wolf", 25, 20, -10),
    option("duo", "Two-man team", 15, 10, 10),
    option("full", "Full crew", 30, -10, 25),
];

static VEHICLES: [HeistOption; 3] = [
    option("bike", "Dirt bike", 20, 10, 35),
    option("van", "Unmarked van", 10, 0, 0),
    option("sports", "Sports car", 25, -10, 40),
];

static ESCAPES: [HeistOption; 3] = [
    option("tunnel", "Storm drains", 5, 50, -10),
    option("highway", "Highway run", 30, -10, 30),
    option("boat", "Speedboat", 15, 20, 10),
];

/// Success chance (percent) for a fully chosen plan.
pub fn success_chance(choices: [&HeistOption; 4]) -> u8 {
    let (risk, stealth, speed) = choices.iter().fold((0, 0, 0), |(r, st, sp), o| {
        (r + o.risk, st + o.stealth, sp + o.speed)
    });
    let chance = BASE_CHANCE + (5 * stealth + 3 * speed - 6 * risk) / 10;
    chance.clamp(MIN_CHANCE, MAX_CHANCE) as u8
}

fn payout(choices: [&HeistOption; 4]) -> u32 {
    let risk: i32 = choices.iter().map(|o| o.risk).sum();
    BASE_PAYOUT + PAYOUT_PER_RISK * risk.max(0) as u32
}

/// Player actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeistAction {
    /// Choose an option for a category during planning.
    Select {
        /// Category being planned.
        category: HeistCategory,
        /// Option identifier within the category.
        option: String,
    },
    /// Lock the plan and go.
    Execute,
}

/// How the job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeistOutcome {
    /// Whether the crew got away.
    pub success: bool,
    /// Chance the roll was made against.
    pub chance: u8,
    /// Take on success, zero otherwise.
    pub payout: u32,
}

/// Options of one planning category and the current pick.
#[derive(Debug, Serialize)]
pub struct HeistCategoryView {
    category: HeistCategory,
    options: &'static [HeistOption],
    selected: Option<&'static str>,
}

/// Client view of the heist plan and its progress.
#[derive(Debug, Serialize)]
pub struct HeistView {
    phase: Phase,
    categories: Vec<HeistCategoryView>,
    success_chance: Option<u8>,
    progress: u8,
    outcome: Option<HeistOutcome>,
}

/// Heist planner state.
#[derive(Debug, Default)]
pub struct Heist {
    machine: PhaseMachine,
    plan: [Option<usize>; 4],
    progress: u8,
    outcome: Option<HeistOutcome>,
}

impl Heist {
    /// Fresh planner with nothing chosen.
    pub fn new() -> Self {
        Self::default()
    }

    fn chosen(&self) -> Option<[&'static HeistOption; 4]> {
        let mut chosen = [&APPROACHES[0]; 4];
        for category in HeistCategory::ALL {
            let index = self.plan[category.index()]?;
            chosen[category.index()] = &category.options()[index];
        }
        Some(chosen)
    }
}

impl Challenge for Heist {
    type Action = HeistAction;
    type View = HeistView;

    const KIND: GameKind = GameKind::Heist;

    fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    fn act(&mut self, action: HeistAction, _rng: &mut GameRng) -> Result<(), GameError> {
        match action {
            HeistAction::Select { category, option } => {
                if !self.machine.is(Phase::Setup) {
                    return Err(GameError::OutOfPhase(
                        "the plan is locked once the job starts".into(),
                    ));
                }
                let index = category
                    .options()
                    .iter()
                    .position(|candidate| candidate.id == option)
                    .ok_or_else(|| {
                        GameError::InvalidAction(format!("unknown {category:?} option `{option}`"))
                    })?;
                self.plan[category.index()] = Some(index);
                Ok(())
            }
            HeistAction::Execute => {
                self.machine.ensure(PhaseEvent::Start)?;
                if self.chosen().is_none() {
                    return Err(GameError::InvalidAction(
                        "every category needs a choice before executing".into(),
                    ));
                }
                self.progress = 0;
                self.machine.apply(PhaseEvent::Start)?;
                Ok(())
            }
        }
    }

    fn tick_interval(&self) -> Option<Duration> {
        self.machine.is(Phase::Running).then_some(TICK)
    }

    fn tick(&mut self, rng: &mut GameRng) {
        if !self.machine.is(Phase::Running) {
            return;
        }
        self.progress = self.progress.saturating_add(PROGRESS_STEP).min(100);
        if self.progress < 100 {
            return;
        }
        let Some(chosen) = self.chosen() else {
            return;
        };
        let chance = success_chance(chosen);
        let success = roll(rng, chance);
        self.outcome = Some(HeistOutcome {
            success,
            chance,
            payout: if success { payout(chosen) } else { 0 },
        });
        let _ = self.machine.apply(PhaseEvent::Finish);
    }

    fn reset(&mut self) {
        self.plan = [None; 4];
        self.progress = 0;
        self.outcome = None;
        let _ = self.machine.apply(PhaseEvent::Reset);
    }

    fn view(&self) -> HeistView {
        HeistView {
            phase: self.machine.phase(),
            categories: HeistCategory::ALL
                .iter()
                .map(|category| HeistCategoryView {
                    category: *category,
                    options: category.options(),
                    selected: self.plan[category.index()].map(|i| category.options()[i].id),
                })
                .collect(),
            success_chance: self.chosen().map(success_chance),
            progress: self.progress,
            outcome: self.outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn plan(heist: &mut Heist, rng: &mut GameRng, picks: [&str; 4]) {
        for (category, option) in HeistCategory::ALL.into_iter().zip(picks) {
            heist
                .act(
                    HeistAction::Select {
                        category,
                        option: option.into(),
                    },
                    rng,
                )
                .unwrap();
        }
    }

    #[test]
    fn every_combination_stays_within_bounds() {
        let mut seen_min = false;
        let mut seen_max = false;
        for a in &APPROACHES {
            for c in &CREWS {
                for v in &VEHICLES {
                    for e in &ESCAPES {
                        let chance = success_chance([a, c, v, e]);
                        assert!((5..=95).contains(&chance), "{chance} out of bounds");
                        seen_min |= chance == 5;
                        seen_max |= chance == 95;
                    }
                }
            }
        }
        assert!(seen_min && seen_max, "clamps should be reachable");
    }

    #[test]
    fn execute_requires_a_full_plan() {
        let mut rng = GameRng::seed_from_u64(3);
        let mut heist = Heist::new();
        heist
            .act(
                HeistAction::Select {
                    category: HeistCategory::Crew,
                    option: "duo".into(),
                },
                &mut rng,
            )
            .unwrap();
        let err = heist.act(HeistAction::Execute, &mut rng).unwrap_err();
        assert!(matches!(err, GameError::InvalidAction(_)));
        assert_eq!(heist.machine.phase(), Phase::Setup);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut rng = GameRng::seed_from_u64(3);
        let mut heist = Heist::new();
        let err = heist
            .act(
                HeistAction::Select {
                    category: HeistCategory::Vehicle,
                    option: "helicopter".into(),
                },
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidAction(_)));
    }

    #[test]
    fn progress_runs_to_a_result() {
        let mut rng = GameRng::seed_from_u64(11);
        let mut heist = Heist::new();
        plan(&mut heist, &mut rng, ["ghost", "duo", "bike", "tunnel"]);
        heist.act(HeistAction::Execute, &mut rng).unwrap();
        assert_eq!(heist.tick_interval(), Some(TICK));

        let mut ticks = 0;
        while heist.machine.is(Phase::Running) {
            heist.tick(&mut rng);
            ticks += 1;
        }
        assert_eq!(ticks, 20);
        assert!(heist.tick_interval().is_none());

        let outcome = heist.outcome.expect("outcome decided");
        assert_eq!(outcome.chance, 95);
        assert_eq!(outcome.payout > 0, outcome.success);
    }

    #[test]
    fn plan_is_locked_while_running() {
        let mut rng = GameRng::seed_from_u64(5);
        let mut heist = Heist::new();
        plan(&mut heist, &mut rng, ["loud", "full", "sports", "highway"]);
        heist.act(HeistAction::Execute, &mut rng).unwrap();
        let err = heist
            .act(
                HeistAction::Select {
                    category: HeistCategory::Crew,
                    option: "solo".into(),
                },
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, GameError::OutOfPhase(_)));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut rng = GameRng::seed_from_u64(9);
        let mut heist = Heist::new();
        plan(&mut heist, &mut rng, ["inside", "solo", "van", "boat"]);
        heist.act(HeistAction::Execute, &mut rng).unwrap();
        heist.tick(&mut rng);
        heist.reset();

        assert_eq!(heist.machine.phase(), Phase::Setup);
        assert_eq!(heist.plan, [None; 4]);
        assert_eq!(heist.progress, 0);
        assert!(heist.outcome.is_none());
        assert!(heist.tick_interval().is_none());
    }
}
