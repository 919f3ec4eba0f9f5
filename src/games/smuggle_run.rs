//! Smuggle run: pick a cargo, sit through the drive, and hope the draw beats
//! the cargo's risk.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Challenge, GameError, GameKind, GameRng, Phase, PhaseEvent, PhaseMachine};

const TICK: Duration = Duration::from_millis(50);
const PROGRESS_STEP: u8 = 4;

/// A cargo option.
#[derive(Debug, Serialize)]
pub struct Cargo {
    /// Identifier sent back by the client.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Probability of getting caught.
    pub risk: f64,
    /// Payout on delivery.
    pub payout: u32,
}

static CARGO: [Cargo; 3] = [
    Cargo {
        id: "herbs",
        label: "Herbal goods",
        risk: 0.2,
        payout: 2_000,
    },
    Cargo {
        id: "hardware",
        label: "Hardware",
        risk: 0.45,
        payout: 6_000,
    },
    Cargo {
        id: "gold",
        label: "Gold bars",
        risk: 0.7,
        payout: 15_000,
    },
];

/// Player actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SmuggleRunAction {
    /// Load the chosen cargo and drive.
    Start {
        /// Cargo identifier.
        cargo: String,
    },
}

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunOutcome {
    /// Cargo delivered.
    pub success: bool,
    /// The uniform draw compared against the risk.
    pub draw: f64,
    /// Money earned, zero when caught.
    pub payout: u32,
}

/// Client view of a smuggling run.
#[derive(Debug, Serialize)]
pub struct SmuggleRunView {
    phase: Phase,
    cargo_options: &'static [Cargo],
    cargo: Option<&'static str>,
    progress: u8,
    outcome: Option<RunOutcome>,
}

/// Smuggle run state.
#[derive(Debug, Default)]
pub struct SmuggleRun {
    machine: PhaseMachine,
    cargo: Option<usize>,
    progress: u8,
    outcome: Option<RunOutcome>,
}

impl SmuggleRun {
    /// Nothing loaded yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Challenge for SmuggleRun {
    type Action = SmuggleRunAction;
    type View = SmuggleRunView;

    const KIND: GameKind = GameKind::SmuggleRun;

    fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    fn act(&mut self, action: SmuggleRunAction, _rng: &mut GameRng) -> Result<(), GameError> {
        match action {
            SmuggleRunAction::Start { cargo } => {
                self.machine.ensure(PhaseEvent::Start)?;
                let index = CARGO
                    .iter()
                    .position(|candidate| candidate.id == cargo)
                    .ok_or_else(|| GameError::InvalidAction(format!("unknown cargo `{cargo}`")))?;
                self.machine.apply(PhaseEvent::Start)?;
                self.cargo = Some(index);
                self.progress = 0;
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
        let Some(cargo) = self.cargo.map(|index| &CARGO[index]) else {
            return;
        };
        let draw: f64 = rng.random();
        let success = draw > cargo.risk;
        self.outcome = Some(RunOutcome {
            success,
            draw,
            payout: if success { cargo.payout } else { 0 },
        });
        let _ = self.machine.apply(PhaseEvent::Finish);
    }

    fn reset(&mut self) {
        let mut machine = std::mem::take(&mut self.machine);
        let _ = machine.apply(PhaseEvent::Reset);
        *self = Self {
            machine,
            ..Self::default()
        };
    }

    fn view(&self) -> SmuggleRunView {
        SmuggleRunView {
            phase: self.machine.phase(),
            cargo_options: &CARGO,
            cargo: self.cargo.map(|index| CARGO[index].id),
            progress: self.progress,
            outcome: self.outcome,
        }
    }
}
