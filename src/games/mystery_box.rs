//! Mystery box: nine hidden rewards, one pick.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{Challenge, GameError, GameKind, GameRng, Phase, PhaseEvent, PhaseMachine};

/// Number of boxes on the grid.
pub const CELLS: usize = 9;
/// The single top prize hidden among the boxes.
pub const JACKPOT: u32 = 500;

const REWARDS: [u32; CELLS] = [JACKPOT, 0, 0, 10, 25, 50, 75, 100, 250];

/// Player actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MysteryBoxAction {
    /// Shuffle the boxes and open the grid.
    Start,
    /// Open one box.
    Reveal {
        /// Box index, `0..9`.
        cell: usize,
    },
}

/// One grid cell, with its content once revealed.
#[derive(Debug, Serialize)]
pub struct CellView {
    index: usize,
    value: Option<u32>,
    locked: bool,
}

/// Client view of the mystery box grid.
#[derive(Debug, Serialize)]
pub struct MysteryBoxView {
    phase: Phase,
    cells: Vec<CellView>,
    prize: Option<u32>,
}

/// Grid state. Values stay hidden except for the one box opened.
#[derive(Debug)]
pub struct MysteryBox {
    machine: PhaseMachine,
    cells: [u32; CELLS],
    revealed: Option<usize>,
}

impl Default for MysteryBox {
    fn default() -> Self {
        Self {
            machine: PhaseMachine::new(),
            cells: REWARDS,
            revealed: None,
        }
    }
}

impl MysteryBox {
    /// Closed grid, rewards not yet shuffled.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Challenge for MysteryBox {
    type Action = MysteryBoxAction;
    type View = MysteryBoxView;

    const KIND: GameKind = GameKind::MysteryBox;

    fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    fn act(&mut self, action: MysteryBoxAction, rng: &mut GameRng) -> Result<(), GameError> {
        match action {
            MysteryBoxAction::Start => {
                self.machine.apply(PhaseEvent::Start)?;
                self.cells.shuffle(rng);
                Ok(())
            }
            MysteryBoxAction::Reveal { cell } => {
                if self.revealed.is_some() {
                    return Err(GameError::InvalidAction("a box was already opened".into()));
                }
                if cell >= CELLS {
                    return Err(GameError::InvalidAction(format!("box {cell} does not exist")));
                }
                self.machine.apply(PhaseEvent::Finish)?;
                self.revealed = Some(cell);
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

    fn view(&self) -> MysteryBoxView {
        let open = self.machine.is(Phase::Running);
        MysteryBoxView {
            phase: self.machine.phase(),
            cells: (0..CELLS)
                .map(|index| CellView {
                    index,
                    value: (self.revealed == Some(index)).then(|| self.cells[index]),
                    locked: !open,
                })
                .collect(),
            prize: self.revealed.map(|index| self.cells[index]),
        }
    }
}
