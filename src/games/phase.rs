use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// High-level phases every mini-game moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Choices are being made; nothing is timed yet.
    Setup,
    /// The challenge is live: timers may be firing and actions are scored.
    Running,
    /// The outcome has been decided and is displayed until a reset.
    Result,
}

/// Events that can be applied to a [`PhaseMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Leave setup and begin the challenge.
    Start,
    /// The outcome has been decided.
    Finish,
    /// Play again straight from the result screen, keeping accumulated state.
    Restart,
    /// Return to setup from anywhere.
    Reset,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the machine was in when the event was received.
    pub from: Phase,
    /// The event that cannot be applied from this phase.
    pub event: PhaseEvent,
}

/// Phase tracker shared by all mini-games.
///
/// The version increments on every applied transition; session snapshots
/// carry it so clients can discard stale frames.
#[derive(Debug, Clone)]
pub struct PhaseMachine {
    phase: Phase,
    version: usize,
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self {
            phase: Phase::Setup,
            version: 0,
        }
    }
}

impl PhaseMachine {
    /// Create a new machine initialised in the setup phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of transitions applied since creation.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Check whether the machine is in `phase`.
    pub fn is(&self, phase: Phase) -> bool {
        self.phase == phase
    }

    /// Fail with [`InvalidTransition`] unless `event` is valid from the current phase.
    pub fn ensure(&self, event: PhaseEvent) -> Result<(), InvalidTransition> {
        self.compute_transition(event).map(|_| ())
    }

    /// Apply `event`, returning the new phase.
    pub fn apply(&mut self, event: PhaseEvent) -> Result<Phase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        self.version += 1;
        Ok(next)
    }

    fn compute_transition(&self, event: PhaseEvent) -> Result<Phase, InvalidTransition> {
        let next = match (self.phase, event) {
            (Phase::Setup, PhaseEvent::Start) => Phase::Running,
            (Phase::Running, PhaseEvent::Finish) => Phase::Result,
            (Phase::Result, PhaseEvent::Restart) => Phase::Running,
            (_, PhaseEvent::Reset) => Phase::Setup,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_phase_is_setup() {
        let machine = PhaseMachine::new();
        assert_eq!(machine.phase(), Phase::Setup);
        assert_eq!(machine.version(), 0);
    }

    #[test]
    fn full_round_trip_through_phases() {
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.apply(PhaseEvent::Start), Ok(Phase::Running));
        assert_eq!(machine.apply(PhaseEvent::Finish), Ok(Phase::Result));
        assert_eq!(machine.apply(PhaseEvent::Restart), Ok(Phase::Running));
        assert_eq!(machine.apply(PhaseEvent::Finish), Ok(Phase::Result));
        assert_eq!(machine.apply(PhaseEvent::Reset), Ok(Phase::Setup));
        assert_eq!(machine.version(), 5);
    }

    #[test]
    fn finishing_from_setup_is_rejected() {
        let mut machine = PhaseMachine::new();
        let err = machine.apply(PhaseEvent::Finish).unwrap_err();
        assert_eq!(err.from, Phase::Setup);
        assert_eq!(err.event, PhaseEvent::Finish);
        assert_eq!(machine.version(), 0);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut machine = PhaseMachine::new();
        machine.apply(PhaseEvent::Start).unwrap();
        assert!(machine.ensure(PhaseEvent::Start).is_err());
        assert!(machine.apply(PhaseEvent::Restart).is_err());
    }

    #[test]
    fn reset_is_valid_from_every_phase() {
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.apply(PhaseEvent::Reset), Ok(Phase::Setup));
        machine.apply(PhaseEvent::Start).unwrap();
        assert_eq!(machine.apply(PhaseEvent::Reset), Ok(Phase::Setup));
    }
}
