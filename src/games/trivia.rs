//! City trivia: a five-question round cycling question, feedback, next.

use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{Challenge, GameError, GameKind, GameRng, Phase, PhaseEvent, PhaseMachine};

const TICK: Duration = Duration::from_millis(100);
const TIME_LIMIT_TICKS: u32 = 150;
const ROUND_LEN: usize = 5;
const POINTS_PER_ANSWER: u32 = 100;

/// A multiple-choice question.
#[derive(Debug, Serialize)]
pub struct Question {
    /// Question text.
    pub prompt: &'static str,
    /// Possible answers.
    pub answers: &'static [&'static str],
    #[serde(skip)]
    correct: usize,
}

static QUESTION_BANK: [Question; 10] = [
    Question {
        prompt: "What must you never do during an active roleplay scene?",
        answers: &["Break character without reason", "Use an emote", "Call a taxi"],
        correct: 0,
    },
    Question {
        prompt: "What is it called when you use out-of-character info in character?",
        answers: &["Powergaming", "Metagaming", "Combat logging"],
        correct: 1,
    },
    Question {
        prompt: "Forcing an outcome on another player without giving them a chance is...",
        answers: &["Fail RP", "Powergaming", "Value of life"],
        correct: 1,
    },
    Question {
        prompt: "Disconnecting to escape an arrest is known as...",
        answers: &["Combat logging", "Ghosting", "Random deathmatch"],
        correct: 0,
    },
    Question {
        prompt: "Killing another player without any roleplay reason is...",
        answers: &["VDM", "RDM", "NLR"],
        correct: 1,
    },
    Question {
        prompt: "Using a vehicle as a weapon without cause is...",
        answers: &["VDM", "RDM", "Metagaming"],
        correct: 0,
    },
    Question {
        prompt: "After being downed and respawning, you must forget the events that led to it. This is...",
        answers: &["New Life Rule", "Safe zone", "Cooldown"],
        correct: 0,
    },
    Question {
        prompt: "Valuing your character's life means you should...",
        answers: &[
            "Act as if you had only one life",
            "Charge at armed police",
            "Ignore threats",
        ],
        correct: 0,
    },
    Question {
        prompt: "Where should rule disputes be handled?",
        answers: &["In the middle of a scene", "Through a support ticket", "In global chat"],
        correct: 1,
    },
    Question {
        prompt: "Streaming another player's location to your crew is...",
        answers: &["Ghosting", "Fail driving", "Allowed"],
        correct: 0,
    },
];

/// Where the round stands while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Waiting for an answer while the clock runs.
    Question,
    /// Showing whether the last answer was right.
    Feedback {
        /// The answer given was correct.
        correct: bool,
        /// The clock ran out before an answer was given.
        timed_out: bool,
    },
}

/// Player actions.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriviaAction {
    /// Draw a round and show the first question.
    Start,
    /// Answer the current question.
    Answer {
        /// Index into the question's answers.
        choice: usize,
    },
    /// Move on after feedback.
    Next,
}

/// Client view of the quiz; answers stay hidden until played.
#[derive(Debug, Serialize)]
pub struct TriviaView {
    phase: Phase,
    question_number: usize,
    questions_total: usize,
    question: Option<&'static Question>,
    step: Step,
    correct_answer: Option<usize>,
    remaining_ms: u64,
    score: u32,
    correct_count: usize,
}

/// Trivia round state.
#[derive(Debug)]
pub struct Trivia {
    machine: PhaseMachine,
    round: Vec<usize>,
    current: usize,
    step: Step,
    remaining_ticks: u32,
    score: u32,
    correct_count: usize,
}

impl Default for Trivia {
    fn default() -> Self {
        Self {
            machine: PhaseMachine::new(),
            round: Vec::new(),
            current: 0,
            step: Step::Question,
            remaining_ticks: TIME_LIMIT_TICKS,
            score: 0,
            correct_count: 0,
        }
    }
}

impl Trivia {
    /// No round drawn yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn current_question(&self) -> Option<&'static Question> {
        if !self.machine.is(Phase::Running) {
            return None;
        }
        self.round
            .get(self.current)
            .map(|&index| &QUESTION_BANK[index])
    }

    fn asking(&self) -> bool {
        self.machine.is(Phase::Running) && self.step == Step::Question
    }
}

impl Challenge for Trivia {
    type Action = TriviaAction;
    type View = TriviaView;

    const KIND: GameKind = GameKind::Trivia;

    fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    fn act(&mut self, action: TriviaAction, rng: &mut GameRng) -> Result<(), GameError> {
        match action {
            TriviaAction::Start => {
                self.machine.apply(PhaseEvent::Start)?;
                let mut pool: Vec<usize> = (0..QUESTION_BANK.len()).collect();
                pool.shuffle(rng);
                pool.truncate(ROUND_LEN);
                self.round = pool;
                self.current = 0;
                self.step = Step::Question;
                self.remaining_ticks = TIME_LIMIT_TICKS;
                Ok(())
            }
            TriviaAction::Answer { choice } => {
                let question = match self.current_question() {
                    Some(question) if self.step == Step::Question => question,
                    _ => {
                        return Err(GameError::OutOfPhase(
                            "no question is waiting for an answer".into(),
                        ));
                    }
                };
                if choice >= question.answers.len() {
                    return Err(GameError::InvalidAction(format!(
                        "answer {choice} does not exist"
                    )));
                }
                let correct = choice == question.correct;
                if correct {
                    self.score += POINTS_PER_ANSWER;
                    self.correct_count += 1;
                }
                self.step = Step::Feedback {
                    correct,
                    timed_out: false,
                };
                Ok(())
            }
            TriviaAction::Next => {
                if !self.machine.is(Phase::Running) || self.step == Step::Question {
                    return Err(GameError::OutOfPhase(
                        "answer the current question first".into(),
                    ));
                }
                self.current += 1;
                if self.current >= self.round.len() {
                    self.machine.apply(PhaseEvent::Finish)?;
                } else {
                    self.step = Step::Question;
                    self.remaining_ticks = TIME_LIMIT_TICKS;
                }
                Ok(())
            }
        }
    }

    fn tick_interval(&self) -> Option<Duration> {
        self.asking().then_some(TICK)
    }

    fn tick(&mut self, _rng: &mut GameRng) {
        if !self.asking() {
            return;
        }
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            self.step = Step::Feedback {
                correct: false,
                timed_out: true,
            };
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

    fn view(&self) -> TriviaView {
        let question = self.current_question();
        let in_feedback = matches!(self.step, Step::Feedback { .. });
        TriviaView {
            phase: self.machine.phase(),
            question_number: (self.current + 1).min(self.round.len().max(1)),
            questions_total: ROUND_LEN,
            question,
            step: self.step,
            correct_answer: question.filter(|_| in_feedback).map(|q| q.correct),
            remaining_ms: u64::from(self.remaining_ticks) * TICK.as_millis() as u64,
            score: self.score,
            correct_count: self.correct_count,
        }
    }
}
