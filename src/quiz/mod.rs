//! The quiz attempt state machine and its controller.

mod controller;
mod events;
mod state;

pub use controller::QuizController;
pub use events::{QuizEvent, QuizOutcome, QuizSnapshot};
pub use state::{score_attempt, AttemptState, NavDirection, QuizPhase};
