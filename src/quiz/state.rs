use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Quiz;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    Completed,
}

impl Default for QuizPhase {
    fn default() -> Self {
        QuizPhase::NotStarted
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NavDirection {
    Forward,
    Back,
}

/// Transient state for one quiz taking. Only the outcome outlives the
/// attempt; nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptState {
    pub phase: QuizPhase,
    pub attempt_id: Option<String>,
    pub current_question: usize,
    /// question id → selected option index
    pub answers: HashMap<u32, usize>,
    pub remaining_secs: u32,
    pub score: Option<u8>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for AttemptState {
    fn default() -> Self {
        Self {
            phase: QuizPhase::NotStarted,
            attempt_id: None,
            current_question: 0,
            answers: HashMap::new(),
            remaining_secs: 0,
            score: None,
            started_at: None,
        }
    }
}

impl AttemptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, attempt_id: String, time_limit_secs: u32, started_at: DateTime<Utc>) {
        *self = Self {
            phase: QuizPhase::InProgress,
            attempt_id: Some(attempt_id),
            current_question: 0,
            answers: HashMap::new(),
            remaining_secs: time_limit_secs,
            score: None,
            started_at: Some(started_at),
        };
    }

    pub fn record_answer(&mut self, question_id: u32, option_index: usize) {
        self.answers.insert(question_id, option_index);
    }

    pub fn is_answered(&self, question_id: u32) -> bool {
        self.answers.contains_key(&question_id)
    }

    /// One countdown step. Returns the remaining seconds after the step.
    pub fn tick(&mut self) -> u32 {
        if self.phase == QuizPhase::InProgress {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
        }
        self.remaining_secs
    }

    /// Moves the current-question index, clamped to the question range.
    /// Forward movement is refused until the current question has an answer;
    /// backward movement is unconditional. Returns whether the index moved.
    pub fn navigate(&mut self, direction: NavDirection, quiz: &Quiz) -> bool {
        match direction {
            NavDirection::Back => {
                if self.current_question > 0 {
                    self.current_question -= 1;
                    true
                } else {
                    false
                }
            }
            NavDirection::Forward => {
                if self.current_question + 1 >= quiz.question_count() {
                    return false;
                }
                let current_id = quiz.questions[self.current_question].id;
                if !self.is_answered(current_id) {
                    return false;
                }
                self.current_question += 1;
                true
            }
        }
    }

    pub fn complete(&mut self, score: u8) {
        self.phase = QuizPhase::Completed;
        self.score = Some(score);
    }
}

/// Scores a set of recorded answers against a quiz. Unanswered questions
/// never match; the result is the integer-rounded percentage of correct
/// answers.
pub fn score_attempt(quiz: &Quiz, answers: &HashMap<u32, usize>) -> u8 {
    let total = quiz.question_count();
    if total == 0 {
        return 0;
    }

    let correct = quiz
        .questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_option))
        .count();

    ((correct as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn python_quiz() -> Quiz {
        Catalog::builtin()
            .unwrap()
            .quiz("python-basics")
            .unwrap()
            .clone()
    }

    #[test]
    fn forward_navigation_requires_an_answer() {
        let quiz = python_quiz();
        let mut state = AttemptState::new();
        state.begin("a".into(), quiz.time_limit_secs, Utc::now());

        assert!(!state.navigate(NavDirection::Forward, &quiz));
        assert_eq!(state.current_question, 0);

        state.record_answer(quiz.questions[0].id, 0);
        assert!(state.navigate(NavDirection::Forward, &quiz));
        assert_eq!(state.current_question, 1);
    }

    #[test]
    fn backward_navigation_is_unconditional_and_clamped() {
        let quiz = python_quiz();
        let mut state = AttemptState::new();
        state.begin("a".into(), quiz.time_limit_secs, Utc::now());

        assert!(!state.navigate(NavDirection::Back, &quiz));

        state.record_answer(quiz.questions[0].id, 0);
        state.navigate(NavDirection::Forward, &quiz);
        assert!(state.navigate(NavDirection::Back, &quiz));
        assert_eq!(state.current_question, 0);
    }

    #[test]
    fn forward_navigation_clamps_at_the_last_question() {
        let quiz = python_quiz();
        let mut state = AttemptState::new();
        state.begin("a".into(), quiz.time_limit_secs, Utc::now());

        for question in &quiz.questions {
            state.record_answer(question.id, 0);
            state.navigate(NavDirection::Forward, &quiz);
        }
        assert_eq!(state.current_question, quiz.question_count() - 1);
        assert!(!state.navigate(NavDirection::Forward, &quiz));
    }

    #[test]
    fn tick_saturates_at_zero() {
        let mut state = AttemptState::new();
        state.begin("a".into(), 2, Utc::now());

        assert_eq!(state.tick(), 1);
        assert_eq!(state.tick(), 0);
        assert_eq!(state.tick(), 0);
    }

    #[test]
    fn scoring_matches_correct_count() {
        let quiz = python_quiz();
        let mut answers = HashMap::new();

        // 7 of 10 correct -> 70.
        for question in quiz.questions.iter().take(7) {
            answers.insert(question.id, question.correct_option);
        }
        for question in quiz.questions.iter().skip(7) {
            let wrong = (question.correct_option + 1) % question.options.len();
            answers.insert(question.id, wrong);
        }
        assert_eq!(score_attempt(&quiz, &answers), 70);
    }

    #[test]
    fn scoring_is_order_independent() {
        let quiz = python_quiz();

        let mut forward = HashMap::new();
        for question in &quiz.questions {
            forward.insert(question.id, question.correct_option);
        }

        let mut reverse = HashMap::new();
        for question in quiz.questions.iter().rev() {
            reverse.insert(question.id, question.correct_option);
        }

        assert_eq!(score_attempt(&quiz, &forward), score_attempt(&quiz, &reverse));
        assert_eq!(score_attempt(&quiz, &forward), 100);
    }

    #[test]
    fn no_answers_scores_zero() {
        let quiz = python_quiz();
        assert_eq!(score_attempt(&quiz, &HashMap::new()), 0);
    }
}
