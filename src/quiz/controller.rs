use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use log::error;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{certificates::CertificateRegistry, models::Quiz, settings::SettingsStore};

use super::{
    events::{QuizEvent, QuizOutcome, QuizSnapshot},
    state::{score_attempt, AttemptState, NavDirection, QuizPhase},
};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Delay between a passing submit and the redirect notification, so the
/// success message has time to render.
const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Drives one quiz attempt: the NotStarted → InProgress → Completed state
/// machine, the one-second countdown, and certificate issuance on a pass.
///
/// The controller is tied to the lifetime of the quiz view; `teardown` must
/// be called when the view unmounts so no ticker or pending redirect can
/// touch state afterwards.
#[derive(Clone)]
pub struct QuizController {
    quiz: Arc<Quiz>,
    course_name: String,
    state: Arc<Mutex<AttemptState>>,
    certificates: CertificateRegistry,
    settings: Arc<SettingsStore>,
    events: mpsc::UnboundedSender<QuizEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    cancel_token: CancellationToken,
}

impl QuizController {
    pub fn new(
        quiz: Arc<Quiz>,
        course_name: String,
        certificates: CertificateRegistry,
        settings: Arc<SettingsStore>,
        events: mpsc::UnboundedSender<QuizEvent>,
    ) -> Self {
        Self {
            quiz,
            course_name,
            state: Arc::new(Mutex::new(AttemptState::new())),
            certificates,
            settings,
            events,
            ticker: Arc::new(Mutex::new(None)),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub async fn snapshot(&self) -> QuizSnapshot {
        let guard = self.state.lock().await;
        QuizSnapshot {
            remaining_secs: guard.remaining_secs,
            state: guard.clone(),
        }
    }

    /// Explicit start action: initializes the countdown and begins ticking.
    /// An attempt cannot be restarted once started.
    pub async fn start(&self) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            if guard.phase != QuizPhase::NotStarted {
                bail!("quiz attempt already started");
            }
            let attempt_id = Uuid::new_v4().to_string();
            guard.begin(attempt_id, self.quiz.time_limit_secs, Utc::now());
        }

        self.spawn_ticker().await;
        self.emit_state_changed().await;
        Ok(())
    }

    /// Upserts an answer. The only validation is that the question exists
    /// and the option index is in range for it.
    pub async fn record_answer(&self, question_id: u32, option_index: usize) -> Result<()> {
        let question = self
            .quiz
            .question(question_id)
            .ok_or_else(|| anyhow!("unknown question id {question_id}"))?;
        if option_index >= question.options.len() {
            bail!(
                "option index {option_index} out of range for question {question_id}"
            );
        }

        {
            let mut guard = self.state.lock().await;
            if guard.phase != QuizPhase::InProgress {
                bail!("no active quiz attempt");
            }
            guard.record_answer(question_id, option_index);
        }

        self.emit_state_changed().await;
        Ok(())
    }

    /// Moves between questions. A refused move (unanswered current question,
    /// or either end of the range) returns false; it is not an error.
    pub async fn navigate(&self, direction: NavDirection) -> bool {
        let moved = {
            let mut guard = self.state.lock().await;
            if guard.phase != QuizPhase::InProgress {
                return false;
            }
            guard.navigate(direction, &self.quiz)
        };

        if moved {
            self.emit_state_changed().await;
        }
        moved
    }

    /// Explicit submit. Scores whatever answers were recorded; submitting
    /// with none is a 0%, not an error.
    pub async fn submit(&self) -> Result<QuizOutcome> {
        complete_attempt(
            &self.state,
            &self.quiz,
            &self.course_name,
            &self.certificates,
            &self.settings,
            &self.events,
            &self.cancel_token,
        )
        .await
    }

    /// Must be called when the owning view unmounts. Stops the ticker and
    /// cancels any pending redirect; the attempt state is left as-is.
    pub async fn teardown(&self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let quiz = self.quiz.clone();
        let course_name = self.course_name.clone();
        let certificates = self.certificates.clone();
        let settings = self.settings.clone();
        let events = self.events.clone();
        let cancel_token = self.cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(TICK_INTERVAL);
            // The first tick of a tokio interval completes immediately;
            // consume it so the countdown steps once per full second.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                let (snapshot, remaining) = {
                    let mut guard = state.lock().await;
                    if guard.phase != QuizPhase::InProgress {
                        break;
                    }
                    let remaining = guard.tick();
                    (guard.clone(), remaining)
                };

                let _ = events.send(QuizEvent::StateChanged(QuizSnapshot {
                    remaining_secs: remaining,
                    state: snapshot,
                }));

                if remaining == 0 {
                    if let Err(err) = complete_attempt(
                        &state,
                        &quiz,
                        &course_name,
                        &certificates,
                        &settings,
                        &events,
                        &cancel_token,
                    )
                    .await
                    {
                        error!("Auto-submit on countdown expiry failed: {err}");
                    }
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn emit_state_changed(&self) {
        let guard = self.state.lock().await;
        let _ = self.events.send(QuizEvent::StateChanged(QuizSnapshot {
            remaining_secs: guard.remaining_secs,
            state: guard.clone(),
        }));
    }
}

/// Shared completion path for explicit submits and countdown expiry.
async fn complete_attempt(
    state: &Mutex<AttemptState>,
    quiz: &Quiz,
    course_name: &str,
    certificates: &CertificateRegistry,
    settings: &SettingsStore,
    events: &mpsc::UnboundedSender<QuizEvent>,
    cancel_token: &CancellationToken,
) -> Result<QuizOutcome> {
    let (attempt_id, score, final_state) = {
        let mut guard = state.lock().await;
        if guard.phase != QuizPhase::InProgress {
            bail!("no active quiz attempt to submit");
        }

        let score = score_attempt(quiz, &guard.answers);
        guard.complete(score);

        let attempt_id = guard
            .attempt_id
            .clone()
            .ok_or_else(|| anyhow!("missing attempt id"))?;
        (attempt_id, score, guard.clone())
    };

    let _ = events.send(QuizEvent::StateChanged(QuizSnapshot {
        remaining_secs: final_state.remaining_secs,
        state: final_state,
    }));

    let passed = score >= quiz.passing_score;
    let certificate = if passed {
        let holder = settings.profile().display_name;
        match certificates.issue(&quiz.id, course_name, score, &holder) {
            Ok(certificate) => Some(certificate),
            Err(err) => {
                // The pass still stands; only the durable record is missing.
                error!("Failed to issue certificate for attempt {attempt_id}: {err}");
                None
            }
        }
    } else {
        None
    };

    let outcome = QuizOutcome {
        attempt_id,
        score,
        passed,
        certificate: certificate.clone(),
    };
    let _ = events.send(QuizEvent::Completed(outcome.clone()));

    if let Some(certificate) = certificate {
        let events = events.clone();
        let token = cancel_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep(REDIRECT_DELAY) => {
                    let _ = events.send(QuizEvent::CertificateReady {
                        certificate_id: certificate.id,
                    });
                }
            }
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        catalog::Catalog,
        models::Quiz,
        storage::{MemoryStore, Store},
    };

    fn python_quiz() -> Quiz {
        Catalog::builtin()
            .unwrap()
            .quiz("python-basics")
            .unwrap()
            .clone()
    }

    fn test_controller(
        quiz: Quiz,
    ) -> (
        QuizController,
        mpsc::UnboundedReceiver<QuizEvent>,
        Arc<MemoryStore>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let certificates = CertificateRegistry::new(store.clone());
        let settings_path = std::env::temp_dir()
            .join("certifytube-tests")
            .join(format!("settings-{}.json", Uuid::new_v4()));
        let settings = Arc::new(SettingsStore::new(settings_path).unwrap());
        let (tx, rx) = mpsc::unbounded_channel();

        let controller = QuizController::new(
            Arc::new(quiz),
            "Python Programming Fundamentals".into(),
            certificates,
            settings,
            tx,
        );
        (controller, rx, store)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<QuizEvent>) -> Vec<QuizEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn start_initializes_the_countdown() {
        let quiz = python_quiz();
        let limit = quiz.time_limit_secs;
        let (controller, _rx, _store) = test_controller(quiz);

        controller.start().await.unwrap();
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.state.phase, QuizPhase::InProgress);
        assert_eq!(snapshot.remaining_secs, limit);

        controller.teardown().await;
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let (controller, _rx, _store) = test_controller(python_quiz());
        controller.start().await.unwrap();
        assert!(controller.start().await.is_err());
        controller.teardown().await;
    }

    #[tokio::test]
    async fn submit_with_no_answers_scores_zero() {
        let (controller, _rx, _store) = test_controller(python_quiz());
        controller.start().await.unwrap();

        let outcome = controller.submit().await.unwrap();
        assert_eq!(outcome.score, 0);
        assert!(!outcome.passed);
        assert!(outcome.certificate.is_none());

        controller.teardown().await;
    }

    #[tokio::test]
    async fn double_submit_is_rejected() {
        let (controller, _rx, _store) = test_controller(python_quiz());
        controller.start().await.unwrap();
        controller.submit().await.unwrap();
        assert!(controller.submit().await.is_err());
        controller.teardown().await;
    }

    #[tokio::test]
    async fn seven_of_ten_passes_and_issues_a_certificate() {
        let quiz = python_quiz();
        let questions = quiz.questions.clone();
        let (controller, _rx, store) = test_controller(quiz);
        controller.start().await.unwrap();

        for question in questions.iter().take(7) {
            controller
                .record_answer(question.id, question.correct_option)
                .await
                .unwrap();
        }
        for question in questions.iter().skip(7) {
            let wrong = (question.correct_option + 1) % question.options.len();
            controller.record_answer(question.id, wrong).await.unwrap();
        }

        let outcome = controller.submit().await.unwrap();
        assert_eq!(outcome.score, 70);
        assert!(outcome.passed);

        let certificate = outcome.certificate.unwrap();
        assert_eq!(certificate.course_id, "python-basics");
        assert_eq!(certificate.user_name, "John Doe");
        assert!(store
            .get(&format!("certificate:{}", certificate.id))
            .unwrap()
            .is_some());

        controller.teardown().await;
    }

    #[tokio::test]
    async fn six_of_ten_fails_and_issues_nothing() {
        let quiz = python_quiz();
        let questions = quiz.questions.clone();
        let (controller, _rx, store) = test_controller(quiz);
        controller.start().await.unwrap();

        for question in questions.iter().take(6) {
            controller
                .record_answer(question.id, question.correct_option)
                .await
                .unwrap();
        }

        let outcome = controller.submit().await.unwrap();
        assert_eq!(outcome.score, 60);
        assert!(!outcome.passed);
        assert!(outcome.certificate.is_none());
        assert!(store.list_keys("certificate:").unwrap().is_empty());

        controller.teardown().await;
    }

    #[tokio::test]
    async fn record_answer_validates_the_option_index() {
        let quiz = python_quiz();
        let first_id = quiz.questions[0].id;
        let option_count = quiz.questions[0].options.len();
        let (controller, _rx, _store) = test_controller(quiz);
        controller.start().await.unwrap();

        assert!(controller.record_answer(first_id, option_count).await.is_err());
        assert!(controller.record_answer(9999, 0).await.is_err());
        assert!(controller.record_answer(first_id, 0).await.is_ok());

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expiry_auto_submits_with_recorded_answers() {
        let mut quiz = python_quiz();
        quiz.time_limit_secs = 5;
        let questions = quiz.questions.clone();
        let (controller, mut rx, _store) = test_controller(quiz);
        controller.start().await.unwrap();

        // 3 of 10 answered, all correct.
        for question in questions.iter().take(3) {
            controller
                .record_answer(question.id, question.correct_option)
                .await
                .unwrap();
        }

        time::sleep(Duration::from_secs(7)).await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.state.phase, QuizPhase::Completed);
        assert_eq!(snapshot.state.score, Some(30));

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, QuizEvent::Completed(outcome) if outcome.score == 30)));

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn passing_submit_schedules_the_redirect() {
        let quiz = python_quiz();
        let questions = quiz.questions.clone();
        let (controller, mut rx, _store) = test_controller(quiz);
        controller.start().await.unwrap();

        for question in &questions {
            controller
                .record_answer(question.id, question.correct_option)
                .await
                .unwrap();
        }
        let outcome = controller.submit().await.unwrap();
        let expected_id = outcome.certificate.unwrap().id;

        time::sleep(Duration::from_secs(3)).await;

        let events = drain(&mut rx);
        assert!(events.iter().any(|e| matches!(
            e,
            QuizEvent::CertificateReady { certificate_id } if *certificate_id == expected_id
        )));

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_cancels_the_pending_redirect() {
        let quiz = python_quiz();
        let questions = quiz.questions.clone();
        let (controller, mut rx, _store) = test_controller(quiz);
        controller.start().await.unwrap();

        for question in &questions {
            controller
                .record_answer(question.id, question.correct_option)
                .await
                .unwrap();
        }
        controller.submit().await.unwrap();
        controller.teardown().await;

        time::sleep(Duration::from_secs(5)).await;

        let events = drain(&mut rx);
        assert!(!events
            .iter()
            .any(|e| matches!(e, QuizEvent::CertificateReady { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_stops_after_teardown() {
        let mut quiz = python_quiz();
        quiz.time_limit_secs = 100;
        let (controller, _rx, _store) = test_controller(quiz);
        controller.start().await.unwrap();

        time::sleep(Duration::from_secs(3)).await;
        controller.teardown().await;
        let frozen = controller.snapshot().await.remaining_secs;

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(controller.snapshot().await.remaining_secs, frozen);
    }
}
