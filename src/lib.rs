//! CertifyTube core: the course-progress → quiz → certificate flow of a
//! local-first learning app.
//!
//! All durable state lives behind the [`storage::Store`] port; the quiz
//! attempt runs as a small state machine with a cancellable countdown. The
//! UI shell (rendering, routing, QR/PDF integrations) is not part of this
//! crate — it consumes [`app::App`] and the [`quiz::QuizEvent`] channel.

pub mod app;
pub mod catalog;
pub mod certificates;
pub mod dashboard;
pub mod models;
pub mod progress;
pub mod quiz;
pub mod settings;
pub mod storage;

pub use app::{App, CourseProgressView};
pub use catalog::Catalog;
pub use certificates::{CertificateRegistry, CertificateStats};
pub use dashboard::{Dashboard, DashboardOverview};
pub use models::{Certificate, Course, CourseProgress, Difficulty, Question, Quiz, Video};
pub use progress::{ProgressTracker, ToggleOutcome};
pub use quiz::{NavDirection, QuizController, QuizEvent, QuizOutcome, QuizPhase, QuizSnapshot};
pub use settings::{ProfileSettings, SettingsStore};
pub use storage::{MemoryStore, SqliteStore, Store};

/// Initializes logging from the environment (reads RUST_LOG).
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}
