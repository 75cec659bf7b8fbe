//! Wires the catalog, storage port, settings, and the three flow stages
//! together. This is the surface an embedding shell (CLI, desktop app, web
//! view) talks to.

use std::{collections::BTreeSet, path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    catalog::Catalog,
    certificates::{CertificateRegistry, CertificateStats},
    dashboard::{Dashboard, DashboardOverview},
    models::{Certificate, Course},
    progress::{ProgressTracker, ToggleOutcome},
    quiz::{QuizController, QuizEvent},
    settings::SettingsStore,
    storage::{SqliteStore, Store},
};

/// Progress summary for one course view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressView {
    pub watched: BTreeSet<u32>,
    pub percent: u8,
    pub quiz_unlocked: bool,
}

pub struct App {
    catalog: Arc<Catalog>,
    settings: Arc<SettingsStore>,
    progress: ProgressTracker,
    certificates: CertificateRegistry,
    dashboard: Dashboard,
    events: mpsc::UnboundedSender<QuizEvent>,
}

impl App {
    /// Builds an app over any storage port. Returns the receiving end of the
    /// quiz event channel for the shell to consume.
    pub fn new(
        store: Arc<dyn Store>,
        settings: Arc<SettingsStore>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<QuizEvent>)> {
        let catalog = Arc::new(Catalog::builtin()?);
        let progress = ProgressTracker::new(store.clone());
        let certificates = CertificateRegistry::new(store.clone());
        let dashboard = Dashboard::new(
            store,
            catalog.clone(),
            certificates.clone(),
            progress.clone(),
        );

        let (events, receiver) = mpsc::unbounded_channel();

        Ok((
            Self {
                catalog,
                settings,
                progress,
                certificates,
                dashboard,
                events,
            },
            receiver,
        ))
    }

    /// Opens the durable app state under a data directory: the SQLite store
    /// plus `settings.json`.
    pub fn open(data_dir: &Path) -> Result<(Self, mpsc::UnboundedReceiver<QuizEvent>)> {
        std::fs::create_dir_all(data_dir).with_context(|| {
            format!("failed to create data directory {}", data_dir.display())
        })?;

        let store = SqliteStore::new(data_dir.join("certifytube.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        Self::new(Arc::new(store), Arc::new(settings))
    }

    pub fn courses(&self) -> &[Course] {
        self.catalog.courses()
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.catalog.course(course_id)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Flips a video's watched state. `None` when the course is unknown.
    pub fn toggle_video_watched(
        &self,
        course_id: &str,
        video_id: u32,
    ) -> Option<ToggleOutcome> {
        let course = self.catalog.course(course_id)?;
        Some(self.progress.toggle_video_watched(course, video_id))
    }

    /// Progress summary for a course view. `None` when the course is unknown.
    pub fn course_progress(&self, course_id: &str) -> Option<CourseProgressView> {
        let course = self.catalog.course(course_id)?;
        let watched = self.progress.watched(course_id);

        Some(CourseProgressView {
            percent: ProgressTracker::compute_progress(course, &watched),
            quiz_unlocked: ProgressTracker::is_quiz_unlocked(course, &watched),
            watched,
        })
    }

    /// Entry point to the quiz route. Enforces the unlock gate: every video
    /// of the course must be watched. The returned controller is still in
    /// `NotStarted`; the shell calls `start()` on the explicit start action.
    pub fn start_quiz(&self, course_id: &str) -> Result<QuizController> {
        let course = self
            .catalog
            .course(course_id)
            .with_context(|| format!("course {course_id} not found"))?;
        let quiz = self
            .catalog
            .quiz(course_id)
            .with_context(|| format!("no quiz for course {course_id}"))?;

        let watched = self.progress.watched(course_id);
        if !ProgressTracker::is_quiz_unlocked(course, &watched) {
            bail!("quiz for {course_id} is locked until every video is watched");
        }

        Ok(QuizController::new(
            Arc::new(quiz.clone()),
            course.title.clone(),
            self.certificates.clone(),
            self.settings.clone(),
            self.events.clone(),
        ))
    }

    pub fn certificate(&self, certificate_id: &str) -> Result<Option<Certificate>> {
        self.certificates.lookup(certificate_id)
    }

    pub fn certificates(&self) -> Result<Vec<Certificate>> {
        self.certificates.list_all()
    }

    pub fn certificate_stats(&self) -> Result<CertificateStats> {
        self.certificates.stats()
    }

    pub fn dashboard(&self) -> Result<DashboardOverview> {
        self.dashboard.overview()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use uuid::Uuid;

    fn test_app() -> (App, mpsc::UnboundedReceiver<QuizEvent>) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let settings_path = std::env::temp_dir()
            .join("certifytube-tests")
            .join(format!("settings-{}.json", Uuid::new_v4()));
        let settings = Arc::new(SettingsStore::new(settings_path).unwrap());
        App::new(store, settings).unwrap()
    }

    #[test]
    fn quiz_route_refuses_entry_until_unlocked() {
        let (app, _rx) = test_app();

        assert!(app.start_quiz("python-basics").is_err());

        let course = app.course("python-basics").unwrap().clone();
        for video in &course.videos {
            app.toggle_video_watched(&course.id, video.id).unwrap();
        }

        assert!(app.start_quiz("python-basics").is_ok());
    }

    #[test]
    fn unknown_ids_are_not_found_rather_than_errors() {
        let (app, _rx) = test_app();

        assert!(app.course("no-such-course").is_none());
        assert!(app.toggle_video_watched("no-such-course", 1).is_none());
        assert!(app.course_progress("no-such-course").is_none());
        assert!(app.certificate("CT-2025-NOPE-1").unwrap().is_none());
    }

    #[test]
    fn course_progress_tracks_the_gate() {
        let (app, _rx) = test_app();

        let view = app.course_progress("python-basics").unwrap();
        assert_eq!(view.percent, 0);
        assert!(!view.quiz_unlocked);

        let course = app.course("python-basics").unwrap().clone();
        for video in &course.videos {
            app.toggle_video_watched(&course.id, video.id).unwrap();
        }

        let view = app.course_progress("python-basics").unwrap();
        assert_eq!(view.percent, 100);
        assert!(view.quiz_unlocked);
    }
}
