//! Watched-video tracking and the quiz unlock gate.

use std::{collections::BTreeSet, sync::Arc};

use log::{error, warn};

use crate::{
    models::Course,
    storage::{keys, Store},
};

/// Result of a toggle. The watched set always reflects the mutation;
/// `persisted` is false when the store write failed and only the in-memory
/// copy is current.
#[derive(Debug, Clone)]
pub struct ToggleOutcome {
    pub watched: BTreeSet<u32>,
    pub persisted: bool,
}

#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn Store>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Loads the watched set for a course. Storage failures and corrupt
    /// payloads degrade to an empty set rather than surfacing an error.
    pub fn watched(&self, course_id: &str) -> BTreeSet<u32> {
        let key = keys::course_progress(course_id);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeSet::new(),
            Err(err) => {
                warn!("Failed to read progress for {course_id}: {err}");
                return BTreeSet::new();
            }
        };

        match serde_json::from_str::<BTreeSet<u32>>(&raw) {
            Ok(watched) => watched,
            Err(err) => {
                warn!("Discarding corrupt progress entry for {course_id}: {err}");
                BTreeSet::new()
            }
        }
    }

    /// Flips membership of `video_id` in the course's watched set and
    /// persists the result immediately. Video ids the course does not have
    /// are ignored, keeping the set a subset of the course's videos.
    pub fn toggle_video_watched(&self, course: &Course, video_id: u32) -> ToggleOutcome {
        let mut watched = self.watched(&course.id);

        if !course.has_video(video_id) {
            warn!(
                "Ignoring toggle for unknown video {video_id} in course {}",
                course.id
            );
            return ToggleOutcome {
                watched,
                persisted: true,
            };
        }

        if !watched.remove(&video_id) {
            watched.insert(video_id);
        }

        let persisted = self.persist(&course.id, &watched);
        ToggleOutcome { watched, persisted }
    }

    fn persist(&self, course_id: &str, watched: &BTreeSet<u32>) -> bool {
        let key = keys::course_progress(course_id);
        let payload = match serde_json::to_string(watched) {
            Ok(payload) => payload,
            Err(err) => {
                error!("Failed to serialize progress for {course_id}: {err}");
                return false;
            }
        };

        match self.store.set(&key, &payload) {
            Ok(()) => true,
            Err(err) => {
                error!("Failed to persist progress for {course_id}: {err}");
                false
            }
        }
    }

    /// Integer-rounded completion percentage for a course.
    pub fn compute_progress(course: &Course, watched: &BTreeSet<u32>) -> u8 {
        let total = course.total_videos();
        if total == 0 {
            return 0;
        }

        let done = watched.iter().filter(|id| course.has_video(**id)).count();
        ((done as f64 / total as f64) * 100.0).round() as u8
    }

    /// The hard gate in front of the quiz: every video must be watched.
    pub fn is_quiz_unlocked(course: &Course, watched: &BTreeSet<u32>) -> bool {
        !course.videos.is_empty() && course.videos.iter().all(|v| watched.contains(&v.id))
    }
}
