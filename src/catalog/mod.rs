//! Static course and quiz reference data.
//!
//! The catalog is bundled configuration, not fetched: it is embedded at
//! compile time and parsed once at startup. Everything in it is read-only
//! at runtime.

use anyhow::{Context, Result};

use crate::models::{Course, Quiz};

pub struct Catalog {
    courses: Vec<Course>,
    quizzes: Vec<Quiz>,
}

impl Catalog {
    /// Parses the bundled reference data shipped with the crate.
    pub fn builtin() -> Result<Self> {
        let courses: Vec<Course> = serde_json::from_str(include_str!("courses.json"))
            .context("failed to parse built-in course catalog")?;
        let quizzes: Vec<Quiz> = serde_json::from_str(include_str!("quizzes.json"))
            .context("failed to parse built-in quiz catalog")?;

        Ok(Self { courses, quizzes })
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == course_id)
    }

    pub fn quiz(&self, course_id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == course_id)
    }
}
