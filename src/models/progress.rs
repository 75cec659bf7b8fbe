use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which videos of a course the learner has marked watched. The watched set
/// is persisted as a plain JSON array of video ids under
/// `course-progress:<courseId>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    pub course_id: String,
    pub watched: BTreeSet<u32>,
}

impl CourseProgress {
    pub fn empty(course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            watched: BTreeSet::new(),
        }
    }
}
