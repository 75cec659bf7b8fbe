use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record attesting a passing quiz score for a course. Persisted as
/// JSON under `certificate:<id>`; the field names below are the on-disk
/// layout, so renames here are breaking changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub score: u8,
    pub date: DateTime<Utc>,
    pub user_name: String,
}
