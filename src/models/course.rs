use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

/// A single playlist entry. `duration` is a display label ("15:30"), not a
/// machine-readable duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: u32,
    pub title: String,
    pub duration: String,
}

/// Static reference data for one curated playlist course. Read-only at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub duration: String,
    pub students: String,
    pub rating: f32,
    pub difficulty: Difficulty,
    pub playlist_url: String,
    pub videos: Vec<Video>,
}

impl Course {
    pub fn total_videos(&self) -> usize {
        self.videos.len()
    }

    pub fn has_video(&self, video_id: u32) -> bool {
        self.videos.iter().any(|v| v.id == video_id)
    }
}
