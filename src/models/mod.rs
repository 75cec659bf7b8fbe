mod certificate;
mod course;
mod progress;
mod quiz;

pub use certificate::Certificate;
pub use course::{Course, Difficulty, Video};
pub use progress::CourseProgress;
pub use quiz::{Question, Quiz};
