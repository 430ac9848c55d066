pub mod records;

pub use records::{LearningProgress, UserProfile, UserSettings, merge_fields};
