//! Pre-authored lesson content.
//!
//! Content lives on disk as JSON: a `difficulties.json` index plus one
//! `lessons/<difficultyId>.json` file per difficulty. It is loaded once
//! at startup and served read-only; nothing in the API mutates it.
//!
//! The library makes no ordering guarantee for lesson lists - callers
//! that need display order sort by the lesson `number` field.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::db::LogOnError;

/// A difficulty level (e.g. beginner, intermediate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A single pre-authored lesson within a difficulty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Position within the difficulty; clients display lessons in
    /// ascending `number` order
    pub number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// In-memory library of all difficulties and their lessons.
#[derive(Debug, Default)]
pub struct ContentLibrary {
    difficulties: Vec<Difficulty>,
    lessons: HashMap<String, Vec<Lesson>>,
}

impl ContentLibrary {
    /// Load the library from a content directory.
    ///
    /// Missing or invalid files are logged and skipped so a content
    /// authoring mistake cannot keep the service from starting.
    pub fn load(dir: &Path) -> Self {
        let mut library = ContentLibrary::default();

        match fs::read_to_string(dir.join("difficulties.json")) {
            Ok(raw) => {
                if let Some(list) = serde_json::from_str::<Vec<Difficulty>>(&raw)
                    .log_warn("Invalid difficulties.json")
                {
                    library.difficulties = list;
                }
            }
            Err(_) => {
                tracing::warn!("No difficulties.json in {}", dir.display());
            }
        }

        let lessons_dir = dir.join("lessons");
        let entries = match fs::read_dir(&lessons_dir) {
            Ok(entries) => entries,
            Err(_) => {
                tracing::warn!("No lessons directory in {}", dir.display());
                return library;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(difficulty_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let lessons = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<Vec<Lesson>>(&raw).map_err(|e| e.to_string())
                });
            match lessons {
                Ok(lessons) => {
                    library.lessons.insert(difficulty_id.to_string(), lessons);
                }
                Err(e) => {
                    tracing::warn!("Invalid lesson file {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!(
            "Loaded {} difficulties, {} lesson sets from {}",
            library.difficulties.len(),
            library.lessons.len(),
            dir.display()
        );
        library
    }

    pub fn difficulties(&self) -> &[Difficulty] {
        &self.difficulties
    }

    /// Lessons for a difficulty, in storage order.
    pub fn lessons(&self, difficulty_id: &str) -> Option<&[Lesson]> {
        self.lessons.get(difficulty_id).map(|l| l.as_slice())
    }

    pub fn lesson(&self, difficulty_id: &str, lesson_id: &str) -> Option<&Lesson> {
        self.lessons
            .get(difficulty_id)?
            .iter()
            .find(|l| l.id == lesson_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_library(dir: &Path) {
        fs::create_dir_all(dir.join("lessons")).unwrap();
        fs::write(
            dir.join("difficulties.json"),
            json!([
                {"id": "beginner", "name": "Beginner"},
                {"id": "intermediate", "name": "Intermediate", "description": "Knows Hangul"}
            ])
            .to_string(),
        )
        .unwrap();
        // Deliberately not sorted by number
        fs::write(
            dir.join("lessons/beginner.json"),
            json!([
                {"id": "greetings", "title": "Greetings", "number": 2},
                {"id": "hangul", "title": "Reading Hangul", "number": 1}
            ])
            .to_string(),
        )
        .unwrap();
    }

    #[test]
    fn test_load_empty_directory() {
        let temp = TempDir::new().unwrap();
        let library = ContentLibrary::load(temp.path());
        assert!(library.difficulties().is_empty());
        assert!(library.lessons("beginner").is_none());
    }

    #[test]
    fn test_load_and_lookup() {
        let temp = TempDir::new().unwrap();
        write_library(temp.path());

        let library = ContentLibrary::load(temp.path());
        assert_eq!(library.difficulties().len(), 2);

        let lessons = library.lessons("beginner").unwrap();
        assert_eq!(lessons.len(), 2);
        // Storage order preserved; sorting is the caller's concern
        assert_eq!(lessons[0].id, "greetings");

        let lesson = library.lesson("beginner", "hangul").unwrap();
        assert_eq!(lesson.title, "Reading Hangul");
        assert_eq!(lesson.number, 1);
    }

    #[test]
    fn test_unknown_lookups_are_none() {
        let temp = TempDir::new().unwrap();
        write_library(temp.path());

        let library = ContentLibrary::load(temp.path());
        assert!(library.lessons("expert").is_none());
        assert!(library.lesson("beginner", "no-such-lesson").is_none());
        assert!(library.lesson("expert", "hangul").is_none());
    }

    #[test]
    fn test_invalid_lesson_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        write_library(temp.path());
        fs::write(temp.path().join("lessons/broken.json"), "not json").unwrap();

        let library = ContentLibrary::load(temp.path());
        assert!(library.lessons("broken").is_none());
        // Valid files still load
        assert!(library.lessons("beginner").is_some());
    }

    #[test]
    fn test_non_json_files_ignored() {
        let temp = TempDir::new().unwrap();
        write_library(temp.path());
        fs::write(temp.path().join("lessons/README.txt"), "notes").unwrap();

        let library = ContentLibrary::load(temp.path());
        assert_eq!(library.lessons.len(), 1);
    }
}
