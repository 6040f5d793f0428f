/*!
 * Common test utilities for the linguadeck test suite
 */

use std::path::Path;

use linguadeck::Repository;
use linguadeck::database::models::{NewLanguage, NewLesson};
use linguadeck::lessons::LessonPaths;

// Re-export the mock services module
pub mod mock_services;

/// Route library logs through env_logger; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Connected repository over a fresh in-memory database
pub async fn memory_repo() -> Repository {
    init_logging();
    Repository::open_in_memory()
        .await
        .expect("in-memory database should open")
}

/// Insert a Spanish language row and return its id
pub async fn seed_language(repo: &Repository) -> i64 {
    repo.add_language(&NewLanguage::new("Spanish", "es-ES", "es-ES-ElviraNeural"))
        .await
        .expect("language insert should succeed")
}

/// Lesson row pointing at `paths`
pub fn lesson_at(language_id: i64, title: &str, paths: &LessonPaths) -> NewLesson {
    NewLesson {
        language_id,
        title: title.to_string(),
        content: "Hola amigo, ¿qué tal?".to_string(),
        file_path: paths.directory.to_string_lossy().to_string(),
        audio_file_name: paths.audio_file.to_string_lossy().to_string(),
        audio_srt_json_name: paths.subtitle_file.to_string_lossy().to_string(),
    }
}

/// Allocate lesson paths under `root` and write the audio and subtitle files
pub async fn materialize_lesson_files(root: &Path) -> LessonPaths {
    let paths = LessonPaths::allocate(root)
        .await
        .expect("lesson directory should be created");
    std::fs::write(&paths.audio_file, b"ID3").expect("audio file should be written");
    std::fs::write(&paths.subtitle_file, "[]").expect("subtitle file should be written");
    paths
}

/// Insert a lesson with real files under `root`; returns the id and its paths
pub async fn seed_lesson_with_files(repo: &Repository, language_id: i64, root: &Path) -> (i64, LessonPaths) {
    let paths = materialize_lesson_files(root).await;
    let id = repo
        .add_lesson(&lesson_at(language_id, "Saludos", &paths))
        .await
        .expect("lesson insert should succeed");
    (id, paths)
}
