/*!
 * Integration tests for the cascading lesson delete
 */

use std::sync::Arc;

use linguadeck::database::models::WordFields;
use linguadeck::errors::{AppError, CascadeStage};
use linguadeck::lessons::{CascadeDeleteCoordinator, LessonPaths, LocalLessonFiles};
use tempfile::TempDir;

use crate::common::mock_services::{FileCall, MockLessonFiles};
use crate::common::{lesson_at, memory_repo, seed_language, seed_lesson_with_files};

#[tokio::test]
async fn test_deleteLesson_withRealFiles_shouldRemoveEverything() {
    let repo = memory_repo().await;
    let root = TempDir::new().unwrap();
    let language_id = seed_language(&repo).await;
    let (lesson_id, paths) = seed_lesson_with_files(&repo, language_id, root.path()).await;
    repo.insert_word(lesson_id, language_id, &WordFields::new("hola", 0), 0)
        .await
        .unwrap();
    repo.insert_cached_audio("hola", lesson_id, "AAAA").await.unwrap();
    let coordinator = CascadeDeleteCoordinator::new(repo.clone(), Arc::new(LocalLessonFiles));

    let report = coordinator.delete_lesson_by_id(lesson_id).await.unwrap();

    assert_eq!(report.word_rows, 1);
    assert_eq!(report.audio_rows, 1);
    assert!(!paths.directory.exists());
    assert!(matches!(repo.get_lesson(lesson_id).await, Err(AppError::NotFound(_))));
    assert!(repo.find_cached_audio("hola").await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleteLesson_shouldOnlyTouchItsOwnRows() {
    let repo = memory_repo().await;
    let root = TempDir::new().unwrap();
    let language_id = seed_language(&repo).await;
    let (doomed, _) = seed_lesson_with_files(&repo, language_id, root.path()).await;
    let (kept, kept_paths) = seed_lesson_with_files(&repo, language_id, root.path()).await;
    repo.insert_word(kept, language_id, &WordFields::new("quedar", 0), 0)
        .await
        .unwrap();
    repo.insert_cached_audio("quedar", kept, "BBBB").await.unwrap();
    let coordinator = CascadeDeleteCoordinator::new(repo.clone(), Arc::new(LocalLessonFiles));

    coordinator.delete_lesson_by_id(doomed).await.unwrap();

    assert!(kept_paths.directory.is_dir());
    assert_eq!(repo.list_lesson_words(kept).await.unwrap().len(), 1);
    assert!(repo.find_cached_audio("quedar").await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleteLesson_withMissingSubtitle_shouldStopAtFirstStage() {
    let repo = memory_repo().await;
    let root = TempDir::new().unwrap();
    let language_id = seed_language(&repo).await;
    let (lesson_id, paths) = seed_lesson_with_files(&repo, language_id, root.path()).await;
    std::fs::remove_file(&paths.subtitle_file).unwrap();
    let coordinator = CascadeDeleteCoordinator::new(repo.clone(), Arc::new(LocalLessonFiles));

    let err = coordinator.delete_lesson_by_id(lesson_id).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Cascade {
            stage: CascadeStage::SubtitleFile,
            ..
        }
    ));
    assert!(paths.audio_file.exists());
    assert!(repo.get_lesson(lesson_id).await.is_ok());
}

#[tokio::test]
async fn test_deleteLesson_withDirectoryFailure_shouldKeepRowsAndNameStage() {
    let repo = memory_repo().await;
    let language_id = seed_language(&repo).await;
    let paths = LessonPaths {
        directory: "/lessons/abc".into(),
        audio_file: "/lessons/abc/output_abc.mp3".into(),
        subtitle_file: "/lessons/abc/output_abc.json".into(),
    };
    let lesson_id = repo
        .add_lesson(&lesson_at(language_id, "Bloqueada", &paths))
        .await
        .unwrap();
    repo.insert_word(lesson_id, language_id, &WordFields::new("bloqueo", 0), 0)
        .await
        .unwrap();
    repo.insert_cached_audio("bloqueo", lesson_id, "CCCC").await.unwrap();
    let files = MockLessonFiles::failing_on("/lessons/abc");
    let coordinator = CascadeDeleteCoordinator::new(repo.clone(), Arc::new(files.clone()));

    let err = coordinator.delete_lesson(lesson_id, &paths).await.unwrap_err();

    match &err {
        AppError::Cascade { stage, .. } => assert_eq!(*stage, CascadeStage::Directory),
        other => panic!("expected cascade error, got {:?}", other),
    }
    assert!(matches!(err.root(), AppError::Filesystem(_)));
    assert_eq!(
        files.calls(),
        vec![
            FileCall::RemoveFile(paths.subtitle_file.clone()),
            FileCall::RemoveFile(paths.audio_file.clone()),
            FileCall::RemoveDir(paths.directory.clone()),
        ]
    );
    assert!(repo.get_lesson(lesson_id).await.is_ok());
    assert_eq!(repo.list_lesson_words(lesson_id).await.unwrap().len(), 1);
    let cached = repo.find_cached_audio("bloqueo").await.unwrap().unwrap();
    assert_eq!(cached.class_id, lesson_id);
}

#[tokio::test]
async fn test_deleteLessonById_withUnknownLesson_shouldBeNotFound() {
    let repo = memory_repo().await;
    let files = MockLessonFiles::new();
    let coordinator = CascadeDeleteCoordinator::new(repo, Arc::new(files.clone()));

    let result = coordinator.delete_lesson_by_id(77).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(files.calls().is_empty());
}
