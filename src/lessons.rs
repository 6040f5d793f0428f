/*!
 * Lesson storage layout and cascading delete.
 *
 * A lesson owns a directory holding its synthesized audio and the matching
 * subtitle JSON, plus word rows and cached audio rows in the database.
 * Deleting a lesson removes all of them in a fixed order and stops at the
 * first stage that fails. Completed stages are not undone.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::database::Repository;
use crate::database::models::{LessonRecord, NewLesson};
use crate::errors::{AppError, AppResult, CascadeStage};

/// File-system locations of one lesson
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonPaths {
    pub directory: PathBuf,
    pub audio_file: PathBuf,
    pub subtitle_file: PathBuf,
}

impl LessonPaths {
    /// Paths inside a fresh `<root>/<id>/` directory, named
    /// `output_<id>.mp3` and `output_<id>.json`. The directory is created.
    pub async fn allocate<P: AsRef<Path>>(root: P) -> AppResult<Self> {
        let id = Uuid::new_v4().simple().to_string();
        let directory = root.as_ref().join(&id);

        tokio::fs::create_dir_all(&directory).await.map_err(|e| {
            AppError::Filesystem(format!("Failed to create lesson directory {:?}: {}", directory, e))
        })?;
        debug!("Allocated lesson directory {:?}", directory);

        Ok(Self {
            audio_file: directory.join(format!("output_{}.mp3", id)),
            subtitle_file: directory.join(format!("output_{}.json", id)),
            directory,
        })
    }
}

impl From<&LessonRecord> for LessonPaths {
    fn from(lesson: &LessonRecord) -> Self {
        Self {
            directory: PathBuf::from(&lesson.file_path),
            audio_file: PathBuf::from(&lesson.audio_file_name),
            subtitle_file: PathBuf::from(&lesson.audio_srt_json_name),
        }
    }
}

/// Allocate a lesson directory under `root` and insert the lesson row.
///
/// The language must exist. If the insert fails the fresh directory is
/// removed again.
pub async fn create_lesson<P: AsRef<Path>>(
    repo: &Repository,
    root: P,
    language_id: i64,
    title: &str,
    content: &str,
) -> AppResult<(i64, LessonPaths)> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(AppError::Validation("lesson title and content must not be empty".into()));
    }
    repo.get_language(language_id).await?;

    let paths = LessonPaths::allocate(root).await?;
    let lesson = NewLesson {
        language_id,
        title: title.to_string(),
        content: content.to_string(),
        file_path: paths.directory.to_string_lossy().to_string(),
        audio_file_name: paths.audio_file.to_string_lossy().to_string(),
        audio_srt_json_name: paths.subtitle_file.to_string_lossy().to_string(),
    };

    match repo.add_lesson(&lesson).await {
        Ok(id) => {
            info!("Created lesson {} in {:?}", id, paths.directory);
            Ok((id, paths))
        }
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&paths.directory).await {
                warn!("Failed to remove {:?}: {}", paths.directory, cleanup);
            }
            Err(e)
        }
    }
}

/// File-system operations the cascade needs
#[async_trait]
pub trait LessonFiles: Send + Sync {
    /// Remove a file; a missing file is an error
    async fn remove_file(&self, path: &Path) -> AppResult<()>;

    /// Remove a directory and everything below it; a missing directory is an error
    async fn remove_dir(&self, path: &Path) -> AppResult<()>;
}

/// `tokio::fs` implementation of `LessonFiles`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalLessonFiles;

impl LocalLessonFiles {
    async fn require_exists(path: &Path) -> AppResult<std::fs::Metadata> {
        tokio::fs::metadata(path)
            .await
            .map_err(|_| AppError::Filesystem(format!("Path {:?} does not exist", path)))
    }
}

#[async_trait]
impl LessonFiles for LocalLessonFiles {
    async fn remove_file(&self, path: &Path) -> AppResult<()> {
        let metadata = Self::require_exists(path).await?;
        if !metadata.is_file() {
            return Err(AppError::Filesystem(format!("Path {:?} is not a file", path)));
        }
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| AppError::Filesystem(format!("Failed to delete file {:?}: {}", path, e)))
    }

    async fn remove_dir(&self, path: &Path) -> AppResult<()> {
        let metadata = Self::require_exists(path).await?;
        if !metadata.is_dir() {
            return Err(AppError::Filesystem(format!("Path {:?} is not a directory", path)));
        }
        tokio::fs::remove_dir_all(path)
            .await
            .map_err(|e| AppError::Filesystem(format!("Failed to delete directory {:?}: {}", path, e)))
    }
}

/// Row counts removed by a completed cascade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub audio_rows: usize,
    pub word_rows: usize,
}

/// Deletes a lesson together with its files, words and cached audio
#[derive(Clone)]
pub struct CascadeDeleteCoordinator {
    repo: Repository,
    files: Arc<dyn LessonFiles>,
}

impl CascadeDeleteCoordinator {
    pub fn new(repo: Repository, files: Arc<dyn LessonFiles>) -> Self {
        Self { repo, files }
    }

    /// Look up the lesson's paths and run the cascade
    pub async fn delete_lesson_by_id(&self, lesson_id: i64) -> AppResult<CascadeReport> {
        let lesson = self.repo.get_lesson(lesson_id).await?;
        self.delete_lesson(lesson_id, &LessonPaths::from(&lesson))
            .await
    }

    /// Run every stage in `CascadeStage::ALL` order.
    ///
    /// On failure the error is wrapped in `AppError::Cascade` naming the
    /// stage; later stages do not run.
    pub async fn delete_lesson(&self, lesson_id: i64, paths: &LessonPaths) -> AppResult<CascadeReport> {
        let mut report = CascadeReport::default();

        for stage in CascadeStage::ALL {
            debug!("Lesson {}: {}", lesson_id, stage);
            if let Err(source) = self.run_stage(stage, lesson_id, paths, &mut report).await {
                warn!("Lesson {} delete stopped at '{}': {}", lesson_id, stage, source);
                return Err(AppError::Cascade {
                    stage,
                    source: Box::new(source),
                });
            }
        }

        info!(
            "Deleted lesson {} ({} word rows, {} cached audio rows)",
            lesson_id, report.word_rows, report.audio_rows
        );
        Ok(report)
    }

    async fn run_stage(
        &self,
        stage: CascadeStage,
        lesson_id: i64,
        paths: &LessonPaths,
        report: &mut CascadeReport,
    ) -> AppResult<()> {
        match stage {
            CascadeStage::SubtitleFile => self.files.remove_file(&paths.subtitle_file).await,
            CascadeStage::AudioFile => self.files.remove_file(&paths.audio_file).await,
            CascadeStage::Directory => self.files.remove_dir(&paths.directory).await,
            CascadeStage::AudioCacheRows => {
                report.audio_rows = self.repo.delete_lesson_audio(lesson_id).await?;
                Ok(())
            }
            CascadeStage::WordRows => {
                report.word_rows = self.repo.delete_lesson_words(lesson_id).await?;
                Ok(())
            }
            CascadeStage::LessonRow => {
                self.repo.delete_lesson_row(lesson_id).await?;
                Ok(())
            }
        }
    }
}
