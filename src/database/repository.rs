/*!
 * Repository layer for database operations.
 *
 * Typed access to languages, lessons, words, cached audio and settings.
 * Every statement is built with `QueryBuilder` and runs on the blocking pool
 * through `DatabaseConnection::execute_async`.
 */

use log::debug;
use rusqlite::types::Value;
use rusqlite::Connection;

use super::connection::DatabaseConnection;
use super::models::{
    CachedAudioRecord, LanguageRecord, LessonRecord, NewLanguage, NewLesson, Settings,
    SoftOptions, WordFields, WordRecord,
};
use super::query::{Columns, QueryBuilder};
use super::schema::{
    AUDIO_CACHE_TABLE, LANGUAGE_TABLE, LESSON_TABLE, OPTION_ROW_ID, OPTION_TABLE, WORD_TABLE,
};
use crate::errors::{AppError, AppResult};
use crate::prompts::PromptTemplates;
use crate::providers::{AiPlatform, AiSettings, ProviderSettings};

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn not_found(what: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} {}", what, id))
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository over the given connection handle
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connected repository over a fresh in-memory database (for testing)
    pub async fn open_in_memory() -> AppResult<Self> {
        let db = DatabaseConnection::new_in_memory();
        db.connect().await?;
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Languages
    // =========================================================================

    /// Insert a language and return its id
    pub async fn add_language(&self, language: &NewLanguage) -> AppResult<i64> {
        language.validate()?;

        let stmt = QueryBuilder::insert(
            LANGUAGE_TABLE,
            &["title", "languageText", "voice"],
            vec![
                text(&language.title),
                text(&language.language_text),
                text(&language.voice),
            ],
        )?;

        let id = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.last_insert_id))
            .await?;
        debug!("Added language {} ({})", id, language.title);
        Ok(id)
    }

    pub async fn list_languages(&self) -> AppResult<Vec<LanguageRecord>> {
        let stmt = QueryBuilder::select(LANGUAGE_TABLE, Columns::List(LanguageRecord::COLUMNS), "", vec![])
            .order_by("id");

        self.db
            .execute_async(move |conn| Ok(stmt.query_map(conn, LanguageRecord::from_row)?))
            .await
    }

    pub async fn get_language(&self, language_id: i64) -> AppResult<LanguageRecord> {
        self.db
            .execute_async(move |conn| Self::get_language_sync(conn, language_id))
            .await
    }

    fn get_language_sync(conn: &Connection, language_id: i64) -> AppResult<LanguageRecord> {
        QueryBuilder::select(
            LANGUAGE_TABLE,
            Columns::List(LanguageRecord::COLUMNS),
            "id = ?",
            vec![Value::Integer(language_id)],
        )
        .query_map(conn, LanguageRecord::from_row)?
        .into_iter()
        .next()
        .ok_or_else(|| not_found("language", language_id))
    }

    pub async fn rename_language(&self, language_id: i64, title: &str) -> AppResult<()> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("language title must not be empty".into()));
        }
        self.update_language_column(language_id, "title", text(title))
            .await
    }

    pub async fn update_language_voice(&self, language_id: i64, voice: &str) -> AppResult<()> {
        if voice.trim().is_empty() {
            return Err(AppError::Validation("voice must not be empty".into()));
        }
        self.update_language_column(language_id, "voice", text(voice))
            .await
    }

    /// Remember the lesson last opened in a language
    pub async fn set_last_viewed_lesson(&self, language_id: i64, lesson_id: i64) -> AppResult<()> {
        self.update_language_column(language_id, "lastViewId", Value::Integer(lesson_id))
            .await
    }

    async fn update_language_column(
        &self,
        language_id: i64,
        column: &'static str,
        value: Value,
    ) -> AppResult<()> {
        let stmt = QueryBuilder::update(
            LANGUAGE_TABLE,
            vec![(column, value)],
            "id = ?",
            vec![Value::Integer(language_id)],
        );

        let changes = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await?;
        if changes == 0 {
            return Err(not_found("language", language_id));
        }
        Ok(())
    }

    // =========================================================================
    // Lessons
    // =========================================================================

    /// Insert a lesson and return its id; validation runs before any I/O
    pub async fn add_lesson(&self, lesson: &NewLesson) -> AppResult<i64> {
        lesson.validate()?;

        let stmt = QueryBuilder::insert(
            LESSON_TABLE,
            &[
                "languageId",
                "title",
                "content",
                "filePath",
                "audioFileName",
                "audioSrtJsonName",
            ],
            vec![
                Value::Integer(lesson.language_id),
                text(&lesson.title),
                text(&lesson.content),
                text(&lesson.file_path),
                text(&lesson.audio_file_name),
                text(&lesson.audio_srt_json_name),
            ],
        )?;

        self.db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.last_insert_id))
            .await
    }

    pub async fn get_lesson(&self, lesson_id: i64) -> AppResult<LessonRecord> {
        let stmt = QueryBuilder::select(
            LESSON_TABLE,
            Columns::List(LessonRecord::COLUMNS),
            "id = ?",
            vec![Value::Integer(lesson_id)],
        );

        self.db
            .execute_async(move |conn| {
                stmt.query_map(conn, LessonRecord::from_row)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| not_found("lesson", lesson_id))
            })
            .await
    }

    pub async fn list_lessons(&self, language_id: i64) -> AppResult<Vec<LessonRecord>> {
        self.select_lessons("languageId = ?", language_id).await
    }

    /// Lessons whose enrichment has not completed yet
    pub async fn list_unfinished_lessons(&self, language_id: i64) -> AppResult<Vec<LessonRecord>> {
        self.select_lessons("languageId = ? AND isFinish = 0", language_id)
            .await
    }

    async fn select_lessons(&self, condition: &str, language_id: i64) -> AppResult<Vec<LessonRecord>> {
        let stmt = QueryBuilder::select(
            LESSON_TABLE,
            Columns::List(LessonRecord::COLUMNS),
            condition,
            vec![Value::Integer(language_id)],
        )
        .order_by("id DESC");

        self.db
            .execute_async(move |conn| Ok(stmt.query_map(conn, LessonRecord::from_row)?))
            .await
    }

    /// Flip `isFinish` from 0 to 1. Returns false when it was already set.
    pub async fn mark_lesson_finished(&self, lesson_id: i64) -> AppResult<bool> {
        let stmt = QueryBuilder::update(
            LESSON_TABLE,
            vec![("isFinish", Value::Integer(1))],
            "id = ? AND isFinish = 0",
            vec![Value::Integer(lesson_id)],
        );

        let changes = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await?;
        if changes == 0 {
            // Distinguish "already finished" from "no such lesson"
            self.get_lesson(lesson_id).await?;
        }
        Ok(changes > 0)
    }

    pub async fn update_lesson_translation(&self, lesson_id: i64, translation: &str) -> AppResult<()> {
        let stmt = QueryBuilder::update(
            LESSON_TABLE,
            vec![("translation", text(translation))],
            "id = ?",
            vec![Value::Integer(lesson_id)],
        );

        let changes = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await?;
        if changes == 0 {
            return Err(not_found("lesson", lesson_id));
        }
        Ok(())
    }

    /// Delete the lesson row only; see `lessons::CascadeDeleteCoordinator`
    pub async fn delete_lesson_row(&self, lesson_id: i64) -> AppResult<usize> {
        self.delete(LESSON_TABLE, "id = ?", lesson_id).await
    }

    // =========================================================================
    // Words
    // =========================================================================

    /// Words of a lesson in `sort` order
    pub async fn list_lesson_words(&self, lesson_id: i64) -> AppResult<Vec<WordRecord>> {
        let stmt = QueryBuilder::select(
            WORD_TABLE,
            Columns::List(WordRecord::COLUMNS),
            "classId = ?",
            vec![Value::Integer(lesson_id)],
        )
        .order_by("sort, id");

        self.db
            .execute_async(move |conn| Ok(stmt.query_map(conn, WordRecord::from_row)?))
            .await
    }

    /// Language-wide words (`applicable = 1`) across all lessons
    pub async fn list_common_words(&self, language_id: i64) -> AppResult<Vec<WordRecord>> {
        let stmt = QueryBuilder::select(
            WORD_TABLE,
            Columns::List(WordRecord::COLUMNS),
            "languageId = ? AND applicable = 1",
            vec![Value::Integer(language_id)],
        )
        .order_by("id");

        self.db
            .execute_async(move |conn| Ok(stmt.query_map(conn, WordRecord::from_row)?))
            .await
    }

    /// Insert a word at position `sort` and return its id
    pub async fn insert_word(
        &self,
        lesson_id: i64,
        language_id: i64,
        fields: &WordFields,
        sort: i64,
    ) -> AppResult<i64> {
        let mut columns = vec!["classId", "languageId"];
        let mut values = vec![Value::Integer(lesson_id), Value::Integer(language_id)];
        for (column, value) in word_assignments(fields, sort) {
            columns.push(column);
            values.push(value);
        }
        let stmt = QueryBuilder::insert(WORD_TABLE, &columns, values)?;

        self.db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.last_insert_id))
            .await
    }

    /// Overwrite a word's fields and position; NotFound if it is not in this lesson
    pub async fn update_word(
        &self,
        lesson_id: i64,
        word_id: i64,
        fields: &WordFields,
        sort: i64,
    ) -> AppResult<()> {
        let stmt = QueryBuilder::update(
            WORD_TABLE,
            word_assignments(fields, sort),
            "id = ? AND classId = ?",
            vec![Value::Integer(word_id), Value::Integer(lesson_id)],
        );

        let changes = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await?;
        if changes == 0 {
            return Err(AppError::NotFound(format!(
                "word {} in lesson {}",
                word_id, lesson_id
            )));
        }
        Ok(())
    }

    /// Delete one word of a lesson; deleting a missing word is not an error
    pub async fn delete_word(&self, lesson_id: i64, word_id: i64) -> AppResult<usize> {
        let stmt = QueryBuilder::delete(
            WORD_TABLE,
            "id = ? AND classId = ?",
            vec![Value::Integer(word_id), Value::Integer(lesson_id)],
        );

        self.db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await
    }

    pub async fn delete_lesson_words(&self, lesson_id: i64) -> AppResult<usize> {
        self.delete(WORD_TABLE, "classId = ?", lesson_id).await
    }

    // =========================================================================
    // Cached audio
    // =========================================================================

    /// Exact-text lookup in the global audio cache
    pub async fn find_cached_audio(&self, word: &str) -> AppResult<Option<CachedAudioRecord>> {
        let stmt = QueryBuilder::select(
            AUDIO_CACHE_TABLE,
            Columns::List(CachedAudioRecord::COLUMNS),
            "word = ?",
            vec![text(word)],
        );

        self.db
            .execute_async(move |conn| {
                Ok(stmt
                    .query_map(conn, CachedAudioRecord::from_row)?
                    .into_iter()
                    .next())
            })
            .await
    }

    /// Store a payload unless the word is already cached.
    ///
    /// Returns whether a row was written.
    pub async fn insert_cached_audio(&self, word: &str, lesson_id: i64, payload: &str) -> AppResult<bool> {
        let stmt = QueryBuilder::insert(
            AUDIO_CACHE_TABLE,
            &["classId", "word", "base64"],
            vec![Value::Integer(lesson_id), text(word), text(payload)],
        )?
        .on_conflict_ignore("word");

        let changes = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await?;
        Ok(changes > 0)
    }

    /// Delete every cached row tagged with this lesson
    pub async fn delete_lesson_audio(&self, lesson_id: i64) -> AppResult<usize> {
        self.delete(AUDIO_CACHE_TABLE, "classId = ?", lesson_id).await
    }

    async fn delete(&self, table: &'static str, condition: &'static str, id: i64) -> AppResult<usize> {
        let stmt = QueryBuilder::delete(table, condition, vec![Value::Integer(id)]);

        let changes = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await?;
        debug!("Deleted {} row(s) from {}", changes, table);
        Ok(changes)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Load the `option` row, parsing every provider column once
    pub async fn load_settings(&self) -> AppResult<Settings> {
        let mut columns = vec!["nowAiPlatform"];
        columns.extend(AiPlatform::ALL.iter().map(|p| p.as_str()));
        columns.extend([
            "annotationPrompt",
            "translationPrompt",
            "annotationRule",
            "annotationNumber",
            "showOartOfSpeech",
            "playSpeed",
        ]);

        let stmt = QueryBuilder::select(
            OPTION_TABLE,
            Columns::List(&columns),
            "id = ?",
            vec![Value::Integer(OPTION_ROW_ID)],
        );

        let raw = self
            .db
            .execute_async(move |conn| {
                stmt.query_map(conn, RawOptionRow::from_row)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| AppError::Configuration("settings row is missing".into()))
            })
            .await?;

        raw.into_settings()
    }

    /// Persist the active platform and all five provider configs
    pub async fn save_ai_settings(&self, ai: &AiSettings) -> AppResult<()> {
        let mut assignments = vec![("nowAiPlatform", text(ai.now_ai_platform.as_str()))];
        for platform in AiPlatform::ALL {
            let encoded = ai.get(platform).map(serde_json::to_string).transpose()?;
            assignments.push((platform.as_str(), Value::from(encoded)));
        }
        self.update_options(assignments).await
    }

    pub async fn save_prompt_templates(&self, prompts: &PromptTemplates) -> AppResult<()> {
        prompts.validate()?;
        self.update_options(vec![
            ("annotationPrompt", Value::from(prompts.annotation.clone())),
            ("translationPrompt", Value::from(prompts.translation.clone())),
        ])
        .await
    }

    pub async fn save_soft_options(&self, options: &SoftOptions) -> AppResult<()> {
        options.validate()?;
        self.update_options(vec![
            ("annotationRule", Value::Integer(options.annotation_rule)),
            ("annotationNumber", Value::Integer(options.annotation_number)),
            ("showOartOfSpeech", Value::from(options.show_part_of_speech)),
            ("playSpeed", Value::Real(options.play_speed)),
        ])
        .await
    }

    async fn update_options(&self, assignments: Vec<(&'static str, Value)>) -> AppResult<()> {
        let stmt = QueryBuilder::update(
            OPTION_TABLE,
            assignments,
            "id = ?",
            vec![Value::Integer(OPTION_ROW_ID)],
        );

        let changes = self
            .db
            .execute_async(move |conn| Ok(stmt.execute(conn)?.changes))
            .await?;
        if changes == 0 {
            return Err(AppError::Configuration("settings row is missing".into()));
        }
        Ok(())
    }
}

/// Column values for a word's editable fields plus its position
fn word_assignments(fields: &WordFields, sort: i64) -> Vec<(&'static str, Value)> {
    vec![
        ("inlineId", Value::from(fields.inline_id)),
        ("content", Value::from(fields.content.clone())),
        ("oartOfSpeech", Value::from(fields.oart_of_speech.clone())),
        ("pronunciation", Value::from(fields.pronunciation.clone())),
        ("interpretation", Value::from(fields.interpretation.clone())),
        ("other", Value::from(fields.other.clone())),
        ("applicable", Value::from(fields.applicable)),
        ("spell", Value::from(fields.spell)),
        ("startIndex", Value::Integer(fields.start_index)),
        ("sort", Value::Integer(sort)),
    ]
}

/// `option` row as stored, before provider JSON is parsed
struct RawOptionRow {
    now_ai_platform: String,
    providers: Vec<(AiPlatform, Option<String>)>,
    annotation_prompt: Option<String>,
    translation_prompt: Option<String>,
    annotation_rule: Option<i64>,
    annotation_number: Option<i64>,
    show_part_of_speech: Option<i64>,
    play_speed: Option<f64>,
}

impl RawOptionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let mut providers = Vec::with_capacity(AiPlatform::ALL.len());
        for (i, platform) in AiPlatform::ALL.iter().enumerate() {
            providers.push((*platform, row.get(1 + i)?));
        }
        let base = 1 + AiPlatform::ALL.len();

        Ok(Self {
            now_ai_platform: row.get(0)?,
            providers,
            annotation_prompt: row.get(base)?,
            translation_prompt: row.get(base + 1)?,
            annotation_rule: row.get(base + 2)?,
            annotation_number: row.get(base + 3)?,
            show_part_of_speech: row.get(base + 4)?,
            play_speed: row.get(base + 5)?,
        })
    }

    fn into_settings(self) -> AppResult<Settings> {
        let mut ai = AiSettings {
            now_ai_platform: self.now_ai_platform.parse()?,
            ..Default::default()
        };
        for (platform, stored) in self.providers {
            ai.set(platform, parse_provider_settings(platform, stored.as_deref())?);
        }

        let defaults = SoftOptions::default();
        Ok(Settings {
            ai,
            prompts: PromptTemplates {
                annotation: self.annotation_prompt,
                translation: self.translation_prompt,
            },
            soft: SoftOptions {
                annotation_rule: self.annotation_rule.unwrap_or(defaults.annotation_rule),
                annotation_number: self.annotation_number.unwrap_or(defaults.annotation_number),
                show_part_of_speech: self
                    .show_part_of_speech
                    .map(|v| v != 0)
                    .unwrap_or(defaults.show_part_of_speech),
                play_speed: self.play_speed.unwrap_or(defaults.play_speed),
            },
        })
    }
}

/// Decode one provider column. Empty and null-like values mean "not configured".
fn parse_provider_settings(platform: AiPlatform, stored: Option<&str>) -> AppResult<Option<ProviderSettings>> {
    let Some(raw) = stored.map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() || raw == "null" || raw == "unll" {
        return Ok(None);
    }

    serde_json::from_str(raw).map(Some).map_err(|e| {
        AppError::Configuration(format!("Stored {} settings are malformed: {}", platform, e))
    })
}
