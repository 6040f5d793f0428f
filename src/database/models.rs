/*!
 * Database entity models.
 *
 * Records map one-to-one onto table rows. `New*` structs carry the
 * caller-supplied fields of a row that does not exist yet and validate them
 * before any I/O happens.
 */

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::language_utils;
use crate::prompts::PromptTemplates;
use crate::providers::AiSettings;

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// A studied language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRecord {
    pub id: i64,
    pub title: String,
    /// Locale tag such as `en-US`
    pub language_text: String,
    /// Synthesis voice name
    pub voice: String,
    /// Lesson last opened in this language; 0 when none
    pub last_view_id: i64,
    pub create_time: Option<String>,
}

impl LanguageRecord {
    pub const COLUMNS: &'static [&'static str] =
        &["id", "title", "languageText", "voice", "lastViewId", "createTime"];

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            language_text: row.get(2)?,
            voice: row.get(3)?,
            last_view_id: row.get::<_, Option<i64>>(4)?.unwrap_or(0),
            create_time: row.get(5)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLanguage {
    pub title: String,
    pub language_text: String,
    pub voice: String,
}

impl NewLanguage {
    pub fn new(
        title: impl Into<String>,
        language_text: impl Into<String>,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            language_text: language_text.into(),
            voice: voice.into(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        require("language title", &self.title)?;
        require("voice", &self.voice)?;
        language_utils::validate_locale(&self.language_text)
    }
}

/// A lesson (`class` row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub id: i64,
    pub language_id: i64,
    pub is_finish: bool,
    pub title: String,
    /// Full transcript
    pub content: String,
    pub translation: Option<String>,
    /// Lesson directory
    pub file_path: String,
    pub audio_file_name: String,
    pub audio_srt_json_name: String,
    pub create_time: Option<String>,
}

impl LessonRecord {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "languageId",
        "isFinish",
        "title",
        "content",
        "translation",
        "filePath",
        "audioFileName",
        "audioSrtJsonName",
        "createTime",
    ];

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            language_id: row.get(1)?,
            is_finish: row.get::<_, Option<i64>>(2)?.unwrap_or(0) != 0,
            title: row.get(3)?,
            content: row.get(4)?,
            translation: row.get(5)?,
            file_path: row.get(6)?,
            audio_file_name: row.get(7)?,
            audio_srt_json_name: row.get(8)?,
            create_time: row.get(9)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLesson {
    pub language_id: i64,
    pub title: String,
    pub content: String,
    pub file_path: String,
    pub audio_file_name: String,
    pub audio_srt_json_name: String,
}

impl NewLesson {
    pub fn validate(&self) -> AppResult<()> {
        require("lesson title", &self.title)?;
        require("lesson content", &self.content)?;
        require("lesson directory", &self.file_path)?;
        require("audio file name", &self.audio_file_name)?;
        require("subtitle file name", &self.audio_srt_json_name)
    }
}

/// Editable fields of a word
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WordFields {
    /// Correlates occurrences of the same word across edits
    pub inline_id: Option<i64>,
    pub content: Option<String>,
    /// Part of speech
    pub oart_of_speech: Option<String>,
    pub pronunciation: Option<String>,
    pub interpretation: Option<String>,
    pub other: Option<String>,
    /// `false`: lesson-local, `true`: language-wide
    pub applicable: bool,
    pub spell: bool,
    /// Index into the lesson's subtitle JSON array
    pub start_index: i64,
}

impl WordFields {
    pub fn new(content: impl Into<String>, start_index: i64) -> Self {
        Self {
            content: Some(content.into()),
            applicable: true,
            spell: true,
            start_index,
            ..Default::default()
        }
    }
}

/// A word row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: i64,
    pub class_id: i64,
    pub language_id: i64,
    pub fields: WordFields,
    pub sort: i64,
    pub create_time: Option<String>,
}

impl WordRecord {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "classId",
        "languageId",
        "inlineId",
        "content",
        "oartOfSpeech",
        "pronunciation",
        "interpretation",
        "other",
        "applicable",
        "spell",
        "startIndex",
        "sort",
        "createTime",
    ];

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            class_id: row.get(1)?,
            language_id: row.get(2)?,
            fields: WordFields {
                inline_id: row.get(3)?,
                content: row.get(4)?,
                oart_of_speech: row.get(5)?,
                pronunciation: row.get(6)?,
                interpretation: row.get(7)?,
                other: row.get(8)?,
                applicable: row.get::<_, Option<i64>>(9)?.unwrap_or(1) != 0,
                spell: row.get::<_, Option<i64>>(10)?.unwrap_or(1) != 0,
                start_index: row.get(11)?,
            },
            sort: row.get(12)?,
            create_time: row.get(13)?,
        })
    }
}

/// A cached audio row (`wordBase64`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAudioRecord {
    pub id: i64,
    /// Lesson that first requested the word; used for cleanup only
    pub class_id: i64,
    pub word: String,
    /// Base64 audio payload
    pub base64: String,
}

impl CachedAudioRecord {
    pub const COLUMNS: &'static [&'static str] = &["id", "classId", "word", "base64"];

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            class_id: row.get(1)?,
            word: row.get(2)?,
            base64: row.get(3)?,
        })
    }
}

/// Study options kept alongside the AI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoftOptions {
    pub annotation_rule: i64,
    /// Words per annotation request
    pub annotation_number: i64,
    pub show_part_of_speech: bool,
    pub play_speed: f64,
}

impl Default for SoftOptions {
    fn default() -> Self {
        Self {
            annotation_rule: 0,
            annotation_number: 10,
            show_part_of_speech: true,
            play_speed: 1.0,
        }
    }
}

impl SoftOptions {
    pub fn validate(&self) -> AppResult<()> {
        if self.annotation_number < 1 {
            return Err(AppError::Validation(
                "annotation number must be at least 1".into(),
            ));
        }
        if self.play_speed.is_nan() || self.play_speed <= 0.0 {
            return Err(AppError::Validation("play speed must be positive".into()));
        }
        Ok(())
    }

    /// Annotation batch size as a usize
    pub fn batch_size(&self) -> usize {
        usize::try_from(self.annotation_number).unwrap_or(1).max(1)
    }
}

/// Everything stored in the single `option` row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub ai: AiSettings,
    pub prompts: PromptTemplates,
    pub soft: SoftOptions,
}
