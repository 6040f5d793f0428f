/*!
 * Prompt templates for annotation and translation.
 *
 * A template holds a single `{content}` marker. Stored templates that are
 * unset or blank fall back to the built-in defaults.
 */

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Placeholder replaced by the words or text being sent
pub const CONTENT_MARKER: &str = "{content}";

pub const DEFAULT_ANNOTATION_PROMPT: &str = "You are a language expert. The user sends words as a JSON array. \
For each word explain its part of speech, pronunciation, meaning, any additional notes, \
and whether it only applies to this lesson (output 0) or to the language in general (output 1).
Separate words with two blank lines and output nothing else, using this format:
Word: the word
Part of speech: one of noun,numeral,measure_word,verb,adjective,distinguishing_word,adverb,conjunction,preposition,auxiliary,modal_particle,phrase,sentence_fragment,pronoun,interjection,onomatopoeia,morpheme,other
Pronunciation:
Meaning:
Notes:
Applicability: 0 or 1

Words: {content}";

pub const DEFAULT_TRANSLATION_PROMPT: &str = "You are a professional translator. \
Translate the following lesson text sentence by sentence, keeping the original line breaks. \
Output only the translation.

{content}";

/// A template with one `{content}` marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> AppResult<Self> {
        let template = template.into();
        match template.matches(CONTENT_MARKER).count() {
            1 => Ok(Self(template)),
            0 => Err(AppError::Validation(format!(
                "prompt template has no {} marker",
                CONTENT_MARKER
            ))),
            n => Err(AppError::Validation(format!(
                "prompt template has {} {} markers, expected one",
                n, CONTENT_MARKER
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute `content` for the marker
    pub fn render(&self, content: &str) -> String {
        self.0.replacen(CONTENT_MARKER, content, 1)
    }
}

/// Stored templates; `None` or blank means "use the default"
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PromptTemplates {
    pub annotation: Option<String>,
    pub translation: Option<String>,
}

impl PromptTemplates {
    pub fn annotation(&self) -> PromptTemplate {
        resolve(self.annotation.as_deref(), DEFAULT_ANNOTATION_PROMPT)
    }

    pub fn translation(&self) -> PromptTemplate {
        resolve(self.translation.as_deref(), DEFAULT_TRANSLATION_PROMPT)
    }

    /// Every non-blank template must carry exactly one marker
    pub fn validate(&self) -> AppResult<()> {
        for template in [&self.annotation, &self.translation].into_iter().flatten() {
            if !template.trim().is_empty() {
                PromptTemplate::new(template.as_str())?;
            }
        }
        Ok(())
    }
}

fn resolve(stored: Option<&str>, default: &str) -> PromptTemplate {
    stored
        .filter(|t| !t.trim().is_empty())
        .and_then(|t| PromptTemplate::new(t).ok())
        .unwrap_or_else(|| PromptTemplate(default.to_string()))
}

/// Annotation prompt with the words embedded as a JSON array
pub fn annotation_prompt(words: &[String], templates: &PromptTemplates) -> AppResult<String> {
    if words.is_empty() {
        return Err(AppError::Validation("no words to annotate".into()));
    }
    let list = serde_json::to_string(words)?;
    Ok(templates.annotation().render(&list))
}

/// Split `words` into batches of at most `batch_size` (at least one word each)
pub fn annotation_batches(words: &[String], batch_size: usize) -> Vec<&[String]> {
    words.chunks(batch_size.max(1)).collect()
}
