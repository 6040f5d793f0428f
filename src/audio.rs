/*!
 * Word audio cache.
 *
 * Maps word text to a base64 audio payload. The cache is global: a word
 * synthesized for one lesson is reused by every other lesson. Rows are tagged
 * with the lesson that first asked for them so the lesson cascade can remove
 * them again.
 */

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;

use crate::app_config::SynthesisConfig;
use crate::database::Repository;
use crate::errors::{AppError, AppResult};

/// One synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub voice: String,
    pub text: String,
    pub pitch: i32,
    pub rate: i32,
    pub volume: i32,
    pub output_root: PathBuf,
    /// Whether the synthesizer should also write audio and subtitle files
    pub save_to_file: bool,
}

/// Text-to-speech collaborator
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `request.text` and return the audio as base64
    async fn synthesize(&self, request: SynthesisRequest) -> AppResult<String>;
}

/// Lookup counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AudioCacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl AudioCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Read-through audio cache backed by the `wordBase64` table
#[derive(Clone)]
pub struct AudioCache {
    repo: Repository,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    config: SynthesisConfig,
    hits: Arc<RwLock<usize>>,
    misses: Arc<RwLock<usize>>,
}

impl AudioCache {
    pub fn new(repo: Repository, synthesizer: Arc<dyn SpeechSynthesizer>, config: SynthesisConfig) -> Self {
        Self {
            repo,
            synthesizer,
            config,
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
        }
    }

    /// Return the cached payload for `word`, synthesizing and storing it on a miss.
    ///
    /// A hit never touches the synthesizer or checks the lesson. A miss
    /// resolves the language's voice, calls the synthesizer once and stores
    /// the result tagged with `lesson_id`. If another caller stored the word
    /// first, that stored payload is returned instead.
    pub async fn get_or_synthesize(&self, word: &str, language_id: i64, lesson_id: i64) -> AppResult<String> {
        if word.is_empty() {
            return Err(AppError::Validation("word must not be empty".into()));
        }

        if let Some(cached) = self.repo.find_cached_audio(word).await? {
            *self.hits.write() += 1;
            debug!("Audio cache hit for '{}'", word);
            return Ok(cached.base64);
        }

        *self.misses.write() += 1;
        debug!("Audio cache miss for '{}'", word);

        let language = self.repo.get_language(language_id).await?;
        let request = SynthesisRequest {
            voice: language.voice,
            text: word.to_string(),
            pitch: self.config.pitch,
            rate: self.config.rate,
            volume: self.config.volume,
            output_root: self.config.output_root.clone(),
            save_to_file: false,
        };
        let payload = self.synthesizer.synthesize(request).await?;

        if self.repo.insert_cached_audio(word, lesson_id, &payload).await? {
            info!("Cached audio for '{}' (lesson {})", word, lesson_id);
            return Ok(payload);
        }

        // Lost the race to a concurrent miss; the first stored payload wins
        match self.repo.find_cached_audio(word).await? {
            Some(stored) => Ok(stored.base64),
            None => Ok(payload),
        }
    }

    pub fn stats(&self) -> AudioCacheStats {
        AudioCacheStats {
            hits: *self.hits.read(),
            misses: *self.misses.read(),
        }
    }
}
