/*!
 * Integration tests for the word audio cache
 */

use std::sync::Arc;

use linguadeck::app_config::SynthesisConfig;
use linguadeck::audio::AudioCache;
use linguadeck::errors::AppError;

use crate::common::mock_services::MockSynthesizer;
use crate::common::{memory_repo, seed_language};

fn synthesis_config() -> SynthesisConfig {
    SynthesisConfig {
        pitch: 5,
        rate: -10,
        volume: 0,
        output_root: std::env::temp_dir(),
    }
}

#[tokio::test]
async fn test_getOrSynthesize_calledTwice_shouldSynthesizeOnce() {
    let repo = memory_repo().await;
    let language_id = seed_language(&repo).await;
    let synth = MockSynthesizer::new();
    let cache = AudioCache::new(repo.clone(), Arc::new(synth.clone()), synthesis_config());

    let first = cache.get_or_synthesize("gracias", language_id, 1).await.unwrap();
    let second = cache.get_or_synthesize("gracias", language_id, 1).await.unwrap();

    assert_eq!(first, MockSynthesizer::payload_for("gracias"));
    assert_eq!(first, second);
    assert_eq!(synth.call_count(), 1);
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_getOrSynthesize_onMiss_shouldUseLanguageVoiceAndConfig() {
    let repo = memory_repo().await;
    let language_id = seed_language(&repo).await;
    let synth = MockSynthesizer::new();
    let cache = AudioCache::new(repo, Arc::new(synth.clone()), synthesis_config());

    cache.get_or_synthesize("perro", language_id, 3).await.unwrap();

    let request = &synth.requests()[0];
    assert_eq!(request.voice, "es-ES-ElviraNeural");
    assert_eq!(request.text, "perro");
    assert_eq!((request.pitch, request.rate, request.volume), (5, -10, 0));
    assert!(!request.save_to_file);
}

#[tokio::test]
async fn test_getOrSynthesize_fromAnotherLesson_shouldReuseGlobalRow() {
    let repo = memory_repo().await;
    let language_id = seed_language(&repo).await;
    let synth = MockSynthesizer::new();
    let cache = AudioCache::new(repo.clone(), Arc::new(synth.clone()), synthesis_config());

    cache.get_or_synthesize("agua", language_id, 1).await.unwrap();
    cache.get_or_synthesize("agua", language_id, 2).await.unwrap();

    assert_eq!(synth.call_count(), 1);
    let stored = repo.find_cached_audio("agua").await.unwrap().unwrap();
    assert_eq!(stored.class_id, 1);
}

#[tokio::test]
async fn test_getOrSynthesize_shouldTreatWordsCaseSensitively() {
    let repo = memory_repo().await;
    let language_id = seed_language(&repo).await;
    let synth = MockSynthesizer::new();
    let cache = AudioCache::new(repo, Arc::new(synth.clone()), synthesis_config());

    cache.get_or_synthesize("Hola", language_id, 1).await.unwrap();
    cache.get_or_synthesize("hola", language_id, 1).await.unwrap();

    assert_eq!(synth.call_count(), 2);
}

#[tokio::test]
async fn test_getOrSynthesize_whenSynthesisFails_shouldStoreNothing() {
    let repo = memory_repo().await;
    let language_id = seed_language(&repo).await;
    let cache = AudioCache::new(repo.clone(), Arc::new(MockSynthesizer::failing()), synthesis_config());

    let result = cache.get_or_synthesize("roto", language_id, 1).await;

    assert!(matches!(result, Err(AppError::Synthesis(_))));
    assert!(repo.find_cached_audio("roto").await.unwrap().is_none());
}

#[tokio::test]
async fn test_getOrSynthesize_withUnknownLanguageOnMiss_shouldBeNotFound() {
    let repo = memory_repo().await;
    let synth = MockSynthesizer::new();
    let cache = AudioCache::new(repo, Arc::new(synth.clone()), synthesis_config());

    let result = cache.get_or_synthesize("nada", 404, 1).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(synth.call_count(), 0);
}

#[tokio::test]
async fn test_getOrSynthesize_withEmptyWord_shouldFailValidation() {
    let repo = memory_repo().await;
    let cache = AudioCache::new(repo, Arc::new(MockSynthesizer::new()), synthesis_config());

    assert!(matches!(
        cache.get_or_synthesize("", 1, 1).await,
        Err(AppError::Validation(_))
    ));
}
