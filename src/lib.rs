/*!
 * # linguadeck - local store and AI enrichment for language lessons
 *
 * A Rust library that keeps languages, lessons, their vocabulary and
 * synthesized word audio in SQLite, and enriches words through remote AI
 * platforms.
 *
 * ## Features
 *
 * - Parameterized statement builder with positional `$n` markers
 * - Idempotent schema bootstrap with a seeded settings row
 * - Ordered vocabulary reconciliation with dense positions
 * - Cascading lesson delete across files and tables
 * - Global read-through word audio cache
 * - Annotation and translation through five AI platforms:
 *   - ChatGLM, DeepSeek, Groq and ChatGPT (chat completions)
 *   - Google Gemini
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: SQLite persistence:
 *   - `database::query`: Statement builder
 *   - `database::schema`: Table definitions and bootstrap
 *   - `database::connection`: Connection lifecycle
 *   - `database::repository`: Typed data access
 * - `audio`: Word audio cache over a speech synthesizer
 * - `vocabulary`: Word list reconciliation
 * - `lessons`: Lesson file layout and cascading delete
 * - `providers`: AI platform adapters and the HTTP relay
 * - `prompts`: Annotation and translation prompt templates
 * - `language_utils`: Locale tag utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod audio;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod lessons;
pub mod prompts;
pub mod providers;
pub mod vocabulary;

// Re-export main types for easier usage
pub use app_config::Config;
pub use audio::{AudioCache, SpeechSynthesizer, SynthesisRequest};
pub use database::{DatabaseConnection, QueryBuilder, Repository};
pub use errors::{AppError, AppResult, CascadeStage, ProviderError};
pub use lessons::{CascadeDeleteCoordinator, LessonFiles, LessonPaths, LocalLessonFiles};
pub use providers::{AiClient, AiPlatform, AiSettings, ProviderSelection, ProviderSettings};
pub use vocabulary::{ReconcileReport, WordEdit, WordSetReconciler};
