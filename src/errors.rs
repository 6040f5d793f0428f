/*!
 * Error types for the linguadeck library.
 *
 * Provider failures get their own enum so callers can tell a transport
 * failure from a malformed provider payload. Everything else surfaces
 * through `AppError`, using the thiserror crate for the definitions.
 */

use thiserror::Error;

use crate::providers::AiPlatform;

/// Errors that can occur when talking to an AI provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, TLS, proxy, timeout)
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The provider answered with a non-success status.
    ///
    /// `message` is the raw relay message, shown to the operator as-is.
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Raw error body from the provider
        message: String,
    },

    /// The provider answered 200 but the payload had no usable text
    #[error("{platform} response is malformed or empty: {detail}")]
    MalformedResponse {
        /// Provider that produced the payload
        platform: AiPlatform,
        /// What was missing
        detail: String,
    },
}

impl ProviderError {
    /// True for failures that happened before or at the HTTP layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::RequestFailed(_) | Self::ApiError { .. })
    }
}

/// Stage of the lesson cascade delete, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    SubtitleFile,
    AudioFile,
    Directory,
    AudioCacheRows,
    WordRows,
    LessonRow,
}

impl CascadeStage {
    /// All stages in execution order
    pub const ALL: [CascadeStage; 6] = [
        CascadeStage::SubtitleFile,
        CascadeStage::AudioFile,
        CascadeStage::Directory,
        CascadeStage::AudioCacheRows,
        CascadeStage::WordRows,
        CascadeStage::LessonRow,
    ];
}

impl std::fmt::Display for CascadeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SubtitleFile => "delete subtitle file",
            Self::AudioFile => "delete audio file",
            Self::Directory => "delete lesson directory",
            Self::AudioCacheRows => "delete cached audio rows",
            Self::WordRows => "delete word rows",
            Self::LessonRow => "delete lesson row",
        };
        write!(f, "{}", name)
    }
}

/// Main error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Required input was empty or malformed; raised before any I/O
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced language, lesson or word does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// SQLite failure, passed through verbatim
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Missing file or failed file-system operation
    #[error("File error: {0}")]
    Filesystem(String),

    /// Error from an AI provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Speech synthesis collaborator failed
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Bad or missing configuration (unknown provider, missing credential,
    /// database not connected, malformed stored settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON encoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A lesson cascade delete stopped at `stage`; earlier stages stay applied
    #[error("Cascade delete stopped at '{stage}': {source}")]
    Cascade {
        stage: CascadeStage,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// The error beneath any cascade wrapper
    pub fn root(&self) -> &AppError {
        match self {
            Self::Cascade { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Configuration(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Filesystem(error.to_string())
    }
}

/// Result alias used across the crate
pub type AppResult<T> = Result<T, AppError>;
