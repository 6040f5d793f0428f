/*!
 * AI provider integration.
 *
 * Five remote platforms are supported. Each has its own request shape and
 * response envelope; this module normalizes them into a single text result:
 * - ChatGLM, DeepSeek, Groq and ChatGPT speak the chat-completions dialect
 *   (`chat_completions`)
 * - Google Gemini has its own `generateContent` shape (`google`)
 *
 * All traffic goes through an `HttpRelay` so the transport can be swapped
 * out in tests.
 */

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult, ProviderError};
use crate::prompts::{self, PromptTemplates};

pub mod chat_completions;
pub mod google;
pub mod mock;
pub mod relay;

pub use relay::{HttpMethod, HttpRelay, RelayRequest, RelayResponse, ReqwestRelay};

/// Supported AI platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiPlatform {
    #[default]
    ChatGLM,
    DeepSeek,
    Groq,
    Google,
    ChatGPT,
}

impl AiPlatform {
    /// Every platform, in settings-column order
    pub const ALL: [AiPlatform; 5] = [
        AiPlatform::ChatGLM,
        AiPlatform::ChatGPT,
        AiPlatform::DeepSeek,
        AiPlatform::Google,
        AiPlatform::Groq,
    ];

    /// Name as stored in `nowAiPlatform` and used as the settings column name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatGLM => "ChatGLM",
            Self::DeepSeek => "DeepSeek",
            Self::Groq => "Groq",
            Self::Google => "Google",
            Self::ChatGPT => "ChatGPT",
        }
    }
}

impl fmt::Display for AiPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiPlatform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Configuration(format!("Unknown AI platform: {}", s)))
    }
}

/// Per-platform connection settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub model: String,
    #[serde(rename = "apiKey", default)]
    pub api_key: String,
    /// Proxy URL, passed through to the relay unmodified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl ProviderSettings {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, proxy: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            proxy: proxy.filter(|p| !p.trim().is_empty()),
        }
    }

    /// Model and credential must both be present
    pub fn validate(&self, platform: AiPlatform) -> AppResult<()> {
        if self.model.trim().is_empty() {
            return Err(AppError::Configuration(format!("{} model is not set", platform)));
        }
        if self.api_key.trim().is_empty() {
            return Err(AppError::Configuration(format!("{} API key is not set", platform)));
        }
        Ok(())
    }
}

/// The platform to call, carrying that platform's settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelection {
    ChatGLM(ProviderSettings),
    DeepSeek(ProviderSettings),
    Groq(ProviderSettings),
    Google(ProviderSettings),
    ChatGPT(ProviderSettings),
}

impl ProviderSelection {
    pub fn new(platform: AiPlatform, settings: ProviderSettings) -> Self {
        match platform {
            AiPlatform::ChatGLM => Self::ChatGLM(settings),
            AiPlatform::DeepSeek => Self::DeepSeek(settings),
            AiPlatform::Groq => Self::Groq(settings),
            AiPlatform::Google => Self::Google(settings),
            AiPlatform::ChatGPT => Self::ChatGPT(settings),
        }
    }

    pub fn platform(&self) -> AiPlatform {
        match self {
            Self::ChatGLM(_) => AiPlatform::ChatGLM,
            Self::DeepSeek(_) => AiPlatform::DeepSeek,
            Self::Groq(_) => AiPlatform::Groq,
            Self::Google(_) => AiPlatform::Google,
            Self::ChatGPT(_) => AiPlatform::ChatGPT,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        match self {
            Self::ChatGLM(s)
            | Self::DeepSeek(s)
            | Self::Groq(s)
            | Self::Google(s)
            | Self::ChatGPT(s) => s,
        }
    }

    /// Build the relay request for `prompt`
    pub fn build_request(&self, prompt: &str) -> AppResult<RelayRequest> {
        let request = match self {
            Self::ChatGLM(s) => chat_completions::CHATGLM.build_request(prompt, s)?,
            Self::DeepSeek(s) => chat_completions::DEEPSEEK.build_request(prompt, s)?,
            Self::Groq(s) => chat_completions::GROQ.build_request(prompt, s)?,
            Self::ChatGPT(s) => chat_completions::CHATGPT.build_request(prompt, s)?,
            Self::Google(s) => google::build_request(prompt, s)?,
        };
        Ok(request)
    }

    /// Pull the generated text out of a successful response body
    pub fn extract_text(&self, body: &serde_json::Value) -> Result<String, ProviderError> {
        match self {
            Self::ChatGLM(_) | Self::DeepSeek(_) | Self::Groq(_) | Self::ChatGPT(_) => {
                chat_completions::extract_text(self.platform(), body)
            }
            Self::Google(_) => google::extract_text(body),
        }
    }
}

/// Stored AI settings: one optional config per platform plus the active one
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AiSettings {
    pub now_ai_platform: AiPlatform,
    pub chat_glm: Option<ProviderSettings>,
    pub chat_gpt: Option<ProviderSettings>,
    pub deep_seek: Option<ProviderSettings>,
    pub google: Option<ProviderSettings>,
    pub groq: Option<ProviderSettings>,
}

impl AiSettings {
    pub fn get(&self, platform: AiPlatform) -> Option<&ProviderSettings> {
        match platform {
            AiPlatform::ChatGLM => self.chat_glm.as_ref(),
            AiPlatform::ChatGPT => self.chat_gpt.as_ref(),
            AiPlatform::DeepSeek => self.deep_seek.as_ref(),
            AiPlatform::Google => self.google.as_ref(),
            AiPlatform::Groq => self.groq.as_ref(),
        }
    }

    pub fn set(&mut self, platform: AiPlatform, settings: Option<ProviderSettings>) {
        let slot = match platform {
            AiPlatform::ChatGLM => &mut self.chat_glm,
            AiPlatform::ChatGPT => &mut self.chat_gpt,
            AiPlatform::DeepSeek => &mut self.deep_seek,
            AiPlatform::Google => &mut self.google,
            AiPlatform::Groq => &mut self.groq,
        };
        *slot = settings;
    }

    /// Resolve the active platform into a ready-to-call selection
    pub fn active(&self) -> AppResult<ProviderSelection> {
        let platform = self.now_ai_platform;
        let settings = self.get(platform).cloned().ok_or_else(|| {
            AppError::Configuration(format!("{} is selected but not configured", platform))
        })?;
        settings.validate(platform)?;
        Ok(ProviderSelection::new(platform, settings))
    }
}

/// Client that sends prompts to the selected platform through a relay
#[derive(Clone)]
pub struct AiClient {
    relay: Arc<dyn HttpRelay>,
}

impl AiClient {
    pub fn new(relay: Arc<dyn HttpRelay>) -> Self {
        Self { relay }
    }

    /// Send a prompt and return the generated text
    pub async fn complete(&self, prompt: &str, selection: &ProviderSelection) -> AppResult<String> {
        if prompt.trim().is_empty() {
            return Err(AppError::Validation("prompt must not be empty".into()));
        }

        let platform = selection.platform();
        let request = selection.build_request(prompt)?;
        debug!("Sending {} request to {}", platform, redact_url(&request.url));

        let response = self.relay.send(request).await?;
        if !response.is_success() {
            let message = response.msg.unwrap_or_else(|| "unknown error".to_string());
            error!("{} API error ({}): {}", platform, response.code, message);
            return Err(ProviderError::ApiError {
                status_code: response.code,
                message,
            }
            .into());
        }

        let body = response.data.unwrap_or(serde_json::Value::Null);
        Ok(selection.extract_text(&body)?)
    }

    /// Annotate `text` with an explicitly given platform and credentials
    pub async fn annotate(
        &self,
        text: &str,
        platform: AiPlatform,
        model: &str,
        credential: &str,
        proxy: Option<&str>,
    ) -> AppResult<String> {
        let settings = ProviderSettings::new(model, credential, proxy.map(str::to_string));
        settings.validate(platform)?;
        self.complete(text, &ProviderSelection::new(platform, settings))
            .await
    }

    /// Annotate a word list with the active platform and the stored prompt
    pub async fn annotate_words(
        &self,
        words: &[String],
        ai: &AiSettings,
        templates: &PromptTemplates,
    ) -> AppResult<String> {
        let selection = ai.active()?;
        let prompt = prompts::annotation_prompt(words, templates)?;
        self.complete(&prompt, &selection).await
    }

    /// Annotate a word list in sequential batches of `batch_size` words.
    ///
    /// Stops at the first failing batch.
    pub async fn annotate_in_batches(
        &self,
        words: &[String],
        batch_size: usize,
        ai: &AiSettings,
        templates: &PromptTemplates,
    ) -> AppResult<Vec<String>> {
        let selection = ai.active()?;
        let mut results = Vec::new();
        for batch in prompts::annotation_batches(words, batch_size) {
            let prompt = prompts::annotation_prompt(batch, templates)?;
            results.push(self.complete(&prompt, &selection).await?);
        }
        Ok(results)
    }

    /// Translate lesson text with the active platform
    pub async fn translate(
        &self,
        text: &str,
        ai: &AiSettings,
        templates: &PromptTemplates,
    ) -> AppResult<String> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("text to translate must not be empty".into()));
        }
        let selection = ai.active()?;
        let prompt = templates.translation().render(text);
        self.complete(&prompt, &selection).await
    }
}

/// Strip the query string so credentials in it never reach the log
fn redact_url(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
