/*!
 * Chat-completions dialect shared by ChatGLM, DeepSeek, Groq and ChatGPT.
 *
 * The platforms differ only in endpoint, an optional system message, the
 * `stream` flag and an extra `Accept` header, so each one is described by a
 * `ChatEndpoint` constant.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::relay::RelayRequest;
use super::{AiPlatform, ProviderSettings};
use crate::errors::{AppResult, ProviderError};

/// Request shape of one chat-completions platform
#[derive(Debug, Clone, Copy)]
pub struct ChatEndpoint {
    pub platform: AiPlatform,
    pub url: &'static str,
    /// Sent as a leading `system` message when set
    pub system_prompt: Option<&'static str>,
    /// Whether the body carries `"stream": false`
    pub disable_stream: bool,
    /// Whether to send `Accept: application/json`
    pub accept_json: bool,
}

pub const CHATGLM: ChatEndpoint = ChatEndpoint {
    platform: AiPlatform::ChatGLM,
    url: "https://open.bigmodel.cn/api/paas/v4/chat/completions",
    system_prompt: None,
    disable_stream: true,
    accept_json: false,
};

pub const DEEPSEEK: ChatEndpoint = ChatEndpoint {
    platform: AiPlatform::DeepSeek,
    url: "https://api.deepseek.com/chat/completions",
    system_prompt: Some("You are a helpful assistant"),
    disable_stream: true,
    accept_json: true,
};

pub const GROQ: ChatEndpoint = ChatEndpoint {
    platform: AiPlatform::Groq,
    url: "https://api.groq.com/openai/v1/chat/completions",
    system_prompt: None,
    disable_stream: true,
    accept_json: false,
};

pub const CHATGPT: ChatEndpoint = ChatEndpoint {
    platform: AiPlatform::ChatGPT,
    url: "https://api.openai.com/v1/chat/completions",
    system_prompt: None,
    disable_stream: false,
    accept_json: false,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatEndpoint {
    pub fn build_request(&self, prompt: &str, settings: &ProviderSettings) -> AppResult<RelayRequest> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let body = ChatRequest {
            model: settings.model.clone(),
            messages,
            stream: self.disable_stream.then_some(false),
        };

        let mut request = RelayRequest::post_json(self.url, serde_json::to_value(&body)?, settings.proxy.clone())
            .with_header("Authorization", format!("Bearer {}", settings.api_key));
        if self.accept_json {
            request = request.with_header("Accept", "application/json");
        }
        Ok(request)
    }
}

/// `choices[0].message.content`, which must be a non-empty string
pub fn extract_text(platform: AiPlatform, body: &Value) -> Result<String, ProviderError> {
    let malformed = |detail: &str| ProviderError::MalformedResponse {
        platform,
        detail: detail.to_string(),
    };

    let response: ChatResponse =
        serde_json::from_value(body.clone()).map_err(|e| malformed(&e.to_string()))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| malformed("no choices"))?;

    choice
        .message
        .and_then(|m| m.content)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| malformed("first choice has no content"))
}
