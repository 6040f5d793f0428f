/*!
 * Tests for provider request shaping and response extraction
 */

use linguadeck::errors::{AppError, ProviderError};
use linguadeck::providers::{AiPlatform, AiSettings, HttpMethod, ProviderSelection, ProviderSettings};
use serde_json::json;

fn settings(model: &str) -> ProviderSettings {
    ProviderSettings::new(model, "sk-test", None)
}

#[test]
fn test_aiPlatform_fromStr_shouldIgnoreCase() {
    assert_eq!("deepseek".parse::<AiPlatform>().unwrap(), AiPlatform::DeepSeek);
    assert_eq!(" Google ".parse::<AiPlatform>().unwrap(), AiPlatform::Google);
    assert!(matches!("Claude".parse::<AiPlatform>(), Err(AppError::Configuration(_))));
}

#[test]
fn test_aiPlatform_default_shouldBeChatGlm() {
    assert_eq!(AiPlatform::default(), AiPlatform::ChatGLM);
    assert_eq!(AiPlatform::ChatGLM.to_string(), "ChatGLM");
}

#[test]
fn test_providerSettings_withBlankProxy_shouldDropIt() {
    let settings = ProviderSettings::new("glm-4", "key", Some("  ".into()));
    assert_eq!(settings.proxy, None);
}

#[test]
fn test_providerSettings_serde_shouldUseApiKeyName() {
    let encoded = serde_json::to_value(settings("gpt-4o")).unwrap();
    assert_eq!(encoded, json!({"model": "gpt-4o", "apiKey": "sk-test"}));
}

#[test]
fn test_providerSettings_validate_withoutKey_shouldNamePlatform() {
    let result = ProviderSettings::new("llama3", "", None).validate(AiPlatform::Groq);
    assert!(matches!(result, Err(AppError::Configuration(ref m)) if m.contains("Groq")));
}

#[test]
fn test_chatGlmRequest_shouldDisableStreamAndUseBearer() {
    let selection = ProviderSelection::new(AiPlatform::ChatGLM, settings("glm-4-flash"));

    let request = selection.build_request("hola").unwrap();

    assert_eq!(request.method, HttpMethod::Post);
    assert!(request.url.contains("bigmodel.cn"));
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
    assert_eq!(request.body["stream"], json!(false));
    assert_eq!(request.body["messages"][0], json!({"role": "user", "content": "hola"}));
}

#[test]
fn test_deepSeekRequest_shouldLeadWithSystemMessage() {
    let selection = ProviderSelection::new(AiPlatform::DeepSeek, settings("deepseek-chat"));

    let request = selection.build_request("hola").unwrap();

    assert_eq!(request.body["messages"][0]["role"], "system");
    assert_eq!(request.body["messages"][1]["content"], "hola");
    assert_eq!(request.header("Accept"), Some("application/json"));
}

#[test]
fn test_chatGptRequest_shouldOmitStreamFlag() {
    let selection = ProviderSelection::new(AiPlatform::ChatGPT, settings("gpt-4o-mini"));

    let request = selection.build_request("hola").unwrap();

    assert!(request.body.get("stream").is_none());
}

#[test]
fn test_googleRequest_shouldPutKeyInQueryAndSkipAuthHeader() {
    let selection = ProviderSelection::new(AiPlatform::Google, settings("gemini-1.5-flash"));

    let request = selection.build_request("hola").unwrap();

    assert!(request.url.contains("/gemini-1.5-flash:generateContent?key=sk-test"));
    assert_eq!(request.header("Authorization"), None);
    assert_eq!(request.body["contents"][0]["parts"][0]["text"], "hola");
}

#[test]
fn test_request_shouldCarryProxyThrough() {
    let selection = ProviderSelection::new(
        AiPlatform::Groq,
        ProviderSettings::new("llama3", "k", Some("http://127.0.0.1:7890".into())),
    );

    let request = selection.build_request("x").unwrap();

    assert_eq!(request.proxy.as_deref(), Some("http://127.0.0.1:7890"));
}

#[test]
fn test_extractText_chatWithEmptyChoices_shouldBeMalformed() {
    let selection = ProviderSelection::new(AiPlatform::Groq, settings("llama3"));

    let result = selection.extract_text(&json!({"choices": []}));

    assert!(matches!(
        result,
        Err(ProviderError::MalformedResponse { platform: AiPlatform::Groq, .. })
    ));
}

#[test]
fn test_extractText_googleWithTextPart_shouldReturnIt() {
    let selection = ProviderSelection::new(AiPlatform::Google, settings("gemini-pro"));
    let body = json!({"candidates": [{"content": {"parts": [{"text": "ok"}]}}]});

    assert_eq!(selection.extract_text(&body).unwrap(), "ok");
}

#[test]
fn test_aiSettings_active_whenUnconfigured_shouldFailConfiguration() {
    let mut ai = AiSettings::default();
    ai.now_ai_platform = AiPlatform::Google;
    ai.set(AiPlatform::ChatGLM, Some(settings("glm-4")));

    assert!(matches!(ai.active(), Err(AppError::Configuration(_))));

    ai.set(AiPlatform::Google, Some(settings("gemini-pro")));
    assert_eq!(ai.active().unwrap().platform(), AiPlatform::Google);
}
