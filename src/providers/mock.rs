/*!
 * Mock relay for testing.
 *
 * `MockRelay` records every request and answers according to its behavior:
 * - `MockRelay::responding(body)` always answers 200 with `body`
 * - `MockRelay::status(code, msg)` always answers with a non-200 status
 * - `MockRelay::unreachable()` fails before any HTTP status
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use super::relay::{HttpRelay, RelayRequest, RelayResponse};
use crate::errors::ProviderError;

/// Behavior mode for the mock relay
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Answer 200 with this body
    Respond(Value),
    /// Answer with a non-200 status and raw message
    Status { code: u16, msg: String },
    /// Fail with a transport error
    Unreachable,
}

#[derive(Debug, Clone)]
pub struct MockRelay {
    behavior: MockBehavior,
    requests: Arc<Mutex<Vec<RelayRequest>>>,
    request_count: Arc<AtomicUsize>,
}

impl MockRelay {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            requests: Arc::new(Mutex::new(Vec::new())),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn responding(body: Value) -> Self {
        Self::new(MockBehavior::Respond(body))
    }

    /// 200 with a chat-completions body whose first choice says `text`
    pub fn chat_reply(text: &str) -> Self {
        Self::responding(json!({"choices": [{"message": {"role": "assistant", "content": text}}]}))
    }

    /// 200 with a Gemini body whose first part says `text`
    pub fn gemini_reply(text: &str) -> Self {
        Self::responding(json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}))
    }

    pub fn status(code: u16, msg: impl Into<String>) -> Self {
        Self::new(MockBehavior::Status {
            code,
            msg: msg.into(),
        })
    }

    pub fn unreachable() -> Self {
        Self::new(MockBehavior::Unreachable)
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RelayRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RelayRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl HttpRelay for MockRelay {
    async fn send(&self, request: RelayRequest) -> Result<RelayResponse, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);

        match &self.behavior {
            MockBehavior::Respond(body) => Ok(RelayResponse::ok(body.clone())),
            MockBehavior::Status { code, msg } => Ok(RelayResponse::failed(*code, msg.clone())),
            MockBehavior::Unreachable => Err(ProviderError::RequestFailed(
                "Simulated connection failure".to_string(),
            )),
        }
    }
}
