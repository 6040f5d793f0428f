/*!
 * Mock collaborators for testing
 *
 * `MockSynthesizer` stands in for the text-to-speech engine and
 * `MockLessonFiles` for the file system, so tests can count calls and
 * inject failures at a chosen step.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use linguadeck::audio::{SpeechSynthesizer, SynthesisRequest};
use linguadeck::errors::{AppError, AppResult};
use linguadeck::lessons::LessonFiles;

/// Synthesizer that encodes the text it was given
#[derive(Debug, Default, Clone)]
pub struct MockSynthesizer {
    requests: Arc<Mutex<Vec<SynthesisRequest>>>,
    fail: bool,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesizer whose every call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().clone()
    }

    /// Payload produced for `text`
    pub fn payload_for(text: &str) -> String {
        format!("b64:{}", text)
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> AppResult<String> {
        let text = request.text.clone();
        self.requests.lock().push(request);
        if self.fail {
            return Err(AppError::Synthesis("engine offline".to_string()));
        }
        Ok(Self::payload_for(&text))
    }
}

/// Kind of file operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCall {
    RemoveFile(PathBuf),
    RemoveDir(PathBuf),
}

/// Records removals without touching the disk; can fail on one path
#[derive(Debug, Default, Clone)]
pub struct MockLessonFiles {
    calls: Arc<Mutex<Vec<FileCall>>>,
    fail_on: Option<PathBuf>,
}

impl MockLessonFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the removal of `path`; every other call succeeds
    pub fn failing_on(path: impl Into<PathBuf>) -> Self {
        Self {
            fail_on: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<FileCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: FileCall, path: &Path) -> AppResult<()> {
        self.calls.lock().push(call);
        match &self.fail_on {
            Some(target) if target == path => Err(AppError::Filesystem(format!(
                "Permission denied: {:?}",
                path
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl LessonFiles for MockLessonFiles {
    async fn remove_file(&self, path: &Path) -> AppResult<()> {
        self.record(FileCall::RemoveFile(path.to_path_buf()), path)
    }

    async fn remove_dir(&self, path: &Path) -> AppResult<()> {
        self.record(FileCall::RemoveDir(path.to_path_buf()), path)
    }
}
