//! Test double that replays queued completions and records prompts.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LanguageModel, LlmError};

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn fail(self) -> Self {
        self.replies.lock().unwrap().push_back(Err(LlmError::Api {
            status: 503,
            message: "backend unavailable".to_string(),
        }));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted-test-model"
    }

    /// An exhausted script behaves like an unreachable backend.
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}
