use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

use super::GenerationBackend;
use crate::errors::ServiceError;

/// In-memory backend that replays queued results and records every prompt.
#[derive(Default)]
pub struct Scripted {
    replies: Mutex<VecDeque<Result<Value, ServiceError>>>,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, v: Value) -> Self {
        self.replies.lock().push_back(Ok(v));
        self
    }

    pub fn fail(self, e: ServiceError) -> Self {
        self.replies.lock().push_back(Err(e));
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerationBackend for Scripted {
    async fn generate(&self, prompt: &str, _shape: &Value) -> Result<Value, ServiceError> {
        self.prompts.lock().push(prompt.to_string());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Unavailable("script exhausted".into())))
    }
}
