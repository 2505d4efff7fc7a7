//! Mock text generator

use super::{bump, lock};
use crate::error::{ErrorCode, OutreachError, Result};
use crate::generate::{RenderedPrompt, TextGenerator};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const DEFAULT_RESPONSE: &str =
    r#"{"subject": "Quick intro", "body": "Hello there.\n\nI would love to connect."}"#;

/// Builder for creating configured mock generators
pub struct MockGeneratorBuilder {
    responses: VecDeque<Result<String>>,
    default_response: String,
    error_on_call: Option<usize>,
}

impl Default for MockGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGeneratorBuilder {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            default_response: DEFAULT_RESPONSE.to_string(),
            error_on_call: None,
        }
    }

    /// Queue one raw response; queued responses are used before the default
    pub fn with_response(mut self, raw: &str) -> Self {
        self.responses.push_back(Ok(raw.to_string()));
        self
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.responses.push_back(Err(OutreachError::generation(message)));
        self
    }

    /// Response once the queue is empty
    pub fn with_default(mut self, raw: &str) -> Self {
        self.default_response = raw.to_string();
        self
    }

    /// Fail only the n-th call (1-based)
    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.error_on_call = Some(call);
        self
    }

    pub fn build(self) -> MockGenerator {
        MockGenerator {
            responses: Arc::new(Mutex::new(self.responses)),
            default_response: self.default_response,
            error_on_call: self.error_on_call,
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock implementation of TextGenerator for testing
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    default_response: String,
    error_on_call: Option<usize>,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<RenderedPrompt>>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MockGeneratorBuilder {
        MockGeneratorBuilder::new()
    }

    pub fn get_call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Every prompt received, in call order
    pub fn prompts(&self) -> Vec<RenderedPrompt> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &RenderedPrompt) -> Result<String> {
        let call = bump(&self.call_count);
        lock(&self.prompts).push(prompt.clone());

        if self.error_on_call == Some(call) {
            return Err(OutreachError::generation_with_code(
                ErrorCode::GENERATION_REQUEST_FAILED,
                format!("Simulated failure on call {}", call),
            ));
        }

        match lock(&self.responses).pop_front() {
            Some(response) => response,
            None => Ok(self.default_response.clone()),
        }
    }
}
