//! Per-contact message generation
//!
//! A [`PromptEngine`] renders the fixed instructions for a contact, a
//! [`TextGenerator`] turns them into raw text, and [`parse_generated`]
//! recovers a subject and body from whatever came back.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod azure;
pub mod parse;
pub mod prompt;

pub use azure::AzureOpenAiClient;
pub use parse::{fix_self_references, parse_generated, DEFAULT_SUBJECT};
pub use prompt::{PromptEngine, RenderedPrompt};

/// Subject and plain-text body ready for assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

/// Text-generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce raw model output for a system instruction and user prompt
    async fn generate(&self, prompt: &RenderedPrompt) -> Result<String>;
}
