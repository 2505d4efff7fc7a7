//! Outbound mail transport

use crate::compose::ComposedMessage;
use crate::error::Result;
use async_trait::async_trait;

pub mod gmail;
pub mod mime;
pub mod retry;
pub mod token;

pub use gmail::GmailClient;
pub use retry::RetryPolicy;
pub use token::{GoogleToken, TokenStore};

/// Delivers one assembled message
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send to `to` and return the provider's message id
    async fn send(&self, to: &str, message: &ComposedMessage) -> Result<String>;
}
