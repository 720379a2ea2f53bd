pub mod completions;

use async_trait::async_trait;

use crate::error::Error;

/// A chat-completion style text service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one system + user exchange and returns the answer text.
    ///
    /// `Ok(None)` means the service answered successfully but without any
    /// usable text. Transport failures and non-2xx responses are errors.
    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, Error>;
}
