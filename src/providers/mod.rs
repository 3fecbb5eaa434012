//! LLM provider implementations

pub mod groq;

use async_trait::async_trait;

// Re-export for convenience
pub use groq::GroqClient;

/// Sends one system + user prompt pair to a chat model and returns the
/// completion text.
///
/// The orchestrator only sees this trait, so tests can swap the hosted
/// provider for a stub.
#[async_trait]
pub trait CompletionClient: Send + Sync
{   async fn complete(
      &self
    , system: &str
    , user: &str
    ) -> Result<String, crate::error::Error>;
}
