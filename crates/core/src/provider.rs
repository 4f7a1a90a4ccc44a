//! Provider trait: the abstraction over language-model backends.
//!
//! A provider turns a prompt into text and a text into an embedding vector.
//! The synthesizer uses `generate`; the capability catalog uses `embed`.
//!
//! Implementations: Ollama (HTTP), scripted mocks in tests.

use async_trait::async_trait;
use crate::error::ProviderError;

/// The core Provider trait.
///
/// Calls are blocking from the pipeline's point of view: each one is awaited
/// to completion (or to the client-side timeout) before the next stage runs.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama").
    fn name(&self) -> &str;

    /// Generate a completion for a single prompt.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;

    /// Embed a text into a fixed-length vector.
    ///
    /// Default implementation returns an error indicating embeddings aren't supported.
    async fn embed(&self, _text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "Provider '{}' does not support embeddings",
            self.name()
        )))
    }
}
