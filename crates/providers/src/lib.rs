//! Language-model backend implementations for Genie.
//!
//! All backends implement the `genie_core::Provider` trait.
//! `build_from_config` creates the configured backend.

pub mod ollama;

pub use ollama::OllamaProvider;

use genie_config::LlmConfig;
use genie_core::error::ProviderError;
use std::sync::Arc;
use std::time::Duration;

/// Build the configured backend.
pub fn build_from_config(
    config: &LlmConfig,
) -> Result<Arc<dyn genie_core::Provider>, ProviderError> {
    let provider = OllamaProvider::new(
        &config.base_url,
        &config.model,
        &config.embed_model,
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(Arc::new(provider))
}
