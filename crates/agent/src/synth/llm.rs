//! Language-model synthesis.

use super::{SynthesisRequest, SynthesisStrategy};
use async_trait::async_trait;
use genie_core::Provider;
use genie_core::error::ProviderError;
use std::sync::Arc;
use tracing::debug;

const ROLE: &str = "You are a senior Go automation test engineer. \
Write a complete Go test program from the information below; \
it will run in the device automation environment.";

const REQUIREMENTS: &[&str] = &[
    "Include package main and a main function.",
    "Import the automation modules the program needs.",
    "The code must build and run as-is.",
    "Add error handling and log output where needed.",
];

/// Delegates synthesis to a [`Provider`]; the completion is returned as-is.
pub struct LlmStrategy {
    provider: Arc<dyn Provider>,
}

impl LlmStrategy {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn build_prompt(request: &SynthesisRequest<'_>) -> String {
        let mut prompt = String::new();
        prompt.push_str(ROLE);
        prompt.push_str("\n\n");
        if !request.conversation.is_empty() {
            prompt.push_str(request.conversation);
            prompt.push('\n');
        }
        prompt.push_str(request.context);
        prompt.push('\n');
        prompt.push_str("User request:\n");
        prompt.push_str(&request.intent.to_string());
        prompt.push_str("\nRequirements:\n");
        for (i, requirement) in REQUIREMENTS.iter().enumerate() {
            prompt.push_str(&format!("{}. {requirement}\n", i + 1));
        }
        prompt
    }
}

#[async_trait]
impl SynthesisStrategy for LlmStrategy {
    fn name(&self) -> &str {
        "llm"
    }

    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String, ProviderError> {
        let prompt = Self::build_prompt(request);
        debug!(provider = self.provider.name(), prompt_len = prompt.len(), "Requesting completion");
        let completion = self.provider.generate(&prompt).await?;
        Ok(completion.trim().to_string())
    }
}
