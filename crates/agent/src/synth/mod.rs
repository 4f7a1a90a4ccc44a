//! Code synthesis.
//!
//! The [`Synthesizer`] retrieves catalog context, parses the request, then
//! asks each configured [`SynthesisStrategy`] in turn for a program. The
//! template strategy closes the chain and cannot fail, so once context
//! retrieval succeeds some source text is always produced.

pub mod llm;
pub mod template;

pub use llm::LlmStrategy;
pub use template::TemplateStrategy;

use crate::intent::IntentParser;
use async_trait::async_trait;
use genie_catalog::CapabilityCatalog;
use genie_core::Intent;
use genie_core::error::{CatalogError, ProviderError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a strategy may draw on for one request.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub query: &'a str,
    /// Rendered conversation memory (may be empty)
    pub conversation: &'a str,
    /// Rendered catalog context
    pub context: &'a str,
    pub intent: &'a Intent,
}

/// One way of turning a request into source text.
#[async_trait]
pub trait SynthesisStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, request: &SynthesisRequest<'_>) -> Result<String, ProviderError>;
}

/// Output of a synthesis.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub code: String,
    pub intent: Intent,
    /// Name of the strategy that produced `code`
    pub strategy: String,
}

pub struct Synthesizer {
    catalog: Arc<CapabilityCatalog>,
    parser: IntentParser,
    strategies: Vec<Arc<dyn SynthesisStrategy>>,
    fallback: TemplateStrategy,
}

impl Synthesizer {
    /// A template-only synthesizer.
    pub fn new(catalog: Arc<CapabilityCatalog>, fallback: TemplateStrategy) -> Self {
        Self {
            catalog,
            parser: IntentParser::new(),
            strategies: Vec::new(),
            fallback,
        }
    }

    /// Try `strategy` before the templates.
    pub fn with_strategy(mut self, strategy: Arc<dyn SynthesisStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(self.fallback.name()))
            .collect()
    }

    /// Produce source text for `query`.
    ///
    /// Only catalog retrieval can fail; strategy errors fall through to the
    /// next strategy and finally to the templates.
    pub async fn synthesize(
        &self,
        query: &str,
        conversation: &str,
    ) -> Result<Synthesis, CatalogError> {
        let context = self.catalog.get_context(query).await?;
        let intent = self.parser.parse(query);
        debug!(action = %intent.action, target = %intent.target, "Intent parsed");

        let request = SynthesisRequest {
            query,
            conversation,
            context: &context,
            intent: &intent,
        };

        for strategy in &self.strategies {
            match strategy.synthesize(&request).await {
                Ok(code) if !code.trim().is_empty() => {
                    info!(strategy = strategy.name(), "Code synthesized");
                    return Ok(Synthesis {
                        code: code.trim().to_string(),
                        intent,
                        strategy: strategy.name().to_string(),
                    });
                }
                Ok(_) => warn!(strategy = strategy.name(), "Blank synthesis output, falling back"),
                Err(e) => warn!(strategy = strategy.name(), error = %e, "Synthesis failed, falling back"),
            }
        }

        let code = self.fallback.render(&request);
        info!(strategy = self.fallback.name(), "Code synthesized");
        Ok(Synthesis {
            code,
            intent,
            strategy: self.fallback.name().to_string(),
        })
    }
}
