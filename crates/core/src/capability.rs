//! Capability descriptors: the catalog's unit of knowledge.
//!
//! A descriptor documents one device-automation function the generated
//! programs may call. The pipeline never invokes these functions itself; it
//! only retrieves their descriptions to ground code synthesis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One externally-provided automation function.
///
/// `(module, function)` is the natural key for curation, but uniqueness is
/// not enforced by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDoc {
    /// Store-assigned identity (0 until persisted)
    #[serde(default)]
    pub id: i64,

    /// Namespace the function lives in (e.g. "motion", "uiacc")
    pub module: String,

    /// Function name within the module
    pub function: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub signature: String,

    #[serde(default)]
    pub parameters: String,

    /// Human description of the return value
    #[serde(default, rename = "return")]
    pub return_spec: String,

    #[serde(default)]
    pub example: String,

    /// Free-text search tags, whitespace separated
    #[serde(default)]
    pub keywords: String,

    /// Embedding vector, filled lazily on first vector search
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CapabilityDoc {
    /// Start a descriptor for `module.function` with every other field empty.
    pub fn new(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            id: 0,
            module: module.into(),
            function: function.into(),
            description: String::new(),
            signature: String::new(),
            parameters: String::new(),
            return_spec: String::new(),
            example: String::new(),
            keywords: String::new(),
            embedding: None,
            created_at: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = parameters.into();
        self
    }

    pub fn returns(mut self, return_spec: impl Into<String>) -> Self {
        self.return_spec = return_spec.into();
        self
    }

    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// `module.function`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.function)
    }

    /// The text fed to the embedding provider for this descriptor.
    pub fn embedding_text(&self) -> String {
        [
            self.description.as_str(),
            self.signature.as_str(),
            self.example.as_str(),
        ]
        .join("\n")
    }
}
