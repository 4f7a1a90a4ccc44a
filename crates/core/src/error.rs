//! Error types for the Genie domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// The top-level error type for all Genie operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Catalog errors ---
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the capability store.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Failures of the external compiler invocation.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to start compiler: {0}")]
    Spawn(String),

    #[error("Build failed ({status}): {output}")]
    Failed { status: String, output: String },
}

impl BuildError {
    /// Captured compiler output, if the compiler got far enough to produce any.
    pub fn output(&self) -> &str {
        match self {
            BuildError::Spawn(_) => "",
            BuildError::Failed { output, .. } => output,
        }
    }
}

/// Failures of the push → chmod → run sequence on a device.
///
/// Every variant carries whatever the failing step printed so the caller can
/// show it next to the error.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("transfer failed: {reason}")]
    TransferFailed { output: String, reason: String },

    #[error("permission failed: {reason}")]
    PermissionFailed { output: String, reason: String },

    #[error("run failed: {reason}")]
    RunFailed { output: String, reason: String },
}

impl ExecutorError {
    /// Device output captured by the failing step.
    pub fn output(&self) -> &str {
        match self {
            ExecutorError::TransferFailed { output, .. }
            | ExecutorError::PermissionFailed { output, .. }
            | ExecutorError::RunFailed { output, .. } => output,
        }
    }
}
