//! Compiling generated sources.

use async_trait::async_trait;
use genie_core::error::BuildError;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Turns a persisted source file into an executable.
#[async_trait]
pub trait Builder: Send + Sync {
    /// Build `source` into `output`, returning the compiler's combined output.
    async fn build(&self, source: &Path, output: &Path) -> Result<String, BuildError>;
}

/// Runs `<compiler> build -o <output> <source>`.
#[derive(Debug, Clone)]
pub struct GoBuilder {
    compiler: String,
}

impl GoBuilder {
    pub fn new(compiler: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
        }
    }
}

impl Default for GoBuilder {
    fn default() -> Self {
        Self::new("go")
    }
}

#[async_trait]
impl Builder for GoBuilder {
    async fn build(&self, source: &Path, output: &Path) -> Result<String, BuildError> {
        debug!(compiler = %self.compiler, source = %source.display(), "Building");

        let result = Command::new(&self.compiler)
            .arg("build")
            .arg("-o")
            .arg(output)
            .arg(source)
            .output()
            .await
            .map_err(|e| BuildError::Spawn(format!("{}: {e}", self.compiler)))?;

        let mut combined = String::from_utf8_lossy(&result.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&result.stderr));

        if result.status.success() {
            Ok(combined)
        } else {
            warn!(status = %result.status, "Build failed");
            Err(BuildError::Failed {
                status: result.status.to_string(),
                output: combined,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_compiler_is_spawn_error() {
        let builder = GoBuilder::new("genie-no-such-compiler");
        let err = builder
            .build(Path::new("a.go"), Path::new("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Spawn(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_build_failure() {
        let builder = GoBuilder::new("false");
        let err = builder
            .build(Path::new("a.go"), Path::new("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_success() {
        let builder = GoBuilder::new("true");
        assert!(builder.build(Path::new("a.go"), Path::new("a")).await.is_ok());
    }
}
