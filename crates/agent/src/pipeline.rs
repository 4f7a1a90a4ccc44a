//! The request pipeline.
//!
//! `SYNTHESIZE → PERSIST_SOURCE → BUILD → EXECUTE_REMOTE? → PERSIST_REPORT`
//!
//! Each stage yields a `Result`; the first error short-circuits the rest and
//! is folded into the returned [`RunResult`]. Nothing unwinds past
//! [`TestAgent::process`]. The report is written for every run that produced
//! source text; a failure to write it only leaves `report_path` empty.

use crate::build::{Builder, GoBuilder};
use crate::executor::RemoteExecutor;
use crate::report::RunReport;
use crate::synth::{LlmStrategy, Synthesizer, TemplateStrategy};
use chrono::{DateTime, Utc};
use genie_catalog::CapabilityCatalog;
use genie_config::{AgentConfig, AppConfig};
use genie_core::error::{BuildError, CatalogError, ExecutorError};
use genie_core::{CapabilityDoc, Provider};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

/// Output reported when the build succeeds and nothing runs on a device.
pub const BUILD_SUCCESS_MESSAGE: &str = "Code generated and built successfully.";

/// Why a run stopped.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("code generation failed: {0}")]
    Synthesis(#[from] CatalogError),

    #[error("failed to save generated source to {path}: {source}")]
    PersistSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("remote execution {0}")]
    Execute(#[from] ExecutorError),
}

impl StageError {
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Synthesis(_) => "synthesize",
            StageError::PersistSource { .. } => "persist_source",
            StageError::Build(_) => "build",
            StageError::Execute(_) => "execute_remote",
        }
    }
}

/// The synthesized source and where it lives on disk.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    pub code: String,
    pub source_path: PathBuf,
    pub binary_path: PathBuf,
}

impl GeneratedArtifact {
    /// Paths get a nanosecond suffix so concurrent runs never collide.
    pub fn new(workspace: &Path, code: String) -> Self {
        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self {
            code,
            source_path: workspace.join(format!("generated_{stamp}.go")),
            binary_path: workspace.join(format!("test_binary_{stamp}")),
        }
    }
}

/// Outcome of one request. `error` is empty exactly when `success` is true.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub success: bool,
    pub code: String,
    pub output: String,
    pub error: String,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
    pub report_path: Option<PathBuf>,
    pub artifact: Option<GeneratedArtifact>,
    pub auto_executed: bool,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl RunResult {
    /// Human-readable summary for terminals.
    pub fn render(&self) -> String {
        let rule = "=".repeat(61);
        let thin = "-".repeat(61);
        let mut out = format!("{rule}\nAutomated test result\n{rule}\n\n");
        out.push_str(if self.success {
            "Status: SUCCESS\n"
        } else {
            "Status: FAILED\n"
        });
        out.push_str(&format!("Duration: {:?}\n", self.duration));
        out.push_str(&format!(
            "Time: {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Generated code:\n{thin}\n{}\n{thin}\n\n", self.code));
        if !self.output.is_empty() {
            out.push_str(&format!("Output:\n{}\n\n", self.output));
        }
        if !self.error.is_empty() {
            out.push_str(&format!("Error:\n{}\n\n", self.error));
        }
        if let Some(path) = &self.report_path {
            out.push_str(&format!("Report: {}\n\n", path.display()));
        }
        out.push_str(&rule);
        out.push('\n');
        out
    }
}

/// The orchestrator. Owns a handle to the shared catalog.
pub struct TestAgent {
    catalog: Arc<CapabilityCatalog>,
    synthesizer: Synthesizer,
    builder: Arc<dyn Builder>,
    executor: RemoteExecutor,
    options: AgentConfig,
}

impl TestAgent {
    /// Assemble an agent around `catalog`, seeding it when the defaults are
    /// missing. Synthesis is template-only until [`with_provider`] is called.
    ///
    /// [`with_provider`]: TestAgent::with_provider
    pub async fn new(
        catalog: Arc<CapabilityCatalog>,
        config: &AppConfig,
    ) -> Result<Self, CatalogError> {
        catalog.seed_defaults().await?;

        let mut options = config.agent.clone();
        options.normalize();

        Ok(Self {
            synthesizer: Synthesizer::new(
                catalog.clone(),
                TemplateStrategy::new(config.build.import_root.clone()),
            ),
            catalog,
            builder: Arc::new(GoBuilder::new(config.build.compiler.clone())),
            executor: RemoteExecutor::from_config(&config.executor),
            options,
        })
    }

    /// Open the configured catalog and backend and build a ready agent.
    pub async fn from_config(config: &AppConfig) -> genie_core::Result<Self> {
        let needs_backend = config.agent.use_llm || config.llm.embeddings;
        let provider = if needs_backend {
            Some(genie_providers::build_from_config(&config.llm)?)
        } else {
            None
        };

        let mut catalog = CapabilityCatalog::open(&config.catalog.path).await?;
        if config.llm.embeddings {
            catalog.set_embedder(provider.clone());
        }

        let agent = Self::new(Arc::new(catalog), config).await?;
        Ok(match provider {
            Some(provider) if config.agent.use_llm => agent.with_provider(provider),
            _ => agent,
        })
    }

    /// Try `provider` before the templates, if LLM use is enabled.
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        if self.options.use_llm {
            self.synthesizer = self
                .synthesizer
                .with_strategy(Arc::new(LlmStrategy::new(provider)));
        }
        self
    }

    pub fn with_builder(mut self, builder: Arc<dyn Builder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_executor(mut self, executor: RemoteExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn options(&self) -> &AgentConfig {
        &self.options
    }

    pub fn catalog(&self) -> &Arc<CapabilityCatalog> {
        &self.catalog
    }

    /// Keyword lookup over the catalog (top 10).
    pub async fn capabilities(&self, query: &str) -> Result<Vec<CapabilityDoc>, CatalogError> {
        self.catalog.search(query, 10).await
    }

    /// Run one request start to finish.
    pub async fn process(&self, query: &str, conversation: &str) -> RunResult {
        let started = Instant::now();
        let auto_executed = self.options.auto_execute;
        info!(query, "Processing request");

        let synthesis = match self.synthesizer.synthesize(query, conversation).await {
            Ok(synthesis) => synthesis,
            Err(e) => {
                let e = StageError::from(e);
                warn!(stage = e.stage(), error = %e, "Run failed");
                return RunResult {
                    success: false,
                    code: String::new(),
                    output: String::new(),
                    error: e.to_string(),
                    duration: started.elapsed(),
                    timestamp: Utc::now(),
                    report_path: None,
                    artifact: None,
                    auto_executed,
                };
            }
        };

        let artifact = GeneratedArtifact::new(&self.options.workspace_dir, synthesis.code);
        let mut report = RunReport::new(query, auto_executed);
        let outcome = self.run_stages(&artifact, &mut report).await;

        let (output, error) = match &outcome {
            Ok(output) => (output.clone(), String::new()),
            Err(e) => {
                warn!(stage = e.stage(), error = %e, "Run failed");
                let output = match e {
                    StageError::Execute(inner) => inner.output().to_string(),
                    _ => String::new(),
                };
                (output, e.to_string())
            }
        };

        report.success = outcome.is_ok();
        report.execution_output = output.clone();
        report.execution_error = error.clone();
        report.duration_ms = started.elapsed().as_millis() as u64;
        report.timestamp = Utc::now();

        let report_path = match report.save(&self.options.report_dir).await {
            Ok(path) => {
                info!(path = %path.display(), success = report.success, "Run complete");
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, "Failed to persist report");
                None
            }
        };

        RunResult {
            success: report.success,
            code: artifact.code.clone(),
            output,
            error,
            duration: started.elapsed(),
            timestamp: report.timestamp,
            report_path,
            artifact: Some(artifact),
            auto_executed,
        }
    }

    async fn run_stages(
        &self,
        artifact: &GeneratedArtifact,
        report: &mut RunReport,
    ) -> Result<String, StageError> {
        self.persist_source(artifact).await?;
        report.code_path = Some(artifact.source_path.clone());

        let compiled = self
            .builder
            .build(&artifact.source_path, &artifact.binary_path)
            .await;
        match compiled {
            Ok(output) => report.compile_output = output,
            Err(e) => {
                report.compile_output = e.output().to_string();
                return Err(e.into());
            }
        }
        report.binary_path = Some(artifact.binary_path.clone());

        if !self.options.auto_execute {
            return Ok(BUILD_SUCCESS_MESSAGE.to_string());
        }
        Ok(self.executor.execute(&artifact.binary_path).await?)
    }

    async fn persist_source(&self, artifact: &GeneratedArtifact) -> Result<(), StageError> {
        let to_stage_error = |source| StageError::PersistSource {
            path: artifact.source_path.clone(),
            source,
        };
        tokio::fs::create_dir_all(&self.options.workspace_dir)
            .await
            .map_err(to_stage_error)?;
        tokio::fs::write(&artifact.source_path, &artifact.code)
            .await
            .map_err(to_stage_error)
    }
}
