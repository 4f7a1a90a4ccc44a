//! Remote execution on a connected device.
//!
//! The sequence is push → chmod → run. Each step is checked before the next
//! one starts; the first failure aborts with that step's captured output.

use async_trait::async_trait;
use genie_config::ExecutorConfig;
use genie_core::error::ExecutorError;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Captured result of one bridge invocation.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit status as reported by the OS
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// A command-line path to the device (adb, or a fake in tests).
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    async fn run(&self, args: &[&str]) -> std::io::Result<CommandOutput>;
}

/// Android Debug Bridge.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    adb_path: String,
}

impl AdbBridge {
    pub fn new(adb_path: impl Into<String>) -> Self {
        let adb_path = adb_path.into();
        Self {
            adb_path: if adb_path.is_empty() {
                "adb".into()
            } else {
                adb_path
            },
        }
    }
}

#[async_trait]
impl DeviceBridge for AdbBridge {
    async fn run(&self, args: &[&str]) -> std::io::Result<CommandOutput> {
        debug!(adb = %self.adb_path, ?args, "Device command");
        let output = Command::new(&self.adb_path).args(args).output().await?;
        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Transfer,
    Permission,
    Run,
}

impl Step {
    fn error(self, output: String, reason: String) -> ExecutorError {
        match self {
            Step::Transfer => ExecutorError::TransferFailed { output, reason },
            Step::Permission => ExecutorError::PermissionFailed { output, reason },
            Step::Run => ExecutorError::RunFailed { output, reason },
        }
    }
}

pub struct RemoteExecutor {
    bridge: Arc<dyn DeviceBridge>,
    remote_dir: String,
}

impl RemoteExecutor {
    pub fn new(bridge: Arc<dyn DeviceBridge>, remote_dir: impl Into<String>) -> Self {
        let remote_dir = remote_dir.into();
        Self {
            bridge,
            remote_dir: if remote_dir.is_empty() {
                "/data/local/tmp".into()
            } else {
                remote_dir
            },
        }
    }

    /// An adb-backed executor from configuration.
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self::new(
            Arc::new(AdbBridge::new(config.adb_path.clone())),
            config.remote_dir.clone(),
        )
    }

    /// Device path the artifact is pushed to.
    pub fn remote_path(&self, local: &Path) -> String {
        let name = local
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/{name}", self.remote_dir.trim_end_matches('/'))
    }

    /// Push, mark executable, and run `local`; returns the program's stdout.
    pub async fn execute(&self, local: &Path) -> Result<String, ExecutorError> {
        let remote = self.remote_path(local);
        let local_str = local.to_string_lossy().into_owned();
        let (local_str, remote) = (local_str.as_str(), remote.as_str());

        info!(remote = %remote, "Pushing artifact to device");
        self.step(Step::Transfer, &["push", local_str, remote]).await?;
        self.step(Step::Permission, &["shell", "chmod", "+x", remote]).await?;
        let run = self.step(Step::Run, &["shell", remote]).await?;

        info!("Remote run finished");
        Ok(run.stdout)
    }

    async fn step(&self, step: Step, args: &[&str]) -> Result<CommandOutput, ExecutorError> {
        let output = self
            .bridge
            .run(args)
            .await
            .map_err(|e| step.error(String::new(), e.to_string()))?;

        if output.success {
            Ok(output)
        } else {
            warn!(?step, status = %output.status, "Device step failed");
            let combined = output.combined();
            Err(step.error(combined, output.status))
        }
    }
}
