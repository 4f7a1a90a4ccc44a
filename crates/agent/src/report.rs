//! Run reports.
//!
//! One JSON file per run, named `report-YYYYMMDD-HHMMSS.json` from the run
//! timestamp. Runs that land in the same second get `-1`, `-2`, ... appended;
//! an existing report is never overwritten. Markdown is rendered on demand
//! and not persisted.

use chrono::{DateTime, Utc};
use genie_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Suffixes tried before giving up on a free report name.
const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub query: String,
    #[serde(default)]
    pub code_path: Option<PathBuf>,
    #[serde(default)]
    pub binary_path: Option<PathBuf>,
    #[serde(default)]
    pub compile_output: String,
    #[serde(default)]
    pub execution_output: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub execution_error: String,
    pub success: bool,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub auto_executed: bool,
}

impl RunReport {
    pub fn new(query: impl Into<String>, auto_executed: bool) -> Self {
        Self {
            query: query.into(),
            code_path: None,
            binary_path: None,
            compile_output: String::new(),
            execution_output: String::new(),
            execution_error: String::new(),
            success: false,
            duration_ms: 0,
            timestamp: Utc::now(),
            auto_executed,
        }
    }

    pub fn file_name(&self) -> String {
        self.candidate_name(0)
    }

    fn candidate_name(&self, attempt: usize) -> String {
        let stem = self.timestamp.format("%Y%m%d-%H%M%S");
        if attempt == 0 {
            format!("report-{stem}.json")
        } else {
            format!("report-{stem}-{attempt}.json")
        }
    }

    /// Write the report under `dir` (created if needed) and return its path.
    ///
    /// The file is created exclusively; a taken name moves on to the next
    /// numeric suffix.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let data = serde_json::to_vec_pretty(self)?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = dir.join(self.candidate_name(attempt));
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };
            file.write_all(&data).await?;
            file.flush().await?;
            debug!(path = %path.display(), "Report saved");
            return Ok(path);
        }

        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free report name for {}", self.file_name()),
        )
        .into())
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Test Report\n\n");
        let _ = writeln!(md, "- Time: {}", self.timestamp.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(md, "- Query: {}", self.query);
        let _ = writeln!(md, "- Duration: {} ms", self.duration_ms);
        let _ = writeln!(
            md,
            "- Result: {}\n",
            if self.success { "PASS" } else { "FAIL" }
        );

        if let Some(path) = &self.code_path {
            let _ = writeln!(md, "**Source file**: `{}`\n", path.display());
        }
        if let Some(path) = &self.binary_path {
            let _ = writeln!(md, "**Binary**: `{}`\n", path.display());
        }
        for (title, body) in [
            ("Compiler output", &self.compile_output),
            ("Execution output", &self.execution_output),
            ("Error", &self.execution_error),
        ] {
            if !body.is_empty() {
                let _ = write!(md, "## {title}\n```\n{body}\n```\n\n");
            }
        }
        md
    }
}
