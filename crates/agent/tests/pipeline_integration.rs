//! End-to-end tests for the request pipeline.
//!
//! The compiler and the device bridge are replaced with scripted fakes; the
//! catalog is a real SQLite database.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use genie_agent::{
    BUILD_SUCCESS_MESSAGE, Builder, CommandOutput, DeviceBridge, DialogueSession, RemoteExecutor,
    Role, RunReport, TestAgent,
};
use genie_catalog::CapabilityCatalog;
use genie_config::AppConfig;
use genie_core::Provider;
use genie_core::error::{BuildError, ProviderError};

// ── Fakes ────────────────────────────────────────────────────────────────

/// A compiler that succeeds or fails with fixed output.
struct StubBuilder {
    result: Result<String, String>,
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl StubBuilder {
    fn ok() -> Self {
        Self {
            result: Ok(String::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing(output: &str) -> Self {
        Self {
            result: Err(output.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Builder for StubBuilder {
    async fn build(&self, source: &Path, output: &Path) -> Result<String, BuildError> {
        self.calls
            .lock()
            .unwrap()
            .push((source.to_path_buf(), output.to_path_buf()));
        match &self.result {
            Ok(out) => Ok(out.clone()),
            Err(out) => Err(BuildError::Failed {
                status: "exit status: 1".into(),
                output: out.clone(),
            }),
        }
    }
}

/// A device whose `shell <bin>` step prints `PASS` or fails.
struct FakeDevice {
    fail_run: bool,
}

#[async_trait]
impl DeviceBridge for FakeDevice {
    async fn run(&self, args: &[&str]) -> std::io::Result<CommandOutput> {
        let is_run = args.len() == 2 && args[0] == "shell";
        if is_run && self.fail_run {
            return Ok(CommandOutput {
                success: false,
                status: "exit status: 3".into(),
                stdout: "partial\n".into(),
                stderr: "segfault\n".into(),
            });
        }
        Ok(CommandOutput {
            success: true,
            status: "exit status: 0".into(),
            stdout: if is_run { "PASS\n".into() } else { String::new() },
            stderr: String::new(),
        })
    }
}

/// An embedding backend that is always down.
struct DownEmbedder;

#[async_trait]
impl Provider for DownEmbedder {
    fn name(&self) -> &str {
        "down"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

/// A language model that always answers with the same program.
struct FixedModel(&'static str);

#[async_trait]
impl Provider for FixedModel {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok(self.0.to_string())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

struct Env {
    dir: tempfile::TempDir,
    config: AppConfig,
}

impl Env {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.agent.workspace_dir = dir.path().join("workspace");
        config.agent.report_dir = dir.path().join("workspace").join("reports");
        config.agent.use_llm = false;
        config.catalog.path = dir.path().join("kb.db").to_string_lossy().into_owned();
        Self { dir, config }
    }

    async fn agent(&self, builder: Arc<dyn Builder>) -> TestAgent {
        let catalog = CapabilityCatalog::open(&self.config.catalog.path)
            .await
            .unwrap();
        TestAgent::new(Arc::new(catalog), &self.config)
            .await
            .unwrap()
            .with_builder(builder)
    }
}

fn assert_consistent(result: &genie_agent::RunResult) {
    if result.success {
        assert!(result.error.is_empty(), "success with error: {}", result.error);
    } else {
        assert!(!result.error.is_empty(), "failure without error text");
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn click_login_button_end_to_end() {
    let env = Env::new();
    let builder = Arc::new(StubBuilder::ok());
    let agent = env.agent(builder.clone()).await;

    // the empty catalog was seeded on construction
    assert_eq!(agent.catalog().count().await.unwrap(), 21);

    let result = agent.process("点击登录按钮", "").await;
    assert_consistent(&result);
    assert!(result.success);
    assert!(result.output.contains(BUILD_SUCCESS_MESSAGE));
    assert!(result.code.contains("uiacc.New().Text(\"登录\").FindOnce()"));
    assert!(result.code.contains("obj.Click()"));

    let artifact = result.artifact.as_ref().unwrap();
    let on_disk = tokio::fs::read_to_string(&artifact.source_path).await.unwrap();
    assert_eq!(on_disk, result.code);
    assert_eq!(builder.calls.lock().unwrap()[0].0, artifact.source_path);

    let report_path = result.report_path.as_ref().unwrap();
    assert!(report_path.starts_with(&env.config.agent.report_dir));
    let report = RunReport::load(report_path).await.unwrap();
    assert!(report.success);
    assert_eq!(report.query, "点击登录按钮");
    assert!(!report.auto_executed);
}

#[tokio::test]
async fn back_to_back_runs_keep_separate_reports() {
    let env = Env::new();
    let agent = env.agent(Arc::new(StubBuilder::ok())).await;

    let first = agent.process("点击登录按钮", "").await;
    let second = agent.process("等待3秒", "").await;

    let first_path = first.report_path.as_ref().unwrap();
    let second_path = second.report_path.as_ref().unwrap();
    assert_ne!(first_path, second_path);
    assert_eq!(RunReport::load(first_path).await.unwrap().query, "点击登录按钮");
    assert_eq!(RunReport::load(second_path).await.unwrap().query, "等待3秒");

    let reports = std::fs::read_dir(&env.config.agent.report_dir).unwrap().count();
    assert_eq!(reports, 2);
}

#[tokio::test]
async fn wait_seconds_sleeps_instead_of_polling() {
    let env = Env::new();
    let agent = env.agent(Arc::new(StubBuilder::ok())).await;

    let result = agent.process("等待3秒", "").await;
    assert!(result.success);
    assert!(result.code.contains("utils.Sleep(3000)"));
    assert!(!result.code.contains("WaitFor"));
}

#[tokio::test]
async fn build_failure_keeps_code_and_compiler_output() {
    let env = Env::new();
    let agent = env.agent(Arc::new(StubBuilder::failing("syntax error"))).await;

    let result = agent.process("点击登录按钮", "").await;
    assert_consistent(&result);
    assert!(!result.success);
    assert!(result.error.contains("syntax error"));
    assert!(result.code.starts_with("package main"));

    let on_disk = tokio::fs::read_to_string(&result.artifact.as_ref().unwrap().source_path)
        .await
        .unwrap();
    assert_eq!(on_disk, result.code);

    let report = RunReport::load(result.report_path.as_ref().unwrap())
        .await
        .unwrap();
    assert!(!report.success);
    assert_eq!(report.compile_output, "syntax error");
    assert!(report.binary_path.is_none());
}

#[tokio::test]
async fn synthesis_failure_stops_before_persisting() {
    let env = Env::new();
    let builder = Arc::new(StubBuilder::ok());
    let catalog = CapabilityCatalog::open(&env.config.catalog.path)
        .await
        .unwrap()
        .with_embedder(Arc::new(DownEmbedder));
    let agent = TestAgent::new(Arc::new(catalog), &env.config)
        .await
        .unwrap()
        .with_builder(builder.clone());

    let result = agent.process("点击登录按钮", "").await;
    assert_consistent(&result);
    assert!(!result.success);
    assert!(result.error.starts_with("code generation failed"));
    assert!(result.code.is_empty());
    assert!(result.report_path.is_none());
    assert!(builder.calls.lock().unwrap().is_empty());
    assert!(!env.config.agent.workspace_dir.exists());
}

#[tokio::test]
async fn persist_failure_still_returns_code() {
    let mut env = Env::new();
    let blocker = env.dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    env.config.agent.workspace_dir = blocker.join("workspace");
    let builder = Arc::new(StubBuilder::ok());
    let agent = env.agent(builder.clone()).await;

    let result = agent.process("swipe", "").await;
    assert_consistent(&result);
    assert!(!result.success);
    assert!(result.error.contains("failed to save generated source"));
    assert!(result.code.contains("motion.Swipe("));
    assert!(builder.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn report_failure_is_silent() {
    let mut env = Env::new();
    let blocker = env.dir.path().join("reports-file");
    std::fs::write(&blocker, b"file").unwrap();
    env.config.agent.report_dir = blocker.join("reports");
    let agent = env.agent(Arc::new(StubBuilder::ok())).await;

    let result = agent.process("点击登录按钮", "").await;
    assert_consistent(&result);
    assert!(result.success);
    assert!(result.report_path.is_none());
}

#[tokio::test]
async fn auto_execute_returns_device_output() {
    let mut env = Env::new();
    env.config.agent.auto_execute = true;
    let agent = env
        .agent(Arc::new(StubBuilder::ok()))
        .await
        .with_executor(RemoteExecutor::new(
            Arc::new(FakeDevice { fail_run: false }),
            "/data/local/tmp",
        ));

    let result = agent.process("启动应用\"com.example.app\"", "").await;
    assert_consistent(&result);
    assert!(result.success);
    assert_eq!(result.output, "PASS\n");
    assert!(result.auto_executed);
}

#[tokio::test]
async fn auto_execute_failure_flips_success() {
    let mut env = Env::new();
    env.config.agent.auto_execute = true;
    let agent = env
        .agent(Arc::new(StubBuilder::ok()))
        .await
        .with_executor(RemoteExecutor::new(
            Arc::new(FakeDevice { fail_run: true }),
            "/data/local/tmp",
        ));

    let result = agent.process("点击登录按钮", "").await;
    assert_consistent(&result);
    assert!(!result.success);
    assert!(result.error.starts_with("remote execution run failed"));
    assert_eq!(result.output, "partial\nsegfault\n");

    let report = RunReport::load(result.report_path.as_ref().unwrap())
        .await
        .unwrap();
    assert!(report.auto_executed);
    assert!(!report.execution_error.is_empty());
}

#[tokio::test]
async fn llm_output_flows_through_the_pipeline() {
    let mut env = Env::new();
    env.config.agent.use_llm = true;
    let program = "package main\n\nfunc main() {}";
    let agent = env
        .agent(Arc::new(StubBuilder::ok()))
        .await
        .with_provider(Arc::new(FixedModel(program)));

    let result = agent.process("点击登录按钮", "").await;
    assert!(result.success);
    assert_eq!(result.code, program);
}

#[tokio::test]
async fn disabled_llm_ignores_provider() {
    let env = Env::new();
    let agent = env
        .agent(Arc::new(StubBuilder::ok()))
        .await
        .with_provider(Arc::new(FixedModel("package main")));

    let result = agent.process("等待3秒", "").await;
    assert!(result.code.contains("utils.Sleep(3000)"));
}

#[tokio::test]
async fn capabilities_lookup_uses_keyword_search() {
    let env = Env::new();
    let agent = env.agent(Arc::new(StubBuilder::ok())).await;
    let docs = agent.capabilities("Launch").await.unwrap();
    assert_eq!(docs[0].qualified_name(), "app.Launch");
    assert!(docs.len() <= 10);
}

#[tokio::test]
async fn dialogue_records_both_sides() {
    let env = Env::new();
    let agent = Arc::new(env.agent(Arc::new(StubBuilder::ok())).await);
    let mut session = DialogueSession::new(agent);

    let first = session.ask("点击登录按钮").await;
    assert!(first.success);
    session.ask("等待3秒").await;

    let turns: Vec<_> = session.memory().turns().collect();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0].role, Role::User);
    assert!(turns[1].text.starts_with("status: true, report: "));
    assert_eq!(session.memory().last_user_turn(), "等待3秒");
    assert!(session.memory().render_context().contains("[user] 点击登录按钮"));
}

#[tokio::test]
async fn dialogue_memory_is_bounded_by_config() {
    let mut env = Env::new();
    env.config.agent.memory_turns = 2;
    let agent = Arc::new(env.agent(Arc::new(StubBuilder::ok())).await);
    let mut session = DialogueSession::new(agent);

    session.ask("swipe").await;
    session.ask("wait").await;
    assert_eq!(session.memory().len(), 2);
    assert_eq!(session.memory().last_user_turn(), "wait");
}
