//! Multi-turn sessions on top of the pipeline.

use crate::memory::{ConversationMemory, Role};
use crate::pipeline::{RunResult, TestAgent};
use std::sync::Arc;

/// Help shown by interactive front ends.
pub const HELP: &str = "\
Commands:
  exit, quit   leave the session
  help         show this help

Example requests:
  点击登录按钮
  click (100,200)
  输入\"Hello World\"
  验证页面是否存在\"主页\"文字
  验证是否存在图片\"logo.png\"
  启动应用\"com.example.app\"
  等待5秒
  滑动屏幕

Capability modules:
  motion   touch input (click, swipe, keys)
  uiacc    UI control lookup and actions
  opencv   image template matching
  ppocr    OCR text recognition
  images   screen capture
  app      application lifecycle
  ime      input method text entry
  utils    helpers (sleep)
";

/// A conversation: memory plus a shared agent.
pub struct DialogueSession {
    agent: Arc<TestAgent>,
    memory: ConversationMemory,
}

impl DialogueSession {
    /// Memory capacity comes from the agent's `memory_turns` setting.
    pub fn new(agent: Arc<TestAgent>) -> Self {
        let capacity = agent.options().memory_turns;
        Self {
            agent,
            memory: ConversationMemory::new(capacity),
        }
    }

    /// Record the request, run it with the conversation so far, and record
    /// the outcome as the assistant turn.
    pub async fn ask(&mut self, query: &str) -> RunResult {
        self.memory.append(Role::User, query);
        let result = self
            .agent
            .process(query, &self.memory.render_context())
            .await;

        let report = result
            .report_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.memory.append(
            Role::Assistant,
            &format!("status: {}, report: {report}", result.success),
        );
        result
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn agent(&self) -> &Arc<TestAgent> {
        &self.agent
    }
}
