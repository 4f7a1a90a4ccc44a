//! The Genie request pipeline.
//!
//! A free-text test request flows through:
//!
//! 1. **Intent** — rule-based parsing into action / target / value
//! 2. **Synthesis** — catalog context + LLM or template code generation
//! 3. **Build** — the generated program is written to the workspace and compiled
//! 4. **Execute** — optionally pushed to and run on a connected device
//! 5. **Report** — a JSON record of the run is written to the report directory
//!
//! [`TestAgent::process`] never fails; every stage error ends up in the
//! returned [`RunResult`]. [`DialogueSession`] adds bounded conversation
//! memory on top.

pub mod build;
pub mod dialogue;
pub mod executor;
pub mod intent;
pub mod memory;
pub mod pipeline;
pub mod report;
pub mod synth;

pub use build::{Builder, GoBuilder};
pub use dialogue::DialogueSession;
pub use executor::{AdbBridge, CommandOutput, DeviceBridge, RemoteExecutor};
pub use intent::IntentParser;
pub use memory::{ConversationMemory, ConversationTurn, Role};
pub use pipeline::{GeneratedArtifact, RunResult, StageError, TestAgent, BUILD_SUCCESS_MESSAGE};
pub use report::RunReport;
pub use synth::{LlmStrategy, Synthesis, SynthesisRequest, SynthesisStrategy, Synthesizer, TemplateStrategy};
