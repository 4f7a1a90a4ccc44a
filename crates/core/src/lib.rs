//! # Genie Core
//!
//! Domain types, traits, and error definitions for the Genie test-automation
//! agent. This crate has **no framework dependencies**: it defines the
//! vocabulary every other crate speaks.
//!
//! ## Design Philosophy
//!
//! Collaborators the pipeline talks to (the LLM backend, the capability
//! store) are described here as plain types and traits. Implementations live
//! in their own crates so they can be swapped by configuration and replaced
//! by scripted stubs in tests.

pub mod capability;
pub mod error;
pub mod intent;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use capability::CapabilityDoc;
pub use error::{Error, Result};
pub use intent::{Action, Intent, Target};
pub use provider::Provider;
