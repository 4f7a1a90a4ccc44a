//! Capability catalog for Genie.
//!
//! A SQLite-backed store of capability descriptors with:
//! - ranked keyword search (substring match, fixed field priority)
//! - vector search (cosine similarity over lazily computed embeddings)
//! - retrieval-context rendering for code synthesis

pub mod context;
pub mod seed;
pub mod sqlite;
pub mod vector;

pub use context::render_context;
pub use seed::default_capabilities;
pub use sqlite::CapabilityCatalog;
pub use vector::{cosine_similarity, rank_by_similarity};
