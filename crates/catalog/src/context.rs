//! Retrieval-context rendering.

use genie_core::CapabilityDoc;
use std::fmt::Write;

/// Header line of every rendered context block.
pub const CONTEXT_HEADER: &str = "Relevant API documentation:";

/// Render docs as the numbered list handed to the synthesizer.
pub fn render_context(docs: &[CapabilityDoc]) -> String {
    let mut out = String::new();
    out.push_str(CONTEXT_HEADER);
    out.push_str("\n\n");

    for (i, doc) in docs.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, doc.qualified_name());
        let _ = writeln!(out, "   Description: {}", doc.description);
        let _ = writeln!(out, "   Signature: {}", doc.signature);
        let _ = writeln!(out, "   Parameters: {}", doc.parameters);
        let _ = writeln!(out, "   Returns: {}", doc.return_spec);
        let _ = writeln!(out, "   Example: {}\n", doc.example);
    }

    out
}
