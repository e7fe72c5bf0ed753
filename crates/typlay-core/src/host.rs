//! The document-host seam.
//!
//! The overlay engine is headless: it never owns the document. A host editor supplies
//! read-only text, the cursor, the visible viewport, and (optionally) a flat list of
//! structural hints from its own syntax tree. Everything the host hands back is allowed to
//! fail - a view can be torn down in the middle of an update - so every callback returns a
//! [`Result`] and the engine treats an error as "no result this cycle" rather than a crash.

use thiserror::Error;

/// Errors surfaced by host callbacks.
///
/// These are never fatal to the update loop; the engine logs them and skips the cycle.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host view was torn down while the update was running.
    #[error("host view is gone")]
    ViewGone,
    /// A host callback failed for a host-specific reason.
    #[error("host callback failed: {0}")]
    Callback(String),
}

/// The visible character-offset window of the host view (half-open is not assumed; the
/// bounds are treated inclusively when clamping to line boundaries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible character offset.
    pub from: usize,
    /// Last visible character offset.
    pub to: usize,
}

impl Viewport {
    /// Create a viewport from a pair of character offsets.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// A structural hint from the host's own syntax tree: a named node span.
///
/// Hint names are host vocabulary (e.g. `"inline-math"`, `"HyperMD-codeblock"`); the
/// scanner only pattern-matches on well-known markers inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxHint {
    /// Node start, in document character offsets.
    pub from: usize,
    /// Node end (exclusive), in document character offsets.
    pub to: usize,
    /// The host-side node name.
    pub name: String,
}

impl SyntaxHint {
    /// Create a hint span.
    pub fn new(from: usize, to: usize, name: impl Into<String>) -> Self {
        Self {
            from,
            to,
            name: name.into(),
        }
    }

    /// Returns `true` if the node name marks a math-like span.
    pub fn names_math(&self) -> bool {
        self.name.to_ascii_lowercase().contains("math")
    }

    /// Returns `true` if the node name marks a fenced code-block line.
    pub fn names_code_block(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        name.contains("codeblock") || name.contains("code-block") || name.contains("code_block")
    }
}

/// Read-only access to the host editor's document state.
///
/// All offsets are character offsets (Unicode scalar values) from the start of the document.
pub trait DocumentHost {
    /// The full document text.
    fn text(&self) -> Result<&str, HostError>;

    /// The primary cursor offset.
    fn cursor(&self) -> Result<usize, HostError>;

    /// The currently visible offset window.
    fn viewport(&self) -> Result<Viewport, HostError>;

    /// Structural hints overlapping `[from, to]`, in document order.
    ///
    /// Hosts without a syntax tree return an empty list.
    fn syntax_hints(&self, from: usize, to: usize) -> Result<Vec<SyntaxHint>, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_name_markers() {
        assert!(SyntaxHint::new(0, 1, "inline-math").names_math());
        assert!(SyntaxHint::new(0, 1, "formatting-math-begin").names_math());
        assert!(SyntaxHint::new(0, 1, "HyperMD-codeblock").names_code_block());
        assert!(!SyntaxHint::new(0, 1, "strong").names_math());
        assert!(!SyntaxHint::new(0, 1, "strong").names_code_block());
    }
}
