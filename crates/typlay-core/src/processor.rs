//! Processor templates.
//!
//! A processor describes how region text is wrapped into a compilable unit: a format
//! template with a substitution placeholder, plus an optional shared preamble prepended
//! with a joining newline. Processors arrive from host settings as plain data; this crate
//! only reads them.

use serde::{Deserialize, Serialize};

/// The substitution placeholder inside a processor's format template.
pub const CODE_PLACEHOLDER: &str = "{CODE}";

/// Template/preamble metadata for one processor, as configured by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Stable identifier used to address this processor from the host.
    pub id: String,
    /// Format template containing [`CODE_PLACEHOLDER`] where region text is substituted.
    pub format: String,
    /// Shared preamble text prepended to the unit (unless [`Self::no_preamble`]).
    #[serde(default)]
    pub preamble: String,
    /// When `true`, the unit is the substituted template alone.
    #[serde(default)]
    pub no_preamble: bool,
}

impl ProcessorConfig {
    /// Create a processor with a preamble.
    pub fn new(
        id: impl Into<String>,
        format: impl Into<String>,
        preamble: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
            preamble: preamble.into(),
            no_preamble: false,
        }
    }

    /// Create a processor that compiles the substituted template alone.
    pub fn without_preamble(id: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
            preamble: String::new(),
            no_preamble: true,
        }
    }

    /// Preamble length in characters.
    pub fn preamble_len(&self) -> usize {
        self.preamble.chars().count()
    }

    /// Character index of the first placeholder occurrence in the template.
    ///
    /// A template without a placeholder behaves as if the placeholder sat at index 0.
    pub fn placeholder_index(&self) -> usize {
        match self.format.find(CODE_PLACEHOLDER) {
            Some(byte_idx) => self.format[..byte_idx].chars().count(),
            None => 0,
        }
    }

    /// Characters preceding the template inside the compiled unit: the preamble plus the
    /// joining newline, or nothing when the preamble is opted out.
    pub fn prefix_len(&self) -> usize {
        if self.no_preamble {
            0
        } else {
            self.preamble_len() + 1
        }
    }

    /// Build the compiled unit for `code`: the template with the first placeholder
    /// substituted, preceded by `preamble + "\n"` unless opted out.
    pub fn compile_unit(&self, code: &str) -> String {
        let body = self.format.replacen(CODE_PLACEHOLDER, code, 1);
        if self.no_preamble {
            body
        } else {
            format!("{}\n{}", self.preamble, body)
        }
    }
}
