//! Diagnostic position remapping and per-line aggregation.
//!
//! Compilers report positions against the *compiled unit* - preamble, joining newline, and
//! the processor template with the region text substituted in. This module translates
//! those positions back into document offsets, drops everything that lands in boilerplate
//! rather than user-authored text, and folds the survivors into per-line reports for
//! line-level decoration consumers.

use crate::active::ActiveRegion;
use crate::processor::ProcessorConfig;
use crate::region::RegionKind;
use ropey::Rope;
use std::collections::BTreeMap;

/// Diagnostic severity. `Error` outranks `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// A warning.
    Warning,
    /// An error.
    Error,
}

/// A diagnostic as reported by the compiler, in compiled-unit character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    /// Range start in the compiled unit.
    pub from: usize,
    /// Range end (exclusive) in the compiled unit.
    pub to: usize,
    /// Severity.
    pub severity: Severity,
    /// Primary message.
    pub message: String,
    /// Secondary hint lines.
    pub hints: Vec<String>,
}

impl RawDiagnostic {
    /// Create a raw diagnostic without hints.
    pub fn new(from: usize, to: usize, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            from,
            to,
            severity,
            message: message.into(),
            hints: Vec::new(),
        }
    }

    /// Attach hint lines.
    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }
}

/// A diagnostic translated into document character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedDiagnostic {
    /// Range start in the document.
    pub from: usize,
    /// Range end (exclusive) in the document.
    pub to: usize,
    /// Severity.
    pub severity: Severity,
    /// Primary message.
    pub message: String,
    /// Secondary hint lines.
    pub hints: Vec<String>,
}

/// Translate compiled-unit diagnostics into document space for the active region.
///
/// The translation is `document = region_start + raw - prefix - placeholder_index`, where
/// the prefix covers the preamble and its joining newline (zero when the processor opts
/// out). Diagnostics whose translated range falls outside the active region belong to
/// boilerplate text and are dropped.
///
/// Fenced-block regions are exempt from diagnostic display and always map to an empty
/// result.
// TODO: map fenced-block diagnostics once compiled units for blocks carry their own
// per-line offset table (the inline template arithmetic below does not apply to them).
pub fn map_diagnostics(
    raw: &[RawDiagnostic],
    processor: &ProcessorConfig,
    active: ActiveRegion,
) -> Vec<MappedDiagnostic> {
    if active.kind == RegionKind::Code {
        return Vec::new();
    }

    let shift = processor.prefix_len() + processor.placeholder_index();
    let mut mapped = Vec::new();

    for diagnostic in raw {
        // Positions before the substitution point sit in the preamble or the template
        // head, not in user-authored text.
        let (Some(rel_from), Some(rel_to)) = (
            diagnostic.from.checked_sub(shift),
            diagnostic.to.checked_sub(shift),
        ) else {
            continue;
        };
        let from = active.from + rel_from;
        let to = active.from + rel_to;
        if to > active.to || from > to {
            continue;
        }
        mapped.push(MappedDiagnostic {
            from,
            to,
            severity: diagnostic.severity,
            message: diagnostic.message.clone(),
            hints: diagnostic.hints.clone(),
        });
    }

    mapped
}

/// One line's worth of aggregated diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReport {
    /// Zero-based document line number.
    pub line: usize,
    /// The strongest severity seen on the line.
    pub severity: Severity,
    /// The displayed message for the line.
    pub message: String,
    /// Accumulated hints.
    pub hints: Vec<String>,
}

/// Group mapped diagnostics by the document line containing their start offset.
///
/// Whitespace-only lines are skipped. When several diagnostics land on one line, an error
/// always beats a warning for the displayed message; a diagnostic of equal severity only
/// contributes its hints; a higher-severity diagnostic replaces the stored message and
/// hints outright.
pub fn aggregate_by_line(mapped: &[MappedDiagnostic], text: &str) -> Vec<LineReport> {
    let rope = Rope::from_str(text);
    let len_chars = rope.len_chars();
    let mut by_line: BTreeMap<usize, LineReport> = BTreeMap::new();

    for diagnostic in mapped {
        if diagnostic.from > len_chars {
            continue;
        }
        let line = rope.char_to_line(diagnostic.from);
        let line_text = rope.line(line).to_string();
        if line_text.trim().is_empty() {
            continue;
        }

        match by_line.get_mut(&line) {
            None => {
                by_line.insert(
                    line,
                    LineReport {
                        line,
                        severity: diagnostic.severity,
                        message: diagnostic.message.clone(),
                        hints: diagnostic.hints.clone(),
                    },
                );
            }
            Some(report) => {
                if diagnostic.severity > report.severity {
                    report.severity = diagnostic.severity;
                    report.message = diagnostic.message.clone();
                    report.hints = diagnostic.hints.clone();
                } else if diagnostic.severity == report.severity {
                    report.hints.extend(diagnostic.hints.iter().cloned());
                }
            }
        }
    }

    by_line.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math_region(from: usize, to: usize) -> ActiveRegion {
        ActiveRegion::new(RegionKind::Math, from, to)
    }

    #[test]
    fn test_offset_round_trip() {
        // preamble of 42 chars, template with placeholder at index 1: a compiled-unit
        // offset of 50 inside a region starting at 100 lands at 100 + 50 - 43 - 1 = 106.
        let processor = ProcessorConfig::new("math", "${CODE}$", "x".repeat(42));
        let raw = vec![RawDiagnostic::new(50, 52, Severity::Error, "bad")];
        let mapped = map_diagnostics(&raw, &processor, math_region(100, 130));
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].from, 106);
        assert_eq!(mapped[0].to, 108);
    }

    #[test]
    fn test_preamble_positions_are_dropped() {
        let processor = ProcessorConfig::new("math", "${CODE}$", "x".repeat(42));
        // Offset 10 sits inside the preamble; offset 43 sits on the template's `$`.
        let raw = vec![
            RawDiagnostic::new(10, 12, Severity::Error, "preamble"),
            RawDiagnostic::new(43, 44, Severity::Error, "template head"),
        ];
        let mapped = map_diagnostics(&raw, &processor, math_region(100, 130));
        assert!(mapped.is_empty());
    }

    #[test]
    fn test_positions_past_region_end_are_dropped() {
        let processor = ProcessorConfig::without_preamble("math", "${CODE}$");
        // shift = 1; region is 5 chars long.
        let raw = vec![RawDiagnostic::new(20, 25, Severity::Warning, "tail")];
        let mapped = map_diagnostics(&raw, &processor, math_region(100, 105));
        assert!(mapped.is_empty());
    }

    #[test]
    fn test_code_regions_never_surface_diagnostics() {
        let processor = ProcessorConfig::without_preamble("block", "{CODE}");
        let raw = vec![RawDiagnostic::new(0, 1, Severity::Error, "anything")];
        let active = ActiveRegion::new(RegionKind::Code, 10, 40);
        assert!(map_diagnostics(&raw, &processor, active).is_empty());
    }

    fn mapped(from: usize, severity: Severity, message: &str, hints: &[&str]) -> MappedDiagnostic {
        MappedDiagnostic {
            from,
            to: from + 1,
            severity,
            message: message.to_string(),
            hints: hints.iter().map(|h| h.to_string()).collect(),
        }
    }

    #[test]
    fn test_aggregation_error_beats_warning() {
        let text = "first line\nsecond line\n";
        let diags = vec![
            mapped(12, Severity::Warning, "w", &["warn hint"]),
            mapped(14, Severity::Error, "e", &["err hint"]),
            // A later warning on the same line must not disturb the stored error.
            mapped(16, Severity::Warning, "w2", &["late hint"]),
        ];
        let reports = aggregate_by_line(&diags, text);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].line, 1);
        assert_eq!(reports[0].severity, Severity::Error);
        assert_eq!(reports[0].message, "e");
        assert_eq!(reports[0].hints, vec!["err hint".to_string()]);
    }

    #[test]
    fn test_aggregation_equal_severity_accumulates_hints() {
        let text = "only line";
        let diags = vec![
            mapped(0, Severity::Warning, "first", &["a"]),
            mapped(3, Severity::Warning, "second", &["b", "c"]),
        ];
        let reports = aggregate_by_line(&diags, text);
        assert_eq!(reports.len(), 1);
        // The first message sticks; hints accumulate.
        assert_eq!(reports[0].message, "first");
        assert_eq!(
            reports[0].hints,
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_aggregation_skips_whitespace_lines() {
        let text = "code\n   \nmore\n";
        let diags = vec![
            mapped(5, Severity::Error, "on blank line", &[]),
            mapped(9, Severity::Warning, "on code line", &[]),
        ];
        let reports = aggregate_by_line(&diags, text);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].line, 2);
        assert_eq!(reports[0].message, "on code line");
    }
}
