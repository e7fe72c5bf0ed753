//! Region detection.
//!
//! Walks the visible part of a document and emits the ordered, non-overlapping spans that
//! deserve live awareness: inline math-like spans (from host structural hints) and fenced
//! code blocks whose language tag is on the configured allow-list. Scanning is a pure
//! function of its inputs and is re-run from scratch on every relevant host event, bounded
//! to the viewport so per-event cost tracks visible text rather than document size.

use crate::host::{SyntaxHint, Viewport};
use regex::Regex;
use ropey::Rope;
use typlay_lang::LanguageConfig;

/// Which flavor of embedded region a span is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    /// An inline math-like span (delimiters included).
    Math,
    /// The body of a fenced code block (fence lines excluded).
    Code,
}

/// A detected embedded region, in document character offsets.
///
/// Regions are ordered by `from` and never overlap; two regions of the same kind within
/// one character of each other are merged during scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Start offset (inclusive).
    pub from: usize,
    /// End offset (exclusive).
    pub to: usize,
    /// The region flavor.
    pub kind: RegionKind,
}

impl Region {
    /// Create a region span.
    pub fn new(from: usize, to: usize, kind: RegionKind) -> Self {
        Self { from, to, kind }
    }

    /// Returns `true` if a cursor at `offset` is considered inside this region.
    ///
    /// Both boundaries count as inside so a caret sitting on a closing delimiter still
    /// owns the region.
    pub fn contains_cursor(&self, offset: usize) -> bool {
        self.from <= offset && offset <= self.to
    }

    /// Region length in characters.
    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// Returns `true` for a zero-length region (e.g. an empty fenced block).
    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }
}

/// Viewport-scoped region scanner.
///
/// Holds the compiled fence-header patterns and the language allow-list, so repeated scans
/// pay no per-event regex compilation.
#[derive(Debug, Clone)]
pub struct RegionScanner {
    config: LanguageConfig,
    fence_open: Regex,
    fence_close: Regex,
}

impl RegionScanner {
    /// Create a scanner for the given language configuration.
    pub fn new(config: LanguageConfig) -> Self {
        // Applied to trimmed line text, so no leading-whitespace handling here.
        let fence_open = Regex::new(r"^```\s*([A-Za-z0-9_+.#-]+)\s*$").expect("static pattern");
        let fence_close = Regex::new(r"^```\s*$").expect("static pattern");
        Self {
            config,
            fence_open,
            fence_close,
        }
    }

    /// The language configuration this scanner was built with.
    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    /// Scan the visible window of `text` and return ordered, non-overlapping regions.
    ///
    /// Fenced blocks are found by a line scan; math-like and code-block spans additionally
    /// come from `hints`. Regions fully outside the viewport are not scanned.
    pub fn scan(&self, text: &str, hints: &[SyntaxHint], viewport: Viewport) -> Vec<Region> {
        let rope = Rope::from_str(text);
        let mut regions = self.scan_fences(&rope, viewport);
        regions.extend(self.scan_hints(&rope, hints, viewport));
        normalize(regions)
    }

    /// Line scan for fenced blocks inside the viewport window.
    fn scan_fences(&self, rope: &Rope, viewport: Viewport) -> Vec<Region> {
        let len_chars = rope.len_chars();
        if len_chars == 0 {
            return Vec::new();
        }

        let first_line = rope.char_to_line(viewport.from.min(len_chars));
        let last_line = rope.char_to_line(viewport.to.min(len_chars));

        let mut regions = Vec::new();
        let mut open_body: Option<usize> = None;

        for line_idx in first_line..=last_line {
            let line_text = rope.line(line_idx).to_string();
            let trimmed = line_text.trim();

            if let Some(body_start) = open_body {
                if self.fence_close.is_match(trimmed) {
                    let close_start = rope.line_to_char(line_idx);
                    // The newline before the closing fence is not part of the body.
                    let body_end = close_start.saturating_sub(1).max(body_start);
                    regions.push(Region::new(body_start, body_end, RegionKind::Code));
                    open_body = None;
                }
            } else if let Some(caps) = self.fence_open.captures(trimmed) {
                if self.config.supports_fence_language(&caps[1]) {
                    let next = line_idx + 1;
                    let body_start = if next < rope.len_lines() {
                        rope.line_to_char(next)
                    } else {
                        len_chars
                    };
                    open_body = Some(body_start);
                }
            }
        }

        // A fence still open at the end of the window is clamped to the window.
        if let Some(body_start) = open_body {
            let window_end = if last_line + 1 < rope.len_lines() {
                rope.line_to_char(last_line + 1).saturating_sub(1)
            } else {
                len_chars
            };
            regions.push(Region::new(
                body_start,
                window_end.max(body_start),
                RegionKind::Code,
            ));
        }

        regions
    }

    /// Turn host structural hints into regions.
    fn scan_hints(&self, rope: &Rope, hints: &[SyntaxHint], viewport: Viewport) -> Vec<Region> {
        let mut math_spans = Vec::new();
        let mut code_spans = Vec::new();

        for hint in hints {
            if hint.to < viewport.from || hint.from > viewport.to {
                continue;
            }
            if hint.names_math() {
                math_spans.push((hint.from, hint.to));
            } else if hint.names_code_block() {
                code_spans.push((hint.from, hint.to));
            }
        }

        let mut regions: Vec<Region> = merge_spans(math_spans)
            .into_iter()
            .map(|(from, to)| Region::new(from, to, RegionKind::Math))
            .collect();

        // Code-block hints only become regions when the line preceding the hinted body
        // declares an allow-listed fence language. The header line itself stays outside.
        let len_chars = rope.len_chars();
        for (from, to) in merge_spans(code_spans) {
            let line = rope.char_to_line(from.min(len_chars));
            if line == 0 {
                continue;
            }
            let header = rope.line(line - 1).to_string();
            let Some(caps) = self.fence_open.captures(header.trim()) else {
                continue;
            };
            if self.config.supports_fence_language(&caps[1]) {
                regions.push(Region::new(from, to, RegionKind::Code));
            }
        }

        regions
    }
}

impl Default for RegionScanner {
    fn default() -> Self {
        Self::new(LanguageConfig::default())
    }
}

/// Merge overlapping or adjacent spans, with a one-character tolerance to absorb boundary
/// tokens the host reports as separate nodes.
fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (from, to) in spans {
        match merged.last_mut() {
            Some((_, prev_to)) if from <= prev_to.saturating_add(1) => {
                *prev_to = (*prev_to).max(to);
            }
            _ => merged.push((from, to)),
        }
    }
    merged
}

/// Sort regions, merge same-kind neighbors (one-character tolerance), and drop any later
/// region that would overlap an earlier one of a different kind.
fn normalize(mut regions: Vec<Region>) -> Vec<Region> {
    regions.sort_by_key(|r| (r.from, r.to));
    let mut out: Vec<Region> = Vec::with_capacity(regions.len());
    for region in regions {
        match out.last_mut() {
            Some(prev) if prev.kind == region.kind && region.from <= prev.to.saturating_add(1) => {
                prev.to = prev.to.max(region.to);
            }
            Some(prev) if region.from < prev.to => {
                // Cross-kind overlap: the earlier region wins.
            }
            _ => out.push(region),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> RegionScanner {
        RegionScanner::new(LanguageConfig::typst_markdown())
    }

    fn full_viewport(text: &str) -> Viewport {
        Viewport::new(0, text.chars().count())
    }

    #[test]
    fn test_fenced_block_on_allow_list() {
        let text = "intro\n```typ\n#set page(width: 10cm)\n```\noutro\n";
        let regions = scanner().scan(text, &[], full_viewport(text));

        assert_eq!(regions.len(), 1);
        let region = regions[0];
        assert_eq!(region.kind, RegionKind::Code);
        // Body is exactly the single line between the fences.
        let body: String = text
            .chars()
            .skip(region.from)
            .take(region.len())
            .collect();
        assert_eq!(body, "#set page(width: 10cm)");
    }

    #[test]
    fn test_fenced_block_not_on_allow_list() {
        let text = "```python\nprint('hi')\n```\n";
        let regions = scanner().scan(text, &[], full_viewport(text));
        assert!(regions.is_empty());
    }

    #[test]
    fn test_unterminated_fence_clamps_to_window() {
        let text = "```typ\nlet x = 1\nmore";
        let regions = scanner().scan(text, &[], full_viewport(text));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Code);
        assert_eq!(regions[0].to, text.chars().count());
    }

    #[test]
    fn test_empty_fenced_block() {
        let text = "```typ\n```\n";
        let regions = scanner().scan(text, &[], full_viewport(text));
        assert_eq!(regions.len(), 1);
        assert!(regions[0].is_empty());
    }

    #[test]
    fn test_math_hints_merge_with_tolerance() {
        let text = "abc $x^2$ def";
        let hints = vec![
            SyntaxHint::new(4, 5, "formatting-math-begin"),
            SyntaxHint::new(5, 8, "inline-math"),
            SyntaxHint::new(8, 9, "formatting-math-end"),
        ];
        let regions = scanner().scan(text, &hints, full_viewport(text));
        assert_eq!(regions, vec![Region::new(4, 9, RegionKind::Math)]);
    }

    #[test]
    fn test_code_hint_rechecks_preceding_fence_line() {
        let text = "```typ\nlet a = 1\n```\n";
        let body_from = 7; // first char of "let"
        let body_to = 16; // end of "let a = 1"
        let hints = vec![SyntaxHint::new(body_from, body_to, "HyperMD-codeblock")];
        let regions = scanner().scan(text, &hints, full_viewport(text));
        // The line scan and the hint agree, so they merge into one region.
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Code);
        assert_eq!(regions[0].from, body_from);

        let text2 = "```python\nprint(1)\n```\n";
        let hints2 = vec![SyntaxHint::new(10, 18, "HyperMD-codeblock")];
        let regions2 = scanner().scan(text2, &hints2, full_viewport(text2));
        assert!(regions2.is_empty());
    }

    #[test]
    fn test_viewport_excludes_far_regions() {
        let mut text = String::from("$a$\n");
        text.push_str(&"filler\n".repeat(50));
        text.push_str("```typ\nx\n```\n");

        let hints = vec![SyntaxHint::new(0, 3, "inline-math")];
        // Viewport covers only the top of the document.
        let regions = scanner().scan(&text, &hints, Viewport::new(0, 10));
        assert_eq!(regions, vec![Region::new(0, 3, RegionKind::Math)]);

        // Viewport covers only the bottom: the math hint is filtered, the fence appears.
        let total = text.chars().count();
        let regions = scanner().scan(&text, &hints, Viewport::new(total - 14, total));
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].kind, RegionKind::Code);
    }

    #[test]
    fn test_scan_is_ordered_and_non_overlapping() {
        let text = "$a$ mid\n```typ\nbody\n```\n$b$\n";
        let hints = vec![
            SyntaxHint::new(0, 3, "inline-math"),
            SyntaxHint::new(24, 27, "inline-math"),
        ];
        let regions = scanner().scan(text, &hints, full_viewport(text));
        assert_eq!(regions.len(), 3);
        for pair in regions.windows(2) {
            assert!(pair[0].to <= pair[1].from);
        }
    }
}
