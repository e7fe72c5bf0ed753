//! The update-loop engine.
//!
//! Everything here runs synchronously inside the host's update callback: scan the visible
//! viewport, tokenize each region, pair brackets against the cursor, and hand back
//! annotations. Compile results arrive on their own cadence and are applied through
//! [`OverlayEngine::apply_compile_outcome`], which revalidates the region identity against
//! the *current* active region before anything is displayed - a batch computed against a
//! region that no longer owns the cursor is silently discarded.
//!
//! There is no shared-state locking: the engine is single-threaded by contract, and the
//! displayed-diagnostics slot is last-write-wins.

use crate::active::{ActiveRegion, ActiveRegionTracker};
use crate::annotation::{Annotation, AnnotationClass, AnnotationLayerId};
use crate::bracket::resolve;
use crate::diagnostic::{
    LineReport, MappedDiagnostic, RawDiagnostic, aggregate_by_line, map_diagnostics,
};
use crate::host::DocumentHost;
use crate::processor::ProcessorConfig;
use crate::region::{Region, RegionScanner};
use crate::token::tokenize;
use log::debug;
use typlay_lang::LanguageConfig;

/// A compile result plus the region identity and processor it was computed against.
///
/// The identity travels with the result precisely so the consumer can refuse it later:
/// never trust a region reference captured before a suspend point.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// The region the compile was issued for.
    pub region: ActiveRegion,
    /// The processor whose template/preamble built the compiled unit.
    pub processor: ProcessorConfig,
    /// Diagnostics in compiled-unit offsets.
    pub diagnostics: Vec<RawDiagnostic>,
}

/// The currently displayed diagnostics, in document space.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsView {
    /// The region the diagnostics belong to.
    pub region: Option<ActiveRegion>,
    /// Mapped diagnostics, filtered to the region.
    pub mapped: Vec<MappedDiagnostic>,
    /// Per-line aggregation of `mapped`.
    pub lines: Vec<LineReport>,
}

/// The overlay engine: viewport scanning, per-region analysis, and diagnostic display
/// state for one host view.
#[derive(Debug, Default)]
pub struct OverlayEngine {
    scanner: RegionScanner,
    tracker: ActiveRegionTracker,
    displayed: DiagnosticsView,
}

impl OverlayEngine {
    /// Create an engine for the given language configuration.
    pub fn new(config: LanguageConfig) -> Self {
        Self {
            scanner: RegionScanner::new(config),
            tracker: ActiveRegionTracker::new(),
            displayed: DiagnosticsView::default(),
        }
    }

    /// The current active region, read through the tracker at call time.
    pub fn active_region(&self) -> Option<ActiveRegion> {
        self.tracker.current()
    }

    /// The currently displayed diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticsView {
        &self.displayed
    }

    /// Explicit reset signal: clears the active region and displayed diagnostics.
    pub fn reset(&mut self) {
        self.tracker.deactivate();
        self.displayed = DiagnosticsView::default();
    }

    /// Run one synchronous update cycle against the host.
    ///
    /// Returns the syntax and bracket annotations for the visible viewport, and updates
    /// the active-region slot from the cursor. A failing host callback degrades the whole
    /// cycle to "no annotations" rather than propagating.
    pub fn refresh<H: DocumentHost>(&mut self, host: &H) -> Vec<Annotation> {
        let (text, cursor, viewport) = match (host.text(), host.cursor(), host.viewport()) {
            (Ok(text), Ok(cursor), Ok(viewport)) => (text, cursor, viewport),
            (text, cursor, viewport) => {
                let err = [
                    text.err().map(|e| e.to_string()),
                    cursor.err().map(|e| e.to_string()),
                    viewport.err().map(|e| e.to_string()),
                ]
                .into_iter()
                .flatten()
                .next()
                .unwrap_or_default();
                debug!("host callback failed, skipping update cycle: {err}");
                return Vec::new();
            }
        };
        let hints = match host.syntax_hints(viewport.from, viewport.to) {
            Ok(hints) => hints,
            Err(err) => {
                debug!("host hint lookup failed, skipping update cycle: {err}");
                return Vec::new();
            }
        };

        let regions = self.scanner.scan(text, &hints, viewport);
        let mut annotations = Vec::new();
        let mut cursor_region: Option<Region> = None;

        for region in &regions {
            let body = char_slice(text, region.from, region.to);
            let tokens = tokenize(&body, self.scanner.config());

            for token in &tokens {
                if let Some(class) = AnnotationClass::from_token_kind(token.kind) {
                    annotations.push(Annotation::range(
                        region.from + token.from,
                        region.from + token.to,
                        AnnotationLayerId::SYNTAX,
                        class,
                    ));
                }
            }

            if region.contains_cursor(cursor) {
                cursor_region = Some(*region);
                let relative = cursor - region.from;
                let resolution = resolve(&tokens, Some(relative));
                if let Some(pair) = resolution.enclosing {
                    for offset in [pair.open, pair.close] {
                        annotations.push(Annotation::range(
                            region.from + offset,
                            region.from + offset + 1,
                            AnnotationLayerId::BRACKETS,
                            AnnotationClass::MatchedBracket,
                        ));
                    }
                }
            }
        }

        match cursor_region {
            Some(region) => self.tracker.activate(region.kind, region.from, region.to),
            None => self.tracker.deactivate(),
        }

        annotations
    }

    /// Apply an asynchronous compile outcome.
    ///
    /// The outcome's region identity is checked against the current active region; a
    /// mismatch means the result is stale (the document or selection moved on while the
    /// compile was in flight) and it is silently discarded. On a match, the displayed
    /// diagnostics slot is overwritten - last write wins.
    ///
    /// Returns `true` when the outcome was applied.
    pub fn apply_compile_outcome<H: DocumentHost>(
        &mut self,
        host: &H,
        outcome: CompileOutcome,
    ) -> bool {
        let Some(current) = self.tracker.current() else {
            debug!("discarding compile outcome: no active region");
            return false;
        };
        if current != outcome.region {
            debug!(
                "discarding stale compile outcome for {:?} (current {:?})",
                outcome.region, current
            );
            return false;
        }
        let text = match host.text() {
            Ok(text) => text,
            Err(err) => {
                debug!("host text unavailable, dropping compile outcome: {err}");
                return false;
            }
        };

        let mapped = map_diagnostics(&outcome.diagnostics, &outcome.processor, current);
        let lines = aggregate_by_line(&mapped, text);
        self.displayed = DiagnosticsView {
            region: Some(current),
            mapped,
            lines,
        };
        true
    }

    /// Diagnostic underline annotations for the displayed diagnostics.
    pub fn diagnostic_annotations(&self) -> Vec<Annotation> {
        self.displayed
            .mapped
            .iter()
            .map(|diagnostic| {
                let mut annotation = Annotation::range(
                    diagnostic.from,
                    diagnostic.to,
                    AnnotationLayerId::DIAGNOSTICS,
                    AnnotationClass::from_severity(diagnostic.severity),
                );
                annotation.message = Some(diagnostic.message.clone());
                annotation.hints = diagnostic.hints.clone();
                annotation
            })
            .collect()
    }
}

/// Slice `[from, to)` out of `text` by character offsets.
fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars()
        .skip(from)
        .take(to.saturating_sub(from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_slice_clamps() {
        assert_eq!(char_slice("abcdef", 2, 4), "cd");
        assert_eq!(char_slice("abc", 2, 100), "c");
        assert_eq!(char_slice("abc", 5, 2), "");
    }
}
