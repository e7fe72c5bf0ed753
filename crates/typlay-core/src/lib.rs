#![warn(missing_docs)]
//! Typlay Core - Live Syntax Awareness for Embedded Markup Regions
//!
//! # Overview
//!
//! `typlay-core` overlays live syntax awareness onto a host document containing embedded
//! Typst-flavored regions: inline math spans and fenced code blocks. It is headless - the
//! host editor supplies text, cursor, viewport, and optional syntax-tree hints, and
//! receives annotations addressed by character-offset ranges. Nothing is persisted;
//! every structure is recomputed per host event.
//!
//! # Core Features
//!
//! - **Region detection**: viewport-scoped scan for math spans and allow-listed fenced
//!   blocks, merged and non-overlapping
//! - **Tokenization**: a fast single-pass classifier (comments, strings, raw spans,
//!   keywords, brackets) with deliberate, documented approximations
//! - **Bracket pairing**: stack-based matching tolerant of mismatched families, plus
//!   nearest-enclosing-pair selection at the cursor
//! - **Diagnostic mapping**: translation of compiled-unit positions back into document
//!   offsets, with boilerplate filtering and per-line aggregation
//! - **Stale-result rejection**: compile outcomes carry the region identity they were
//!   computed against and are revalidated at consumption time
//!
//! # Data Flow
//!
//! ```text
//! host event ──▶ RegionScanner ──▶ tokenize ──▶ resolve (+cursor) ──▶ annotations
//!                                                  │
//! compile outcome (async) ──▶ identity check ──▶ map_diagnostics ──▶ aggregate_by_line
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use typlay_core::{tokenize, resolve};
//! use typlay_lang::LanguageConfig;
//!
//! let config = LanguageConfig::typst_markdown();
//! let tokens = tokenize("#let x = f(g[h])", &config);
//! let resolution = resolve(&tokens, Some(12));
//! assert!(resolution.enclosing.is_some());
//! ```
//!
//! # Module Description
//!
//! - [`region`] - viewport-scoped region detection
//! - [`token`] - the single-pass tokenizer
//! - [`bracket`] - bracket pairing and enclosing-pair selection
//! - [`diagnostic`] - diagnostic remapping and per-line aggregation
//! - [`active`] - the single active-region slot
//! - [`annotation`] - the outbound annotation model
//! - [`host`] - the document-host seam
//! - [`processor`] - processor template/preamble metadata
//! - [`engine`] - the synchronous update loop tying it all together

pub mod active;
pub mod annotation;
pub mod bracket;
pub mod diagnostic;
pub mod engine;
pub mod host;
pub mod processor;
pub mod region;
pub mod token;

pub use active::{ActiveRegion, ActiveRegionTracker};
pub use annotation::{Annotation, AnnotationClass, AnnotationLayerId};
pub use bracket::{BracketPairs, EnclosingPair, Resolution, resolve};
pub use diagnostic::{
    LineReport, MappedDiagnostic, RawDiagnostic, Severity, aggregate_by_line, map_diagnostics,
};
pub use engine::{CompileOutcome, DiagnosticsView, OverlayEngine};
pub use host::{DocumentHost, HostError, SyntaxHint, Viewport};
pub use processor::{CODE_PLACEHOLDER, ProcessorConfig};
pub use region::{Region, RegionKind, RegionScanner};
pub use token::{Token, TokenKind, tokenize};
