//! The outbound annotation model.
//!
//! Annotations are UI-facing marks anchored to document character offsets: syntax classes
//! over tokens, the matched-bracket highlight around the cursor, and diagnostic underlines.
//! The host owns rendering; this crate only addresses ranges and tags them with a class.

use crate::diagnostic::Severity;
use crate::token::TokenKind;

/// A source/layer identifier for annotations.
///
/// Layers let the host replace one source's marks (e.g. re-tokenized syntax) without
/// touching the others (e.g. asynchronously updated diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationLayerId(pub u32);

impl AnnotationLayerId {
    /// Token classes produced by the tokenizer.
    pub const SYNTAX: Self = Self(1);
    /// The matched-bracket highlight around the cursor.
    pub const BRACKETS: Self = Self(2);
    /// Diagnostic underlines and line messages.
    pub const DIAGNOSTICS: Self = Self(3);

    /// Create a layer id from a raw numeric identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// The visual class of an annotation, mapped by the host to concrete styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationClass {
    /// Comment text.
    Comment,
    /// String text.
    String,
    /// Raw/monospace text.
    Raw,
    /// Keyword text.
    Keyword,
    /// A bracket character.
    Bracket,
    /// A bracket participating in the enclosing pair at the cursor.
    MatchedBracket,
    /// An error underline.
    Error,
    /// A warning underline.
    Warning,
}

impl AnnotationClass {
    /// The CSS-like class tag the host attaches to the rendered range.
    pub fn class_tag(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::String => "string",
            Self::Raw => "raw",
            Self::Keyword => "keyword",
            Self::Bracket => "bracket",
            Self::MatchedBracket => "bracket-match",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }

    /// The syntax class for a token kind, or `None` for kinds that are never styled.
    pub fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Comment => Some(Self::Comment),
            TokenKind::String => Some(Self::String),
            TokenKind::Raw => Some(Self::Raw),
            TokenKind::Keyword => Some(Self::Keyword),
            TokenKind::Bracket => Some(Self::Bracket),
            TokenKind::Anchor | TokenKind::Plain => None,
        }
    }

    /// The underline class for a diagnostic severity.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Error => Self::Error,
            Severity::Warning => Self::Warning,
        }
    }
}

/// A single annotation addressed by a document-offset range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Range start (inclusive), in document character offsets.
    pub from: usize,
    /// Range end (exclusive), in document character offsets.
    pub to: usize,
    /// The layer this annotation belongs to.
    pub layer: AnnotationLayerId,
    /// The visual class.
    pub class: AnnotationClass,
    /// Optional hover message (diagnostics).
    pub message: Option<String>,
    /// Optional hover hint lines (diagnostics).
    pub hints: Vec<String>,
}

impl Annotation {
    /// Create a bare range annotation with no hover payload.
    pub fn range(from: usize, to: usize, layer: AnnotationLayerId, class: AnnotationClass) -> Self {
        Self {
            from,
            to,
            layer,
            class,
            message: None,
            hints: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_and_plain_are_never_styled() {
        assert_eq!(AnnotationClass::from_token_kind(TokenKind::Anchor), None);
        assert_eq!(AnnotationClass::from_token_kind(TokenKind::Plain), None);
        assert_eq!(
            AnnotationClass::from_token_kind(TokenKind::Keyword),
            Some(AnnotationClass::Keyword)
        );
    }

    #[test]
    fn test_class_tags_are_stable() {
        assert_eq!(AnnotationClass::MatchedBracket.class_tag(), "bracket-match");
        assert_eq!(
            AnnotationClass::from_severity(Severity::Error).class_tag(),
            "error"
        );
    }
}
