//! Approximate single-pass tokenizer for region text.
//!
//! This is deliberately a fast classifier, not a conformance-grade parser: one left-to-right
//! pass, fixed rule priority, no backtracking. Offsets are character offsets **relative to
//! the region start**. Emitted tokens are contiguous and non-overlapping; characters not
//! covered by any token are implicit plain text, so concatenating token texts together with
//! the gaps always reconstructs the input exactly.

use typlay_lang::{CURSOR_MARKER, INJECT_MARKER, LanguageConfig};

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `//` line comment or `/* */` block comment (nestable).
    Comment,
    /// Single- or double-quoted string, single line only.
    String,
    /// Backtick-delimited raw/monospace span, single line only.
    Raw,
    /// Keyword marker plus identifier (e.g. `#set`).
    Keyword,
    /// One of `( ) [ ] { }`, always a single character.
    Bracket,
    /// A reserved literal marker; recognized so it is never miscategorized, never styled.
    Anchor,
    /// Plain text. The tokenizer leaves plain runs implicit (as gaps); the variant exists
    /// for consumers that materialize them.
    Plain,
}

/// A classified span of region text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token classification.
    pub kind: TokenKind,
    /// Start offset (inclusive), in characters relative to the region start.
    pub from: usize,
    /// End offset (exclusive), in characters relative to the region start.
    pub to: usize,
    /// The covered text.
    pub text: String,
}

impl Token {
    fn from_chars(kind: TokenKind, chars: &[char], from: usize, to: usize) -> Self {
        Self {
            kind,
            from,
            to,
            text: chars[from..to].iter().collect(),
        }
    }
}

/// Tokenize region text in a single O(n) pass.
///
/// Rule priority at each position, first match wins:
/// line comment, block comment, raw span, quoted string, reserved marker, keyword,
/// bracket. Anything else advances one character as implicit plain text. Once a rule
/// starts consuming, it owns its characters to completion (or to the recovery point its
/// own rules define) - there is no backtracking across rules.
pub fn tokenize(text: &str, config: &LanguageConfig) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let markers: [Vec<char>; 2] = [
        CURSOR_MARKER.chars().collect(),
        INJECT_MARKER.chars().collect(),
    ];
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let c = chars[i];

        // Line comment: `//` through end of line, newline excluded.
        if c == '/' && peek(&chars, i + 1) == Some('/') {
            let mut j = i + 2;
            while j < len && chars[j] != '\n' {
                j += 1;
            }
            tokens.push(Token::from_chars(TokenKind::Comment, &chars, i, j));
            i = j;
            continue;
        }

        // Block comment: `/* */`, nestable; unterminated extends to end of input.
        if c == '/' && peek(&chars, i + 1) == Some('*') {
            let mut depth = 1usize;
            let mut j = i + 2;
            while j < len && depth > 0 {
                if chars[j] == '/' && peek(&chars, j + 1) == Some('*') {
                    depth += 1;
                    j += 2;
                } else if chars[j] == '*' && peek(&chars, j + 1) == Some('/') {
                    depth -= 1;
                    j += 2;
                } else {
                    j += 1;
                }
            }
            tokens.push(Token::from_chars(TokenKind::Comment, &chars, i, j.min(len)));
            i = j.min(len);
            continue;
        }

        // Raw span and quoted strings share the same single-line scan: a backslash escapes
        // the next character, and hitting a newline (or the end of input) before the
        // closing delimiter rejects the whole span - the opening delimiter reverts to
        // plain text and scanning resumes right after it.
        if c == '`' || c == '"' || c == '\'' {
            if let Some(end) = scan_single_line_span(&chars, i, c) {
                let kind = if c == '`' {
                    TokenKind::Raw
                } else {
                    TokenKind::String
                };
                tokens.push(Token::from_chars(kind, &chars, i, end));
                i = end;
            } else {
                i += 1;
            }
            continue;
        }

        // Reserved literal markers are recognized verbatim so they are never tokenized as
        // keyword or bracket text by the rules below.
        if let Some(width) = marker_width(&chars, i, &markers) {
            tokens.push(Token::from_chars(TokenKind::Anchor, &chars, i, i + width));
            i += width;
            continue;
        }

        // Keyword: marker character plus at least one identifier character. A lone marker
        // is plain text.
        if c == config.keyword_marker() {
            let mut j = i + 1;
            while j < len && LanguageConfig::is_keyword_char(chars[j]) {
                j += 1;
            }
            if j > i + 1 {
                tokens.push(Token::from_chars(TokenKind::Keyword, &chars, i, j));
                i = j;
                continue;
            }
            i += 1;
            continue;
        }

        if matches!(c, '(' | ')' | '[' | ']' | '{' | '}') {
            tokens.push(Token::from_chars(TokenKind::Bracket, &chars, i, i + 1));
            i += 1;
            continue;
        }

        i += 1;
    }

    tokens
}

fn peek(chars: &[char], idx: usize) -> Option<char> {
    chars.get(idx).copied()
}

/// Scan a delimited single-line span starting at `start` (which holds `delim`).
///
/// Returns the exclusive end offset of the span including the closing delimiter, or `None`
/// when the span must be rejected (newline or end of input before the close).
fn scan_single_line_span(chars: &[char], start: usize, delim: char) -> Option<usize> {
    let mut j = start + 1;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '\n' => return None,
            c if c == delim => return Some(j + 1),
            _ => j += 1,
        }
    }
    None
}

/// If one of the reserved markers begins at `idx`, return its width in characters.
fn marker_width(chars: &[char], idx: usize, markers: &[Vec<char>; 2]) -> Option<usize> {
    markers
        .iter()
        .find(|marker| chars[idx..].starts_with(marker))
        .map(Vec::len)
}
