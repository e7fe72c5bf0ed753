//! Bracket pairing and nearest-enclosing-pair selection.
//!
//! Pairing runs over the bracket tokens of a single region with an explicit stack. The
//! matching rule is intentionally tolerant: a closer searches the stack from the top
//! downward for the nearest opener of its own family and removes it *wherever it sits*,
//! skipping over mismatched openers in between (they stay on the stack and end up
//! unmatched). Bracket mismatch is never an error - unmatched brackets simply never appear
//! in the pair map.

use crate::token::{Token, TokenKind};
use std::collections::HashMap;

/// The enclosing bracket pair for a cursor, in region-relative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnclosingPair {
    /// Offset of the opening bracket.
    pub open: usize,
    /// Offset of the closing bracket.
    pub close: usize,
}

/// A bidirectional map of matched bracket offsets for one region.
///
/// Every entry pairs an opener and closer of the same family; partial entries do not
/// exist. Discard after use - the map is rebuilt on every resolve.
#[derive(Debug, Clone, Default)]
pub struct BracketPairs {
    partners: HashMap<usize, usize>,
    // Complete pairs ordered by opener offset; used for enclosing-pair scans.
    ordered: Vec<(usize, usize)>,
}

impl BracketPairs {
    /// The partner offset for a matched bracket at `offset`, in either direction.
    pub fn partner(&self, offset: usize) -> Option<usize> {
        self.partners.get(&offset).copied()
    }

    /// All complete pairs as `(open, close)`, ordered by opener offset.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.ordered
    }

    /// Number of complete pairs.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` when no bracket matched.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// The result of a resolve pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// All matched pairs.
    pub pairs: BracketPairs,
    /// The tightest pair around the cursor, when a cursor was given and one qualifies.
    pub enclosing: Option<EnclosingPair>,
}

fn opener_for(close: char) -> Option<char> {
    match close {
        ')' => Some('('),
        ']' => Some('['),
        '}' => Some('{'),
        _ => None,
    }
}

fn is_opener(c: char) -> bool {
    matches!(c, '(' | '[' | '{')
}

/// Pair up the bracket tokens of a region and, if `cursor` is given (region-relative),
/// select the nearest enclosing pair.
///
/// A candidate pair encloses the cursor when `open <= cursor <= close + 1`; the pair with
/// the smallest span wins, ties going to the earliest-opened pair.
pub fn resolve(tokens: &[Token], cursor: Option<usize>) -> Resolution {
    let mut stack: Vec<(usize, char)> = Vec::new();
    let mut found: Vec<(usize, usize)> = Vec::new();

    for token in tokens.iter().filter(|t| t.kind == TokenKind::Bracket) {
        let Some(c) = token.text.chars().next() else {
            continue;
        };
        if is_opener(c) {
            stack.push((token.from, c));
        } else if let Some(open_char) = opener_for(c) {
            // Search from the top of the stack downward for the nearest opener of the
            // same family; anything above it stays put and is skipped over.
            if let Some(idx) = stack.iter().rposition(|&(_, oc)| oc == open_char) {
                let (open_offset, _) = stack.remove(idx);
                found.push((open_offset, token.from));
            }
            // No same-family opener on the stack: the closer stays unmatched, silently.
        }
    }

    found.sort_unstable();
    let mut partners = HashMap::with_capacity(found.len() * 2);
    for &(open, close) in &found {
        partners.insert(open, close);
        partners.insert(close, open);
    }
    let pairs = BracketPairs {
        partners,
        ordered: found,
    };

    let enclosing = cursor.and_then(|cur| {
        let mut best: Option<EnclosingPair> = None;
        for &(open, close) in pairs.pairs() {
            if open <= cur && cur <= close + 1 {
                let span = close - open;
                // Strict comparison keeps the earliest-opened pair on span ties.
                if best.is_none_or(|b| span < b.close - b.open) {
                    best = Some(EnclosingPair { open, close });
                }
            }
        }
        best
    });

    Resolution { pairs, enclosing }
}
