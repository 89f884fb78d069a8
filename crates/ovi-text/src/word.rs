//! Word motions: forward and backward jumps over word and WORD runs.
//!
//! | Motion | Vi key | Description |
//! |--------|--------|-------------|
//! | [`word_forward`] | `w` | Forward to start of next word |
//! | [`word_backward`] | `b` | Backward to start of previous word |
//! | [`big_word_forward`] | `W` | Forward to start of next WORD |
//! | [`big_word_backward`] | `B` | Backward to start of previous WORD |
//!
//! # Words vs WORDs
//!
//! Every char falls in one of three classes: whitespace, word chars
//! (alphanumerics plus connector punctuation such as `_`), and separators
//! (everything else). A **word** is a maximal run of one non-whitespace
//! class, so `hello.world` holds three words. A **WORD** merges word chars
//! and separators; only whitespace splits it.
//!
//! Motions scan line by line. An empty line counts as a word of its own and
//! stops both directions; a line holding only whitespace is passed over.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

/// Character class for word boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    /// Letters, digits and connector punctuation.
    Word,
    Separator,
}

/// Connector punctuation (Unicode category Pc).
const CONNECTORS: &[char] = &[
    '_', '\u{203F}', '\u{2040}', '\u{2054}', '\u{FE33}', '\u{FE34}', '\u{FE4D}', '\u{FE4E}',
    '\u{FE4F}', '\u{FF3F}',
];

/// Classify a char for word motions (`w`/`b`).
#[must_use]
pub fn classify(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Whitespace
    } else if ch.is_alphanumeric() || CONNECTORS.contains(&ch) {
        CharClass::Word
    } else {
        CharClass::Separator
    }
}

/// Classify a char for WORD motions (`W`/`B`). Separators fold into words.
#[must_use]
pub fn classify_big(ch: char) -> CharClass {
    match classify(ch) {
        CharClass::Separator => CharClass::Word,
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// `w`: forward to the start of the next word.
#[must_use]
pub fn word_forward(buf: &Buffer, pos: Position) -> Position {
    forward(buf, pos, classify)
}

/// `b`: backward to the start of the current or previous word.
#[must_use]
pub fn word_backward(buf: &Buffer, pos: Position) -> Position {
    backward(buf, pos, classify)
}

/// `W`: forward to the start of the next WORD.
#[must_use]
pub fn big_word_forward(buf: &Buffer, pos: Position) -> Position {
    forward(buf, pos, classify_big)
}

/// `B`: backward to the start of the current or previous WORD.
#[must_use]
pub fn big_word_backward(buf: &Buffer, pos: Position) -> Position {
    backward(buf, pos, classify_big)
}

/// End of the text `dw` operates on from `pos` (exclusive).
///
/// Same scan as [`word_forward`], except that running off the end of the
/// cursor's line stops at that line's end instead of moving on, and the
/// buffer's last line ends one past its last char.
#[must_use]
pub fn word_operand_end(buf: &Buffer, pos: Position) -> Position {
    scan_forward(buf, pos, classify, Stop::LineEnd)
}

/// End of the text `dW` operates on from `pos` (exclusive).
#[must_use]
pub fn big_word_operand_end(buf: &Buffer, pos: Position) -> Position {
    scan_forward(buf, pos, classify_big, Stop::LineEnd)
}

/// Apply `motion` up to `count` times from `from`, stopping early once it
/// no longer moves.
#[must_use]
pub fn repeat(
    buf: &Buffer,
    motion: fn(&Buffer, Position) -> Position,
    from: Position,
    count: usize,
) -> Position {
    let mut pos = from;
    for _ in 0..count {
        let next = motion(buf, pos);
        if next == pos {
            break;
        }
        pos = next;
    }
    pos
}

/// Column offsets where a word starts on `line`.
///
/// An empty line yields `[0]`; a line of only whitespace yields nothing.
#[must_use]
pub fn word_starts(line: &str) -> Vec<usize> {
    starts(line, classify)
}

/// Column offsets where a WORD starts on `line`.
#[must_use]
pub fn big_word_starts(line: &str) -> Vec<usize> {
    starts(line, classify_big)
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

fn starts(line: &str, class: fn(char) -> CharClass) -> Vec<usize> {
    if line.is_empty() {
        return vec![0];
    }
    let mut out = Vec::new();
    let mut prev = CharClass::Whitespace;
    for (i, ch) in line.chars().enumerate() {
        let c = class(ch);
        if c != CharClass::Whitespace && c != prev {
            out.push(i);
        }
        prev = c;
    }
    out
}

fn line_chars(buf: &Buffer, line: usize) -> Vec<char> {
    buf.line(line).map(|l| l.chars().collect()).unwrap_or_default()
}

/// Where a forward scan gives up.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Motions: continue across lines, end on the buffer's last char.
    LastChar,
    /// Operators: end at the cursor line's end when it still had text.
    LineEnd,
}

fn forward(buf: &Buffer, pos: Position, class: fn(char) -> CharClass) -> Position {
    scan_forward(buf, pos, class, Stop::LastChar)
}

fn scan_forward(buf: &Buffer, pos: Position, class: fn(char) -> CharClass, stop: Stop) -> Position {
    let chars = line_chars(buf, pos.line);
    let len = chars.len();
    let mut p = pos.col;

    // Leave the run under the cursor, then any whitespace after it.
    if p < len && class(chars[p]) != CharClass::Whitespace {
        let run = class(chars[p]);
        while p < len && class(chars[p]) == run {
            p += 1;
        }
    }
    while p < len && class(chars[p]) == CharClass::Whitespace {
        p += 1;
    }
    if p < len {
        return Position::new(pos.line, p);
    }
    if stop == Stop::LineEnd && pos.col < len {
        return Position::new(pos.line, len);
    }

    for line in pos.line + 1..buf.line_count() {
        let chars = line_chars(buf, line);
        if chars.is_empty() {
            return Position::new(line, 0);
        }
        if let Some(col) = chars.iter().position(|&c| class(c) != CharClass::Whitespace) {
            return Position::new(line, col);
        }
    }

    // Out of words: settle at the end of the buffer, never backwards.
    let last = buf.line_count() - 1;
    let last_len = buf.line_len(last).unwrap_or(0);
    let target = match stop {
        Stop::LastChar => Position::new(last, last_len.saturating_sub(1)),
        Stop::LineEnd => Position::new(last, last_len),
    };
    target.max(pos)
}

fn backward(buf: &Buffer, pos: Position, class: fn(char) -> CharClass) -> Position {
    let mut line = pos.line.min(buf.line_count() - 1);
    let mut chars = line_chars(buf, line);
    let mut i = pos.col.min(chars.len());

    loop {
        while i > 0 && class(chars[i - 1]) == CharClass::Whitespace {
            i -= 1;
        }
        if i > 0 {
            let run = class(chars[i - 1]);
            while i > 0 && class(chars[i - 1]) == run {
                i -= 1;
            }
            return Position::new(line, i);
        }
        if line == 0 {
            return Position::ZERO;
        }
        line -= 1;
        chars = line_chars(buf, line);
        if chars.is_empty() {
            return Position::new(line, 0);
        }
        i = chars.len();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
