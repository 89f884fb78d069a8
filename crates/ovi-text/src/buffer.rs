//! Text buffer: an ordered sequence of lines, mutated in place.
//!
//! A `Buffer` wraps a [`ropey::Rope`] but exposes a strictly line-based
//! model: lines are joined by a single `\n` internally and **no** trailing
//! terminator is stored, so the rope's line count is exactly the buffer's line
//! count and is never zero. The terminator is a property of the file format,
//! handled on load and save.
//!
//! # Multi-cursor primitives
//!
//! The `*_at_cursors` family applies one edit at every cursor of a
//! [`CursorSet`] in a single pass. None of them reposition cursors; the
//! caller (normally [`Document`](crate::document::Document)) settles cursors
//! afterwards. Each pass is ordered so that an edit at one cursor never
//! invalidates the coordinates another cursor still has to use:
//!
//! - insertions and removals run in **descending** `(line, col)` order, so an
//!   edit only ever shifts text that has already been visited;
//! - [`split_lines`](Buffer::split_lines) runs in **ascending** order and
//!   carries a running count of lines already inserted, plus the column
//!   already consumed on the same original line.
//!
//! Every mutating call marks the buffer modified.

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::cursor::CursorSet;
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which side of a cursor (or line) an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Before,
    After,
}

// ---------------------------------------------------------------------------
// Line endings
// ---------------------------------------------------------------------------

/// Line ending style of a file. Detected on load, reproduced on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Style of the first line break in `text`. `Lf` when there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(i) if i > 0 && text.as_bytes()[i - 1] == b'\r' => Self::CrLf,
            _ => Self::Lf,
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
        }
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// An in-memory document: at least one line of chars.
pub struct Buffer {
    rope: Rope,
    modified: bool,
    line_ending: LineEnding,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// A buffer holding a single empty line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            modified: false,
            line_ending: LineEnding::Lf,
        }
    }

    /// Build a buffer from file-style text.
    ///
    /// `\r\n` is folded to `\n` and a single trailing terminator is dropped,
    /// so `"a\nb\n"` and `"a\nb"` both give the lines `["a", "b"]`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let line_ending = LineEnding::detect(text);
        let normalized = text.replace("\r\n", "\n");
        let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
        Self {
            rope: Rope::from_str(body),
            modified: false,
            line_ending,
        }
    }

    /// Build a buffer from individual lines. An empty iterator gives one
    /// empty line.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = lines
            .into_iter()
            .map(|l| l.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            rope: Rope::from_str(&joined),
            modified: false,
            line_ending: LineEnding::Lf,
        }
    }

    // -- Reads --------------------------------------------------------------

    /// Number of lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Number of chars on a line, or `None` if the line does not exist.
    #[must_use]
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(|l| l.len_chars())
    }

    /// A line's content without its separator. `None` past the last line.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let total = slice.len_chars();
        if total > 0 && slice.char(total - 1) == '\n' {
            Some(slice.slice(..total - 1))
        } else {
            Some(slice)
        }
    }

    /// A line's content as a `String`. Bounds-safe.
    #[must_use]
    pub fn get_line(&self, line: usize) -> Option<String> {
        self.line(line).map(String::from)
    }

    /// The lines in `[start, end)`. An out-of-range or inverted `start`
    /// yields an empty result; `end` is clamped to the buffer length.
    #[must_use]
    pub fn get_lines(&self, start: usize, end: usize) -> Vec<String> {
        let end = end.min(self.line_count());
        if start >= end {
            return Vec::new();
        }
        (start..end).filter_map(|i| self.get_line(i)).collect()
    }

    /// The char at `pos`, or `None` when `pos` is at or past the line end.
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let line = self.line(pos.line)?;
        (pos.col < line.len_chars()).then(|| line.char(pos.col))
    }

    /// All lines joined by `\n`, without a trailing terminator.
    #[must_use]
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    /// Text as it should be written to disk: every line (including the last)
    /// followed by the buffer's line ending.
    #[must_use]
    pub fn to_file_text(&self) -> String {
        let ending = self.line_ending.as_str();
        let mut out = String::with_capacity(self.rope.len_bytes() + self.line_count());
        for i in 0..self.line_count() {
            if let Some(line) = self.line(i) {
                out.extend(line.chars());
            }
            out.push_str(ending);
        }
        out
    }

    // -- Line structure -----------------------------------------------------

    /// Insert a new line before or after `line`, shifting later line indices.
    ///
    /// `text` must not contain a line break. `line` is clamped to the last
    /// line. Cursors are not touched.
    pub fn insert_line(&mut self, line: usize, text: &str, side: Side) {
        let line = line.min(self.line_count() - 1);
        match side {
            Side::Before => {
                let idx = self.rope.line_to_char(line);
                self.rope.insert(idx, &format!("{text}\n"));
            }
            Side::After => {
                let idx = self.end_of_line_idx(line);
                self.rope.insert(idx, &format!("\n{text}"));
            }
        }
        self.modified = true;
    }

    /// Split the line under every cursor into the text before the cursor and
    /// the text at/after it.
    ///
    /// Cursors are processed in ascending `(line, col)` order. Each split
    /// pushes every later line down by one, so a running offset is added to
    /// each subsequent cursor's line index; a later cursor on the *same*
    /// original line also has the already-split-off prefix subtracted from
    /// its column.
    ///
    /// Returns, indexed like the cursor set, the start of the line each
    /// cursor's tail text landed on. Cursors themselves are not moved.
    pub fn split_lines(&mut self, cursors: &CursorSet) -> Vec<Position> {
        let mut landed = vec![Position::ZERO; cursors.len()];
        let mut lines_added = 0;
        let mut last_split: Option<Position> = None;

        for (index, pos) in cursors.ascending() {
            let consumed = match last_split {
                Some(prev) if prev.line == pos.line => prev.col,
                _ => 0,
            };
            let line = pos.line + lines_added;
            let len = self.line_len(line).unwrap_or(0);
            let col = pos.col.saturating_sub(consumed).min(len);
            let idx = self.rope.line_to_char(line) + col;
            self.rope.insert_char(idx, '\n');

            lines_added += 1;
            landed[index] = Position::new(line + 1, 0);
            last_split = Some(Position::new(pos.line, consumed + col));
        }

        self.modified = true;
        landed
    }

    /// Remove up to `count` lines starting at `start`. The buffer always
    /// keeps at least one line: removing everything leaves one empty line.
    /// Returns the number of lines actually removed.
    pub fn remove_lines(&mut self, start: usize, count: usize) -> usize {
        self.modified = true;
        let total = self.line_count();
        if start >= total || count == 0 {
            return 0;
        }
        let end = start.saturating_add(count).min(total);
        if start == 0 && end == total {
            self.rope = Rope::new();
        } else if end < total {
            let from = self.rope.line_to_char(start);
            let to = self.rope.line_to_char(end);
            self.rope.remove(from..to);
        } else {
            // Removing through the last line: drop the separator before it.
            let from = self.rope.line_to_char(start) - 1;
            self.rope.remove(from..self.rope.len_chars());
        }
        end - start
    }

    /// Remove the text in `range`, joining lines when it spans a line break.
    /// Both endpoints are clamped into the buffer first.
    pub fn remove_range(&mut self, range: Range) {
        self.modified = true;
        let from = self.clamped_idx(range.start);
        let to = self.clamped_idx(range.end);
        if from < to {
            self.rope.remove(from..to);
        }
    }

    // -- Characters ---------------------------------------------------------

    /// Insert `text` at every cursor's position in one pass.
    ///
    /// `text` must not contain a line break. Runs in descending order so
    /// every insertion lands at its cursor's original position. Cursors are
    /// not advanced.
    pub fn insert_at_cursors(&mut self, cursors: &CursorSet, text: &str) {
        for (_, pos) in cursors.descending() {
            let idx = self.clamped_idx(pos);
            self.rope.insert(idx, text);
        }
        self.modified = true;
    }

    /// Insert one char at every cursor. See [`insert_at_cursors`](Self::insert_at_cursors).
    pub fn insert_char_at_cursors(&mut self, cursors: &CursorSet, ch: char) {
        let mut tmp = [0u8; 4];
        self.insert_at_cursors(cursors, ch.encode_utf8(&mut tmp));
    }

    /// Remove the char before every cursor. A cursor at column 0 removes
    /// nothing (lines are never joined here).
    ///
    /// Returns the span each cursor removed; see
    /// [`remove_at_cursors`](Self::remove_at_cursors).
    pub fn remove_char_before_cursors(&mut self, cursors: &CursorSet) -> Vec<Range> {
        self.remove_at_cursors(cursors, 1, Side::Before)
    }

    /// Remove up to `count` chars before or after every cursor, never
    /// crossing a line boundary.
    ///
    /// Every cursor's span is computed in the original coordinates. Where
    /// spans on one line overlap, the text removed is their union and each
    /// char goes exactly once: a span is clipped to whatever the spans right
    /// of it have not already taken.
    ///
    /// Returns, indexed like the cursor set, the (possibly empty) span each
    /// cursor removed, in original coordinates. The spans are disjoint.
    pub fn remove_at_cursors(&mut self, cursors: &CursorSet, count: usize, side: Side) -> Vec<Range> {
        let mut removed: Vec<Range> = cursors
            .positions()
            .into_iter()
            .map(|pos| Range::ordered(pos, pos))
            .collect();
        // Lowest column already consumed on the line being visited.
        let mut floor: Option<Position> = None;

        for (index, pos) in cursors.descending() {
            let Some(len) = self.line_len(pos.line) else {
                continue;
            };
            let col = pos.col.min(len);
            let (from, to) = match side {
                Side::Before => (col.saturating_sub(count), col),
                Side::After => (col, col.saturating_add(count).min(len)),
            };
            let to = match floor {
                Some(f) if f.line == pos.line => to.min(f.col),
                _ => to,
            };
            if from >= to {
                continue;
            }
            self.remove_characters(Position::new(pos.line, from), to - from, Side::After);
            removed[index] = Range::ordered(Position::new(pos.line, from), Position::new(pos.line, to));
            floor = Some(Position::new(pos.line, from));
        }

        self.modified = true;
        removed
    }

    /// Remove up to `count` chars adjacent to `pos` on its line. Returns the
    /// number actually removed, which is less than `count` when the line
    /// boundary is reached first.
    pub fn remove_characters(&mut self, pos: Position, count: usize, side: Side) -> usize {
        self.modified = true;
        let Some(len) = self.line_len(pos.line) else {
            return 0;
        };
        let col = pos.col.min(len);
        let (from, to) = match side {
            Side::Before => (col.saturating_sub(count), col),
            Side::After => (col, col.saturating_add(count).min(len)),
        };
        if from < to {
            let base = self.rope.line_to_char(pos.line);
            self.rope.remove(base + from..base + to);
        }
        to - from
    }

    // -- Metadata -----------------------------------------------------------

    /// True if the buffer changed since creation or the last successful save.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    // -- Helpers ------------------------------------------------------------

    /// Char index of the end of `line`'s content (before its separator).
    fn end_of_line_idx(&self, line: usize) -> usize {
        self.rope.line_to_char(line) + self.line_len(line).unwrap_or(0)
    }

    /// Char index of `pos` after clamping it into the buffer.
    fn clamped_idx(&self, pos: Position) -> usize {
        let line = pos.line.min(self.line_count() - 1);
        let col = pos.col.min(self.line_len(line).unwrap_or(0));
        self.rope.line_to_char(line) + col
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("modified", &self.modified)
            .field("line_ending", &self.line_ending)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
