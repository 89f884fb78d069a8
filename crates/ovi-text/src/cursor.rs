//! Cursors: validated positions and multi-cursor bookkeeping.
//!
//! A [`Cursor`] is a [`Position`] that has been checked against a
//! [`Buffer`]: its line exists and its column lies in `0..=line_len`. The
//! only ways to build or move one take the buffer and clamp, so an
//! out-of-bounds cursor cannot be constructed.
//!
//! A [`CursorSet`] is an ordered, non-empty list of cursors. Index 0 is the
//! primary cursor: it drives the status line and anchors selections. The set
//! never merges or de-duplicates cursors that end up on the same spot.
//!
//! # Desired column
//!
//! By default vertical motion simply clamps the column to the target line's
//! length, so passing through a short line loses the original column. When
//! column tracking is switched on ([`CursorSet::set_track_column`]), `Up` and
//! `Down` remember the column they started from and return to it on the next
//! line long enough. Any horizontal motion forgets it.

use crate::buffer::Buffer;
use crate::position::{Position, Range};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// A single-step cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    LineStart,
    LineEnd,
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// A position that is valid for the buffer it was built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
    /// Column to return to on vertical motion, when tracking is on.
    desired_col: Option<usize>,
}

impl Cursor {
    /// A cursor at `(line, col)`, clamped into `buf`.
    #[must_use]
    pub fn new(buf: &Buffer, line: usize, col: usize) -> Self {
        Self {
            pos: clamp(buf, Position::new(line, col)),
            desired_col: None,
        }
    }

    /// A cursor at `pos`, clamped into `buf`.
    #[must_use]
    pub fn at(buf: &Buffer, pos: Position) -> Self {
        Self::new(buf, pos.line, pos.col)
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.pos.line
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    // -- Positioning --------------------------------------------------------

    /// Jump to `pos`, clamped. Forgets any desired column.
    pub fn set_position(&mut self, buf: &Buffer, pos: Position) {
        self.pos = clamp(buf, pos);
        self.desired_col = None;
    }

    /// Re-validate after the buffer changed underneath this cursor.
    pub fn clamp(&mut self, buf: &Buffer) {
        self.pos = clamp(buf, self.pos);
    }

    // -- Movement -----------------------------------------------------------

    /// Move one step. Returns `false` when a boundary stopped the motion.
    ///
    /// - `Left` at column 0 wraps to the end of the previous line.
    /// - `Right` at the line end wraps to column 0 of the next line.
    /// - `Up`/`Down` clamp the column to the target line's length.
    /// - `LineEnd` lands one past the last char.
    pub fn step(&mut self, buf: &Buffer, dir: Direction) -> bool {
        self.step_with(buf, dir, false)
    }

    /// Like [`step`](Self::step), but `Up`/`Down` remember and restore the
    /// starting column across short lines.
    pub fn step_tracking(&mut self, buf: &Buffer, dir: Direction) -> bool {
        self.step_with(buf, dir, true)
    }

    /// Repeat a step up to `count` times, stopping early at a boundary.
    /// Returns how many steps were actually taken.
    pub fn step_many(&mut self, buf: &Buffer, dir: Direction, count: usize, track: bool) -> usize {
        let mut taken = 0;
        while taken < count && self.step_with(buf, dir, track) {
            taken += 1;
        }
        taken
    }

    fn step_with(&mut self, buf: &Buffer, dir: Direction, track: bool) -> bool {
        let before = self.pos;
        let len = |line| buf.line_len(line).unwrap_or(0);
        match dir {
            Direction::Left => {
                if self.pos.col > 0 {
                    self.pos.col -= 1;
                } else if self.pos.line > 0 {
                    self.pos.line -= 1;
                    self.pos.col = len(self.pos.line);
                }
                self.desired_col = None;
            }
            Direction::Right => {
                if self.pos.col < len(self.pos.line) {
                    self.pos.col += 1;
                } else if self.pos.line + 1 < buf.line_count() {
                    self.pos.line += 1;
                    self.pos.col = 0;
                }
                self.desired_col = None;
            }
            Direction::Up | Direction::Down => {
                let target = if dir == Direction::Up {
                    self.pos.line.checked_sub(1)
                } else {
                    Some(self.pos.line + 1).filter(|&l| l < buf.line_count())
                };
                if let Some(line) = target {
                    let want = if track {
                        *self.desired_col.get_or_insert(self.pos.col)
                    } else {
                        self.pos.col
                    };
                    self.pos.line = line;
                    self.pos.col = want.min(len(line));
                }
            }
            Direction::LineStart => {
                self.pos.col = 0;
                self.desired_col = None;
            }
            Direction::LineEnd => {
                self.pos.col = len(self.pos.line);
                self.desired_col = None;
            }
        }
        self.pos != before
    }
}

/// Clamp a position into the buffer: line to the last line, column to that
/// line's length.
fn clamp(buf: &Buffer, pos: Position) -> Position {
    let line = pos.line.min(buf.line_count().saturating_sub(1));
    let col = pos.col.min(buf.line_len(line).unwrap_or(0));
    Position::new(line, col)
}

// ---------------------------------------------------------------------------
// CursorSet
// ---------------------------------------------------------------------------

/// An ordered, non-empty list of cursors. Index 0 is the primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorSet {
    cursors: Vec<Cursor>,
    track_column: bool,
}

impl CursorSet {
    #[must_use]
    pub fn new(primary: Cursor) -> Self {
        Self {
            cursors: vec![primary],
            track_column: false,
        }
    }

    // -- Membership ---------------------------------------------------------

    /// Add a secondary cursor at the end of the list.
    pub fn add(&mut self, cursor: Cursor) {
        self.cursors.push(cursor);
    }

    /// Drop every cursor except the primary.
    pub fn retain_primary(&mut self) {
        self.cursors.truncate(1);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn primary(&self) -> &Cursor {
        &self.cursors[0]
    }

    #[inline]
    pub fn primary_mut(&mut self) -> &mut Cursor {
        &mut self.cursors[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cursor> {
        self.cursors.iter()
    }

    #[must_use]
    pub fn positions(&self) -> Vec<Position> {
        self.cursors.iter().map(Cursor::position).collect()
    }

    /// `(index, position)` pairs in ascending `(line, col, index)` order.
    #[must_use]
    pub fn ascending(&self) -> Vec<(usize, Position)> {
        let mut order: Vec<_> = self.cursors.iter().map(Cursor::position).enumerate().collect();
        order.sort_by_key(|&(i, pos)| (pos, i));
        order
    }

    /// `(index, position)` pairs in descending `(line, col, index)` order.
    #[must_use]
    pub fn descending(&self) -> Vec<(usize, Position)> {
        let mut order = self.ascending();
        order.reverse();
        order
    }

    // -- Movement -----------------------------------------------------------

    /// Switch desired-column memory for vertical motion on or off.
    pub const fn set_track_column(&mut self, on: bool) {
        self.track_column = on;
    }

    /// Move every cursor independently, up to `count` steps each.
    pub fn move_all(&mut self, buf: &Buffer, dir: Direction, count: usize) {
        let track = self.track_column;
        for cursor in &mut self.cursors {
            cursor.step_many(buf, dir, count, track);
        }
    }

    /// Re-validate every cursor against the buffer.
    pub fn clamp_all(&mut self, buf: &Buffer) {
        for cursor in &mut self.cursors {
            cursor.clamp(buf);
        }
    }

    /// Place each cursor at the matching entry of `positions` (indexed like
    /// the set), clamped.
    pub fn place(&mut self, buf: &Buffer, positions: &[Position]) {
        for (cursor, &pos) in self.cursors.iter_mut().zip(positions) {
            cursor.set_position(buf, pos);
        }
    }

    // -- Settling after edits -----------------------------------------------

    /// Advance every cursor past the `width` chars just inserted at each
    /// cursor by [`Buffer::insert_at_cursors`]. A cursor also moves right by
    /// `width` for every cursor on its line that sorts before it.
    pub fn advance_after_insert(&mut self, buf: &Buffer, width: usize) {
        let order = self.ascending();
        let mut settled = self.positions();
        let mut run_line = None;
        let mut ahead = 0;
        for (index, pos) in order {
            if run_line != Some(pos.line) {
                run_line = Some(pos.line);
                ahead = 0;
            }
            ahead += 1;
            settled[index] = Position::new(pos.line, pos.col + ahead * width);
        }
        self.place(buf, &settled);
    }

    /// Map every cursor through the spans removed by
    /// [`Buffer::remove_at_cursors`] (disjoint, in original coordinates).
    ///
    /// A cursor moves left by the removed chars that sat before it on its
    /// line. A cursor inside a removed span lands on that span's start.
    pub fn settle_after_removal(&mut self, buf: &Buffer, removed: &[Range]) {
        let settled: Vec<Position> = self
            .positions()
            .into_iter()
            .map(|pos| {
                let shift: usize = removed
                    .iter()
                    .filter(|span| span.start.line == pos.line)
                    .map(|span| span.end.col.min(pos.col).saturating_sub(span.start.col))
                    .sum();
                Position::new(pos.line, pos.col - shift)
            })
            .collect();
        self.place(buf, &settled);
    }

    /// Account for `count` lines inserted at line index `at`: cursors on or
    /// below `at` move down by `count`.
    pub fn shift_for_inserted_lines(&mut self, buf: &Buffer, at: usize, count: usize) {
        for cursor in &mut self.cursors {
            if cursor.pos.line >= at {
                cursor.pos.line += count;
            }
            cursor.clamp(buf);
        }
    }

    /// Account for lines `[start, start + count)` having been removed:
    /// cursors inside the span land on `start`, cursors below it move up.
    pub fn shift_for_removed_lines(&mut self, buf: &Buffer, start: usize, count: usize) {
        for cursor in &mut self.cursors {
            if cursor.pos.line >= start + count {
                cursor.pos.line -= count;
            } else if cursor.pos.line >= start {
                cursor.pos = Position::new(start, 0);
            }
            cursor.clamp(buf);
        }
    }

    /// Account for the text in `range` having been removed by
    /// [`Buffer::remove_range`]. Cursors inside it collapse onto its start;
    /// cursors after it move back by the removed span.
    pub fn shift_for_removed_range(&mut self, buf: &Buffer, range: Range) {
        let Range { start, end } = range;
        for cursor in &mut self.cursors {
            let pos = cursor.pos;
            cursor.pos = if pos < start {
                pos
            } else if pos <= end {
                start
            } else if pos.line == end.line {
                Position::new(start.line, start.col + (pos.col - end.col))
            } else {
                Position::new(pos.line - (end.line - start.line), pos.col)
            };
            cursor.clamp(buf);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Side;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    // 5 lines of varying length, including an empty one.
    fn sample_buffer() -> Buffer {
        Buffer::from_lines(["hello", "world", "hi", "", "goodbye"])
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn new_clamps_into_buffer() {
        let buf = sample_buffer();
        assert_eq!(Cursor::new(&buf, 100, 100).position(), p(4, 7));
        assert_eq!(Cursor::new(&buf, 2, 9).position(), p(2, 2));
        assert_eq!(Cursor::new(&buf, 3, 1).position(), p(3, 0));
    }

    #[test]
    fn line_end_is_a_valid_column() {
        let buf = sample_buffer();
        assert_eq!(Cursor::new(&buf, 0, 5).position(), p(0, 5));
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn left_wraps_to_previous_line_end() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 1, 0);
        assert!(c.step(&buf, Direction::Left));
        assert_eq!(c.position(), p(0, 5));
    }

    #[test]
    fn left_at_buffer_start_is_noop() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 0, 0);
        assert!(!c.step(&buf, Direction::Left));
        assert_eq!(c.position(), p(0, 0));
    }

    #[test]
    fn right_wraps_to_next_line_start() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 0, 5);
        assert!(c.step(&buf, Direction::Right));
        assert_eq!(c.position(), p(1, 0));
    }

    #[test]
    fn right_at_buffer_end_is_noop() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 4, 7);
        assert!(!c.step(&buf, Direction::Right));
        assert_eq!(c.position(), p(4, 7));
    }

    #[test]
    fn left_then_right_round_trips() {
        let buf = sample_buffer();
        for line in 0..buf.line_count() {
            for col in 0..=buf.line_len(line).unwrap() {
                let start = p(line, col);
                if start == p(0, 0) {
                    continue;
                }
                let mut c = Cursor::at(&buf, start);
                c.step(&buf, Direction::Left);
                c.step(&buf, Direction::Right);
                assert_eq!(c.position(), start, "from {start:?}");
            }
        }
    }

    #[test]
    fn line_start_and_end() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 4, 3);
        c.step(&buf, Direction::LineEnd);
        assert_eq!(c.position(), p(4, 7));
        c.step(&buf, Direction::LineStart);
        assert_eq!(c.position(), p(4, 0));
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn down_clamps_to_short_line() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 1, 4);
        c.step(&buf, Direction::Down);
        assert_eq!(c.position(), p(2, 2));
    }

    #[test]
    fn vertical_without_tracking_loses_column() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 1, 4);
        c.step(&buf, Direction::Down);
        c.step(&buf, Direction::Up);
        assert_eq!(c.position(), p(1, 2));
    }

    #[test]
    fn vertical_with_tracking_restores_column() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 1, 4);
        c.step_tracking(&buf, Direction::Down);
        c.step_tracking(&buf, Direction::Down);
        assert_eq!(c.position(), p(3, 0));
        c.step_tracking(&buf, Direction::Down);
        assert_eq!(c.position(), p(4, 4));
    }

    #[test]
    fn horizontal_move_forgets_desired_column() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 1, 4);
        c.step_tracking(&buf, Direction::Down);
        c.step_tracking(&buf, Direction::Left);
        c.step_tracking(&buf, Direction::Up);
        assert_eq!(c.position(), p(1, 1));
    }

    #[test]
    fn up_at_first_line_is_noop() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 0, 3);
        assert!(!c.step(&buf, Direction::Up));
        assert_eq!(c.position(), p(0, 3));
    }

    #[test]
    fn step_many_stops_at_boundary() {
        let buf = sample_buffer();
        let mut c = Cursor::new(&buf, 3, 0);
        assert_eq!(c.step_many(&buf, Direction::Down, 10, false), 1);
        assert_eq!(c.position(), p(4, 0));
        assert_eq!(c.step_many(&buf, Direction::Down, 10, false), 0);
    }

    #[test]
    fn step_many_right_crosses_lines() {
        let buf = Buffer::from_lines(["ab", "cd"]);
        let mut c = Cursor::new(&buf, 0, 1);
        c.step_many(&buf, Direction::Right, 3, false);
        assert_eq!(c.position(), p(1, 1));
    }

    // -- CursorSet ----------------------------------------------------------

    #[test]
    fn set_moves_every_cursor_independently() {
        let buf = sample_buffer();
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 1));
        set.add(Cursor::new(&buf, 4, 7));
        set.move_all(&buf, Direction::Right, 2);
        assert_eq!(set.positions(), vec![p(0, 3), p(4, 7)]);
    }

    #[test]
    fn colliding_cursors_are_kept() {
        let buf = sample_buffer();
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 0));
        set.add(Cursor::new(&buf, 0, 1));
        set.move_all(&buf, Direction::LineStart, 1);
        assert_eq!(set.len(), 2);
        assert_eq!(set.positions(), vec![p(0, 0), p(0, 0)]);
    }

    #[test]
    fn ascending_orders_by_position_then_index() {
        let buf = sample_buffer();
        let mut set = CursorSet::new(Cursor::new(&buf, 2, 1));
        set.add(Cursor::new(&buf, 0, 4));
        set.add(Cursor::new(&buf, 2, 1));
        assert_eq!(set.ascending(), vec![(1, p(0, 4)), (0, p(2, 1)), (2, p(2, 1))]);
        assert_eq!(set.descending()[0], (2, p(2, 1)));
    }

    #[test]
    fn advance_after_insert_accounts_for_same_line() {
        let mut buf = Buffer::from_lines(["abc"]);
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 2));
        set.add(Cursor::new(&buf, 0, 0));
        buf.insert_char_at_cursors(&set, '-');
        set.advance_after_insert(&buf, 1);
        assert_eq!(buf.get_line(0).unwrap(), "-ab-c");
        assert_eq!(set.positions(), vec![p(0, 4), p(0, 1)]);
    }

    #[test]
    fn settle_after_removal_before() {
        let mut buf = Buffer::from_lines(["abcdef"]);
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 2));
        set.add(Cursor::new(&buf, 0, 5));
        let removed = buf.remove_char_before_cursors(&set);
        set.settle_after_removal(&buf, &removed);
        assert_eq!(buf.get_line(0).unwrap(), "acdf");
        assert_eq!(set.positions(), vec![p(0, 1), p(0, 3)]);
    }

    #[test]
    fn settle_after_overlapping_removals() {
        let mut buf = Buffer::from_lines(["abcdef"]);
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 2));
        set.add(Cursor::new(&buf, 0, 4));
        let removed = buf.remove_at_cursors(&set, 3, Side::Before);
        set.settle_after_removal(&buf, &removed);
        assert_eq!(set.positions(), vec![p(0, 0), p(0, 0)]);

        let mut buf = Buffer::from_lines(["abcdef"]);
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 1));
        set.add(Cursor::new(&buf, 0, 2));
        let removed = buf.remove_at_cursors(&set, 3, Side::After);
        set.settle_after_removal(&buf, &removed);
        assert_eq!(buf.get_line(0).unwrap(), "af");
        assert_eq!(set.positions(), vec![p(0, 1), p(0, 1)]);
    }

    #[test]
    fn shift_for_inserted_and_removed_lines() {
        let mut buf = Buffer::from_lines(["a", "b", "c"]);
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 0));
        set.add(Cursor::new(&buf, 2, 1));
        buf.insert_line(0, "new", Side::After);
        set.shift_for_inserted_lines(&buf, 1, 1);
        assert_eq!(set.positions(), vec![p(0, 0), p(3, 1)]);

        buf.remove_lines(0, 2);
        set.shift_for_removed_lines(&buf, 0, 2);
        assert_eq!(set.positions(), vec![p(0, 0), p(1, 1)]);
    }

    #[test]
    fn shift_for_removed_range() {
        let mut buf = Buffer::from_lines(["hello", "big", "world", "tail"]);
        let mut set = CursorSet::new(Cursor::new(&buf, 0, 3));
        set.add(Cursor::new(&buf, 1, 1));
        set.add(Cursor::new(&buf, 2, 4));
        set.add(Cursor::new(&buf, 3, 2));
        set.add(Cursor::new(&buf, 0, 1));
        let range = Range::ordered(p(0, 3), p(2, 2));
        buf.remove_range(range);
        set.shift_for_removed_range(&buf, range);
        assert_eq!(buf.get_line(0).unwrap(), "helrld");
        assert_eq!(set.positions(), vec![p(0, 3), p(0, 3), p(0, 5), p(1, 2), p(0, 1)]);
    }

    #[test]
    fn retain_primary_drops_secondaries() {
        let buf = sample_buffer();
        let mut set = CursorSet::new(Cursor::new(&buf, 1, 1));
        set.add(Cursor::new(&buf, 2, 0));
        set.retain_primary();
        assert_eq!(set.len(), 1);
        assert_eq!(set.primary().position(), p(1, 1));
    }
}
