//! Document: a buffer together with its cursors, selection and file.
//!
//! The buffer's `*_at_cursors` primitives never move cursors. `Document`
//! pairs each of them with the matching cursor bookkeeping so that after
//! every edit all cursors are valid again and sit where a user expects:
//! past inserted text, at the start of split-off lines, or pulled back by
//! removed characters.
//!
//! Persistence follows a fixed contract: a missing file loads as an empty
//! buffer; saving writes every line with a terminator, refuses to clobber
//! a different existing file unless forced, copies an existing target
//! aside first, and only clears the modified flag once the write went
//! through. The new content goes to a temporary file in the target's
//! directory which is then renamed over the target.

use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::buffer::{Buffer, Side};
use crate::cursor::{Cursor, CursorSet, Direction};
use crate::diagnostics::Diagnostics;
use crate::options::Options;
use crate::position::{Position, Range};
use crate::selection::{Selection, Shape};
use crate::word;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a save did not happen. The buffer is untouched in every case.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no file name")]
    NoName,
    #[error("{path} exists (add ! to override)")]
    WouldOverwrite { path: PathBuf },
    #[error("cannot create backup {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot create a file beside {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write to {path} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot inspect {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Document {
    buffer: Buffer,
    cursors: CursorSet,
    selection: Selection,
    path: Option<PathBuf>,
    options: Options,
    diag: Diagnostics,
}

impl Document {
    /// An unnamed document holding one empty line.
    #[must_use]
    pub fn new(options: Options, diag: Diagnostics) -> Self {
        Self::from_buffer(Buffer::new(), options, diag)
    }

    /// Wrap an existing buffer, with one cursor at the origin.
    #[must_use]
    pub fn from_buffer(buffer: Buffer, options: Options, diag: Diagnostics) -> Self {
        let cursors = fresh_cursors(&buffer, &options);
        Self {
            buffer,
            cursors,
            selection: Selection::new(),
            path: None,
            options,
            diag,
        }
    }

    /// Open `path`. A file that does not exist yet gives an empty buffer
    /// that will be written there on save.
    ///
    /// # Errors
    ///
    /// [`LoadError::Read`] when the file exists but cannot be read.
    pub fn open(path: &Path, options: Options, diag: Diagnostics) -> Result<Self, LoadError> {
        let mut doc = Self::new(options, diag);
        doc.load(path)?;
        Ok(doc)
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn cursors(&self) -> &CursorSet {
        &self.cursors
    }

    #[inline]
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    #[must_use]
    pub const fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The file name for display, empty when the document has none.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Position of the primary cursor.
    #[inline]
    #[must_use]
    pub fn primary(&self) -> Position {
        self.cursors.primary().position()
    }

    // -- Cursors ------------------------------------------------------------

    /// Add a secondary cursor at `pos`, clamped.
    pub fn add_cursor(&mut self, pos: Position) {
        self.cursors.add(Cursor::at(&self.buffer, pos));
    }

    pub fn retain_primary_cursor(&mut self) {
        self.cursors.retain_primary();
    }

    /// Move the primary cursor to `pos`, clamped.
    pub fn set_primary(&mut self, pos: Position) {
        self.cursors.primary_mut().set_position(&self.buffer, pos);
    }

    /// Move every cursor up to `count` steps in `dir`.
    pub fn move_cursors(&mut self, dir: Direction, count: usize) {
        self.cursors.move_all(&self.buffer, dir, count);
    }

    /// Apply a position-to-position motion `count` times to every cursor.
    pub fn jump_cursors(&mut self, motion: fn(&Buffer, Position) -> Position, count: usize) {
        let targets: Vec<Position> = self
            .cursors
            .iter()
            .map(|c| word::repeat(&self.buffer, motion, c.position(), count))
            .collect();
        self.cursors.place(&self.buffer, &targets);
    }

    /// Put every cursor at column 0 of `line`, clamped.
    pub fn goto_line(&mut self, line: usize) {
        let targets = vec![Position::new(line, 0); self.cursors.len()];
        self.cursors.place(&self.buffer, &targets);
    }

    // -- Selection ----------------------------------------------------------

    /// Start a selection of `shape` anchored at the primary cursor.
    pub fn begin_selection(&mut self, shape: Shape) {
        self.selection.begin(self.primary(), shape);
        self.log(|| debug!(target: "ovi::document", ?shape, anchor = ?self.primary(), "selection started"));
    }

    /// Change a live selection's shape, keeping its bounds.
    pub fn reshape_selection(&mut self, shape: Shape) {
        self.selection.set_shape(shape);
    }

    pub fn cancel_selection(&mut self) {
        self.selection.disable();
    }

    /// Copy the primary cursor into the selection's end, when one is live.
    pub fn update_selection(&mut self) {
        if self.selection.is_enabled() {
            self.selection.set_end(self.primary());
        }
    }

    // -- Character edits ----------------------------------------------------

    /// Type `ch` at every cursor. Line breaks split instead.
    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            self.split_lines();
            return;
        }
        self.buffer.insert_char_at_cursors(&self.cursors, ch);
        self.cursors.advance_after_insert(&self.buffer, 1);
    }

    /// Type `text` at every cursor, splitting lines at each line break.
    pub fn insert_text(&mut self, text: &str) {
        let text = text.replace("\r\n", "\n");
        for (i, segment) in text.split(['\n', '\r']).enumerate() {
            if i > 0 {
                self.split_lines();
            }
            if !segment.is_empty() {
                self.buffer.insert_at_cursors(&self.cursors, segment);
                self.cursors
                    .advance_after_insert(&self.buffer, segment.chars().count());
            }
        }
    }

    /// Split the line at every cursor; each cursor moves to the start of the
    /// line its tail text landed on.
    pub fn split_lines(&mut self) {
        let landed = self.buffer.split_lines(&self.cursors);
        self.cursors.place(&self.buffer, &landed);
    }

    /// Remove up to `count` chars before every cursor, within its line.
    pub fn remove_before(&mut self, count: usize) {
        let removed = self.buffer.remove_at_cursors(&self.cursors, count, Side::Before);
        self.cursors.settle_after_removal(&self.buffer, &removed);
    }

    /// Remove up to `count` chars at and after every cursor, within its line.
    pub fn remove_after(&mut self, count: usize) {
        let removed = self.buffer.remove_at_cursors(&self.cursors, count, Side::After);
        self.cursors.settle_after_removal(&self.buffer, &removed);
    }

    // -- Line edits ---------------------------------------------------------

    /// Open an empty line below (`After`) or above (`Before`) every cursor's
    /// line and put each cursor at its start.
    pub fn open_line(&mut self, side: Side) {
        let mut targets = self.cursors.positions();
        let mut done = vec![false; targets.len()];
        for (index, pos) in self.cursors.descending() {
            self.buffer.insert_line(pos.line, "", side);
            let new_line = match side {
                Side::After => pos.line + 1,
                Side::Before => pos.line,
            };
            for (t, _) in targets.iter_mut().zip(&done).filter(|&(_, &d)| d) {
                if t.line >= new_line {
                    t.line += 1;
                }
            }
            targets[index] = Position::new(new_line, 0);
            done[index] = true;
        }
        self.cursors.place(&self.buffer, &targets);
    }

    /// Remove `count` whole lines starting at the primary cursor's line.
    /// The primary cursor lands at column 0 of the line that took their
    /// place. Returns the number of lines removed.
    pub fn remove_lines(&mut self, count: usize) -> usize {
        let start = self.primary().line;
        let removed = self.buffer.remove_lines(start, count);
        self.cursors
            .shift_for_removed_lines(&self.buffer, start, removed);
        self.set_primary(Position::new(start, 0));
        self.log(|| debug!(target: "ovi::document", start, removed, "lines removed"));
        removed
    }

    /// Replace `count` lines starting at the primary cursor's line with one
    /// empty line, cursor at its start.
    pub fn clear_lines(&mut self, count: usize) {
        let start = self.primary().line;
        let len = self.buffer.line_len(start).unwrap_or(0);
        self.buffer
            .remove_range(Range::ordered(Position::new(start, 0), Position::new(start, len)));
        let extra = self.buffer.remove_lines(start + 1, count.saturating_sub(1));
        self.cursors
            .shift_for_removed_lines(&self.buffer, start + 1, extra);
        self.cursors.clamp_all(&self.buffer);
        self.set_primary(Position::new(start, 0));
    }

    /// Remove the text between the primary cursor and `target`, in either
    /// direction, `target` exclusive. The primary cursor ends at the start
    /// of the removed span.
    pub fn remove_to(&mut self, target: Position) {
        let range = Range::ordered(self.primary(), target);
        if range.is_empty() {
            return;
        }
        self.buffer.remove_range(range);
        self.cursors.shift_for_removed_range(&self.buffer, range);
        self.log(|| debug!(target: "ovi::document", ?range, "range removed"));
    }

    // -- Persistence --------------------------------------------------------

    /// Replace the content with the file at `path` and adopt it as this
    /// document's file. A missing file gives one empty line.
    ///
    /// # Errors
    ///
    /// [`LoadError::Read`] for any failure other than the file not existing.
    /// The document is unchanged then.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        let buffer = match fs::read_to_string(path) {
            Ok(text) => Buffer::from_text(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.log(|| info!(target: "ovi::document", path = %path.display(), "new file"));
                Buffer::new()
            }
            Err(source) => {
                self.log(|| warn!(target: "ovi::document", path = %path.display(), error = %source, "load failed"));
                return Err(LoadError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        self.log(|| {
            info!(
                target: "ovi::document",
                path = %path.display(),
                lines = buffer.line_count(),
                ending = %buffer.line_ending(),
                "loaded"
            );
        });
        self.cursors = fresh_cursors(&buffer, &self.options);
        self.buffer = buffer;
        self.selection = Selection::new();
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the buffer to `name`, or to the document's own path.
    ///
    /// Writing to a name other than the loaded one is refused when that file
    /// already exists, unless `force`. An existing target is first copied to
    /// `<path><backup_suffix>` when backups are on. On success the target
    /// becomes the document's path and the modified flag clears; on failure
    /// nothing about the document changes.
    ///
    /// # Errors
    ///
    /// One [`SaveError`] variant per failure kind.
    pub fn save(&mut self, name: Option<&Path>, force: bool) -> Result<PathBuf, SaveError> {
        let diag = self.diag.clone();
        diag.in_scope(|| {
            let result = self.write_out(name, force);
            match &result {
                Ok(path) => info!(
                    target: "ovi::document",
                    path = %path.display(),
                    lines = self.buffer.line_count(),
                    "saved"
                ),
                Err(e) => warn!(target: "ovi::document", error = %e, "save failed"),
            }
            result
        })
    }

    fn write_out(&mut self, name: Option<&Path>, force: bool) -> Result<PathBuf, SaveError> {
        let renamed = name.is_some_and(|n| Some(n) != self.path.as_deref());
        let target = name
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .ok_or(SaveError::NoName)?;

        let existing = match fs::metadata(&target) {
            Ok(meta) => Some(meta),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => return Err(SaveError::Stat { path: target, source }),
        };
        if renamed && existing.is_some() && !force {
            return Err(SaveError::WouldOverwrite { path: target });
        }

        if existing.is_some() && self.options.create_backup {
            let backup = backup_path(&target, &self.options.backup_suffix);
            fs::copy(&target, &backup).map_err(|source| SaveError::Backup {
                path: backup.clone(),
                source,
            })?;
            debug!(target: "ovi::document", backup = %backup.display(), "backup written");
        }

        // Written beside the target and renamed over it, so the old file
        // stays whole until the new one is complete.
        let parent = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(parent).map_err(|source| SaveError::Create {
            path: target.clone(),
            source,
        })?;
        let write_err = |source| SaveError::Write {
            path: target.clone(),
            source,
        };
        if let Some(meta) = &existing {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(write_err)?;
        }
        let mut out = BufWriter::new(tmp);
        out.write_all(self.buffer.to_file_text().as_bytes())
            .and_then(|()| out.flush())
            .map_err(write_err)?;
        out.into_inner()
            .map_err(|e| write_err(e.into_error()))?
            .persist(&target)
            .map_err(|e| write_err(e.error))?;

        self.buffer.mark_saved();
        self.path = Some(target.clone());
        Ok(target)
    }

    fn log(&self, f: impl FnOnce()) {
        self.diag.in_scope(f);
    }
}

fn fresh_cursors(buffer: &Buffer, options: &Options) -> CursorSet {
    let mut cursors = CursorSet::new(Cursor::new(buffer, 0, 0));
    cursors.set_track_column(options.track_desired_column);
    cursors
}

fn backup_path(target: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    fn doc(lines: &[&str]) -> Document {
        Document::from_buffer(Buffer::from_lines(lines), Options::default(), Diagnostics::disabled())
    }

    fn lines(doc: &Document) -> Vec<String> {
        doc.buffer().get_lines(0, doc.buffer().line_count())
    }

    // -- Typing -------------------------------------------------------------

    #[test]
    fn insert_char_advances_every_cursor() {
        let mut d = doc(&["ab", "cd"]);
        d.set_primary(p(0, 1));
        d.add_cursor(p(1, 1));
        d.insert_char('x');
        d.insert_char('y');
        assert_eq!(lines(&d), vec!["axyb", "cxyd"]);
        assert_eq!(d.cursors().positions(), vec![p(0, 3), p(1, 3)]);
    }

    #[test]
    fn insert_char_two_cursors_same_line() {
        let mut d = doc(&["abcd"]);
        d.set_primary(p(0, 3));
        d.add_cursor(p(0, 1));
        d.insert_char('-');
        d.insert_char('-');
        assert_eq!(lines(&d), vec!["a--bc--d"]);
        assert_eq!(d.cursors().positions(), vec![p(0, 7), p(0, 3)]);
    }

    #[test]
    fn insert_text_splits_on_line_breaks() {
        let mut d = doc(&["ad"]);
        d.set_primary(p(0, 1));
        d.insert_text("b\r\nc");
        assert_eq!(lines(&d), vec!["ab", "cd"]);
        assert_eq!(d.primary(), p(1, 1));
    }

    #[test]
    fn newline_char_splits() {
        let mut d = doc(&["ab"]);
        d.set_primary(p(0, 1));
        d.insert_char('\n');
        assert_eq!(lines(&d), vec!["a", "b"]);
        assert_eq!(d.primary(), p(1, 0));
    }

    #[test]
    fn split_places_cursors_on_new_lines() {
        let mut d = doc(&["ab", "cd"]);
        d.set_primary(p(0, 1));
        d.add_cursor(p(1, 1));
        d.split_lines();
        assert_eq!(lines(&d), vec!["a", "b", "c", "d"]);
        assert_eq!(d.cursors().positions(), vec![p(1, 0), p(3, 0)]);
    }

    // -- Removal ------------------------------------------------------------

    #[test]
    fn remove_before_moves_back_by_removed_count() {
        let mut d = doc(&["abc", "xy"]);
        d.set_primary(p(0, 2));
        d.add_cursor(p(1, 0));
        d.remove_before(5);
        assert_eq!(lines(&d), vec!["c", "xy"]);
        assert_eq!(d.cursors().positions(), vec![p(0, 0), p(1, 0)]);
    }

    #[test]
    fn remove_after_keeps_cursor_and_line() {
        let mut d = doc(&["abc", "de"]);
        d.set_primary(p(0, 1));
        d.remove_after(10);
        assert_eq!(lines(&d), vec!["a", "de"]);
        assert_eq!(d.primary(), p(0, 1));
    }

    #[test]
    fn remove_after_same_line_cursors() {
        let mut d = doc(&["abcdef"]);
        d.set_primary(p(0, 1));
        d.add_cursor(p(0, 4));
        d.remove_after(1);
        assert_eq!(lines(&d), vec!["acdf"]);
        assert_eq!(d.cursors().positions(), vec![p(0, 1), p(0, 3)]);
    }

    // -- Lines --------------------------------------------------------------

    #[test]
    fn open_line_below_and_above() {
        let mut d = doc(&["one", "two"]);
        d.set_primary(p(0, 2));
        d.open_line(Side::After);
        assert_eq!(lines(&d), vec!["one", "", "two"]);
        assert_eq!(d.primary(), p(1, 0));

        d.set_primary(p(2, 1));
        d.open_line(Side::Before);
        assert_eq!(lines(&d), vec!["one", "", "", "two"]);
        assert_eq!(d.primary(), p(2, 0));
    }

    #[test]
    fn open_line_with_two_cursors() {
        let mut d = doc(&["a", "b"]);
        d.add_cursor(p(1, 0));
        d.open_line(Side::After);
        assert_eq!(lines(&d), vec!["a", "", "b", ""]);
        assert_eq!(d.cursors().positions(), vec![p(1, 0), p(3, 0)]);
    }

    #[test]
    fn remove_lines_from_primary() {
        let mut d = doc(&["a", "b", "c", "d"]);
        d.set_primary(p(1, 0));
        d.add_cursor(p(3, 1));
        assert_eq!(d.remove_lines(2), 2);
        assert_eq!(lines(&d), vec!["a", "d"]);
        assert_eq!(d.cursors().positions(), vec![p(1, 0), p(1, 1)]);
    }

    #[test]
    fn remove_lines_past_end_is_clamped() {
        let mut d = doc(&["a", "b", "c"]);
        d.set_primary(p(1, 0));
        assert_eq!(d.remove_lines(10), 2);
        assert_eq!(lines(&d), vec!["a"]);
        assert_eq!(d.primary(), p(0, 0));
    }

    #[test]
    fn clear_lines_leaves_one_empty_line() {
        let mut d = doc(&["a", "bb", "cc", "d"]);
        d.set_primary(p(1, 1));
        d.clear_lines(2);
        assert_eq!(lines(&d), vec!["a", "", "d"]);
        assert_eq!(d.primary(), p(1, 0));
    }

    #[test]
    fn remove_to_motion_target() {
        let mut d = doc(&["foo bar baz"]);
        d.set_primary(p(0, 4));
        let end = word::word_operand_end(d.buffer(), d.primary());
        d.remove_to(end);
        assert_eq!(lines(&d), vec!["foo baz"]);
        assert_eq!(d.primary(), p(0, 4));

        let start = word::word_backward(d.buffer(), d.primary());
        d.remove_to(start);
        assert_eq!(lines(&d), vec!["baz"]);
        assert_eq!(d.primary(), p(0, 0));
    }

    // -- Motion -------------------------------------------------------------

    #[test]
    fn jump_cursors_repeats_and_stops() {
        let mut d = doc(&["This is the first line.", "", "  leading space"]);
        d.jump_cursors(word::big_word_forward, 1);
        assert_eq!(d.primary(), p(0, 5));
        d.set_primary(p(0, 19));
        d.jump_cursors(word::big_word_forward, 1);
        assert_eq!(d.primary(), p(1, 0));
        d.jump_cursors(word::big_word_forward, 100);
        assert_eq!(d.primary(), p(2, 14));
    }

    #[test]
    fn track_option_reaches_cursors() {
        let opts = Options {
            track_desired_column: true,
            ..Options::default()
        };
        let mut d = Document::from_buffer(
            Buffer::from_lines(["long line", "", "long line"]),
            opts,
            Diagnostics::disabled(),
        );
        d.set_primary(p(0, 6));
        d.move_cursors(Direction::Down, 2);
        assert_eq!(d.primary(), p(2, 6));
    }

    #[test]
    fn selection_tracks_primary_copy() {
        let mut d = doc(&["abc", "def"]);
        d.set_primary(p(0, 1));
        d.begin_selection(Shape::Fluid);
        d.move_cursors(Direction::Down, 1);
        assert_eq!(d.selection().end(), p(0, 1));
        d.update_selection();
        assert_eq!(d.selection().start(), p(0, 1));
        assert_eq!(d.selection().end(), p(1, 1));
        d.cancel_selection();
        assert!(!d.selection().is_enabled());
    }

    // -- Persistence --------------------------------------------------------

    #[test]
    fn load_missing_file_is_empty_and_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let d = Document::open(&path, Options::default(), Diagnostics::disabled()).unwrap();
        assert_eq!(lines(&d), vec![""]);
        assert_eq!(d.path(), Some(path.as_path()));
        assert!(!d.is_modified());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut d = doc(&["first", "", "  third", "last"]);
        d.insert_char('!');
        assert!(d.is_modified());
        d.save(Some(&path), false).unwrap();
        assert!(!d.is_modified());
        assert_eq!(fs::read_to_string(&path).unwrap(), "!first\n\n  third\nlast\n");

        let back = Document::open(&path, Options::default(), Diagnostics::disabled()).unwrap();
        assert_eq!(lines(&back), lines(&d));
    }

    #[test]
    fn save_without_name_fails() {
        let mut d = doc(&["x"]);
        d.insert_char('y');
        assert!(matches!(d.save(None, false), Err(SaveError::NoName)));
        assert!(d.is_modified());
    }

    #[test]
    fn save_refuses_to_overwrite_other_file() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.txt");
        fs::write(&other, "keep me\n").unwrap();

        let mut d = doc(&["mine"]);
        let err = d.save(Some(&other), false).unwrap_err();
        assert!(matches!(err, SaveError::WouldOverwrite { .. }));
        assert_eq!(fs::read_to_string(&other).unwrap(), "keep me\n");
        assert_eq!(d.path(), None);

        d.save(Some(&other), true).unwrap();
        assert_eq!(fs::read_to_string(&other).unwrap(), "mine\n");
    }

    #[test]
    fn save_over_loaded_file_makes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "old\r\n").unwrap();

        let mut d = Document::open(&path, Options::default(), Diagnostics::disabled()).unwrap();
        d.insert_text("new ");
        d.save(None, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new old\r\n");
        assert_eq!(fs::read_to_string(dir.path().join("f.txt.bak")).unwrap(), "old\r\n");
    }

    #[test]
    fn backup_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        fs::write(&path, "old\n").unwrap();
        let opts = Options {
            create_backup: false,
            ..Options::default()
        };
        let mut d = Document::open(&path, opts, Diagnostics::disabled()).unwrap();
        d.save(None, false).unwrap();
        assert!(!dir.path().join("f.txt.bak").exists());
    }

    #[test]
    fn failed_create_keeps_content_and_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("f.txt");
        let mut d = doc(&["precious"]);
        d.insert_char('!');
        let err = d.save(Some(&path), false).unwrap_err();
        assert!(matches!(err, SaveError::Create { .. }));
        assert!(d.is_modified());
        assert_eq!(lines(&d), vec!["!precious"]);
        assert_eq!(d.path(), None);
    }

    #[test]
    fn failed_save_leaves_target_intact() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be renamed over.
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("inside.txt"), "old contents\n").unwrap();
        let opts = Options {
            create_backup: false,
            ..Options::default()
        };
        let mut d = Document::from_buffer(Buffer::from_lines(["new"]), opts, Diagnostics::disabled());
        d.insert_char('!');

        let err = d.save(Some(&path), true).unwrap_err();
        assert!(matches!(err, SaveError::Write { .. }));
        assert!(d.is_modified());
        assert_eq!(fs::read_to_string(path.join("inside.txt")).unwrap(), "old contents\n");
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
        assert_eq!(names, vec![OsString::from("taken")]);
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, "echo hi\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        let mut d = Document::open(&path, Options::default(), Diagnostics::disabled()).unwrap();
        d.insert_char('#');
        d.save(None, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "#echo hi\n");
        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o755);
    }
}
