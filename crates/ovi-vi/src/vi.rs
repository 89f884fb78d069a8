//! The vi emulation: mode state, pending command buffer, dispatch.
//!
//! For every event the engine walks its rule table in priority order and
//! runs the handlers of matching rules until one reports the event handled.
//! It then parses the pending buffer, runs a completed command, and copies
//! the primary cursor into a live selection's end.
//!
//! Requests the engine cannot serve itself (save, quit, error display) go
//! to the host over the channel given to [`Vi::new`].

use std::fmt;

use tracing::{debug, trace, warn};

use ovi_text::buffer::Side;
use ovi_text::cursor::Direction;
use ovi_text::diagnostics::Diagnostics;
use ovi_text::document::Document;
use ovi_text::emulation::{HandlesEvents, ReportsStatus, Request, Requests};
use ovi_text::event::{Event, InputId, Key, KeyEvent};
use ovi_text::position::Position;
use ovi_text::selection::Shape;
use ovi_text::word;

use crate::command::{self, Action, Invocation, Motion, Parse, Target};
use crate::dispatch::{Pattern, Scope, Table};
use crate::mode::Mode;

type Handler = fn(&mut Vi, &mut Document, &Event) -> bool;

pub struct Vi {
    mode: Mode,
    pending: String,
    rules: Table<Handler>,
    requests: Requests,
    diag: Diagnostics,
}

impl Vi {
    #[must_use]
    pub fn new(requests: Requests, diag: Diagnostics) -> Self {
        Self {
            mode: Mode::Navigation,
            pending: String::new(),
            rules: rules(),
            requests,
            diag,
        }
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The not yet complete command typed so far.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.pending
    }

    // -- Dispatch -----------------------------------------------------------

    fn dispatch(&mut self, doc: &mut Document, source: InputId, event: &Event) -> bool {
        if source != InputId::MAIN {
            debug!(target: "ovi::vi", %source, "event for unknown input");
            return false;
        }
        let handled = self
            .rules
            .matching(self.mode, event)
            .into_iter()
            .any(|handler| handler(self, doc, event));
        if !handled {
            trace!(target: "ovi::vi", ?event, mode = %self.mode, "not handled");
            return false;
        }
        self.run_pending(doc);
        doc.update_selection();
        true
    }

    fn run_pending(&mut self, doc: &mut Document) {
        if self.pending.is_empty() {
            return;
        }
        match command::parse(&self.pending, doc.options().max_count) {
            Parse::Complete(inv) => {
                debug!(target: "ovi::vi", buffer = %self.pending, action = ?inv.action, count = inv.count(), "command");
                self.pending.clear();
                self.execute(doc, inv);
            }
            Parse::Incomplete => {}
            Parse::Invalid => {
                debug!(target: "ovi::vi", buffer = %self.pending, "discarding invalid command");
                self.pending.clear();
            }
        }
    }

    fn execute(&mut self, doc: &mut Document, inv: Invocation) {
        let n = inv.count();
        match inv.action {
            Action::Move(motion) => apply_motion(doc, motion, n),
            Action::RemoveAfter => doc.remove_after(n),
            Action::RemoveBefore => doc.remove_before(n),
            Action::Delete(target) => delete(doc, target, n),
            Action::Change(Target::Lines) => {
                doc.clear_lines(n);
                self.set_mode(Mode::Insertion);
            }
            Action::Change(target) => {
                delete(doc, target, n);
                self.set_mode(Mode::Insertion);
            }
            Action::GotoFirst => doc.goto_line(inv.raw_count.map_or(0, |c| c.saturating_sub(1))),
            Action::GotoLast => {
                let last = doc.buffer().line_count() - 1;
                doc.goto_line(inv.raw_count.map_or(last, |c| c.saturating_sub(1)));
            }
            Action::SaveQuit => {
                self.request(Request::Save {
                    name: None,
                    force: false,
                });
                self.request(Request::Quit { force: false });
            }
            Action::ForceQuit => self.request(Request::Quit { force: true }),
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(target: "ovi::vi", from = %self.mode, to = %mode, "mode");
            self.mode = mode;
        }
    }

    fn request(&self, request: Request) {
        if self.requests.send(request).is_err() {
            warn!(target: "ovi::vi", "host stopped listening for requests");
        }
    }

    // -- Handlers -----------------------------------------------------------

    fn move_cursors(&mut self, doc: &mut Document, event: &Event) -> bool {
        let dir = match event {
            Event::Key(KeyEvent { key, .. }) => match key {
                Key::Left => Direction::Left,
                Key::Right => Direction::Right,
                Key::Up => Direction::Up,
                Key::Down => Direction::Down,
                Key::Home => Direction::LineStart,
                Key::End => Direction::LineEnd,
                _ => return false,
            },
            Event::Character(_) => return false,
        };
        doc.move_cursors(dir, 1);
        true
    }

    fn to_navigation(&mut self, _doc: &mut Document, _event: &Event) -> bool {
        self.set_mode(Mode::Navigation);
        true
    }

    fn cancel(&mut self, doc: &mut Document, _event: &Event) -> bool {
        self.pending.clear();
        doc.cancel_selection();
        true
    }

    fn to_insertion(&mut self, doc: &mut Document, event: &Event) -> bool {
        let Event::Character(ch) = *event else {
            return false;
        };
        match ch {
            'i' => {}
            'I' => doc.move_cursors(Direction::LineStart, 1),
            'a' => doc.move_cursors(Direction::Right, 1),
            'A' => doc.move_cursors(Direction::LineEnd, 1),
            'o' => doc.open_line(Side::After),
            'O' => doc.open_line(Side::Before),
            _ => return false,
        }
        self.pending.clear();
        self.set_mode(Mode::Insertion);
        true
    }

    fn select(&mut self, doc: &mut Document, event: &Event) -> bool {
        let shape = match event {
            Event::Character('v') => Shape::Fluid,
            Event::Character('V') => Shape::Lines,
            Event::Key(_) => Shape::Block,
            Event::Character(_) => return false,
        };
        let (enabled, current) = (doc.selection().is_enabled(), doc.selection().shape());
        if !enabled {
            doc.begin_selection(shape);
        } else if current == shape {
            doc.cancel_selection();
        } else {
            doc.reshape_selection(shape);
        }
        self.pending.clear();
        true
    }

    fn edit_key(&mut self, doc: &mut Document, event: &Event) -> bool {
        let Event::Key(KeyEvent { key, .. }) = event else {
            return false;
        };
        match key {
            Key::Enter => doc.split_lines(),
            Key::Backspace => doc.remove_before(1),
            Key::Delete => doc.remove_after(1),
            Key::Tab => {
                let tab = doc.options().tab_text();
                doc.insert_text(&tab);
            }
            _ => return false,
        }
        true
    }

    fn command_char(&mut self, _doc: &mut Document, event: &Event) -> bool {
        let Event::Character(ch) = *event else {
            return false;
        };
        if command::in_alphabet(ch) {
            self.pending.push(ch);
            true
        } else {
            if !self.pending.is_empty() {
                debug!(target: "ovi::vi", buffer = %self.pending, %ch, "unrecognized, discarding");
            }
            self.pending.clear();
            false
        }
    }

    fn insert_char(&mut self, doc: &mut Document, event: &Event) -> bool {
        let Event::Character(ch) = *event else {
            return false;
        };
        doc.insert_char(ch);
        true
    }
}

impl HandlesEvents for Vi {
    fn handle_event(&mut self, doc: &mut Document, source: InputId, event: &Event) -> bool {
        let diag = self.diag.clone();
        diag.in_scope(|| self.dispatch(doc, source, event))
    }
}

impl ReportsStatus for Vi {
    fn status(&self, doc: &Document) -> String {
        let pos = doc.primary();
        let modified = if doc.is_modified() { "(modified) " } else { "" };
        format!(
            "{}{} {}   {}  row {} col {}",
            self.mode.status_prefix(),
            doc.display_name(),
            modified,
            self.pending,
            pos.line + 1,
            pos.col + 1
        )
    }
}

impl fmt::Debug for Vi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vi")
            .field("mode", &self.mode)
            .field("pending", &self.pending)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

fn keys(keys: &[Key]) -> Pattern {
    Pattern::AnyOf(keys.iter().map(|&k| Event::from(k)).collect())
}

fn chars(chars: &str) -> Pattern {
    Pattern::AnyOf(chars.chars().map(Event::Character).collect())
}

fn rules() -> Table<Handler> {
    Table::<Handler>::new()
        .rule(
            Scope::Any,
            keys(&[Key::Left, Key::Right, Key::Up, Key::Down, Key::Home, Key::End]),
            Vi::move_cursors,
        )
        .rule(Scope::Insertion, Pattern::One(Key::Escape.into()), Vi::to_navigation)
        .rule(Scope::Navigation, Pattern::One(Key::Escape.into()), Vi::cancel)
        .rule(Scope::Navigation, chars("iIaAoO"), Vi::to_insertion)
        .rule(Scope::Navigation, chars("vV"), Vi::select)
        .rule(
            Scope::Navigation,
            Pattern::One(KeyEvent::ctrl(Key::Char('v')).into()),
            Vi::select,
        )
        .rule(
            Scope::Insertion,
            keys(&[Key::Enter, Key::Backspace, Key::Delete, Key::Tab]),
            Vi::edit_key,
        )
        .rule(Scope::Navigation, Pattern::AnyCharacter, Vi::command_char)
        .rule(Scope::Insertion, Pattern::AnyCharacter, Vi::insert_char)
}

// ---------------------------------------------------------------------------
// Motions and operators
// ---------------------------------------------------------------------------

fn apply_motion(doc: &mut Document, motion: Motion, n: usize) {
    match motion {
        Motion::Left => doc.move_cursors(Direction::Left, n),
        Motion::Down => doc.move_cursors(Direction::Down, n),
        Motion::Up => doc.move_cursors(Direction::Up, n),
        Motion::Right => doc.move_cursors(Direction::Right, n),
        Motion::LineStart => doc.move_cursors(Direction::LineStart, 1),
        Motion::LineEnd => doc.move_cursors(Direction::LineEnd, 1),
        Motion::WordForward => doc.jump_cursors(word::word_forward, n),
        Motion::WordBackward => doc.jump_cursors(word::word_backward, n),
        Motion::BigWordForward => doc.jump_cursors(word::big_word_forward, n),
        Motion::BigWordBackward => doc.jump_cursors(word::big_word_backward, n),
    }
}

/// Apply `d` to a target, `n` times over, from the primary cursor.
fn delete(doc: &mut Document, target: Target, n: usize) {
    let motion = match target {
        Target::Lines => {
            doc.remove_lines(n);
            return;
        }
        Target::Motion(m) => m,
    };
    let pos = doc.primary();
    let len = doc.buffer().line_len(pos.line).unwrap_or(0);
    let end = match motion {
        // Vertical motions under an operator cover whole lines.
        Motion::Down => {
            doc.remove_lines(n.saturating_add(1));
            return;
        }
        Motion::Up => {
            let top = pos.line.saturating_sub(n);
            doc.set_primary(Position::new(top, 0));
            doc.remove_lines(pos.line - top + 1);
            return;
        }
        Motion::Left => Position::new(pos.line, pos.col.saturating_sub(n)),
        Motion::Right => Position::new(pos.line, pos.col.saturating_add(n).min(len)),
        Motion::LineStart => pos.line_start(),
        Motion::LineEnd => Position::new(pos.line, len),
        Motion::WordForward => word::repeat(doc.buffer(), word::word_operand_end, pos, n),
        Motion::BigWordForward => word::repeat(doc.buffer(), word::big_word_operand_end, pos, n),
        Motion::WordBackward => word::repeat(doc.buffer(), word::word_backward, pos, n),
        Motion::BigWordBackward => word::repeat(doc.buffer(), word::big_word_backward, pos, n),
    };
    doc.remove_to(end);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
