//! Command-buffer grammar.
//!
//! In Navigation mode, digits and command letters accumulate in a pending
//! buffer. After every handled key the buffer is parsed:
//!
//! ```text
//! invocation := count? simple
//!             | count? operator count? (operator | motion)
//!             | count? "g" "g" | count? "G"
//!             | "Z" ("Z" | "Q")
//! count      := [1-9] [0-9]*
//! simple     := motion | "x" | "X"
//! motion     := "h" | "j" | "k" | "l" | "w" | "b" | "W" | "B" | "0" | "$"
//! operator   := "d" | "c"
//! ```
//!
//! A `0` that does not follow a nonzero digit is the line-start motion, not
//! part of a count. The counts before and after an operator multiply, so
//! `2d3d` removes six lines. Counts saturate at a configured maximum.

use std::fmt;

/// Every char the pending buffer accepts.
pub const ALPHABET: &str = "0123456789hjklwbWBxXdcgG$ZQ";

/// True if `ch` may be appended to the pending buffer.
#[must_use]
pub fn in_alphabet(ch: char) -> bool {
    ALPHABET.contains(ch)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Left,
    Down,
    Up,
    Right,
    WordForward,
    WordBackward,
    BigWordForward,
    BigWordBackward,
    LineStart,
    LineEnd,
}

impl Motion {
    const fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            'h' => Self::Left,
            'j' => Self::Down,
            'k' => Self::Up,
            'l' => Self::Right,
            'w' => Self::WordForward,
            'b' => Self::WordBackward,
            'W' => Self::BigWordForward,
            'B' => Self::BigWordBackward,
            '0' => Self::LineStart,
            '$' => Self::LineEnd,
            _ => return None,
        })
    }
}

/// What an operator applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Whole lines (`dd`, `cc`).
    Lines,
    /// From the cursor to where a motion lands.
    Motion(Motion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Move(Motion),
    /// `x`
    RemoveAfter,
    /// `X`
    RemoveBefore,
    /// `d`
    Delete(Target),
    /// `c`
    Change(Target),
    /// `gg`
    GotoFirst,
    /// `G`
    GotoLast,
    /// `ZZ`
    SaveQuit,
    /// `ZQ`
    ForceQuit,
}

/// A complete command with the count typed for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Invocation {
    /// The typed count, `None` when no digits were typed at all.
    pub raw_count: Option<usize>,
    pub action: Action,
}

impl Invocation {
    /// The repeat count, 1 when none was typed.
    #[must_use]
    pub fn count(&self) -> usize {
        self.raw_count.unwrap_or(1)
    }
}

/// Outcome of parsing the pending buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parse {
    /// A command is ready; execute it and clear the buffer.
    Complete(Invocation),
    /// A valid prefix; keep the buffer and wait for more input.
    Incomplete,
    /// No command starts this way; discard the buffer.
    Invalid,
}

impl fmt::Display for Parse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete(inv) => write!(f, "{:?} x{}", inv.action, inv.count()),
            Self::Incomplete => f.write_str("incomplete"),
            Self::Invalid => f.write_str("invalid"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a pending buffer. Counts above `max_count` saturate to it.
#[must_use]
pub fn parse(buffer: &str, max_count: usize) -> Parse {
    let (outer, rest) = take_count(buffer);
    let mut chars = rest.chars();
    let Some(first) = chars.next() else {
        return Parse::Incomplete;
    };
    let tail = chars.as_str();

    let (inner, action) = match first {
        'x' if tail.is_empty() => (None, Action::RemoveAfter),
        'X' if tail.is_empty() => (None, Action::RemoveBefore),
        'G' if tail.is_empty() => (None, Action::GotoLast),
        'g' => match tail {
            "" => return Parse::Incomplete,
            "g" => (None, Action::GotoFirst),
            _ => return Parse::Invalid,
        },
        'Z' if outer.is_none() => match tail {
            "" => return Parse::Incomplete,
            "Z" => (None, Action::SaveQuit),
            "Q" => (None, Action::ForceQuit),
            _ => return Parse::Invalid,
        },
        'd' | 'c' => match parse_operand(first, tail) {
            Operand::Done(inner, target) => {
                let action = if first == 'd' {
                    Action::Delete(target)
                } else {
                    Action::Change(target)
                };
                (inner, action)
            }
            Operand::Incomplete => return Parse::Incomplete,
            Operand::Invalid => return Parse::Invalid,
        },
        ch => match Motion::from_char(ch) {
            Some(motion) if tail.is_empty() => (None, Action::Move(motion)),
            _ => return Parse::Invalid,
        },
    };

    let raw_count = match (outer, inner) {
        (None, None) => None,
        (a, b) => Some(
            a.unwrap_or(1)
                .saturating_mul(b.unwrap_or(1))
                .min(max_count.max(1)),
        ),
    };
    Parse::Complete(Invocation { raw_count, action })
}

enum Operand {
    Done(Option<usize>, Target),
    Incomplete,
    Invalid,
}

/// Parse what follows operator `op`: an optional count, then either `op`
/// again or a motion.
fn parse_operand(op: char, input: &str) -> Operand {
    let (count, rest) = take_count(input);
    let mut chars = rest.chars();
    let Some(ch) = chars.next() else {
        return Operand::Incomplete;
    };
    if !chars.as_str().is_empty() {
        return Operand::Invalid;
    }
    if ch == op {
        return Operand::Done(count, Target::Lines);
    }
    Motion::from_char(ch).map_or(Operand::Invalid, |m| Operand::Done(count, Target::Motion(m)))
}

/// Split a leading count off `input`. A leading `0` is not a count.
fn take_count(input: &str) -> (Option<usize>, &str) {
    if !input.starts_with(|c: char| matches!(c, '1'..='9')) {
        return (None, input);
    }
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let count = input[..end]
        .bytes()
        .fold(0usize, |n, b| n.saturating_mul(10).saturating_add(usize::from(b - b'0')));
    (Some(count), &input[end..])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
