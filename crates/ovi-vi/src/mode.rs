//! Vi modes.
//!
//! The engine is always in exactly one [`Mode`]:
//!
//! | Mode       | Status prefix  | Purpose              |
//! |------------|----------------|----------------------|
//! | Navigation | (none)         | Motions, commands    |
//! | Insertion  | `--INSERT-- `  | Typing text          |

use std::fmt;

/// The current editing mode.
///
/// Pure data: key dispatch and transitions live in [`crate::vi`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are commands, not text.
    #[default]
    Navigation,
    /// Keys produce characters in the buffer.
    Insertion,
}

impl Mode {
    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Navigation => "NAVIGATION",
            Self::Insertion => "INSERT",
        }
    }

    /// Prefix shown at the start of the status line.
    #[must_use]
    pub const fn status_prefix(self) -> &'static str {
        match self {
            Self::Navigation => "",
            Self::Insertion => "--INSERT-- ",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_navigation() {
        assert_eq!(Mode::default(), Mode::Navigation);
    }

    #[test]
    fn status_prefixes() {
        assert_eq!(Mode::Navigation.status_prefix(), "");
        assert_eq!(Mode::Insertion.status_prefix(), "--INSERT-- ");
    }

    #[test]
    fn display_uses_name() {
        assert_eq!(format!("{}", Mode::Insertion), "INSERT");
    }
}
