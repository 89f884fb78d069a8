//! Mode-scoped dispatch table.
//!
//! An ordered list of rules. Each rule is scoped to a mode (or to any mode),
//! matches one event, a set of alternative events, or any typed character,
//! and names a handler. Rules are tried in order; the caller runs the
//! handlers of matching rules until one reports the event handled.

use ovi_text::event::Event;

use crate::mode::Mode;

/// Which modes a rule applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Any,
    Navigation,
    Insertion,
}

impl Scope {
    #[must_use]
    pub const fn admits(self, mode: Mode) -> bool {
        matches!(
            (self, mode),
            (Self::Any, _) | (Self::Navigation, Mode::Navigation) | (Self::Insertion, Mode::Insertion)
        )
    }
}

/// What a rule matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    One(Event),
    AnyOf(Vec<Event>),
    /// Any [`Event::Character`].
    AnyCharacter,
}

impl Pattern {
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::One(e) => e == event,
            Self::AnyOf(events) => events.contains(event),
            Self::AnyCharacter => matches!(event, Event::Character(_)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule<H> {
    pub scope: Scope,
    pub pattern: Pattern,
    pub handler: H,
}

/// Rules in priority order.
#[derive(Debug, Clone)]
pub struct Table<H> {
    rules: Vec<Rule<H>>,
}

impl<H: Copy> Table<H> {
    #[must_use]
    pub const fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule with the lowest priority so far.
    #[must_use]
    pub fn rule(mut self, scope: Scope, pattern: Pattern, handler: H) -> Self {
        self.rules.push(Rule {
            scope,
            pattern,
            handler,
        });
        self
    }

    /// Handlers of every rule matching `event` in `mode`, in priority order.
    #[must_use]
    pub fn matching(&self, mode: Mode, event: &Event) -> Vec<H> {
        self.rules
            .iter()
            .filter(|r| r.scope.admits(mode) && r.pattern.matches(event))
            .map(|r| r.handler)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<H: Copy> Default for Table<H> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ovi_text::event::Key;

    fn table() -> Table<u8> {
        Table::new()
            .rule(Scope::Any, Pattern::One(Key::Left.into()), 1)
            .rule(Scope::Insertion, Pattern::One(Key::Escape.into()), 2)
            .rule(Scope::Navigation, Pattern::One(Key::Escape.into()), 3)
            .rule(Scope::Navigation, Pattern::AnyOf(vec!['i'.into(), 'a'.into()]), 4)
            .rule(Scope::Navigation, Pattern::AnyCharacter, 5)
    }

    #[test]
    fn any_scope_matches_every_mode() {
        let t = table();
        assert_eq!(t.matching(Mode::Navigation, &Key::Left.into()), vec![1]);
        assert_eq!(t.matching(Mode::Insertion, &Key::Left.into()), vec![1]);
    }

    #[test]
    fn scope_selects_by_mode() {
        let t = table();
        assert_eq!(t.matching(Mode::Insertion, &Key::Escape.into()), vec![2]);
        assert_eq!(t.matching(Mode::Navigation, &Key::Escape.into()), vec![3]);
    }

    #[test]
    fn matches_keep_priority_order() {
        let t = table();
        assert_eq!(t.matching(Mode::Navigation, &'a'.into()), vec![4, 5]);
        assert_eq!(t.matching(Mode::Navigation, &'z'.into()), vec![5]);
    }

    #[test]
    fn unmatched_event_yields_nothing() {
        let t = table();
        assert!(t.matching(Mode::Insertion, &'z'.into()).is_empty());
        assert!(t.matching(Mode::Navigation, &Key::Enter.into()).is_empty());
        assert_eq!(t.len(), 5);
    }
}
