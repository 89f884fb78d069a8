// SPDX-License-Identifier: MIT
//
// Key notation: turns a line of scripted input into events.
//
// Plain characters become `Event::Character`. Named keys go in angle
// brackets, case-insensitive:
//
//   <Esc> <CR> <Enter> <BS> <Del> <Tab>
//   <Left> <Right> <Up> <Down> <Home> <End>
//   <C-x>    Ctrl + x
//   <lt>     a literal '<'

use ovi_text::{Event, Key, KeyEvent};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown key <{0}>")]
    Unknown(String),
    #[error("unterminated key name starting at column {0}")]
    Unterminated(usize),
}

/// Decode one line of key notation.
///
/// # Errors
///
/// [`KeyError`] for an unknown name or a `<` with no closing `>`.
pub fn parse(line: &str) -> Result<Vec<Event>, KeyError> {
    let mut events = Vec::new();
    let mut rest = line;
    while let Some(ch) = rest.chars().next() {
        if ch != '<' {
            events.push(Event::Character(ch));
            rest = &rest[ch.len_utf8()..];
            continue;
        }
        let column = line.len() - rest.len();
        let close = rest.find('>').ok_or(KeyError::Unterminated(column))?;
        events.push(named(&rest[1..close])?);
        rest = &rest[close + 1..];
    }
    Ok(events)
}

fn named(name: &str) -> Result<Event, KeyError> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "lt" => return Ok(Event::Character('<')),
        "esc" => Key::Escape,
        "cr" | "enter" | "return" => Key::Enter,
        "bs" => Key::Backspace,
        "del" => Key::Delete,
        "tab" => Key::Tab,
        "left" => Key::Left,
        "right" => Key::Right,
        "up" => Key::Up,
        "down" => Key::Down,
        "home" => Key::Home,
        "end" => Key::End,
        _ => return ctrl(&lower).ok_or_else(|| KeyError::Unknown(name.to_owned())),
    };
    Ok(key.into())
}

fn ctrl(lower: &str) -> Option<Event> {
    let letter = lower.strip_prefix("c-")?;
    let mut chars = letter.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(KeyEvent::ctrl(Key::Char(ch)).into()),
        _ => None,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_characters() {
        assert_eq!(
            parse("2dw").unwrap(),
            vec![Event::Character('2'), Event::Character('d'), Event::Character('w')]
        );
        assert_eq!(parse("é ").unwrap(), vec![Event::Character('é'), Event::Character(' ')]);
        assert!(parse("").unwrap().is_empty());
    }

    fn k(key: Key) -> Event {
        Event::from(key)
    }

    #[test]
    fn named_keys_any_case() {
        let events = parse("ihi<Esc><cr><BS><del><TAB>").unwrap();
        assert_eq!(
            events[3..].to_vec(),
            vec![
                k(Key::Escape),
                k(Key::Enter),
                k(Key::Backspace),
                k(Key::Delete),
                k(Key::Tab),
            ]
        );
        assert_eq!(
            parse("<Left><Right><Up><Down><Home><End>").unwrap(),
            vec![
                k(Key::Left),
                k(Key::Right),
                k(Key::Up),
                k(Key::Down),
                k(Key::Home),
                k(Key::End),
            ]
        );
    }

    #[test]
    fn ctrl_and_literal_lt() {
        assert_eq!(parse("<C-v>").unwrap(), vec![Event::from(KeyEvent::ctrl(Key::Char('v')))]);
        assert_eq!(
            parse("a<lt>b").unwrap(),
            vec![Event::Character('a'), Event::Character('<'), Event::Character('b')]
        );
    }

    #[test]
    fn errors() {
        assert_eq!(parse("a<Nope>"), Err(KeyError::Unknown("Nope".into())));
        assert_eq!(parse("ab<Esc"), Err(KeyError::Unterminated(2)));
        assert_eq!(parse("<C-vv>"), Err(KeyError::Unknown("C-vv".into())));
    }
}
