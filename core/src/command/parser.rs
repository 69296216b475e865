//! Move notation parser
//!
//! A notation is a comma-separated list of tokens, e.g. `"~D, DF, F, a"`.
//! Unknown characters are skipped, so any string parses.

use super::element::{CommandElement, KeySet};
use super::key::{Button, CommandKey, Direction};
use super::matcher::Command;

/// Byte cursor over one token. Whitespace after each consumed byte is
/// skipped, but `peek_raw` sees the byte immediately following.
struct Cursor<'a> {
    rest: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(token: &'a str) -> Self {
        Self {
            rest: token.as_bytes().trim_ascii(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    fn peek_raw(&self) -> Option<u8> {
        self.rest.get(1).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        if let Some((_, tail)) = self.rest.split_first() {
            self.rest = tail.trim_ascii_start();
        }
        self.peek()
    }
}

impl Command {
    /// Parse a notation into a ready-to-step command.
    pub fn parse(notation: &str) -> Command {
        let mut cmd = Command::default();
        for token in notation.split(',') {
            // a hold marker followed by more tokens becomes a hold requirement
            if cmd.elements.last().is_some_and(|e| e.slash)
                && let Some(prev) = cmd.elements.pop()
            {
                cmd.hold.push(prev.keys);
            }
            let mut elem = CommandElement::default();
            parse_token(token, &mut elem);
            if elem.is_direction() && cmd.elements.last().is_some_and(|p| p.is_direction()) {
                elem.direction = true;
            }
            cmd.elements.push(elem);
        }
        if let Some(last) = cmd.elements.last()
            && last.slash
        {
            cmd.hold.push(last.keys.clone());
        }
        cmd.held = vec![false; cmd.hold.len()];
        cmd
    }
}

fn parse_token(token: &str, elem: &mut CommandElement) {
    let mut cur = Cursor::new(token);
    let mut released = false;

    match cur.peek() {
        Some(b'>') => {
            elem.greater = true;
            match cur.bump() {
                Some(b'/') => {
                    elem.slash = true;
                    cur.bump();
                }
                Some(b'~') => {
                    released = true;
                    parse_charge(&mut cur, elem);
                }
                _ => {}
            }
        }
        Some(b'~') => {
            released = true;
            parse_charge(&mut cur, elem);
        }
        Some(b'/') => {
            elem.slash = true;
            cur.bump();
        }
        _ => {}
    }

    while let Some(ch) = cur.peek() {
        match ch {
            b'$' => {
                // an unknown character after `$` is reconsidered on its own
                match cur.bump() {
                    Some(next @ (b'B' | b'D' | b'F' | b'U')) => {
                        push_direction(&mut cur, &mut elem.keys, next, released, true);
                        released = false;
                    }
                    _ => continue,
                }
            }
            b'B' | b'D' | b'F' | b'U' => {
                push_direction(&mut cur, &mut elem.keys, ch, released, false);
                released = false;
            }
            b'~' => released = true,
            _ => {
                if let Some(button) = Button::from_notation(ch) {
                    elem.keys.push(CommandKey::button(button, released));
                    released = false;
                }
            }
        }
        cur.bump();
    }
}

/// `~N`: digits following the tilde set the charge time. Leaves the cursor
/// on the first non-digit.
fn parse_charge(cur: &mut Cursor<'_>, elem: &mut CommandElement) {
    let mut n: i32 = 0;
    while let Some(d @ b'0'..=b'9') = cur.bump() {
        n = n.saturating_mul(10).saturating_add(i32::from(d - b'0'));
    }
    if n > 0 {
        elem.charge_time = n;
    }
}

fn push_direction(cur: &mut Cursor<'_>, keys: &mut KeySet, ch: u8, released: bool, strict: bool) {
    let dir = match (ch, cur.peek_raw()) {
        (b'D', Some(b'B')) => Some(Direction::DB),
        (b'D', Some(b'F')) => Some(Direction::DF),
        (b'U', Some(b'B')) => Some(Direction::UB),
        (b'U', Some(b'F')) => Some(Direction::UF),
        _ => None,
    };
    let dir = match dir {
        Some(diagonal) => {
            cur.bump();
            diagonal
        }
        None => match ch {
            b'B' => Direction::B,
            b'D' => Direction::D,
            b'F' => Direction::F,
            _ => Direction::U,
        },
    };
    keys.push(CommandKey::direction(dir, released, strict));
}
