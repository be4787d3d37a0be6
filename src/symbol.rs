//! The single input alphabet understood by the game loop.
//!
//! Both the keyboard and the move scripts are decoded through this table:
//!
//! | symbol    | keys                          |
//! |-----------|-------------------------------|
//! | up        | `ESC [ A`, `8`, `u`           |
//! | down      | `ESC [ B`, `5`, `d`           |
//! | left      | `ESC [ D`, `4`, `l`           |
//! | right     | `ESC [ C`, `6`, `r`           |
//! | wait      | `.`                           |
//! | quit      | `q`                           |
//! | restart   | `n`                           |
//! | speed     | `+` faster, `-` slower        |
//!
//! Letters are case-insensitive. Anything else decodes to
//! [`Symbol::Unrecognized`], which the loop ignores.
use std::fmt;

use crate::direction::Direction;

const ESC: u8 = 0x1b;
const CSI: u8 = b'[';

/// Leading bytes shared by every arrow key sequence.
pub(crate) const ESCAPE_PREFIX: [u8; 2] = [ESC, CSI];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Move(Direction),
    /// Keep the current heading for this tick.
    Wait,
    Quit,
    Restart,
    SpeedUp,
    SlowDown,
    Unrecognized,
}

impl Symbol {
    pub fn from_char(c: char) -> Symbol {
        match c.to_ascii_lowercase() {
            '8' | 'u' => Symbol::Move(Direction::Up),
            '5' | 'd' => Symbol::Move(Direction::Down),
            '4' | 'l' => Symbol::Move(Direction::Left),
            '6' | 'r' => Symbol::Move(Direction::Right),
            '.' => Symbol::Wait,
            'q' => Symbol::Quit,
            'n' => Symbol::Restart,
            '+' => Symbol::SpeedUp,
            '-' => Symbol::SlowDown,
            _ => Symbol::Unrecognized,
        }
    }

    /// Decodes one symbol from the front of `bytes`, returning it along with
    /// the number of bytes it used. An escape prefix that is not followed by
    /// a complete arrow sequence consumes only the prefix byte.
    pub fn decode(bytes: &[u8]) -> Option<(Symbol, usize)> {
        match bytes {
            [] => None,
            [ESC, CSI, code, ..] => {
                let symbol = match code {
                    b'A' => Symbol::Move(Direction::Up),
                    b'B' => Symbol::Move(Direction::Down),
                    b'C' => Symbol::Move(Direction::Right),
                    b'D' => Symbol::Move(Direction::Left),
                    _ => Symbol::Unrecognized,
                };
                Some((symbol, 3))
            }
            [ESC, ..] => Some((Symbol::Unrecognized, 1)),
            [b, ..] if b.is_ascii() => Some((Symbol::from_char(*b as char), 1)),
            [_, ..] => Some((Symbol::Unrecognized, 1)),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Move(d) => write!(f, "{d}"),
            Symbol::Wait => f.write_str("WAIT"),
            Symbol::Quit => f.write_str("QUIT"),
            Symbol::Restart => f.write_str("RESTART"),
            Symbol::SpeedUp => f.write_str("SPEED_UP"),
            Symbol::SlowDown => f.write_str("SLOW_DOWN"),
            Symbol::Unrecognized => f.write_str("UNRECOGNIZED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numpad_aliases() {
        assert_eq!(Symbol::from_char('8'), Symbol::Move(Direction::Up));
        assert_eq!(Symbol::from_char('5'), Symbol::Move(Direction::Down));
        assert_eq!(Symbol::from_char('4'), Symbol::Move(Direction::Left));
        assert_eq!(Symbol::from_char('6'), Symbol::Move(Direction::Right));
    }

    #[test]
    fn test_letter_aliases_any_case() {
        assert_eq!(Symbol::from_char('u'), Symbol::Move(Direction::Up));
        assert_eq!(Symbol::from_char('D'), Symbol::Move(Direction::Down));
        assert_eq!(Symbol::from_char('l'), Symbol::Move(Direction::Left));
        assert_eq!(Symbol::from_char('R'), Symbol::Move(Direction::Right));
        assert_eq!(Symbol::from_char('Q'), Symbol::Quit);
        assert_eq!(Symbol::from_char('n'), Symbol::Restart);
    }

    #[test]
    fn test_controls() {
        assert_eq!(Symbol::from_char('.'), Symbol::Wait);
        assert_eq!(Symbol::from_char('+'), Symbol::SpeedUp);
        assert_eq!(Symbol::from_char('-'), Symbol::SlowDown);
        assert_eq!(Symbol::from_char('x'), Symbol::Unrecognized);
        assert_eq!(Symbol::from_char('7'), Symbol::Unrecognized);
    }

    #[test]
    fn test_decode_arrows() {
        assert_eq!(
            Symbol::decode(b"\x1b[A"),
            Some((Symbol::Move(Direction::Up), 3))
        );
        assert_eq!(
            Symbol::decode(b"\x1b[B"),
            Some((Symbol::Move(Direction::Down), 3))
        );
        assert_eq!(
            Symbol::decode(b"\x1b[C"),
            Some((Symbol::Move(Direction::Right), 3))
        );
        assert_eq!(
            Symbol::decode(b"\x1b[Dq"),
            Some((Symbol::Move(Direction::Left), 3))
        );
    }

    #[test]
    fn test_decode_partial_escape() {
        assert_eq!(Symbol::decode(b"\x1b"), Some((Symbol::Unrecognized, 1)));
        assert_eq!(Symbol::decode(b"\x1b["), Some((Symbol::Unrecognized, 1)));
        assert_eq!(Symbol::decode(b"\x1b[Z"), Some((Symbol::Unrecognized, 3)));
    }

    #[test]
    fn test_decode_single_bytes() {
        assert_eq!(Symbol::decode(b""), None);
        assert_eq!(Symbol::decode(b"q"), Some((Symbol::Quit, 1)));
        assert_eq!(Symbol::decode(&[0xc3, 0xa9]), Some((Symbol::Unrecognized, 1)));
    }
}
