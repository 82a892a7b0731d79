//! Key codes, their status-line rendering, and key-description parsing.
//!
//! A [`KeyCode`] is the raw integer a terminal hands us for one keystroke.
//! Codes 1 through 26 are `Ctrl+A`..`Ctrl+Z`; code 10 (`Ctrl+J`) doubles as
//! Enter and never takes part in a chord.

use std::fmt;
use std::str::FromStr;

use crate::error::KeyParseError;

/// One input event: a printable character or a control code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

/// `Ctrl+J`, aliased to Enter.
pub const ENTER: KeyCode = KeyCode(10);
/// `Ctrl+H`, treated as Backspace while typing text.
pub const CTRL_H: KeyCode = KeyCode(8);
/// `Ctrl+C`, which the console loop treats as an interrupt.
pub const CTRL_C: KeyCode = KeyCode(3);
pub const ESC: KeyCode = KeyCode(27);
pub const SPACE: KeyCode = KeyCode(32);
pub const COLON: KeyCode = KeyCode(58);
pub const BACKSPACE: KeyCode = KeyCode(127);

const CTRL_FIRST: u32 = 1;
const CTRL_LAST: u32 = 26;

impl KeyCode {
    /// The control code for `Ctrl+<letter>`. Returns `None` for non-letters.
    #[must_use]
    pub fn ctrl(letter: char) -> Option<Self> {
        let lower = letter.to_ascii_lowercase();
        lower
            .is_ascii_lowercase()
            .then(|| Self(u32::from(lower) - u32::from('a') + CTRL_FIRST))
    }

    /// The key code a terminal reports for a plain character.
    #[must_use]
    pub fn char(ch: char) -> Self {
        Self(u32::from(ch))
    }

    /// Whether this is one of `Ctrl+A`..`Ctrl+Z`, excluding the Enter alias.
    #[must_use]
    pub fn is_control(self) -> bool {
        (CTRL_FIRST..=CTRL_LAST).contains(&self.0) && self != ENTER
    }

    #[must_use]
    pub fn is_enter(self) -> bool {
        self == ENTER
    }

    #[must_use]
    pub fn is_backspace(self) -> bool {
        self == BACKSPACE || self == CTRL_H
    }

    /// The character this key types, if it is printable.
    #[must_use]
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0).filter(|ch| !ch.is_control())
    }

    /// The letter of a control key (`Ctrl+F` → `'f'`).
    fn control_letter(self) -> Option<char> {
        if (CTRL_FIRST..=CTRL_LAST).contains(&self.0) {
            char::from_u32(self.0 - CTRL_FIRST + u32::from('a'))
        } else {
            None
        }
    }
}

impl From<char> for KeyCode {
    fn from(ch: char) -> Self {
        Self::char(ch)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(letter) = self.control_letter() {
            return write!(f, "<CTRL+{letter}>");
        }
        match *self {
            ESC => f.write_str("<ESC>"),
            SPACE => f.write_str("<SPACE>"),
            BACKSPACE => f.write_str("<DEL>"),
            key => match key.as_char() {
                Some(ch) => write!(f, "<{ch}>"),
                None => write!(f, "<#{}>", key.0),
            },
        }
    }
}

/// Render a single key for the status line.
#[must_use]
pub fn render_key(key: KeyCode) -> String {
    key.to_string()
}

/// Render a key sequence for the status line.
///
/// Consecutive control keys are joined with `-`, so `Ctrl+A Ctrl+F` reads
/// `<CTRL+a>-<CTRL+f>`; every other neighbour pair is written back to back.
#[must_use]
pub fn render_sequence(keys: &[KeyCode]) -> String {
    let mut out = String::new();
    let mut previous: Option<KeyCode> = None;
    for &key in keys {
        if previous.is_some_and(KeyCode::is_control) && key.is_control() {
            out.push('-');
        }
        out.push_str(&render_key(key));
        previous = Some(key);
    }
    out
}

/// Rebuild the text typed by a run of keys, skipping anything non-printable.
#[must_use]
pub fn keys_to_text(keys: &[KeyCode]) -> String {
    keys.iter().filter_map(|key| key.as_char()).collect()
}

impl FromStr for KeyCode {
    type Err = KeyParseError;

    /// Parse a single key description: `C-x`, `ret`, `esc`, `space`, `tab`,
    /// `del`, or one character.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.is_empty() {
            return Err(KeyParseError::Empty);
        }

        if let Some(rest) = token.strip_prefix("C-") {
            let mut chars = rest.chars();
            return match (chars.next(), chars.next()) {
                (Some(letter), None) => {
                    Self::ctrl(letter).ok_or_else(|| KeyParseError::NotControl(token.to_string()))
                }
                _ => Err(KeyParseError::NotControl(token.to_string())),
            };
        }

        match token.to_ascii_lowercase().as_str() {
            "ret" | "enter" => return Ok(ENTER),
            "esc" | "escape" => return Ok(ESC),
            "spc" | "space" => return Ok(SPACE),
            "tab" => return Ok(KeyCode(9)),
            "del" | "backspace" => return Ok(BACKSPACE),
            _ => {}
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(Self::char(ch)),
            _ => Err(KeyParseError::Unknown(token.to_string())),
        }
    }
}

/// Parse a whitespace-separated key description such as `"C-a C-f"` or `"esc j"`.
pub fn parse_key_sequence(desc: &str) -> Result<Vec<KeyCode>, KeyParseError> {
    let keys = desc
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<KeyCode>, _>>()?;
    if keys.is_empty() {
        return Err(KeyParseError::Empty);
    }
    Ok(keys)
}
