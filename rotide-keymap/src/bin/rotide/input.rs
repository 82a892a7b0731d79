//! Raw-mode terminal input.
//!
//! Keys are read as crossterm events and translated to engine key codes, so
//! multibyte characters arrive whole and Enter is a key rather than a byte.

use std::io;

use crossterm::event::{self, Event, KeyCode as TermKey, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rotide_keymap::key::{BACKSPACE, ENTER, ESC};
use rotide_keymap::KeyCode;

const TAB: KeyCode = KeyCode(9);

/// Keeps the terminal in raw mode until dropped.
pub struct RawMode(());

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = terminal::disable_raw_mode();
            previous(info);
        }));
        terminal::enable_raw_mode()?;
        Ok(Self(()))
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            log::warn!("failed to leave raw mode: {err}");
        }
    }
}

/// The engine key for a terminal key event, if it has one.
///
/// Releases are dropped. Ctrl with a letter maps to the control code.
pub fn translate(event: &KeyEvent) -> Option<KeyCode> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    match event.code {
        TermKey::Char(ch) if event.modifiers.contains(KeyModifiers::CONTROL) => KeyCode::ctrl(ch),
        TermKey::Char(ch) => Some(KeyCode::char(ch)),
        TermKey::Enter => Some(ENTER),
        TermKey::Esc => Some(ESC),
        TermKey::Backspace => Some(BACKSPACE),
        TermKey::Tab => Some(TAB),
        _ => None,
    }
}

/// Key events from the terminal. Other events are skipped.
pub fn key_events() -> impl Iterator<Item = io::Result<KeyEvent>> {
    std::iter::from_fn(|| loop {
        match event::read() {
            Ok(Event::Key(key)) => return Some(Ok(key)),
            Ok(_) => {}
            Err(err) => return Some(Err(err)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use rotide_keymap::key::CTRL_C;

    fn press(code: TermKey) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn multibyte_characters_arrive_whole() {
        assert_eq!(translate(&press(TermKey::Char('é'))), Some(KeyCode::char('é')));
        assert_eq!(translate(&press(TermKey::Char('ж'))), Some(KeyCode::char('ж')));
    }

    #[test]
    fn control_letters_map_to_control_codes() {
        let event = KeyEvent::new(TermKey::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate(&event), Some(CTRL_C));
        let shifted = KeyEvent::new(
            TermKey::Char('Q'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert_eq!(translate(&shifted), KeyCode::ctrl('q'));
    }

    #[test]
    fn special_keys_map_to_engine_keys() {
        assert_eq!(translate(&press(TermKey::Enter)), Some(ENTER));
        assert_eq!(translate(&press(TermKey::Esc)), Some(ESC));
        assert_eq!(translate(&press(TermKey::Backspace)), Some(BACKSPACE));
        assert_eq!(translate(&press(TermKey::F(1))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let event = KeyEvent {
            code: TermKey::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(translate(&event), None);
    }
}
