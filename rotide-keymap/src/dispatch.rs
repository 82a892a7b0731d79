//! Per-session dispatch state machine.
//!
//! Each key moves the session between four input modes:
//!
//! - `Idle`: nothing pending. A plain key is looked up on its own, unless it
//!   starts a longer binding, in which case it waits as a chord. A control key
//!   starts a chord; the command key opens the command line.
//! - `Chord`: control keys accumulate until Enter resolves the chord. A plain
//!   key extends the chord while it still names a trie path, and resolves it
//!   on reaching a leaf. A space after a bound chord switches to `Arguments`.
//! - `Arguments`: free text after a bound chord, tokenized on Enter and passed
//!   to the chord's handlers.
//! - `CommandLine`: free text resolved on Enter through the command table.
//!
//! The state machine only decides; [`Engine`](crate::engine::Engine) runs the
//! handlers and then closes the attempt through [`DispatchState::finish`].

use crate::error::DispatchError;
use crate::handler::HandlerRef;
use crate::history::{History, Resolution};
use crate::key::{keys_to_text, render_sequence, KeyCode, ESC, SPACE};
use crate::keymap::command::CommandResolution;
use crate::keymap::trie::{KeyTrieNode, TrieSearchResult};
use crate::keymap::Keymap;
use crate::status::StatusLine;
use crate::tokenize::tokenize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Idle,
    Chord,
    /// Typing arguments for the chord made of the first `chord_len` keys.
    Arguments { chord_len: usize },
    CommandLine,
}

/// Result of feeding one key to an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Enter with nothing pending.
    Idle,
    /// More keys are needed. `display` echoes the input so far.
    Pending { display: String },
    /// Handlers ran. `handled` is false when every handler declined.
    Fired {
        keys: Vec<KeyCode>,
        handled: bool,
        status: Option<String>,
    },
    /// A handler failed or had been released by its owner.
    Failed {
        keys: Vec<KeyCode>,
        error: DispatchError,
    },
    /// Nothing matched. `error` is `None` when insert mode suppressed it, in
    /// which case the keys are literal text for the host.
    Unresolved {
        keys: Vec<KeyCode>,
        error: Option<DispatchError>,
    },
    Cancelled {
        keys: Vec<KeyCode>,
    },
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    #[must_use]
    pub fn fired(&self) -> bool {
        matches!(self, Self::Fired { .. })
    }

    #[must_use]
    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Unresolved { error, .. } => error.as_ref(),
            _ => None,
        }
    }

    /// Keys the host should insert as text, if insert mode swallowed them.
    #[must_use]
    pub fn literal_keys(&self) -> Option<&[KeyCode]> {
        match self {
            Self::Unresolved { keys, error: None } => Some(keys),
            _ => None,
        }
    }

    /// The line this outcome puts on the status sink, if any.
    #[must_use]
    pub fn status_line(&self) -> Option<StatusLine> {
        match self {
            Self::Idle | Self::Unresolved { error: None, .. } => None,
            Self::Pending { display } => Some(StatusLine::pending(display.clone())),
            Self::Fired { status, .. } => status.clone().map(StatusLine::info),
            Self::Failed { error, .. }
            | Self::Unresolved {
                error: Some(error), ..
            } => Some(StatusLine::error(error.to_string())),
            Self::Cancelled { .. } => Some(StatusLine::default()),
        }
    }
}

/// Handlers the state machine wants run.
#[derive(Debug)]
pub(crate) struct Invocation {
    pub handlers: Vec<HandlerRef>,
    pub args: Option<Vec<String>>,
    pub command: Option<String>,
}

impl Invocation {
    fn keys(handlers: &[HandlerRef]) -> Self {
        Self {
            handlers: handlers.to_vec(),
            args: None,
            command: None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Step {
    Idle,
    Pending,
    Invoke(Invocation),
    Unresolved(DispatchError),
    Cancelled,
}

/// Mutable input state for one session.
#[derive(Debug, Default)]
pub struct DispatchState {
    /// Keys of the attempt in progress: the chord, then any text typed after it.
    pending: Vec<KeyCode>,
    mode: InputMode,
    history: History,
    insert_mode: bool,
}

impl DispatchState {
    #[must_use]
    pub fn new(insert_mode: bool) -> Self {
        Self {
            insert_mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    #[must_use]
    pub fn pending(&self) -> &[KeyCode] {
        &self.pending
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn set_insert_mode(&mut self, enabled: bool) {
        self.insert_mode = enabled;
    }

    /// Echo of the pending input for the status line.
    #[must_use]
    pub fn display(&self) -> String {
        match self.mode {
            InputMode::Arguments { chord_len } => {
                let (chord, rest) = self.pending.split_at(chord_len.min(self.pending.len()));
                let text = keys_to_text(rest.get(1..).unwrap_or_default());
                format!("{} {text}", render_sequence(chord))
            }
            InputMode::CommandLine => keys_to_text(&self.pending),
            InputMode::Idle | InputMode::Chord => render_sequence(&self.pending),
        }
    }

    /// Drop pending input without recording it.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.mode = InputMode::Idle;
    }

    /// Close the current attempt: record it and return to `Idle`.
    pub(crate) fn finish(&mut self, resolution: Resolution) -> Vec<KeyCode> {
        let keys = std::mem::take(&mut self.pending);
        self.mode = InputMode::Idle;
        if !keys.is_empty() {
            self.history.push(keys.clone(), resolution);
        }
        keys
    }

    /// Feed one key and decide what happens next.
    pub(crate) fn advance(
        &mut self,
        keymap: &Keymap,
        key: KeyCode,
        command_key: Option<KeyCode>,
    ) -> Step {
        match self.mode {
            InputMode::Arguments { chord_len } => {
                return self.advance_arguments(keymap, key, chord_len);
            }
            InputMode::CommandLine => return self.advance_command_line(keymap, key),
            InputMode::Idle | InputMode::Chord => {}
        }

        if key == ESC && self.is_pending() {
            return Step::Cancelled;
        }

        if key.is_control() {
            self.pending.push(key);
            self.mode = InputMode::Chord;
            return Step::Pending;
        }

        if key.is_enter() {
            if self.pending.is_empty() {
                return Step::Idle;
            }
            return match keymap.trie().lookup_chord(&self.pending) {
                Some(handlers) => Step::Invoke(Invocation::keys(handlers)),
                None => self.unresolved_chord(),
            };
        }

        if self.pending.is_empty() {
            self.advance_single(keymap, key, command_key)
        } else {
            self.advance_chord(keymap, key)
        }
    }

    fn advance_single(
        &mut self,
        keymap: &Keymap,
        key: KeyCode,
        command_key: Option<KeyCode>,
    ) -> Step {
        let trie = keymap.trie();
        self.pending.push(key);

        // A key that starts a longer binding waits, even when bound itself:
        // Enter resolves it alone, the next key may extend it.
        if trie.get(key).is_some_and(KeyTrieNode::has_children) {
            self.mode = InputMode::Chord;
            return Step::Pending;
        }
        if let Some(handlers) = trie.lookup_single(key) {
            return Step::Invoke(Invocation::keys(handlers));
        }
        if command_key == Some(key) && !self.insert_mode {
            self.mode = InputMode::CommandLine;
            return Step::Pending;
        }
        self.unresolved_chord()
    }

    fn advance_chord(&mut self, keymap: &Keymap, key: KeyCode) -> Step {
        let trie = keymap.trie();

        // A space right after a bound chord starts its argument text.
        if key == SPACE && trie.lookup_chord(&self.pending).is_some() {
            let chord_len = self.pending.len();
            self.pending.push(key);
            self.mode = InputMode::Arguments { chord_len };
            return Step::Pending;
        }

        self.pending.push(key);
        match trie.search(&self.pending) {
            TrieSearchResult::Found(node) if !node.has_children() => {
                Step::Invoke(Invocation::keys(node.handlers()))
            }
            TrieSearchResult::Found(_) | TrieSearchResult::Partial(_) => Step::Pending,
            TrieSearchResult::NotFound => self.unresolved_chord(),
        }
    }

    fn advance_arguments(&mut self, keymap: &Keymap, key: KeyCode, chord_len: usize) -> Step {
        if key == ESC {
            return Step::Cancelled;
        }

        if key.is_enter() {
            let (chord, rest) = self.pending.split_at(chord_len.min(self.pending.len()));
            let text = keys_to_text(rest.get(1..).unwrap_or_default());
            return match keymap.trie().lookup_chord(chord) {
                Some(handlers) => Step::Invoke(Invocation {
                    handlers: handlers.to_vec(),
                    args: Some(tokenize(&text)),
                    command: None,
                }),
                None => Step::Unresolved(DispatchError::UnresolvedChord {
                    keys: render_sequence(chord),
                }),
            };
        }

        if key.is_backspace() {
            self.pending.pop();
            if self.pending.len() <= chord_len {
                self.mode = InputMode::Chord;
            }
        } else if key.as_char().is_some() {
            self.pending.push(key);
        }
        Step::Pending
    }

    fn advance_command_line(&mut self, keymap: &Keymap, key: KeyCode) -> Step {
        if key == ESC {
            return Step::Cancelled;
        }

        if key.is_enter() {
            let text = keys_to_text(self.pending.get(1..).unwrap_or_default());
            if text.trim().is_empty() {
                return Step::Cancelled;
            }
            let CommandResolution {
                name,
                handlers,
                wildcard,
                remainder,
            } = keymap.commands().resolve(&text);
            return match handlers {
                Some(handlers) => {
                    if wildcard {
                        log::debug!("{name}: no exact command, using wildcard");
                    }
                    Step::Invoke(Invocation {
                        handlers: handlers.to_vec(),
                        args: Some(tokenize(remainder)),
                        command: Some(name),
                    })
                }
                None => Step::Unresolved(DispatchError::UnresolvedCommand { name }),
            };
        }

        if key.is_backspace() {
            if self.pending.len() <= 1 {
                return Step::Cancelled;
            }
            self.pending.pop();
        } else if key.as_char().is_some() {
            self.pending.push(key);
        }
        Step::Pending
    }

    fn unresolved_chord(&self) -> Step {
        Step::Unresolved(DispatchError::UnresolvedChord {
            keys: render_sequence(&self.pending),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::handler::{from_fn, Handler};
    use crate::key::{BACKSPACE, COLON, ENTER};

    fn ctrl(ch: char) -> KeyCode {
        KeyCode::ctrl(ch).expect("letter")
    }

    fn key(ch: char) -> KeyCode {
        KeyCode::char(ch)
    }

    fn noop() -> Rc<dyn Handler> {
        from_fn(|_, _| Ok(true))
    }

    fn feed(state: &mut DispatchState, keymap: &Keymap, keys: &[KeyCode]) -> Step {
        let mut last = Step::Idle;
        for &k in keys {
            last = state.advance(keymap, k, Some(COLON));
        }
        last
    }

    #[test]
    fn control_keys_accumulate_into_chord() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        assert!(matches!(feed(&mut state, &keymap, &[ctrl('a'), ctrl('f')]), Step::Pending));
        assert_eq!(state.mode(), InputMode::Chord);
        assert_eq!(state.display(), "<CTRL+a>-<CTRL+f>");
        assert!(state.history().is_empty());
    }

    #[test]
    fn enter_with_nothing_pending_is_idle() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        assert!(matches!(state.advance(&keymap, ENTER, None), Step::Idle));
    }

    #[test]
    fn enter_resolves_pending_chord() {
        let handler = noop();
        let mut keymap = Keymap::new();
        keymap.bind_keys(&[ctrl('a'), ctrl('b')], &handler).expect("bind");

        let mut state = DispatchState::new(false);
        let step = feed(&mut state, &keymap, &[ctrl('a'), ctrl('b'), ENTER]);
        match step {
            Step::Invoke(invocation) => {
                assert_eq!(invocation.handlers.len(), 1);
                assert!(invocation.args.is_none());
            }
            other => panic!("expected Invoke, got {other:?}"),
        }
    }

    #[test]
    fn space_after_bound_chord_enters_arguments() {
        let handler = noop();
        let mut keymap = Keymap::new();
        keymap.bind_keys(&[ctrl('a'), ctrl('f')], &handler).expect("bind");

        let mut state = DispatchState::new(false);
        let mut keys = vec![ctrl('a'), ctrl('f'), SPACE];
        keys.extend("save \"my file\"".chars().map(KeyCode::char));
        feed(&mut state, &keymap, &keys);
        assert_eq!(state.mode(), InputMode::Arguments { chord_len: 2 });
        assert_eq!(state.display(), "<CTRL+a>-<CTRL+f> save \"my file\"");

        match state.advance(&keymap, ENTER, None) {
            Step::Invoke(invocation) => {
                assert_eq!(
                    invocation.args,
                    Some(vec!["save".to_string(), "my file".to_string()])
                );
            }
            other => panic!("expected Invoke, got {other:?}"),
        }
    }

    #[test]
    fn backspace_over_separator_returns_to_chord() {
        let handler = noop();
        let mut keymap = Keymap::new();
        keymap.bind_keys(&[ctrl('a')], &handler).expect("bind");

        let mut state = DispatchState::new(false);
        feed(&mut state, &keymap, &[ctrl('a'), SPACE, key('x'), BACKSPACE]);
        assert_eq!(state.mode(), InputMode::Arguments { chord_len: 1 });
        feed(&mut state, &keymap, &[BACKSPACE]);
        assert_eq!(state.mode(), InputMode::Chord);
        assert_eq!(state.pending(), &[ctrl('a')]);
    }

    #[test]
    fn space_after_unbound_chord_is_unresolved() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        let step = feed(&mut state, &keymap, &[ctrl('a'), SPACE]);
        match step {
            Step::Unresolved(DispatchError::UnresolvedChord { keys }) => {
                assert_eq!(keys, "<CTRL+a><SPACE>");
            }
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn plain_key_continues_a_longer_prefix() {
        let handler = noop();
        let mut keymap = Keymap::new();
        keymap.bind_keys(&[ctrl('a'), key('g'), key('g')], &handler).expect("bind");

        let mut state = DispatchState::new(false);
        assert!(matches!(feed(&mut state, &keymap, &[ctrl('a'), key('g')]), Step::Pending));
        assert!(matches!(state.advance(&keymap, key('g'), None), Step::Invoke(_)));
    }

    #[test]
    fn bound_plain_key_waits_when_it_starts_a_longer_binding() {
        let handler = noop();
        let mut keymap = Keymap::new();
        keymap.bind_keys(&[key('g')], &handler).expect("bind");
        keymap.bind_keys(&[key('g'), key('g')], &handler).expect("bind");

        let mut state = DispatchState::new(false);
        assert!(matches!(state.advance(&keymap, key('g'), None), Step::Pending));
        assert_eq!(state.mode(), InputMode::Chord);
        assert_eq!(state.display(), "<g>");
        assert!(matches!(state.advance(&keymap, ENTER, None), Step::Invoke(_)));
    }

    #[test]
    fn unknown_plain_key_is_unresolved() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        match state.advance(&keymap, key('q'), None) {
            Step::Unresolved(DispatchError::UnresolvedChord { keys }) => assert_eq!(keys, "<q>"),
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn command_key_opens_command_line_unless_bound() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        assert!(matches!(state.advance(&keymap, COLON, Some(COLON)), Step::Pending));
        assert_eq!(state.mode(), InputMode::CommandLine);
        feed(&mut state, &keymap, &[key('w'), key('q')]);
        assert_eq!(state.display(), ":wq");

        let handler = noop();
        let mut bound = Keymap::new();
        bound.bind_keys(&[COLON], &handler).expect("bind");
        let mut state = DispatchState::new(false);
        assert!(matches!(state.advance(&bound, COLON, Some(COLON)), Step::Invoke(_)));
    }

    #[test]
    fn command_key_is_plain_text_in_insert_mode() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(true);
        assert!(matches!(state.advance(&keymap, COLON, Some(COLON)), Step::Unresolved(_)));
    }

    #[test]
    fn command_line_resolves_through_command_table() {
        let handler = noop();
        let mut keymap = Keymap::new();
        keymap.bind_command("write", &handler);

        let mut state = DispatchState::new(false);
        let mut keys = vec![COLON];
        keys.extend("write a b".chars().map(KeyCode::char));
        feed(&mut state, &keymap, &keys);
        match state.advance(&keymap, ENTER, Some(COLON)) {
            Step::Invoke(invocation) => {
                assert_eq!(invocation.command.as_deref(), Some("write"));
                assert_eq!(invocation.args, Some(vec!["a".to_string(), "b".to_string()]));
            }
            other => panic!("expected Invoke, got {other:?}"),
        }
    }

    #[test]
    fn unknown_command_is_unresolved_command() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        let step = feed(&mut state, &keymap, &[COLON, key('z'), ENTER]);
        match step {
            Step::Unresolved(DispatchError::UnresolvedCommand { name }) => assert_eq!(name, "z"),
            other => panic!("expected UnresolvedCommand, got {other:?}"),
        }
    }

    #[test]
    fn backspace_on_empty_command_line_cancels() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        let step = feed(&mut state, &keymap, &[COLON, BACKSPACE]);
        assert!(matches!(step, Step::Cancelled));
    }

    #[test]
    fn esc_cancels_pending_chord() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        assert!(matches!(feed(&mut state, &keymap, &[ctrl('a'), ESC]), Step::Cancelled));
    }

    #[test]
    fn finish_records_history_and_resets() {
        let keymap = Keymap::new();
        let mut state = DispatchState::new(false);
        feed(&mut state, &keymap, &[ctrl('a'), ctrl('b')]);
        let keys = state.finish(Resolution::Unresolved);
        assert_eq!(keys, vec![ctrl('a'), ctrl('b')]);
        assert!(!state.is_pending());
        assert_eq!(state.mode(), InputMode::Idle);
        assert_eq!(state.history().len(), 1);
        assert_eq!(
            state.history().last().map(|entry| entry.resolution),
            Some(Resolution::Unresolved)
        );
    }

    #[test]
    fn outcome_status_lines() {
        let pending = DispatchOutcome::Pending {
            display: "<CTRL+a>".to_string(),
        };
        assert_eq!(pending.status_line(), Some(StatusLine::pending("<CTRL+a>")));

        let suppressed = DispatchOutcome::Unresolved {
            keys: vec![key('q')],
            error: None,
        };
        assert_eq!(suppressed.status_line(), None);
        assert_eq!(suppressed.literal_keys(), Some(&[key('q')][..]));

        let unresolved = DispatchOutcome::Unresolved {
            keys: vec![key('q')],
            error: Some(DispatchError::UnresolvedChord {
                keys: "<q>".to_string(),
            }),
        };
        assert_eq!(
            unresolved.status_line(),
            Some(StatusLine::error("<q> is not a command"))
        );
    }
}
