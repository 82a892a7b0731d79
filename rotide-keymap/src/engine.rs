//! The engine a session drives keystrokes through.
//!
//! [`Engine`] owns the session's bindings, its dispatch state, and the status
//! sink. Hosts register handlers with [`Engine::bind_chord`] and
//! [`Engine::bind_command`], then feed keys one at a time to
//! [`Engine::dispatch`].

use std::rc::Rc;

use crate::config::EngineConfig;
use crate::dispatch::{DispatchOutcome, DispatchState, Invocation, Step};
use crate::error::{BindError, DispatchError, KeyParseError};
use crate::handler::{Handler, HandlerContext, HandlerError};
use crate::history::{History, Resolution};
use crate::key::{render_key, render_sequence, KeyCode, COLON};
use crate::keymap::Keymap;
use crate::status::StatusSink;

/// Log target of the per-keystroke trace lines, so they can be filtered apart.
pub const KEY_LOG_TARGET: &str = "rotide_keymap::keys";

/// Key bindings, dispatch state, and status output for one session.
pub struct Engine<S: StatusSink> {
    keymap: Keymap,
    state: DispatchState,
    sink: S,
    /// Opens the command line when pressed unbound; `None` disables it.
    command_key: Option<KeyCode>,
}

impl<S: StatusSink> Engine<S> {
    /// Create an engine with no bindings, outside insert mode, with `:` as the
    /// command key.
    pub fn new(sink: S) -> Self {
        Self {
            keymap: Keymap::new(),
            state: DispatchState::new(false),
            sink,
            command_key: Some(COLON),
        }
    }

    /// Create an engine from the `[engine]` configuration section.
    pub fn with_config(config: &EngineConfig, sink: S) -> Result<Self, KeyParseError> {
        let command_key = config.command_key()?;
        Ok(Self {
            keymap: Keymap::new(),
            state: DispatchState::new(config.insert_mode),
            sink,
            command_key,
        })
    }

    /// Set or disable the key that opens the command line.
    #[must_use]
    pub fn with_command_key(mut self, key: Option<KeyCode>) -> Self {
        self.command_key = key;
        self
    }

    /// Register `handler` for `keys`, and under `name` in the command table.
    pub fn bind_chord(
        &mut self,
        keys: &[KeyCode],
        name: &str,
        handler: &Rc<dyn Handler>,
    ) -> Result<(), BindError> {
        self.keymap.bind_chord(keys, name, handler)
    }

    /// Register `handler` for `keys` only.
    pub fn bind_keys(
        &mut self,
        keys: &[KeyCode],
        handler: &Rc<dyn Handler>,
    ) -> Result<(), BindError> {
        self.keymap.bind_keys(keys, handler)
    }

    /// Register `handler` under a command name with no key sequence.
    pub fn bind_command(&mut self, name: &str, handler: &Rc<dyn Handler>) {
        self.keymap.bind_command(name, handler);
    }

    /// Feed one key.
    ///
    /// Completed attempts (fired, failed, unresolved, cancelled) are appended
    /// to the history; keys that leave input pending are not. The resulting
    /// status, if any, is written to the sink before returning.
    pub fn dispatch(&mut self, key: KeyCode) -> DispatchOutcome {
        log::trace!(target: KEY_LOG_TARGET, "dispatch {}", render_key(key));

        let outcome = match self.state.advance(&self.keymap, key, self.command_key) {
            Step::Idle => DispatchOutcome::Idle,
            Step::Pending => DispatchOutcome::Pending {
                display: self.state.display(),
            },
            Step::Cancelled => {
                let keys = self.state.finish(Resolution::Cancelled);
                log::debug!("cancelled {}", render_sequence(&keys));
                DispatchOutcome::Cancelled { keys }
            }
            Step::Unresolved(error) => self.unresolved(error),
            Step::Invoke(invocation) => self.invoke(invocation),
        };

        if let Some(line) = outcome.status_line() {
            self.sink.write_status(&line);
        }
        outcome
    }

    fn unresolved(&mut self, error: DispatchError) -> DispatchOutcome {
        if self.state.insert_mode() {
            let keys = self.state.finish(Resolution::Suppressed);
            log::trace!(
                target: KEY_LOG_TARGET,
                "insert mode: {} taken as text",
                render_sequence(&keys)
            );
            return DispatchOutcome::Unresolved { keys, error: None };
        }
        let keys = self.state.finish(Resolution::Unresolved);
        log::debug!("{error}");
        DispatchOutcome::Unresolved {
            keys,
            error: Some(error),
        }
    }

    fn invoke(&mut self, invocation: Invocation) -> DispatchOutcome {
        let keys = self.state.pending().to_vec();
        let target = invocation
            .command
            .clone()
            .unwrap_or_else(|| render_sequence(&keys));

        let mut insert_mode = self.state.insert_mode();
        let mut status = None;
        let mut handled = false;
        let mut failure = None;

        for handler_ref in &invocation.handlers {
            let Some(handler) = handler_ref.upgrade() else {
                failure = Some(HandlerError::released());
                break;
            };
            let mut cx = HandlerContext {
                keymap: &mut self.keymap,
                insert_mode: &mut insert_mode,
                status: &mut status,
                keys: &keys,
                command: invocation.command.as_deref(),
            };
            match handler.invoke(&mut cx, invocation.args.as_deref()) {
                Ok(acted) => handled |= acted,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        self.state.set_insert_mode(insert_mode);

        if let Some(error) = failure {
            log::warn!("{target}: handler failed: {error}");
            let keys = self.state.finish(Resolution::Failed);
            return DispatchOutcome::Failed {
                keys,
                error: DispatchError::HandlerInvocationFailure { target, error },
            };
        }

        log::debug!(
            "{target}: {} handler(s) ran, handled={handled}",
            invocation.handlers.len()
        );
        let keys = self.state.finish(Resolution::Fired);
        DispatchOutcome::Fired {
            keys,
            handled,
            status,
        }
    }

    /// Drop any pending chord or text without recording it.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    #[must_use]
    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    #[must_use]
    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    #[must_use]
    pub fn history(&self) -> &History {
        self.state.history()
    }

    #[must_use]
    pub fn insert_mode(&self) -> bool {
        self.state.insert_mode()
    }

    pub fn set_insert_mode(&mut self, enabled: bool) {
        self.state.set_insert_mode(enabled);
    }

    /// Whether a chord, argument text, or command line is in progress.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
