//! Bindings for a session.
//!
//! A [`Keymap`] pairs the chord trie with the command table. Chords are
//! usually registered under a command name as well, so the same handler can be
//! reached from a key sequence or from the command line.

pub mod command;
pub mod trie;

use std::rc::Rc;

use command::CommandTable;
use trie::KeyTrieNode;

use crate::error::BindError;
use crate::handler::Handler;
use crate::key::{render_sequence, KeyCode};

/// The chord trie and command table for one session.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    trie: KeyTrieNode,
    commands: CommandTable,
}

impl Keymap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `keys` to `handler` and register the handler under `name`.
    pub fn bind_chord(
        &mut self,
        keys: &[KeyCode],
        name: &str,
        handler: &Rc<dyn Handler>,
    ) -> Result<(), BindError> {
        self.bind_keys(keys, handler)?;
        self.commands.bind(name, handler);
        Ok(())
    }

    /// Bind `keys` to `handler` without naming it.
    pub fn bind_keys(
        &mut self,
        keys: &[KeyCode],
        handler: &Rc<dyn Handler>,
    ) -> Result<(), BindError> {
        self.trie.bind(keys, handler)?;
        log::debug!("bound {}", render_sequence(keys));
        Ok(())
    }

    /// Register `handler` under `name` with no key sequence.
    pub fn bind_command(&mut self, name: &str, handler: &Rc<dyn Handler>) {
        self.commands.bind(name, handler);
        log::debug!("bound command {name}");
    }

    #[must_use]
    pub fn trie(&self) -> &KeyTrieNode {
        &self.trie
    }

    #[must_use]
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }
}
