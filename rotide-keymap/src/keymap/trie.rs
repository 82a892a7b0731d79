//! Key trie data structure for chord dispatch.
//!
//! Every node maps a `KeyCode` to a child node and carries the handlers bound
//! to the exact path that reaches it. A node with children but no handlers is
//! a valid prefix that cannot itself be resolved.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::BindError;
use crate::handler::{Handler, HandlerRef};
use crate::key::{render_sequence, KeyCode};

/// A trie node: children keyed by the next key, plus handlers attached here.
#[derive(Debug, Clone, Default)]
pub struct KeyTrieNode {
    /// Map of key → child node.
    children: HashMap<KeyCode, KeyTrieNode>,
    /// Handlers bound to the path ending here, in registration order.
    handlers: Vec<HandlerRef>,
}

/// Result of walking the trie with a key sequence.
#[derive(Debug)]
pub enum TrieSearchResult<'a> {
    /// The path ends at a node with at least one handler.
    Found(&'a KeyTrieNode),
    /// The path ends at an internal node; more keys are needed.
    Partial(&'a KeyTrieNode),
    /// The path leaves the trie.
    NotFound,
}

impl KeyTrieNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `keys`, creating intermediate nodes as needed.
    ///
    /// Binding the same sequence again appends another handler; both run.
    /// Sequences containing Enter are rejected: they could never be typed.
    pub fn bind(&mut self, keys: &[KeyCode], handler: &Rc<dyn Handler>) -> Result<(), BindError> {
        if keys.is_empty() {
            return Err(BindError::EmptySequence);
        }
        if keys.iter().any(|key| key.is_enter()) {
            return Err(BindError::ContainsEnter(render_sequence(keys)));
        }
        let node = keys
            .iter()
            .fold(self, |node, &key| node.children.entry(key).or_default());
        node.handlers.push(HandlerRef::new(handler));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: KeyCode) -> Option<&KeyTrieNode> {
        self.children.get(&key)
    }

    #[must_use]
    pub fn handlers(&self) -> &[HandlerRef] {
        &self.handlers
    }

    #[must_use]
    pub fn has_handlers(&self) -> bool {
        !self.handlers.is_empty()
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Walk the trie following `keys` exactly.
    #[must_use]
    pub fn search(&self, keys: &[KeyCode]) -> TrieSearchResult<'_> {
        match keys.split_first() {
            None if self.has_handlers() => TrieSearchResult::Found(self),
            None => TrieSearchResult::Partial(self),
            Some((first, rest)) => match self.get(*first) {
                Some(child) => child.search(rest),
                None => TrieSearchResult::NotFound,
            },
        }
    }

    /// Handlers bound to exactly `keys`.
    ///
    /// A path that ends on an internal node is not a match.
    #[must_use]
    pub fn lookup_chord(&self, keys: &[KeyCode]) -> Option<&[HandlerRef]> {
        if keys.is_empty() {
            return None;
        }
        match self.search(keys) {
            TrieSearchResult::Found(node) => Some(node.handlers()),
            TrieSearchResult::Partial(_) | TrieSearchResult::NotFound => None,
        }
    }

    /// Handlers bound to the single key `key`.
    #[must_use]
    pub fn lookup_single(&self, key: KeyCode) -> Option<&[HandlerRef]> {
        self.get(key)
            .filter(|node| node.has_handlers())
            .map(KeyTrieNode::handlers)
    }
}
