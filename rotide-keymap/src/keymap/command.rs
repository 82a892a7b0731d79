//! Command table: handlers registered under a command name.
//!
//! The name `"*"` is the wildcard. It receives every command-line dispatch
//! whose name has no exact registration.

use std::collections::HashMap;
use std::rc::Rc;

use crate::handler::{Handler, HandlerRef};
use crate::tokenize::split_command;

/// The reserved command name that matches any unmatched name.
pub const WILDCARD: &str = "*";

/// Command name → handlers, in registration order.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    map: HashMap<String, Vec<HandlerRef>>,
}

/// Outcome of resolving a command line against the table.
#[derive(Debug)]
pub struct CommandResolution<'a, 't> {
    /// The command name typed, before any wildcard fallback.
    pub name: String,
    /// Handlers for `name`, or for the wildcard when `name` is unknown.
    pub handlers: Option<&'a [HandlerRef]>,
    /// Whether `handlers` came from the wildcard entry.
    pub wildcard: bool,
    /// Raw text after the name, ready for the tokenizer.
    pub remainder: &'t str,
}

impl CommandTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, after any handlers already there.
    pub fn bind(&mut self, name: &str, handler: &Rc<dyn Handler>) {
        self.map
            .entry(name.to_string())
            .or_default()
            .push(HandlerRef::new(handler));
    }

    /// Handlers registered under exactly `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[HandlerRef]> {
        self.map
            .get(name)
            .map(Vec::as_slice)
            .filter(|handlers| !handlers.is_empty())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Command names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a command line: exact name first, then the wildcard.
    #[must_use]
    pub fn resolve<'t>(&self, text: &'t str) -> CommandResolution<'_, 't> {
        let (name, remainder) = split_command(text);
        if let Some(handlers) = self.get(&name) {
            return CommandResolution {
                name,
                handlers: Some(handlers),
                wildcard: false,
                remainder,
            };
        }
        let handlers = self.get(WILDCARD);
        CommandResolution {
            name,
            handlers,
            wildcard: handlers.is_some(),
            remainder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::from_fn;

    fn noop() -> Rc<dyn Handler> {
        from_fn(|_, _| Ok(true))
    }

    #[test]
    fn resolve_falls_back_to_wildcard() {
        let any = noop();
        let mut table = CommandTable::new();
        table.bind(WILDCARD, &any);

        let resolved = table.resolve("foobar extra args");
        assert_eq!(resolved.name, "foobar");
        assert!(resolved.wildcard);
        assert_eq!(resolved.remainder, "extra args");
        let handlers = resolved.handlers.expect("wildcard handlers");
        assert!(handlers[0].ptr_eq(&HandlerRef::new(&any)));
    }

    #[test]
    fn resolve_prefers_exact_name() {
        let any = noop();
        let foobar = noop();
        let mut table = CommandTable::new();
        table.bind(WILDCARD, &any);
        table.bind("foobar", &foobar);

        let resolved = table.resolve("foobar extra args");
        assert!(!resolved.wildcard);
        let handlers = resolved.handlers.expect("exact handlers");
        assert_eq!(handlers.len(), 1);
        assert!(handlers[0].ptr_eq(&HandlerRef::new(&foobar)));
    }

    #[test]
    fn resolve_unknown_without_wildcard() {
        let table = CommandTable::new();
        let resolved = table.resolve("nope");
        assert!(resolved.handlers.is_none());
        assert!(!resolved.wildcard);
        assert_eq!(resolved.remainder, "");
    }

    #[test]
    fn bind_accumulates_under_one_name() {
        let first = noop();
        let second = noop();
        let mut table = CommandTable::new();
        table.bind("save", &first);
        table.bind("save", &second);
        assert_eq!(table.get("save").map(<[_]>::len), Some(2));
        assert_eq!(table.names(), vec!["save"]);
    }
}
