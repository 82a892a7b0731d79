//! Test helpers for engine dispatch tests.
//!
//! Provides key constructors, a recording handler that logs each call into a
//! shared journal, and a helper that feeds a whole key stream to an engine.

use std::cell::RefCell;
use std::rc::Rc;

use crate::dispatch::DispatchOutcome;
use crate::engine::Engine;
use crate::handler::{from_fn, Handler};
use crate::key::KeyCode;
use crate::status::{MemorySink, StatusSink};

/// `Ctrl+<letter>`.
pub fn ctrl(letter: char) -> KeyCode {
    KeyCode::ctrl(letter).expect("control keys are letters")
}

/// A plain printable key.
pub fn key(ch: char) -> KeyCode {
    KeyCode::char(ch)
}

/// The keys typed for `text`, one per character.
pub fn typed(text: &str) -> Vec<KeyCode> {
    text.chars().map(KeyCode::char).collect()
}

/// An engine writing to a [`MemorySink`], with `:` as the command key.
pub fn test_engine() -> Engine<MemorySink> {
    Engine::new(MemorySink::new())
}

/// Feed `keys` in order and return every outcome.
pub fn feed<S: StatusSink>(engine: &mut Engine<S>, keys: &[KeyCode]) -> Vec<DispatchOutcome> {
    keys.iter().map(|&k| engine.dispatch(k)).collect()
}

/// Feed `keys` in order and return the last outcome.
pub fn feed_last<S: StatusSink>(engine: &mut Engine<S>, keys: &[KeyCode]) -> DispatchOutcome {
    feed(engine, keys)
        .pop()
        .expect("at least one key should be fed")
}

/// One recorded handler call: the handler's label and the arguments it got.
pub type Call = (String, Option<Vec<String>>);

/// Shared record of handler calls, in invocation order.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler that records `label` and acts.
    pub fn handler(&self, label: &str) -> Rc<dyn Handler> {
        self.handler_returning(label, true)
    }

    /// A handler that records `label` and returns `acted`.
    pub fn handler_returning(&self, label: &str, acted: bool) -> Rc<dyn Handler> {
        let journal = self.clone();
        let label = label.to_string();
        from_fn(move |_, args| {
            journal
                .0
                .borrow_mut()
                .push((label.clone(), args.map(<[String]>::to_vec)));
            Ok(acted)
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    /// Labels of every call so far.
    pub fn labels(&self) -> Vec<String> {
        self.0.borrow().iter().map(|(label, _)| label.clone()).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Convert string literals to an owned argument list.
pub fn args(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|item| (*item).to_string()).collect())
}
