//! Rotide Keymap - chord and command dispatch for the rotide text console
//!
//! This crate turns a stream of raw keystrokes into handler invocations. Keys
//! are bound into a prefix trie; command names live in a flat table with a
//! `"*"` fallback; free text typed after a chord or on the command line is
//! tokenized into arguments.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rotide_keymap::{from_fn, Engine, KeyCode, MemorySink};
//!
//! let greet = from_fn(|cx, _args| {
//!     cx.set_status("-- You know your ABCs --");
//!     Ok(true)
//! });
//!
//! let mut engine = Engine::new(MemorySink::new());
//! let chord = [KeyCode::ctrl('a'), KeyCode::ctrl('b')].map(Option::unwrap);
//! engine.bind_chord(&chord, "abc", &greet).unwrap();
//!
//! for key in chord {
//!     engine.dispatch(key);
//! }
//! assert!(engine.dispatch(rotide_keymap::key::ENTER).fired());
//! ```
//!
//! ## Ownership
//!
//! Handlers belong to the host. The engine keeps weak references only, so the
//! host must hold every `Rc<dyn Handler>` for as long as it stays bound. A
//! binding whose handler was dropped fails with
//! [`DispatchError::HandlerInvocationFailure`] instead of running.

// Public library modules
pub mod builtin;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod handler;
pub mod history;
pub mod key;
pub mod keymap;
pub mod status;
pub mod tokenize;

#[cfg(test)]
mod test_helpers;

// Convenience re-exports
pub use builtin::Builtins;
pub use config::RotideConfig;
pub use dispatch::{DispatchOutcome, InputMode};
pub use engine::Engine;
pub use error::{BindError, DispatchError, KeyParseError};
pub use handler::{from_fn, Handler, HandlerContext, HandlerError, HandlerRef};
pub use history::{History, HistoryEntry, Resolution};
pub use key::KeyCode;
pub use keymap::Keymap;
pub use status::{AnsiSink, MemorySink, StatusLine, StatusSink, StatusStyle};
pub use tokenize::tokenize;
