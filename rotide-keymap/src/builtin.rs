//! Builtin commands the console ships with.
//!
//! [`Builtins`] plays the host role: it owns the handler objects and must
//! outlive every engine they are installed into.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::engine::Engine;
use crate::error::{BindError, KeyParseError};
use crate::handler::{from_fn, Handler, HandlerContext, HandlerError};
use crate::key::{parse_key_sequence, render_sequence, KeyCode};
use crate::status::StatusSink;

pub const INSERT_STATUS: &str = "-- INSERT --";
pub const WAITING_STATUS: &str = "-- WAITING --";

/// Key bindings installed before the user's `[keys]` table.
pub const DEFAULT_KEYS: &[(&str, &str)] = &[
    ("i", "insert_mode"),
    ("esc", "normal_mode"),
    ("C-q", "quit"),
];

/// The builtin handlers, keyed by command name.
pub struct Builtins {
    handlers: HashMap<&'static str, Rc<dyn Handler>>,
    quit: Rc<Cell<bool>>,
}

impl Builtins {
    #[must_use]
    pub fn new() -> Self {
        let quit = Rc::new(Cell::new(false));

        let mut base: HashMap<&'static str, Rc<dyn Handler>> = HashMap::new();
        base.insert("insert_mode", from_fn(insert_mode));
        base.insert("normal_mode", from_fn(normal_mode));
        base.insert("echo", from_fn(echo));
        base.insert("quit", {
            let quit = Rc::clone(&quit);
            from_fn(move |_, _| {
                quit.set(true);
                Ok(true)
            })
        });

        // `bind` reaches every other builtin, so it is built last.
        let targets = Rc::new(base.clone());
        let mut handlers = base;
        handlers.insert("bind", from_fn(move |cx, args| bind(&targets, cx, args)));

        Self { handlers, quit }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rc<dyn Handler>> {
        self.handlers.get(name)
    }

    /// Builtin command names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Whether the `quit` command has run.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit.get()
    }

    /// The default keys with `overrides` merged over them.
    ///
    /// Descriptions are parsed first, so `esc`, `ESC` and `escape` name the
    /// same binding and the later one wins.
    pub fn merged_keys(
        overrides: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<Vec<KeyCode>, String>, KeyParseError> {
        let defaults = DEFAULT_KEYS.iter().map(|&(desc, name)| (desc, name));
        let user = overrides
            .iter()
            .map(|(desc, name)| (desc.as_str(), name.as_str()));

        let mut keys = BTreeMap::new();
        for (desc, name) in defaults.chain(user) {
            keys.insert(parse_key_sequence(desc)?, name.to_string());
        }
        Ok(keys)
    }

    /// Bind `keys` (sequence → command name) in `engine`.
    ///
    /// The first chord for a command also registers the command name; every
    /// builtin left without a chord is registered by name only.
    pub fn install<S: StatusSink>(
        &self,
        engine: &mut Engine<S>,
        keys: &BTreeMap<Vec<KeyCode>, String>,
    ) -> Result<(), BindError> {
        for (sequence, name) in keys {
            let handler = self
                .get(name)
                .ok_or_else(|| BindError::UnknownCommand(name.clone()))?;
            if engine.keymap().commands().contains(name) {
                engine.bind_keys(sequence, handler)?;
            } else {
                engine.bind_chord(sequence, name, handler)?;
            }
        }
        for name in self.names() {
            if engine.keymap().commands().contains(name) {
                continue;
            }
            if let Some(handler) = self.get(name) {
                engine.bind_command(name, handler);
            }
        }
        log::info!("installed {} key binding(s)", keys.len());
        log::debug!(
            "commands: {}",
            engine.keymap().commands().names().join(", ")
        );
        Ok(())
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

fn insert_mode(cx: &mut HandlerContext<'_>, _: Option<&[String]>) -> Result<bool, HandlerError> {
    cx.set_insert_mode(true);
    cx.set_status(INSERT_STATUS);
    Ok(true)
}

/// Leave insert mode. Declines outside insert mode so `esc` can start a chord.
fn normal_mode(cx: &mut HandlerContext<'_>, _: Option<&[String]>) -> Result<bool, HandlerError> {
    cx.set_status(WAITING_STATUS);
    if cx.insert_mode() {
        cx.set_insert_mode(false);
        return Ok(true);
    }
    Ok(false)
}

fn echo(cx: &mut HandlerContext<'_>, args: Option<&[String]>) -> Result<bool, HandlerError> {
    let text = match args {
        Some(args) => args.join(" "),
        None => render_sequence(cx.keys()),
    };
    cx.set_status(text);
    Ok(true)
}

/// `bind <keys> <command>`: bind a key description to another builtin.
fn bind(
    targets: &HashMap<&'static str, Rc<dyn Handler>>,
    cx: &mut HandlerContext<'_>,
    args: Option<&[String]>,
) -> Result<bool, HandlerError> {
    let Some([desc, name]) = args else {
        return Err(HandlerError::new("usage: bind <keys> <command>"));
    };
    let handler = targets
        .get(name.as_str())
        .ok_or_else(|| HandlerError::new(format!("unknown command: {name}")))?;
    let sequence =
        parse_key_sequence(desc).map_err(|err| HandlerError::new(err.to_string()))?;
    cx.bind_keys(&sequence, handler)
        .map_err(|err| HandlerError::new(err.to_string()))?;
    cx.set_status(format!("{} bound to {name}", render_sequence(&sequence)));
    Ok(true)
}
