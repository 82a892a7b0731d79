//! Handlers: the host-owned callables that bindings point at.
//!
//! The host keeps every handler alive as an `Rc<dyn Handler>`. The engine only
//! stores [`HandlerRef`]s, which are weak: if the host drops a handler while a
//! binding still names it, invoking that binding reports a
//! [`DispatchError::HandlerInvocationFailure`](crate::error::DispatchError)
//! rather than reaching freed state.

use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::BindError;
use crate::key::KeyCode;
use crate::keymap::Keymap;

/// Something a key binding or command can invoke.
pub trait Handler {
    /// Run the handler.
    ///
    /// `args` is `Some` only for command-prefix and command-line dispatch,
    /// where trailing text was tokenized into arguments. Return `Ok(true)`
    /// when the handler acted, `Ok(false)` to decline the keystroke.
    fn invoke(
        &self,
        cx: &mut HandlerContext<'_>,
        args: Option<&[String]>,
    ) -> Result<bool, HandlerError>;
}

/// Adapter that turns a closure into a [`Handler`].
pub struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut HandlerContext<'_>, Option<&[String]>) -> Result<bool, HandlerError>,
{
    fn invoke(
        &self,
        cx: &mut HandlerContext<'_>,
        args: Option<&[String]>,
    ) -> Result<bool, HandlerError> {
        (self.0)(cx, args)
    }
}

/// Wrap a closure as a shared handler.
pub fn from_fn<F>(f: F) -> Rc<dyn Handler>
where
    F: Fn(&mut HandlerContext<'_>, Option<&[String]>) -> Result<bool, HandlerError> + 'static,
{
    Rc::new(FnHandler(f))
}

/// Non-owning reference to a host handler.
#[derive(Clone)]
pub struct HandlerRef(Weak<dyn Handler>);

impl HandlerRef {
    #[must_use]
    pub fn new(handler: &Rc<dyn Handler>) -> Self {
        Self(Rc::downgrade(handler))
    }

    /// The handler, if its owner still holds it.
    #[must_use]
    pub fn upgrade(&self) -> Option<Rc<dyn Handler>> {
        self.0.upgrade()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether both references point at the same handler.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// An error raised by a handler while it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    pub message: String,
    /// Where the failure happened in the host's terms, such as `rotide.js:12`.
    pub location: Option<String>,
}

impl HandlerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub(crate) fn released() -> Self {
        Self::new("handler was released by its owner")
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "<{location}> {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for HandlerError {}

/// What a handler can see and change while it runs.
pub struct HandlerContext<'a> {
    pub(crate) keymap: &'a mut Keymap,
    pub(crate) insert_mode: &'a mut bool,
    pub(crate) status: &'a mut Option<String>,
    pub(crate) keys: &'a [KeyCode],
    pub(crate) command: Option<&'a str>,
}

impl HandlerContext<'_> {
    /// The keys that resolved to this invocation.
    #[must_use]
    pub fn keys(&self) -> &[KeyCode] {
        self.keys
    }

    /// The command name, when dispatched from the command line.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.command
    }

    #[must_use]
    pub fn insert_mode(&self) -> bool {
        *self.insert_mode
    }

    pub fn set_insert_mode(&mut self, enabled: bool) {
        *self.insert_mode = enabled;
    }

    /// Replace the status text shown once the dispatch completes.
    pub fn set_status(&mut self, text: impl Into<String>) {
        *self.status = Some(text.into());
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn bind_chord(
        &mut self,
        keys: &[KeyCode],
        name: &str,
        handler: &Rc<dyn Handler>,
    ) -> Result<(), BindError> {
        self.keymap.bind_chord(keys, name, handler)
    }

    pub fn bind_keys(
        &mut self,
        keys: &[KeyCode],
        handler: &Rc<dyn Handler>,
    ) -> Result<(), BindError> {
        self.keymap.bind_keys(keys, handler)
    }

    pub fn bind_command(&mut self, name: &str, handler: &Rc<dyn Handler>) {
        self.keymap.bind_command(name, handler);
    }

    /// The bindings, for handlers that inspect what is registered.
    #[must_use]
    pub fn keymap(&self) -> &Keymap {
        self.keymap
    }
}
