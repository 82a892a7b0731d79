//! Append-only log of completed key sequences.

use crate::key::KeyCode;

/// How a resolution attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Handlers ran.
    Fired,
    /// A handler failed or had been released.
    Failed,
    /// Nothing matched and the error was shown.
    Unresolved,
    /// Nothing matched, but insert mode swallowed the error.
    Suppressed,
    /// The user cancelled the pending input.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Keys consumed by the attempt. Never empty.
    pub keys: Vec<KeyCode>,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub(crate) fn push(&mut self, keys: Vec<KeyCode>, resolution: Resolution) {
        debug_assert!(!keys.is_empty(), "history entries always carry keys");
        self.entries.push(HistoryEntry { keys, resolution });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
