//! Status line output.
//!
//! The engine writes in-progress chords, handler status text, and errors to a
//! [`StatusSink`]. Rendering is up to the sink: [`MemorySink`] keeps lines for
//! inspection, [`AnsiSink`] paints a terminal row with crossterm commands.

use std::io::{self, Write};

use crossterm::cursor::{MoveTo, MoveToColumn, RestorePosition, SavePosition};
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

/// How a status line should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusStyle {
    #[default]
    Info,
    /// An in-progress chord, argument text, or command line.
    Pending,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub text: String,
    pub style: StatusStyle,
}

impl StatusLine {
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: StatusStyle::Info,
        }
    }

    #[must_use]
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: StatusStyle::Pending,
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: StatusStyle::Error,
        }
    }
}

/// Where status text goes. Each write replaces the whole line.
pub trait StatusSink {
    fn write_status(&mut self, line: &StatusLine);

    fn clear_status(&mut self) {
        self.write_status(&StatusLine::default());
    }
}

/// Records every status line written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<StatusLine>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[StatusLine] {
        &self.lines
    }

    #[must_use]
    pub fn last(&self) -> Option<&StatusLine> {
        self.lines.last()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl StatusSink for MemorySink {
    fn write_status(&mut self, line: &StatusLine) {
        self.lines.push(line.clone());
    }
}

/// Paints the status line on a terminal.
///
/// With a fixed row the cursor is saved, moved there, and restored after the
/// line is drawn. Otherwise the current row is redrawn from its first column.
pub struct AnsiSink<W: Write> {
    writer: W,
    row: Option<u16>,
}

impl<W: Write> AnsiSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, row: None }
    }

    /// Draw at a fixed, 1-based terminal row.
    #[must_use]
    pub fn at_row(mut self, row: u16) -> Self {
        self.row = Some(row);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn color(style: StatusStyle) -> (Color, bool) {
        match style {
            StatusStyle::Info => (Color::DarkGreen, false),
            StatusStyle::Pending => (Color::DarkYellow, true),
            StatusStyle::Error => (Color::DarkRed, true),
        }
    }

    fn paint(&mut self, line: &StatusLine) -> io::Result<()> {
        match self.row {
            Some(row) => queue!(self.writer, SavePosition, MoveTo(0, row.saturating_sub(1)))?,
            None => queue!(self.writer, MoveToColumn(0))?,
        }
        queue!(self.writer, Clear(ClearType::CurrentLine))?;
        if !line.text.is_empty() {
            let (color, bold) = Self::color(line.style);
            queue!(self.writer, SetForegroundColor(color))?;
            if bold {
                queue!(self.writer, SetAttribute(Attribute::Bold))?;
            }
            queue!(self.writer, Print(&line.text), SetAttribute(Attribute::Reset))?;
        }
        if self.row.is_some() {
            queue!(self.writer, RestorePosition)?;
        }
        self.writer.flush()
    }
}

impl<W: Write> StatusSink for AnsiSink<W> {
    fn write_status(&mut self, line: &StatusLine) {
        if let Err(err) = self.paint(line) {
            log::warn!("failed to write status line: {err}");
        }
    }
}
