//! Tracing configuration for the rotide binary.
//!
//! The terminal is in raw mode and owned by the status line, so events go to
//! the log file when it can be created. Without `RUST_LOG`, rotide's own
//! crates log at the configured level and everything else at `warn`.
//! Keystrokes are only logged when `log_keys` is set.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use rotide_keymap::config::LoggingConfig;
use rotide_keymap::engine::KEY_LOG_TARGET;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Targets that follow the configured level.
const OWN_TARGETS: &[&str] = &["rotide_keymap", "rotide"];

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(config: &LoggingConfig) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(OWN_TARGETS.iter().map(|target| format!("{target}={}", config.level)));
    if !config.log_keys {
        directives.push(format!("{KEY_LOG_TARGET}=off"));
    }
    directives.join(",")
}

/// Drops formatted events containing any suppressed pattern.
struct FilteringFormatter {
    inner: fmt::format::Format,
    suppressed_patterns: Vec<String>,
}

impl FilteringFormatter {
    fn new(suppressed_patterns: Vec<String>) -> Self {
        Self {
            inner: fmt::format::Format::default()
                .with_target(true)
                .with_ansi(false),
            suppressed_patterns,
        }
    }

    fn is_suppressed(&self, line: &str) -> bool {
        self.suppressed_patterns
            .iter()
            .any(|pattern| line.contains(pattern.as_str()))
    }
}

impl<S, N> FormatEvent<S, N> for FilteringFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut line = String::new();
        self.inner.format_event(ctx, Writer::new(&mut line), event)?;
        if self.is_suppressed(&line) {
            return Ok(());
        }
        write!(writer, "{line}")
    }
}

/// Install the global subscriber. Returns the log file in use, or `None`
/// when output fell back to stderr.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init(config: &LoggingConfig) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    let log_file = config
        .log_file
        .as_ref()
        .and_then(|path| File::create(path).ok().map(|file| (path.clone(), file)));
    let (writer, path) = match log_file {
        Some((path, file)) => (BoxMakeWriter::new(Mutex::new(file)), Some(path)),
        None => (BoxMakeWriter::new(io::stderr), None),
    };

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .event_format(FilteringFormatter::new(config.suppressed_patterns.clone()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_scope_level_to_own_crates() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(
            default_directives(&config),
            "warn,rotide_keymap=debug,rotide=debug,rotide_keymap::keys=off"
        );
    }

    #[test]
    fn key_logging_lifts_the_keystroke_filter() {
        let config = LoggingConfig {
            level: "trace".to_string(),
            log_keys: true,
            ..LoggingConfig::default()
        };
        let directives = default_directives(&config);
        assert!(!directives.contains("=off"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn suppressed_patterns_match_anywhere_in_the_line() {
        let formatter = FilteringFormatter::new(vec!["bound command".to_string()]);
        assert!(formatter.is_suppressed("DEBUG rotide_keymap::keymap: bound command echo"));
        assert!(!formatter.is_suppressed("DEBUG rotide_keymap::keymap: bound <CTRL+a>"));
    }
}
