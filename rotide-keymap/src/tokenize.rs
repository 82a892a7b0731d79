//! Argument tokenizer for command-prefix and command-line dispatch.
//!
//! Splitting rules:
//! - ASCII space separates tokens, unless it sits inside a double-quoted run.
//! - `"` toggles quoting and is never part of a token.
//! - `\` makes the next character literal (space, quote, or backslash) and is
//!   itself dropped. A trailing lone backslash is kept as-is.
//! - Consecutive unquoted spaces produce empty tokens.

/// Split `text` into arguments.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    if text.is_empty() {
        return tokens;
    }

    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            ' ' if !quoted => tokens.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    if escaped {
        current.push('\\');
    }
    tokens.push(current);
    tokens
}

/// Split a command line at its first unescaped space.
///
/// Returns the command name with escapes removed and the raw text after the
/// space (empty when there is no space or nothing follows it).
#[must_use]
pub fn split_command(text: &str) -> (String, &str) {
    let mut name = String::new();
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if escaped {
            name.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            ' ' => return (name, text.get(idx + 1..).unwrap_or_default()),
            _ => name.push(ch),
        }
    }
    if escaped {
        name.push('\\');
    }
    (name, "")
}
