//! Home-relative and variable-bearing path expansion.
//!
//! Settings and hook commands carry paths like `~/.cache/x`, `$HOME/x` or
//! `${CLAUDE_PROJECT_DIR}/x`. Unknown variables are left verbatim.

use std::path::PathBuf;

/// The user's home directory, falling back to `/tmp`.
pub fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string())
}

/// Expand `~` and environment variables against the process environment.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(expand_with(raw, |name| std::env::var(name).ok()))
}

/// Expand a leading `~`, `$NAME` and `${NAME}` using `lookup`.
///
/// `~` resolves through `lookup("HOME")`.
pub fn expand_with<F>(raw: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    if rest == "~" || rest.starts_with("~/") {
        if let Some(home) = lookup("HOME") {
            out.push_str(&home);
            rest = &rest[1..];
        }
    }

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(value)) => out.push_str(&value),
            _ => {
                out.push('$');
                out.push_str(&after[..consumed]);
            }
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}
