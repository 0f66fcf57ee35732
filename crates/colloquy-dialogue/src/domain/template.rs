//! `{variable}` substitution in dialogue text.
//!
//! Resolution fails open: a placeholder naming an unset variable is left in
//! the output verbatim so broken content stays visible. Malformed placeholders
//! are caught earlier by [`lint`], which graph construction runs over all text.

use std::sync::LazyLock;

use colloquy_core::error::TemplateError;
use colloquy_core::variables::VariableStore;
use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder regex must compile"));

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Substitutes every `{name}` in `text` with the value of `name` in `store`.
///
/// Single left-to-right pass; substituted values are never rescanned.
#[must_use]
pub fn resolve(text: &str, store: &VariableStore) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| match store.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Returns the distinct variable names referenced by `text`, in order of
/// first appearance.
#[must_use]
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        if let Some(name) = caps.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Checks `text` for malformed placeholders.
///
/// A `{` followed by a name that reaches the end of the line without a
/// closing `}` is unterminated; `{}` is empty. Braces around anything other
/// than a bare name are ordinary prose and are accepted.
///
/// # Errors
///
/// Returns the first `TemplateError` found.
pub fn lint(text: &str) -> Result<(), TemplateError> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let rest = &bytes[i + 1..];
        if rest.first() == Some(&b'}') {
            return Err(TemplateError::Empty { offset: i });
        }
        let name_len = rest.iter().take_while(|b| is_word_byte(**b)).count();
        if name_len > 0 && rest.get(name_len) != Some(&b'}') {
            let line = rest.split(|b| *b == b'\n').next().unwrap_or_default();
            if !line.contains(&b'}') {
                return Err(TemplateError::Unterminated { offset: i });
            }
        }
        i += 1 + name_len;
    }
    Ok(())
}
