use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ClientError, Result};

/// A validated request: one parenthesized expression, surrounding whitespace
/// stripped.
///
/// Only the outer parentheses are checked; the server parses the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sentence(String);

impl Sentence {
    /// Trim and validate raw sentence text.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.len() < 2 || !trimmed.starts_with('(') || !trimmed.ends_with(')') {
            return Err(ClientError::BadFormat(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Create an individual `name` whose parent is `parent`.
    pub fn new_indv(name: &str, parent: &str) -> Self {
        Self(format!("(new-indv {{{name}}} {{{parent}}})"))
    }

    /// Remove every element created after `marker` (the marker itself stays).
    pub fn remove_elements_after(marker: &str) -> Self {
        Self(format!("(remove-elements-after {{{marker}}})"))
    }

    /// Remove the most recently created element.
    pub fn remove_last_element() -> Self {
        Self("(remove-last-element)".to_string())
    }

    /// Load a knowledge file that lives on the server's filesystem.
    pub fn load_kb(path: &Path) -> Self {
        Self(format!("(load-kb \"{}\")", escape_lisp_string(&path.to_string_lossy())))
    }

    /// The sentence text as sent on the wire (without the newline).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the owned text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Sentence {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for Sentence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape_lisp_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
