//! Puzzle identity: human-readable names and their folder identifiers.

use std::fmt;

use crate::error::PuzzleError;

/// Filesystem-safe identifier of a puzzle's storage namespace.
///
/// Always a single path component: non-empty, free of path separators and
/// NUL bytes, and never `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PuzzleId(String);

impl PuzzleId {
    /// Derive the folder identifier for a human-readable puzzle name.
    ///
    /// Distinct names can map to the same identifier ("My Puzzle" and
    /// "my_puzzle" both become `my_puzzle`).
    pub fn from_name(name: &str) -> Result<Self, PuzzleError> {
        let folder = to_folder_name(name);
        Self::parse(&folder).map_err(|_| PuzzleError::InvalidName {
            name: name.to_string(),
        })
    }

    /// Validate an existing folder identifier.
    pub fn parse(folder: &str) -> Result<Self, PuzzleError> {
        if is_safe_component(folder) {
            Ok(Self(folder.to_string()))
        } else {
            Err(PuzzleError::InvalidName {
                name: folder.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PuzzleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Transliterate a display name into snake case.
///
/// Uppercase letters become `_` plus the lowercase letter (except at the
/// start), spaces and hyphens become `_`, and everything else is kept.
pub fn to_folder_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);

    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == ' ' || ch == '-' {
            result.push('_');
        } else {
            result.push(ch);
        }
    }

    result
}

/// Whether `s` is usable as a single path component.
pub(crate) fn is_safe_component(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && !s.contains(['/', '\\', '\0'])
}
