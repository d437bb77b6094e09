//! Textual encoding of a context path: a comma-separated list of child
//! indices, e.g. `"0,1"` for "first child, then second child".

use crate::error::WeakenError;
use std::fmt;

/// Parse `"0,1,0"` into `[0, 1, 0]`. The empty string parses to the empty
/// path (the root itself).
pub fn parse_path(s: &str) -> Result<Vec<usize>, WeakenError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(',')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|_| {
                WeakenError::parse_error(1, 1, format!("invalid path component: '{part}'"))
            })
        })
        .collect()
}

/// Render `[0, 1, 0]` back into `"0,1,0"`.
pub fn format_path(path: &[usize]) -> String {
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub struct DisplayPath<'a>(pub &'a [usize]);

impl fmt::Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_path(self.0))
    }
}
