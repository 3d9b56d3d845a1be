use anyhow::Context;
use anyhow::Result;

use crate::bailc;
use crate::constants::CONFIG_BEGIN_MARKER;
use crate::constants::CONFIG_END_MARKER;

/// One raw `NAME=value` assignment found inside the configuration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// The assigned name, e.g. `NUM_NODES`.
    pub name: String,

    /// The unevaluated right-hand side.
    pub expr: String,
}

/// Extract the raw assignment lines from a script's configuration block.
///
/// The block is the single contiguous region between [CONFIG_BEGIN_MARKER]
/// and [CONFIG_END_MARKER]. Within it only comment lines are scanned, and of
/// those only lines of `NAME=value` shape are kept; comment-only prose is
/// ignored. Assignment-shaped text outside the region is never considered.
///
/// Fails when the markers are absent or unbalanced, and when the region
/// contains no assignment at all.
pub fn assignment_lines(script: &str) -> Result<Vec<Assignment>> {
    let mut lines = script.lines();

    if !lines.any(|line| line.trim_end() == CONFIG_BEGIN_MARKER) {
        bailc!(
            "No launch configuration found", ;
            "The script does not contain the line `{CONFIG_BEGIN_MARKER}`", ;
            "Add a config block delimited by `{CONFIG_BEGIN_MARKER}` and `{CONFIG_END_MARKER}`",
        );
    }

    let mut assignments = Vec::new();
    let mut closed = false;

    for line in lines {
        if line.trim_end() == CONFIG_END_MARKER {
            closed = true;
            break;
        }

        if let Some(assignment) = parse_comment_assignment(line) {
            assignments.push(assignment);
        }
    }

    if !closed {
        bailc!(
            "No launch configuration found", ;
            "The line `{CONFIG_BEGIN_MARKER}` is never closed by `{CONFIG_END_MARKER}`", ;
            "Add the end marker after the last config field",
        );
    }

    if assignments.is_empty() {
        bailc!(
            "No launch configuration found", ;
            "The config block contains no `NAME=value` assignment", ;
            "Declare the launch fields inside the block, for example `# NUM_NODES=2`",
        );
    }

    Ok(assignments)
}

/// Parse one region line into an assignment, if it is one.
///
/// Only comment lines qualify; the comment prefix is stripped before the
/// `NAME=value` shape is checked.
fn parse_comment_assignment(line: &str) -> Option<Assignment> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return None;
    }

    let body = trimmed.trim_start_matches('#').trim();
    let (name, expr) = body.split_once('=')?;
    let name = name.trim();

    if !is_config_name(name) {
        return None;
    }

    Some(Assignment {
        name: name.to_string(),
        expr: expr.trim().to_string(),
    })
}

/// Whether a string has the shape of a config field name.
fn is_config_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_uppercase() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
#[path = "tests/extract.rs"]
mod tests;
