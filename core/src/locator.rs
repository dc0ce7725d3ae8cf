#![deny(missing_docs)]

//! # Section Locator
//!
//! Finds where a validation block belongs inside a single CRD document, working
//! line by line from indentation instead of a parsed tree.
//!
//! For [`TargetPath::Spec`] the block goes right after the `type: object` line
//! that closes the `spec:` property schema, e.g.
//!
//! ```yaml
//!           spec:
//!             properties:
//!               topicRef:
//!                 type: string
//!             type: object      <- accepted line
//!           status:             <- block is inserted before this line
//! ```

use crate::registry::TargetPath;

const SCHEMA_ROOT: &str = "type: object";
const SIBLING_MARKER: &str = "status:";
const NESTING_STEP: usize = 2;

/// Line and indentation at which a rendered block is inserted.
///
/// Only meaningful for the document it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    /// Zero based index of the line the block is inserted before.
    pub line_index: usize,
    /// Indentation of the block header, in spaces.
    pub indent_width: usize,
}

impl InsertionPoint {
    /// Byte offset in `document` of the start of line `line_index`.
    pub fn byte_offset(&self, document: &str) -> usize {
        document
            .split('\n')
            .take(self.line_index)
            .map(|line| line.len() + 1)
            .sum::<usize>()
            .min(document.len())
    }

    /// Line ending used by the line right above the insertion point.
    pub fn line_ending<'d>(&self, document: &'d str) -> &'d str {
        let preceding = self
            .line_index
            .checked_sub(1)
            .and_then(|idx| document.split('\n').nth(idx));
        match preceding {
            Some(line) if line.ends_with('\r') => "\r\n",
            _ => "\n",
        }
    }
}

/// Locates the insertion point for `target` in `document`.
///
/// Returns `None` when the document never reaches a qualifying line.
pub fn locate(document: &str, target: TargetPath) -> Option<InsertionPoint> {
    match target {
        TargetPath::Spec => locate_section(document, "spec"),
    }
}

/// Scans for `<key>:` and then for the `type: object` line two columns deeper that
/// ends the section. A later `<key>:` line restarts the search at its own depth.
fn locate_section(document: &str, key: &str) -> Option<InsertionPoint> {
    let lines: Vec<&str> = document.split('\n').collect();
    let mut section_indent: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        if let Some(indent) = section_header_indent(line, key) {
            section_indent = Some(indent);
            continue;
        }

        let Some(base) = section_indent else {
            continue;
        };
        let expected = base + NESTING_STEP;
        if !is_schema_root(line, expected) {
            continue;
        }

        // Deeper `type: object` lines belong to nested properties
        let Some(next) = lines.get(idx + 1) else {
            continue;
        };
        if indent_width(next) <= expected || next.contains(SIBLING_MARKER) {
            return Some(InsertionPoint {
                line_index: idx + 1,
                indent_width: expected,
            });
        }
    }

    None
}

/// Indentation of a `<key>:` line that opens a block, or `None` for any other line.
fn section_header_indent(line: &str, key: &str) -> Option<usize> {
    let body = line.trim_start();
    let rest = body.strip_prefix(key)?.strip_prefix(':')?;
    if !rest.trim().is_empty() {
        return None;
    }
    Some(indent_width(line))
}

/// True for a line made of exactly `indent` spaces followed by `type: object`.
fn is_schema_root(line: &str, indent: usize) -> bool {
    let bytes = line.as_bytes();
    if bytes.len() < indent || !bytes[..indent].iter().all(|b| *b == b' ') {
        return false;
    }
    line[indent..]
        .strip_prefix(SCHEMA_ROOT)
        .is_some_and(|rest| rest.trim().is_empty())
}

fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
