//! # Resource Matcher
//!
//! Decides which registry entry, if any, a document belongs to.
//!
//! Matching is a plain substring test for `name: <identifier>` anywhere in the
//! document. It does not check that the hit is `metadata.name`, so an identifier
//! quoted in a description, a comment or another field also matches, as does
//! any identifier sharing the registered one as a prefix.

use crate::registry::{Registry, ValidationSpec};

/// The declaration searched for in a document.
pub fn declaration(identifier: &str) -> String {
    format!("name: {}", identifier)
}

/// Returns the first registry entry (in registration order) declared by `document`.
pub fn match_document<'r>(
    document: &str,
    registry: &'r Registry,
) -> Option<(&'r str, &'r ValidationSpec)> {
    registry
        .iter()
        .find(|(identifier, _)| document.contains(&declaration(identifier)))
}
