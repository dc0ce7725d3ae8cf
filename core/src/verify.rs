//! # Output Verification
//!
//! Optional check that a patched document still parses and that the injected
//! block landed as a well-formed list of rules.

use crate::error::{AppError, AppResult};
use crate::render::VALIDATIONS_KEY;
use serde_yaml::Value;

/// Parses `document` and checks it holds `expected_rules` validations.
pub fn verify_document(document: &str, expected_rules: usize) -> AppResult<()> {
    let root: Value = serde_yaml::from_str(document)?;

    let validations = find_key(&root, VALIDATIONS_KEY).ok_or_else(|| {
        AppError::InvalidOutput(format!("'{}' not found after patching", VALIDATIONS_KEY))
    })?;

    let items = validations.as_sequence().ok_or_else(|| {
        AppError::InvalidOutput(format!("'{}' is not a sequence", VALIDATIONS_KEY))
    })?;

    if items.len() != expected_rules {
        return Err(AppError::InvalidOutput(format!(
            "expected {} validations, found {}",
            expected_rules,
            items.len()
        )));
    }

    for (idx, item) in items.iter().enumerate() {
        let has_rule = item.get("rule").and_then(Value::as_str).is_some();
        let has_message = item.get("message").and_then(Value::as_str).is_some();
        if !has_rule || !has_message {
            return Err(AppError::InvalidOutput(format!(
                "validation #{} is missing 'rule' or 'message'",
                idx
            )));
        }
    }

    Ok(())
}

/// Depth-first search for the first mapping entry named `key`.
fn find_key<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Mapping(map) => map
            .get(key)
            .or_else(|| map.values().find_map(|v| find_key(v, key))),
        Value::Sequence(items) => items.iter().find_map(|v| find_key(v, key)),
        Value::Tagged(tagged) => find_key(&tagged.value, key),
        _ => None,
    }
}
