//! # Validation Renderer
//!
//! Renders registered rules as an `x-kubernetes-validations` YAML block.

use crate::registry::ValidationRule;
use serde_json::Value as JsonValue;

/// Mapping key carrying CEL rules in a structural schema.
pub const VALIDATIONS_KEY: &str = "x-kubernetes-validations";

/// Header line of a rendered block, without indentation.
pub const VALIDATIONS_HEADER: &str = "x-kubernetes-validations:";

/// Renders `rules` with the header at `indent_width` spaces.
///
/// Each rule becomes a list item two columns deeper than the header:
///
/// ```yaml
/// x-kubernetes-validations:
///   - rule: "<expression>"
///     message: "<message>"
/// ```
///
/// Every line, the last one included, ends with `\n`.
pub fn render_validations(rules: &[ValidationRule], indent_width: usize) -> String {
    let header_pad = " ".repeat(indent_width);
    let item_pad = " ".repeat(indent_width + 2);

    let mut block = format!("{}{}\n", header_pad, VALIDATIONS_HEADER);
    for rule in rules {
        block.push_str(&format!(
            "{}- rule: {}\n",
            item_pad,
            quote_scalar(&rule.expression)
        ));
        block.push_str(&format!(
            "{}  message: {}\n",
            item_pad,
            quote_scalar(&rule.message)
        ));
    }
    block
}

/// Double-quoted scalar. A JSON string literal is a valid YAML double-quoted scalar,
/// so quotes, backslashes and control characters come out escaped.
pub fn quote_scalar(value: &str) -> String {
    JsonValue::from(value).to_string()
}
