//! Identifier grammar for passes, producers and consumers

use crate::error::{RenderError, RenderResult};

/// Target pass name that refers to the renderer's global scope.
pub const GLOBAL_SCOPE: &str = "$";

/// Whether `name` is a valid identifier: non-empty ASCII alphanumerics and
/// underscores, not starting with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate an identifier, naming its `kind` in the error.
pub fn validate_identifier(kind: &'static str, name: &str) -> RenderResult<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(RenderError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

/// Validate the pass half of a consumer target. Accepts [`GLOBAL_SCOPE`].
pub fn validate_target_pass(name: &str) -> RenderResult<()> {
    if name == GLOBAL_SCOPE {
        return Ok(());
    }
    validate_identifier("target pass", name)
}
