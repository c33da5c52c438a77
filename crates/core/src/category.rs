//! Food-category labels ("Italian", "Vegan", ...).
//!
//! Categories are free text entered by users and recipe authors, so every
//! comparison goes through [`normalize`]: trimmed and lower-cased.

use crate::error::CoreError;

/// Maximum length of a category label after trimming.
pub const MAX_CATEGORY_LEN: usize = 64;

/// Canonical comparison form of a category label.
pub fn normalize(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Whether `candidate` names the same category as an already-normalized
/// `target`.
pub fn matches_normalized(candidate: &str, target: &str) -> bool {
    candidate.trim().to_lowercase() == target
}

/// Validate a user-supplied category and return it trimmed.
///
/// The original casing is preserved so responses echo what the user typed.
pub fn validate(category: &str) -> Result<&str, CoreError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("category must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_CATEGORY_LEN {
        return Err(CoreError::Validation(format!(
            "category must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }
    Ok(trimmed)
}
