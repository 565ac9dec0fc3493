//! Label input validation.
//!
//! Validation happens before a label reaches the store; the store itself
//! never rejects a label.

use crate::error::LabelError;

/// Maximum label length in characters, after trimming.
pub const MAX_LABEL_LEN: usize = 100;

/// Default label of a freshly created root.
pub const DEFAULT_ROOT_LABEL: &str = "Root Node";

/// Default label of a freshly created child.
pub const DEFAULT_CHILD_LABEL: &str = "New Node";

/// Trim and validate user input, returning the label to store.
pub fn validate_label(input: &str) -> Result<String, LabelError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LabelError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_LABEL_LEN {
        return Err(LabelError::TooLong {
            len,
            max: MAX_LABEL_LEN,
        });
    }
    Ok(trimmed.to_string())
}

/// Label equality ignoring surrounding whitespace.
pub fn labels_equal(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}
