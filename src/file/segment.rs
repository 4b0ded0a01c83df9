//! Path segment checks for subjects and filenames.
//!
//! Subjects and filenames come straight from the client and are joined onto
//! the storage root, so each must be exactly one normal path component.

use crate::{Result, SatchelError};

use super::MAX_SEGMENT_LENGTH;

/// What a checked segment names, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A subject directory name.
    Subject,
    /// A stored filename.
    Filename,
}

impl SegmentKind {
    fn label(self) -> &'static str {
        match self {
            SegmentKind::Subject => "subject",
            SegmentKind::Filename => "filename",
        }
    }
}

/// Check that `value` is safe to use as a single path component.
///
/// Rejects empty values, `.` and `..`, path separators (`/` and `\`),
/// control characters including NUL, and values longer than
/// [`MAX_SEGMENT_LENGTH`] bytes.
pub fn validate_segment(kind: SegmentKind, value: &str) -> Result<&str> {
    let label = kind.label();

    let reason = if value.is_empty() {
        Some("is empty")
    } else if value == "." || value == ".." {
        Some("refers to a directory")
    } else if value.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if value.chars().any(char::is_control) {
        Some("contains a control character")
    } else if value.len() > MAX_SEGMENT_LENGTH {
        Some("is too long")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SatchelError::Validation(format!("{label} {reason}"))),
        None => Ok(value),
    }
}
