//! File management module for satchel.
//!
//! This module provides the upload storage core:
//! - Extension allow-listing for uploaded filenames
//! - Path segment checks for subjects and filenames
//! - Subject-scoped storage with collision-safe naming

mod extension;
mod segment;
mod storage;

pub use extension::ExtensionPolicy;
pub use segment::{validate_segment, SegmentKind};
pub use storage::{split_extension, StoredFile, SubjectStorage};

/// Extensions accepted when none are configured.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "jpg", "png"];

/// Maximum length of a subject or filename, in bytes.
pub const MAX_SEGMENT_LENGTH: usize = 255;
