//! satchel - Subject-scoped study material uploads
//!
//! A small HTTP service that stores uploaded files in one directory per
//! subject, lists them and serves them back, implemented in Rust.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod template;
pub mod web;

pub use config::Config;
pub use error::{Result, SatchelError};
pub use file::{
    split_extension, validate_segment, ExtensionPolicy, SegmentKind, StoredFile, SubjectStorage,
};
pub use web::WebServer;
