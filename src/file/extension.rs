//! Upload extension allow-list.

use std::collections::BTreeSet;

use crate::config::StorageConfig;

use super::DEFAULT_ALLOWED_EXTENSIONS;

/// Decides whether an uploaded filename carries an accepted extension.
///
/// The extension is everything after the **first** dot of the filename,
/// compared case-insensitively. `notes.TXT` is accepted while
/// `archive.tar.gz` is checked as `tar.gz` and rejected unless that exact
/// compound extension is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    allowed: BTreeSet<String>,
}

impl ExtensionPolicy {
    /// Build a policy from a list of extensions.
    ///
    /// Entries are lowercased and a leading dot is dropped, so `".PDF"` and
    /// `"pdf"` are equivalent. Blank entries are ignored.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self { allowed }
    }

    /// Build a policy from the storage configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.allowed_extensions)
    }

    /// Check whether `filename` may be uploaded.
    pub fn is_allowed(&self, filename: &str) -> bool {
        match filename.split_once('.') {
            Some((_, ext)) => self.allowed.contains(&ext.to_lowercase()),
            None => false,
        }
    }

    /// Accepted extensions in sorted order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EXTENSIONS)
    }
}
