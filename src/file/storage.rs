//! Subject-scoped file storage for satchel.
//!
//! Files are stored under one directory per subject, keeping the client's
//! filename:
//! ```text
//! {root}/
//! ├── math/
//! │   ├── notes.txt
//! │   └── notes_1.txt
//! └── physics/
//!     └── lab.pdf
//! ```
//!
//! Subject directories are created on first use. A name that is already
//! taken is disambiguated by appending `_{n}` to its stem.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::{Result, SatchelError};

use super::segment::{validate_segment, SegmentKind};
use super::MAX_SEGMENT_LENGTH;

/// A file written by [`SubjectStorage::store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Subject the file was stored under.
    pub subject: String,
    /// Name the file was written as, possibly suffixed.
    pub filename: String,
    /// Full on-disk path.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: u64,
}

/// Storage rooted at a directory with one subdirectory per subject.
#[derive(Debug, Clone)]
pub struct SubjectStorage {
    root: PathBuf,
}

impl SubjectStorage {
    /// Create a new storage with the given root.
    ///
    /// The root directory will be created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Get the root path of this storage.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `subject`, without touching the filesystem.
    pub fn subject_dir(&self, subject: &str) -> Result<PathBuf> {
        let subject = validate_segment(SegmentKind::Subject, subject)?;
        Ok(self.root.join(subject))
    }

    /// Full path of `filename` under `subject`, without touching the filesystem.
    pub fn file_path(&self, subject: &str, filename: &str) -> Result<PathBuf> {
        let dir = self.subject_dir(subject)?;
        let filename = validate_segment(SegmentKind::Filename, filename)?;
        Ok(dir.join(filename))
    }

    /// Ensure the directory for `subject` exists. Idempotent.
    pub fn ensure_subject_dir(&self, subject: &str) -> Result<PathBuf> {
        let dir = self.subject_dir(subject)?;
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Pick a path for `filename` under `subject` that does not exist yet.
    ///
    /// Creates the subject directory if needed, but neither creates nor
    /// reserves the file. Two callers racing on the same name can both be
    /// handed the same path; use [`SubjectStorage::store`] to write safely.
    pub fn resolve_path(&self, subject: &str, filename: &str) -> Result<PathBuf> {
        validate_segment(SegmentKind::Filename, filename)?;
        let dir = self.ensure_subject_dir(subject)?;

        for name in candidate_names(filename) {
            let path = dir.join(name);
            if !path.exists() {
                return Ok(path);
            }
        }

        Err(names_exhausted(filename))
    }

    /// Write `content` as `filename` under `subject` without overwriting.
    ///
    /// Each candidate name (`notes.txt`, `notes_1.txt`, `notes_2.txt`, ...)
    /// is claimed with an exclusive create, so concurrent uploads of the
    /// same name always end up in distinct files.
    pub fn store(&self, subject: &str, filename: &str, content: &[u8]) -> Result<StoredFile> {
        validate_segment(SegmentKind::Filename, filename)?;
        let dir = self.ensure_subject_dir(subject)?;

        for name in candidate_names(filename) {
            let path = dir.join(&name);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            let written = file.write_all(content);
            drop(file);
            if let Err(e) = written {
                let _ = fs::remove_file(&path);
                return Err(e.into());
            }

            tracing::debug!(subject, filename = %name, size = content.len(), "Stored file");

            return Ok(StoredFile {
                subject: subject.to_string(),
                filename: name,
                path,
                size: content.len() as u64,
            });
        }

        Err(names_exhausted(filename))
    }

    /// List the files stored under `subject`, sorted by name.
    ///
    /// A subject that has never received an upload has no files.
    pub fn list(&self, subject: &str) -> Result<Vec<String>> {
        let dir = self.subject_dir(subject)?;

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(?raw, "Skipping non UTF-8 filename"),
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load the content of `filename` under `subject`.
    pub fn load(&self, subject: &str, filename: &str) -> Result<Vec<u8>> {
        let path = self.file_path(subject, filename)?;
        let not_found = || SatchelError::NotFound(format!("File: {subject}/{filename}"));

        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        match fs::read(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Names tried for `filename`, in order: the name itself, then `stem_1.ext`,
/// `stem_2.ext`, ...
///
/// The stem is shortened on a char boundary so every name stays within
/// [`MAX_SEGMENT_LENGTH`] bytes. The sequence ends once the suffix alone no
/// longer fits.
fn candidate_names(filename: &str) -> impl Iterator<Item = String> + '_ {
    let (stem, ext) = split_extension(filename);

    std::iter::once(filename.to_string()).chain((1u64..).map_while(move |n| {
        let suffix = format!("_{n}{ext}");
        let budget = MAX_SEGMENT_LENGTH.checked_sub(suffix.len())?;

        let mut end = stem.len().min(budget);
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        Some(format!("{}{suffix}", &stem[..end]))
    }))
}

fn names_exhausted(filename: &str) -> SatchelError {
    SatchelError::Validation(format!("filename {filename} cannot be made unique"))
}

/// Split a filename into stem and extension at the last dot.
///
/// The extension keeps its dot. Leading dots belong to the stem, so hidden
/// files such as `.bashrc` have no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let leading = filename.len() - filename.trim_start_matches('.').len();

    match filename[leading..].rfind('.') {
        Some(i) => filename.split_at(leading + i),
        None => (filename, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup_storage() -> (TempDir, SubjectStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = SubjectStorage::new(temp_dir.path().join("uploads")).unwrap();
        (temp_dir, storage)
    }

    fn file_name(path: &Path) -> &str {
        path.file_name().unwrap().to_str().unwrap()
    }

    #[test]
    fn test_new_creates_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested").join("uploads");

        assert!(!root.exists());
        let storage = SubjectStorage::new(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(storage.root(), root);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".bashrc"), (".bashrc", ""));
        assert_eq!(split_extension(".config.txt"), (".config", ".txt"));
        assert_eq!(split_extension("..txt"), ("..txt", ""));
        assert_eq!(split_extension("trailing."), ("trailing", "."));
    }

    #[test]
    fn test_resolve_path_fresh_subject() {
        let (_temp_dir, storage) = setup_storage();

        let path = storage.resolve_path("math", "notes.txt").unwrap();

        assert_eq!(path, storage.root().join("math").join("notes.txt"));
        assert!(storage.root().join("math").is_dir());
        // Resolving does not create the file.
        assert!(!path.exists());
    }

    #[test]
    fn test_resolve_path_directory_creation_is_idempotent() {
        let (_temp_dir, storage) = setup_storage();

        let first = storage.resolve_path("math", "notes.txt").unwrap();
        let second = storage.resolve_path("math", "notes.txt").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read_dir(storage.root()).unwrap().count(), 1);
    }

    #[test]
    fn test_resolve_path_collision_suffixes() {
        let (_temp_dir, storage) = setup_storage();
        let dir = storage.ensure_subject_dir("reports").unwrap();

        fs::write(dir.join("report.pdf"), b"v0").unwrap();
        let path = storage.resolve_path("reports", "report.pdf").unwrap();
        assert_eq!(file_name(&path), "report_1.pdf");

        fs::write(&path, b"v1").unwrap();
        let path = storage.resolve_path("reports", "report.pdf").unwrap();
        assert_eq!(file_name(&path), "report_2.pdf");
    }

    #[test]
    fn test_resolve_path_without_extension() {
        let (_temp_dir, storage) = setup_storage();
        let dir = storage.ensure_subject_dir("misc").unwrap();
        fs::write(dir.join("Makefile"), b"").unwrap();

        let path = storage.resolve_path("misc", "Makefile").unwrap();
        assert_eq!(file_name(&path), "Makefile_1");
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let (temp_dir, storage) = setup_storage();

        assert!(matches!(
            storage.resolve_path("..", "notes.txt"),
            Err(SatchelError::Validation(_))
        ));
        assert!(matches!(
            storage.resolve_path("math", "../../escape.txt"),
            Err(SatchelError::Validation(_))
        ));
        // Nothing was created outside the root.
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_store_and_load() {
        let (_temp_dir, storage) = setup_storage();

        let stored = storage.store("math", "notes.txt", b"Hello, World!").unwrap();

        assert_eq!(stored.subject, "math");
        assert_eq!(stored.filename, "notes.txt");
        assert_eq!(stored.size, 13);
        assert_eq!(stored.path, storage.root().join("math").join("notes.txt"));
        assert_eq!(storage.load("math", "notes.txt").unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_store_never_overwrites() {
        let (_temp_dir, storage) = setup_storage();

        let first = storage.store("reports", "report.pdf", b"first").unwrap();
        let second = storage.store("reports", "report.pdf", b"second").unwrap();
        let third = storage.store("reports", "report.pdf", b"third").unwrap();

        assert_eq!(first.filename, "report.pdf");
        assert_eq!(second.filename, "report_1.pdf");
        assert_eq!(third.filename, "report_2.pdf");

        assert_eq!(storage.load("reports", "report.pdf").unwrap(), b"first");
        assert_eq!(storage.load("reports", "report_1.pdf").unwrap(), b"second");
        assert_eq!(storage.load("reports", "report_2.pdf").unwrap(), b"third");
    }

    #[test]
    fn test_store_skips_taken_suffix() {
        let (_temp_dir, storage) = setup_storage();
        let dir = storage.ensure_subject_dir("reports").unwrap();
        fs::write(dir.join("report.pdf"), b"").unwrap();
        fs::write(dir.join("report_1.pdf"), b"").unwrap();

        let stored = storage.store("reports", "report.pdf", b"new").unwrap();
        assert_eq!(stored.filename, "report_2.pdf");
    }

    #[test]
    fn test_store_concurrent_same_name() {
        let (_temp_dir, storage) = setup_storage();
        let storage = Arc::new(storage);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    storage
                        .store("race", "same.txt", format!("writer {i}").as_bytes())
                        .unwrap()
                        .filename
                })
            })
            .collect();

        let names: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(names.len(), 8);
        assert_eq!(storage.list("race").unwrap().len(), 8);
    }

    #[test]
    fn test_store_empty_content() {
        let (_temp_dir, storage) = setup_storage();

        let stored = storage.store("math", "empty.txt", b"").unwrap();
        assert_eq!(stored.size, 0);
        assert!(storage.load("math", "empty.txt").unwrap().is_empty());
    }

    #[test]
    fn test_list_absent_subject() {
        let (_temp_dir, storage) = setup_storage();

        assert!(storage.list("history").unwrap().is_empty());
        // Listing does not create the directory.
        assert!(!storage.root().join("history").exists());
    }

    #[test]
    fn test_list_sorted_files_only() {
        let (_temp_dir, storage) = setup_storage();
        storage.store("math", "b.txt", b"b").unwrap();
        storage.store("math", "a.pdf", b"a").unwrap();
        fs::create_dir(storage.root().join("math").join("drafts")).unwrap();

        assert_eq!(storage.list("math").unwrap(), vec!["a.pdf", "b.txt"]);
    }

    #[test]
    fn test_list_rejects_traversal() {
        let (_temp_dir, storage) = setup_storage();

        assert!(matches!(
            storage.list(".."),
            Err(SatchelError::Validation(_))
        ));
    }

    #[test]
    fn test_load_not_found() {
        let (_temp_dir, storage) = setup_storage();
        storage.ensure_subject_dir("math").unwrap();

        let result = storage.load("math", "missing.txt");
        assert!(matches!(result, Err(SatchelError::NotFound(_))));
    }

    #[test]
    fn test_load_directory_is_not_found() {
        let (_temp_dir, storage) = setup_storage();
        fs::create_dir_all(storage.root().join("math").join("drafts")).unwrap();

        let result = storage.load("math", "drafts");
        assert!(matches!(result, Err(SatchelError::NotFound(_))));
    }

    #[test]
    fn test_store_collision_on_longest_name() {
        let (_temp_dir, storage) = setup_storage();
        let filename = format!("{}.pdf", "a".repeat(MAX_SEGMENT_LENGTH - 4));

        let first = storage.store("math", &filename, b"first").unwrap();
        let second = storage.store("math", &filename, b"second").unwrap();

        assert_eq!(first.filename, filename);
        assert_eq!(second.filename.len(), MAX_SEGMENT_LENGTH);
        assert_eq!(
            second.filename,
            format!("{}_1.pdf", "a".repeat(MAX_SEGMENT_LENGTH - 6))
        );
        assert_eq!(storage.load("math", &second.filename).unwrap(), b"second");
    }

    #[test]
    fn test_resolve_path_collision_on_longest_name() {
        let (_temp_dir, storage) = setup_storage();
        let filename = format!("{}.txt", "b".repeat(MAX_SEGMENT_LENGTH - 4));
        storage.store("math", &filename, b"x").unwrap();

        let path = storage.resolve_path("math", &filename).unwrap();
        assert_eq!(file_name(&path).len(), MAX_SEGMENT_LENGTH);
        assert!(file_name(&path).ends_with("_1.txt"));
    }

    #[test]
    fn test_candidate_names_shorten_on_char_boundary() {
        // 2-byte chars: the stem cannot be cut at an odd byte offset.
        let filename = format!("{}.pdf", "é".repeat(125));

        let names: Vec<String> = candidate_names(&filename).take(3).collect();

        assert_eq!(names[0], filename);
        assert_eq!(names[1], format!("{}_1.pdf", "é".repeat(124)));
        assert_eq!(names[2], format!("{}_2.pdf", "é".repeat(124)));
        assert!(names.iter().all(|n| n.len() <= MAX_SEGMENT_LENGTH));
    }

    #[test]
    fn test_candidate_names_end_when_suffix_does_not_fit() {
        let filename = format!("a.{}", "x".repeat(MAX_SEGMENT_LENGTH - 3));

        // `_1.xxx` to `_9.xxx` fit with an empty stem; `_10.xxx` does not.
        assert_eq!(candidate_names(&filename).count(), 10);
    }

    #[test]
    fn test_binary_content() {
        let (_temp_dir, storage) = setup_storage();
        let content: Vec<u8> = (0..=255).collect();

        storage.store("images", "bytes.png", &content).unwrap();
        assert_eq!(storage.load("images", "bytes.png").unwrap(), content);
    }

    #[test]
    fn test_unicode_names() {
        let (_temp_dir, storage) = setup_storage();

        let stored = storage.store("日本語", "ノート.txt", b"data").unwrap();
        assert_eq!(stored.filename, "ノート.txt");

        let again = storage.store("日本語", "ノート.txt", b"data").unwrap();
        assert_eq!(again.filename, "ノート_1.txt");
    }
}
