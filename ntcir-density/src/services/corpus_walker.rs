//! Paragraph archive discovery
//!
//! Walks a dataset root recursively and yields every paragraph archive
//! (`<identifier>.xhtml.zip`) together with its parent directory. The parent
//! directory is the document the paragraph belongs to.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Compound extension of paragraph archives in NTCIR-11/12 format datasets
pub const PARAGRAPH_ARCHIVE_SUFFIX: &str = ".xhtml.zip";

/// Corpus walking errors
#[derive(Debug, Error)]
pub enum WalkError {
    /// Dataset root does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Dataset root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory entry could not be read during traversal
    #[error("Traversal error at {0}: {1}")]
    Traversal(PathBuf, String),
}

impl From<WalkError> for ntcir_common::Error {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::PathNotFound(path) => ntcir_common::Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "dataset root not found"),
            ),
            WalkError::NotADirectory(path) => {
                ntcir_common::Error::Config(format!(
                    "dataset root {} is not a directory",
                    path.display()
                ))
            }
            WalkError::Traversal(path, message) => {
                ntcir_common::Error::io(path, std::io::Error::new(std::io::ErrorKind::Other, message))
            }
        }
    }
}

/// A discovered paragraph: its document directory and identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParagraphEntry {
    pub directory: PathBuf,
    pub identifier: String,
}

/// Paragraph archive walker
#[derive(Debug, Clone)]
pub struct CorpusWalker {
    suffix: String,
}

impl CorpusWalker {
    /// Walker for `.xhtml.zip` paragraph archives
    pub fn new() -> Self {
        Self::with_suffix(PARAGRAPH_ARCHIVE_SUFFIX)
    }

    /// Walker for a different two-part archive extension, e.g. `.html.gz`
    pub fn with_suffix(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Paragraph identifier for an archive path, or `None` if the file is
    /// not a paragraph archive
    pub fn identifier_from_path(&self, path: &Path) -> Option<String> {
        let file_name = path.file_name()?.to_str()?;
        let stem = file_name.strip_suffix(self.suffix.as_str())?;
        if stem.is_empty() {
            return None;
        }
        Some(stem.to_string())
    }

    /// Start a fresh traversal of `root`
    ///
    /// Every call walks the file system again. Order follows the file system
    /// and is not stable across runs.
    pub fn walk(&self, root: &Path) -> Result<Paragraphs<'_>, WalkError> {
        if !root.exists() {
            return Err(WalkError::PathNotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(WalkError::NotADirectory(root.to_path_buf()));
        }

        Ok(Paragraphs {
            walker: self,
            entries: WalkDir::new(root).follow_links(true).into_iter(),
        })
    }

    /// Identifiers of every paragraph archive directly inside `directory`
    pub fn sibling_identifiers(&self, directory: &Path) -> Result<Vec<String>, WalkError> {
        let traversal_error =
            |e: std::io::Error| WalkError::Traversal(directory.to_path_buf(), e.to_string());

        let mut identifiers = Vec::new();
        for entry in fs::read_dir(directory).map_err(traversal_error)? {
            let entry = entry.map_err(traversal_error)?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(identifier) = self.identifier_from_path(&entry.path()) {
                identifiers.push(identifier);
            }
        }
        Ok(identifiers)
    }
}

impl Default for CorpusWalker {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy sequence of paragraphs found under a dataset root
pub struct Paragraphs<'a> {
    walker: &'a CorpusWalker,
    entries: walkdir::IntoIter,
}

impl Iterator for Paragraphs<'_> {
    type Item = Result<ParagraphEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(WalkError::Traversal(path, e.to_string())));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(identifier) = self.walker.identifier_from_path(entry.path()) else {
                continue;
            };

            let directory = entry
                .path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();

            return Some(Ok(ParagraphEntry {
                directory,
                identifier,
            }));
        }
    }
}
