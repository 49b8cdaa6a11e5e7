//! Document collections handed to the detector.
//!
//! Reading files happens here, before detection starts; the detector itself
//! never touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use detect::SourceDocument;

/// File extensions read as plain text.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "py"];

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// A loaded collection, plus the entries that were passed over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedCollection {
    pub documents: Vec<SourceDocument>,
    /// Files with an extension outside [`TEXT_EXTENSIONS`].
    pub unsupported: Vec<PathBuf>,
}

/// Anything that can produce one collection of documents.
pub trait TextSource: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    fn load(&self) -> Result<LoadedCollection, SourceError>;
}

/// Documents already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    name: String,
    documents: Vec<SourceDocument>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
        }
    }

    pub fn with_text(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.push(SourceDocument::text(id, text));
        self
    }

    pub fn with_document(mut self, document: SourceDocument) -> Self {
        self.documents.push(document);
        self
    }
}

impl TextSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<LoadedCollection, SourceError> {
        Ok(LoadedCollection {
            documents: self.documents.clone(),
            unsupported: Vec::new(),
        })
    }
}

/// Top-level files of one directory, in file-name order. Subdirectories are
/// not descended into. Document ids are file names.
///
/// Files are read as bytes; decoding happens per paragraph during
/// normalization so one bad paragraph does not lose the file.
#[derive(Debug, Clone)]
pub struct PlainTextDirSource {
    root: PathBuf,
}

impl PlainTextDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TextSource for PlainTextDirSource {
    fn name(&self) -> &str {
        self.root.to_str().unwrap_or("<non-utf8 path>")
    }

    fn load(&self) -> Result<LoadedCollection, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::NotADirectory(self.root.clone()));
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_error(&self.root))? {
            let entry = entry.map_err(io_error(&self.root))?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut collection = LoadedCollection::default();
        for path in paths {
            if !is_text_file(&path) {
                warn!(path = %path.display(), "unsupported_file_skipped");
                collection.unsupported.push(path);
                continue;
            }
            let bytes = fs::read(&path).map_err(io_error(&path))?;
            let id = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            collection.documents.push(SourceDocument::bytes(id, bytes));
        }

        info!(
            root = %self.root.display(),
            documents = collection.documents.len(),
            unsupported = collection.unsupported.len(),
            "source_loaded"
        );
        Ok(collection)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SourceError {
    let path = path.to_path_buf();
    move |source| SourceError::Io { path, source }
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}
