//! core::package
//!
//! A package file queued for upload, with optional source files.
//!
//! Debian source packages (`.dsc`) are uploaded together with the tarballs
//! they reference; those travel as [`SourceFile`]s in insertion order.
//!
//! # Example
//!
//! ```no_run
//! use packagecloud::core::package::Package;
//!
//! let package = Package::from_path("dist/jake_1.0-7.dsc")?
//!     .with_source_path("dist/jake_1.0.orig.tar.bz2")?
//!     .with_source_path("dist/jake_1.0-7.debian.tar.gz")?;
//! assert_eq!(package.filename(), "jake_1.0-7.dsc");
//! # Ok::<(), packagecloud::core::package::PackageError>(())
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;

/// File extensions the service knows how to index.
pub const SUPPORTED_EXTENSIONS: [&str; 13] = [
    "deb", "dsc", "gem", "rpm", "whl", "zip", "egg", "egg-info", "tar", "bz2", "Z", "gz", "tgz",
];

/// Errors from building a package.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PackageError {
    #[error("failed to read package file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("filename cannot be empty")]
    MissingFilename,
}

/// An auxiliary file uploaded alongside the main package.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub contents: Vec<u8>,
}

/// A package ready to upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Package {
    filename: String,
    contents: Vec<u8>,
    source_files: Vec<SourceFile>,
}

// Package contents can be megabytes; Debug shows sizes only.
impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("filename", &self.filename)
            .field("size", &self.contents.len())
            .field("source_files", &self.source_files)
            .finish()
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("filename", &self.filename)
            .field("size", &self.contents.len())
            .finish()
    }
}

impl Package {
    /// Read a package from disk. The filename is the path's basename.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::Io` if the file cannot be read and
    /// `PackageError::MissingFilename` if the path has no file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let (filename, contents) = read_named(path.as_ref())?;
        Ok(Self {
            filename,
            contents,
            source_files: Vec::new(),
        })
    }

    /// Build a package from in-memory contents.
    ///
    /// # Errors
    ///
    /// Returns `PackageError::MissingFilename` if `filename` is empty.
    pub fn from_bytes(
        filename: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Result<Self, PackageError> {
        let filename = filename.into();
        if filename.is_empty() {
            return Err(PackageError::MissingFilename);
        }
        Ok(Self {
            filename,
            contents: contents.into(),
            source_files: Vec::new(),
        })
    }

    /// Attach an in-memory source file.
    pub fn with_source_file(
        mut self,
        filename: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        self.source_files.push(SourceFile {
            filename: filename.into(),
            contents: contents.into(),
        });
        self
    }

    /// Attach a source file read from disk.
    ///
    /// # Errors
    ///
    /// Same as [`Package::from_path`].
    pub fn with_source_path(mut self, path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let (filename, contents) = read_named(path.as_ref())?;
        self.source_files.push(SourceFile { filename, contents });
        Ok(self)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    /// Total bytes across the package and its source files.
    pub fn total_size(&self) -> usize {
        self.contents.len()
            + self
                .source_files
                .iter()
                .map(|s| s.contents.len())
                .sum::<usize>()
    }

    /// Whether the filename ends in one of [`SUPPORTED_EXTENSIONS`].
    pub fn has_supported_extension(&self) -> bool {
        SUPPORTED_EXTENSIONS
            .iter()
            .any(|ext| self.filename.ends_with(&format!(".{}", ext)))
    }
}

fn read_named(path: &Path) -> Result<(String, Vec<u8>), PackageError> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or(PackageError::MissingFilename)?
        .to_string();
    let contents = fs::read(path).map_err(|e| PackageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok((filename, contents))
}
