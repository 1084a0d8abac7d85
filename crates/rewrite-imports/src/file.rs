//! Source file values passed through the rewriter
//!
//! A [`SourceFile`] pairs a location with its contents. Locations follow the
//! usual build-pipeline layout: a working directory, a base directory the file
//! was matched from, and the file path itself.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Chunked byte stream used for stream contents
pub type ChunkStream = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + Send>;

/// Where a file lives, used for relative path resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    cwd: PathBuf,
    base: Option<PathBuf>,
    path: PathBuf,
    directory: bool,
}

impl FileLocation {
    /// Location for `path`, with the working directory taken from the process
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_default(),
            base: None,
            path: path.into(),
            directory: false,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Mark this location as a directory rather than a file
    pub fn into_directory(mut self) -> Self {
        self.directory = true;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Base directory; defaults to the working directory
    pub fn base(&self) -> PathBuf {
        let base = self.base.as_deref().unwrap_or(&self.cwd);
        self.cwd.join(base)
    }

    /// Absolute path of the file
    pub fn path(&self) -> PathBuf {
        self.cwd.join(&self.path)
    }

    /// Path of the file relative to its base
    pub fn relative(&self) -> PathBuf {
        let path = self.path();
        match path.strip_prefix(self.base()) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => self.path.clone(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.directory
    }
}

/// Contents of a [`SourceFile`]
pub enum Contents {
    /// No contents; passed through untouched
    Null,
    /// Directory entry; passed through untouched
    Directory,
    /// Fully loaded contents
    Buffer(Vec<u8>),
    /// Chunked contents
    Stream(ChunkStream),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contents::Null => f.write_str("Null"),
            Contents::Directory => f.write_str("Directory"),
            Contents::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Contents::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A file in the pipeline
#[derive(Debug)]
pub struct SourceFile {
    pub location: FileLocation,
    pub contents: Contents,
}

impl SourceFile {
    pub fn new(location: FileLocation, contents: Contents) -> Self {
        Self { location, contents }
    }

    pub fn buffer(location: FileLocation, contents: impl Into<Vec<u8>>) -> Self {
        Self::new(location, Contents::Buffer(contents.into()))
    }

    pub fn stream<I>(location: FileLocation, chunks: I) -> Self
    where
        I: Iterator<Item = io::Result<Vec<u8>>> + Send + 'static,
    {
        Self::new(location, Contents::Stream(Box::new(chunks)))
    }

    pub fn directory(location: FileLocation) -> Self {
        Self::new(location.into_directory(), Contents::Directory)
    }

    pub fn null(location: FileLocation) -> Self {
        Self::new(location, Contents::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.contents, Contents::Directory)
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.contents, Contents::Buffer(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    /// Buffer contents, if loaded
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Drain the contents into memory.
    ///
    /// Streams are read to the end; null and directory entries yield nothing.
    pub fn read_to_end(self) -> io::Result<Vec<u8>> {
        match self.contents {
            Contents::Buffer(bytes) => Ok(bytes),
            Contents::Stream(chunks) => {
                let mut out = Vec::new();
                for chunk in chunks {
                    out.extend_from_slice(&chunk?);
                }
                Ok(out)
            }
            Contents::Null | Contents::Directory => Ok(Vec::new()),
        }
    }
}
