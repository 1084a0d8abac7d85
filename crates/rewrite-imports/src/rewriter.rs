//! Per-file transform

use crate::engine;
use crate::error::{RewriteError, RewriteResult};
use crate::file::{Contents, FileLocation, SourceFile};
use crate::options::RewriteOptions;
use crate::stream::{RewriteChunks, StreamRewriter};
use std::sync::Arc;
use tracing::{debug, warn};

/// Rewrites module references in the files passed through it.
///
/// Cheap to clone and safe to share across threads; the options are fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct ImportRewriter {
    options: Arc<RewriteOptions>,
}

impl ImportRewriter {
    /// Build a rewriter after validating `options`
    pub fn new(options: RewriteOptions) -> RewriteResult<Self> {
        options.validate()?;
        debug!(
            mappings = options.mappings.len(),
            streams = options.experimental_enable_streams,
            "Created import rewriter"
        );
        Ok(Self {
            options: Arc::new(options),
        })
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Rewrite a single file.
    ///
    /// Null and directory entries come back unchanged. Stream contents are
    /// wrapped in a rewriting stream, or rejected when streaming is disabled.
    pub fn transform(&self, file: SourceFile) -> RewriteResult<SourceFile> {
        let SourceFile { location, contents } = file;

        let contents = match contents {
            Contents::Null => Contents::Null,
            Contents::Directory => Contents::Directory,
            Contents::Buffer(bytes) => {
                let (output, changes) = engine::rewrite_buffer(&bytes, &self.options, &location);
                debug!(
                    file = %location.path().display(),
                    changes,
                    "Rewrote module references"
                );
                Contents::Buffer(output)
            }
            Contents::Stream(chunks) => {
                if !self.options.experimental_enable_streams {
                    warn!(
                        file = %location.path().display(),
                        "Stream contents rejected, streaming is disabled"
                    );
                    return Err(RewriteError::streaming_disabled());
                }
                let rewriter = StreamRewriter::new(Arc::clone(&self.options), location.clone());
                Contents::Stream(RewriteChunks::new(chunks, rewriter).boxed())
            }
        };

        Ok(SourceFile { location, contents })
    }

    /// Rewrite many files; a failure only affects its own entry
    pub fn transform_all<I>(&self, files: I) -> Vec<RewriteResult<SourceFile>>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        files
            .into_iter()
            .map(|file| {
                let path = file.location.path();
                self.transform(file).inspect_err(|err| {
                    warn!(file = %path.display(), error = %err, "Failed to rewrite file");
                })
            })
            .collect()
    }

    /// Rewrite text belonging to the file at `location`
    pub fn rewrite_str(&self, location: &FileLocation, content: &str) -> (String, usize) {
        engine::rewrite_text(content, &self.options, location)
    }

    /// Rewrite raw bytes belonging to the file at `location`
    pub fn rewrite_bytes(&self, location: &FileLocation, content: &[u8]) -> (Vec<u8>, usize) {
        engine::rewrite_buffer(content, &self.options, location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    fn rewriter(streams: bool) -> ImportRewriter {
        ImportRewriter::new(
            RewriteOptions::new()
                .with_mapping("nowhere", "somewhere")
                .with_streams(streams),
        )
        .unwrap()
    }

    fn location() -> FileLocation {
        FileLocation::new("/project/src/index.js")
    }

    #[test]
    fn test_null_and_directory_pass_through() {
        let rewriter = rewriter(false);
        assert!(rewriter
            .transform(SourceFile::null(location()))
            .unwrap()
            .is_null());
        assert!(rewriter
            .transform(SourceFile::directory(location()))
            .unwrap()
            .is_directory());
    }

    #[test]
    fn test_stream_rejected_when_disabled() {
        let chunks: Vec<io::Result<Vec<u8>>> = vec![Ok(b"require('nowhere')".to_vec())];
        let file = SourceFile::stream(location(), chunks.into_iter());
        let err = rewriter(false).transform(file).unwrap_err();
        assert!(matches!(err, RewriteError::StreamingDisabled { .. }));
    }

    #[test]
    fn test_stream_rewritten_when_enabled() {
        let chunks: Vec<io::Result<Vec<u8>>> = vec![
            Ok(b"const x = require('no".to_vec()),
            Ok(b"where');\n".to_vec()),
        ];
        let file = SourceFile::stream(location(), chunks.into_iter());
        let file = rewriter(true).transform(file).unwrap();
        assert!(file.is_stream());
        assert_eq!(
            file.read_to_end().unwrap(),
            b"const x = require('somewhere');\n"
        );
    }

    #[test]
    fn test_rewrite_bytes_keeps_invalid_utf8() {
        let mut source = b"export * from \"nowhere\";\n".to_vec();
        source.extend_from_slice(&[0xff, 0xfe]);
        let (output, changes) = rewriter(false).rewrite_bytes(&location(), &source);

        let mut expected = b"export * from \"somewhere\";\n".to_vec();
        expected.extend_from_slice(&[0xff, 0xfe]);
        assert_eq!(output, expected);
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_rewrite_str() {
        let (output, changes) = rewriter(false).rewrite_str(&location(), "import x from 'other';");
        assert_eq!(output, "import x from 'other';");
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = ImportRewriter::new(RewriteOptions::new().with_mapping("", "x")).unwrap_err();
        assert!(matches!(err, RewriteError::InvalidOptions { .. }));
    }

    #[test]
    fn test_transform_all_isolates_failures() {
        let files = vec![
            SourceFile::buffer(location(), "require('nowhere');"),
            SourceFile::stream(location(), std::iter::empty()),
            SourceFile::buffer(location(), "import('nowhere');"),
        ];
        let results = rewriter(false).transform_all(files);
        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());

        let first = results[0].as_ref().unwrap().bytes().unwrap();
        let last = results[2].as_ref().unwrap().bytes().unwrap();
        assert_eq!(first, b"require('somewhere');");
        assert_eq!(last, b"import('somewhere');");
    }
}
