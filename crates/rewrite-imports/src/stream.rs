//! Streaming rewrite engine (experimental)
//!
//! Rewrites chunked input without loading the whole file. The pending window
//! only holds bytes that could still belong to an unfinished reference:
//!
//! - references never span a line break, so everything up to the last `\n` is
//!   flushed;
//! - references are assumed to be at most `max_match_length` bytes, so
//!   anything further back than that is flushed too.
//!
//! A reference that begins in the flushable region is always completed before
//! the flush. One already-emitted byte is kept at the front of the window so
//! word-boundary checks see the same left context as the buffered engine.

use crate::engine;
use crate::file::{ChunkStream, FileLocation};
use crate::options::RewriteOptions;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// Incremental rewriter fed one chunk at a time
#[derive(Debug)]
pub struct StreamRewriter {
    options: Arc<RewriteOptions>,
    location: FileLocation,
    pending: Vec<u8>,
    /// Number of bytes at the front of `pending` that were already emitted
    context: usize,
    changes: usize,
}

impl StreamRewriter {
    pub fn new(options: Arc<RewriteOptions>, location: FileLocation) -> Self {
        Self {
            options,
            location,
            pending: Vec::new(),
            context: 0,
            changes: 0,
        }
    }

    /// Feed a chunk and return whatever output is now final
    pub fn push(&mut self, chunk: &[u8]) -> Vec<u8> {
        self.pending.extend_from_slice(chunk);

        let after_newline = self.pending[self.context..]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(self.context, |idx| self.context + idx + 1);
        let window_start = self
            .pending
            .len()
            .saturating_sub(self.options.max_match_length);
        let cut = after_newline.max(window_start);

        if cut <= self.context {
            return Vec::new();
        }
        self.flush_until(cut)
    }

    /// Flush everything still pending
    pub fn finish(&mut self) -> Vec<u8> {
        let len = self.pending.len();
        if len <= self.context {
            return Vec::new();
        }
        self.flush_until(len)
    }

    /// References rewritten so far
    pub fn changes(&self) -> usize {
        self.changes
    }

    /// Bytes currently held back
    pub fn pending_len(&self) -> usize {
        self.pending.len() - self.context
    }

    fn flush_until(&mut self, cut: usize) -> Vec<u8> {
        let splice = engine::splice(
            &self.pending,
            self.context,
            cut,
            &self.options,
            &self.location,
        );
        self.changes += splice.changes;

        let keep_from = splice.end.saturating_sub(1);
        self.pending.drain(..keep_from);
        self.context = splice.end - keep_from;
        splice.output
    }
}

/// Chunk iterator that rewrites references as chunks pass through
pub struct RewriteChunks<I> {
    inner: I,
    rewriter: Option<StreamRewriter>,
}

impl<I> RewriteChunks<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    pub fn new(inner: I, rewriter: StreamRewriter) -> Self {
        Self {
            inner,
            rewriter: Some(rewriter),
        }
    }
}

impl RewriteChunks<ChunkStream> {
    /// Box into a [`ChunkStream`] so it can replace a file's contents
    pub fn boxed(self) -> ChunkStream {
        Box::new(self)
    }
}

impl<I> Iterator for RewriteChunks<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rewriter.as_ref()?;
        loop {
            match self.inner.next() {
                Some(Ok(chunk)) => {
                    let output = self.rewriter.as_mut()?.push(&chunk);
                    if !output.is_empty() {
                        return Some(Ok(output));
                    }
                }
                Some(Err(err)) => {
                    self.rewriter = None;
                    return Some(Err(err));
                }
                None => {
                    let mut rewriter = self.rewriter.take()?;
                    let output = rewriter.finish();
                    debug!(
                        file = %rewriter.location.path().display(),
                        changes = rewriter.changes(),
                        "Finished rewriting stream"
                    );
                    return (!output.is_empty()).then_some(Ok(output));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewriter(max_match_length: usize) -> StreamRewriter {
        let options = RewriteOptions {
            max_match_length,
            ..RewriteOptions::new().with_mapping("nowhere", "somewhere")
        };
        StreamRewriter::new(Arc::new(options), FileLocation::new("/project/a.js"))
    }

    fn run(chunks: &[&str], max_match_length: usize) -> String {
        let mut rewriter = rewriter(max_match_length);
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(rewriter.push(chunk.as_bytes()));
        }
        out.extend(rewriter.finish());
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_reference_split_across_chunks() {
        let output = run(&["import { X } from 'now", "here';\nconst y = 1;\n"], 4096);
        assert_eq!(output, "import { X } from 'somewhere';\nconst y = 1;\n");
    }

    #[test]
    fn test_byte_at_a_time() {
        let source = "a();require(\"nowhere\");\nexport * from 'nowhere';";
        let chunks: Vec<String> = source.chars().map(String::from).collect();
        let chunks: Vec<&str> = chunks.iter().map(String::as_str).collect();
        assert_eq!(
            run(&chunks, 64),
            "a();require(\"somewhere\");\nexport * from 'somewhere';"
        );
    }

    #[test]
    fn test_word_boundary_survives_flush() {
        // The window forces a flush right between `x` and `require`
        let source = "xxxxxxxxxxrequire('nowhere')";
        let chunks: Vec<String> = source.chars().map(String::from).collect();
        let chunks: Vec<&str> = chunks.iter().map(String::as_str).collect();
        assert_eq!(run(&chunks, 18), source);
    }

    #[test]
    fn test_complete_lines_are_flushed_eagerly() {
        let mut rewriter = rewriter(4096);
        let out = rewriter.push(b"require('nowhere');\nimport x fr");
        assert_eq!(out, b"require('somewhere');\n");
        assert_eq!(rewriter.pending_len(), "import x fr".len());
        assert_eq!(rewriter.push(b"om 'nowhere';"), b"");
        assert_eq!(rewriter.finish(), b"import x from 'somewhere';");
        assert_eq!(rewriter.changes(), 2);
    }

    #[test]
    fn test_window_is_bounded_on_long_lines() {
        let mut rewriter = rewriter(32);
        let line = "x".repeat(1000);
        let out = rewriter.push(line.as_bytes());
        assert_eq!(out.len(), 1000 - 32);
        assert_eq!(rewriter.pending_len(), 32);
    }

    #[test]
    fn test_terminator_arriving_later() {
        let output = run(&["import a from 'nowhere'   ", "  ;\n"], 4096);
        assert_eq!(output, "import a from 'somewhere'     ;\n");
    }

    #[test]
    fn test_chunk_iterator_adapter() {
        let chunks = vec![
            Ok(b"const a = requ".to_vec()),
            Ok(b"ire('nowhere');\n".to_vec()),
        ];
        let adapter = RewriteChunks::new(chunks.into_iter(), rewriter(4096));
        let out: Vec<u8> = adapter
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
            .concat();
        assert_eq!(out, b"const a = require('somewhere');\n");
    }

    #[test]
    fn test_chunk_iterator_stops_after_error() {
        let chunks = vec![
            Ok(b"a\n".to_vec()),
            Err(io::Error::other("read failed")),
            Ok(b"b\n".to_vec()),
        ];
        let mut adapter = RewriteChunks::new(chunks.into_iter(), rewriter(4096));
        assert_eq!(adapter.next().unwrap().unwrap(), b"a\n");
        assert!(adapter.next().unwrap().is_err());
        assert!(adapter.next().is_none());
    }
}
