//! Buffered rewrite engine
//!
//! Scans a fully loaded buffer and splices each rewritten reference in at the
//! offset it was found:
//!
//! ```text
//! cursor = 0
//! for each reference r:
//!     copy source[cursor..r.start]
//!     copy replacement (or r unchanged)
//!     cursor = r.end
//! copy source[cursor..]
//! ```
//!
//! Identical statements elsewhere in the file are never affected by a splice.

use crate::file::FileLocation;
use crate::grammar::{scan_from, Reference};
use crate::options::RewriteOptions;
use crate::{resolver, rules};
use tracing::{debug, trace};

/// Result of splicing a region of a buffer
#[derive(Debug, Default)]
pub(crate) struct Splice {
    pub output: Vec<u8>,
    /// Offset up to which the input was consumed
    pub end: usize,
    pub changes: usize,
}

/// Rewrite every mapped reference in `content`.
///
/// Returns the new contents and the number of references rewritten.
pub fn rewrite_buffer(
    content: &[u8],
    options: &RewriteOptions,
    location: &FileLocation,
) -> (Vec<u8>, usize) {
    let splice = splice(content, 0, content.len(), options, location);
    (splice.output, splice.changes)
}

/// [`rewrite_buffer`] for text
pub fn rewrite_text(
    content: &str,
    options: &RewriteOptions,
    location: &FileLocation,
) -> (String, usize) {
    let (output, changes) = rewrite_buffer(content.as_bytes(), options, location);
    let output = String::from_utf8(output)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
    (output, changes)
}

/// Rewrite references in `haystack[start..]` that begin before `cut`.
///
/// A reference that begins before `cut` is consumed whole even when it ends
/// past it. Bytes before `start` are only used as match context.
pub(crate) fn splice(
    haystack: &[u8],
    start: usize,
    cut: usize,
    options: &RewriteOptions,
    location: &FileLocation,
) -> Splice {
    let mut output = Vec::with_capacity(cut.saturating_sub(start));
    let mut cursor = start;
    let mut changes = 0;

    // Nothing can match without a mapping; skip the scan entirely.
    if !options.mappings.is_empty() {
        for reference in scan_from(haystack, start) {
            if reference.span.start >= cut {
                break;
            }
            output.extend_from_slice(&haystack[cursor..reference.span.start]);
            match replacement_for(&reference, options, location) {
                Some(replacement) => {
                    output.extend_from_slice(&replacement);
                    changes += 1;
                }
                None => output.extend_from_slice(reference.text),
            }
            cursor = reference.span.end;
        }
    }

    let end = cursor.max(cut);
    output.extend_from_slice(&haystack[cursor..end]);
    Splice {
        output,
        end,
        changes,
    }
}

fn replacement_for(
    reference: &Reference<'_>,
    options: &RewriteOptions,
    location: &FileLocation,
) -> Option<Vec<u8>> {
    let kind = reference.kind();
    if !options.is_enabled(kind) {
        trace!(kind = %kind, "Reference kind disabled, leaving unchanged");
        return None;
    }

    let specifier = reference.specifier_str()?;
    let Some(target) = options.mappings.get(specifier) else {
        trace!(kind = %kind, specifier = %specifier, "No mapping for specifier");
        return None;
    };

    let resolved = resolver::resolve(target, location);
    debug!(
        kind = %kind,
        from = %specifier,
        to = %resolved,
        file = %location.path().display(),
        "Rewrote module reference"
    );
    Some(rules::render(reference, &resolved))
}
