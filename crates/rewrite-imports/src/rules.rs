//! Replacement rendering
//!
//! A rewritten reference is the matched text with only the module specifier
//! swapped. Keywords, binding clause, whitespace, quotes and terminator are
//! copied from the source as they were written.

use crate::grammar::Reference;

/// Render the replacement for `reference` pointing at `target`
pub fn render(reference: &Reference<'_>, target: &str) -> Vec<u8> {
    substitute(reference.text, reference.specifier_offsets(), target)
}

/// Replace `text[range]` with `target`
pub fn substitute(text: &[u8], range: std::ops::Range<usize>, target: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() - range.len() + target.len());
    out.extend_from_slice(&text[..range.start]);
    out.extend_from_slice(target.as_bytes());
    out.extend_from_slice(&text[range.end..]);
    out
}
