//! Module specifier rewriting for JavaScript/TypeScript sources
//!
//! Rewrites the module specifier of static imports, re-exports, `require()`
//! calls and dynamic `import()` calls according to a mapping table. Meant to
//! run as one step of a build pipeline: every file passes through
//! [`ImportRewriter::transform`] independently.
//!
//! # Architecture
//!
//! - [`grammar`] finds references and classifies them by kind
//! - [`rules`] swaps the specifier inside the matched text
//! - [`resolver`] turns mapping targets into specifiers, optionally relative
//! - [`engine`] splices replacements into a loaded buffer
//! - [`stream`] does the same over chunked input (experimental)
//!
//! # Example
//!
//! ```rust
//! use rewrite_imports::{FileLocation, ImportRewriter, RewriteOptions};
//!
//! let rewriter = ImportRewriter::new(
//!     RewriteOptions::new().with_mapping("nowhere", "somewhere"),
//! )
//! .unwrap();
//!
//! let (output, changes) = rewriter.rewrite_str(
//!     &FileLocation::new("src/index.js"),
//!     "import { X } from 'nowhere';",
//! );
//! assert_eq!(output, "import { X } from 'somewhere';");
//! assert_eq!(changes, 1);
//! ```

pub mod engine;
pub mod error;
pub mod file;
pub mod grammar;
pub mod options;
pub mod resolver;
pub mod rewriter;
pub mod rules;
pub mod stream;

/// Component name attached to every error
pub const PLUGIN_NAME: &str = "rewrite-imports";

// Re-exports
pub use engine::{rewrite_buffer, rewrite_text};
pub use error::{RewriteError, RewriteResult};
pub use file::{ChunkStream, Contents, FileLocation, SourceFile};
pub use grammar::{scan, Quote, Reference, ReferenceForm, ReferenceKind};
pub use options::{Mappings, RewriteOptions, TargetPath, TargetSpecifier};
pub use rewriter::ImportRewriter;
pub use stream::{RewriteChunks, StreamRewriter};
