//! Rewrite options and the mapping table

use crate::error::{RewriteError, RewriteResult};
use crate::grammar::ReferenceKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default bound for how far back the streaming engine may hold bytes
pub const DEFAULT_MAX_MATCH_LENGTH: usize = 4096;

/// Module specifier to replacement target.
///
/// Keys match exactly and case-sensitively. Insertion order is kept so
/// serialized configs round-trip in the order they were written.
pub type Mappings = IndexMap<String, TargetSpecifier>;

/// Replacement for a mapped module specifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpecifier {
    /// Used verbatim
    Literal(String),
    /// A path, optionally made relative to the referencing file
    Path(TargetPath),
}

/// Path target with optional relative resolution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPath {
    pub path: String,

    /// Resolve relative to the referencing file's own directory
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub relative: bool,

    /// Resolve relative to the referencing file re-rooted under this directory.
    /// Takes precedence over `relative`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<PathBuf>,
}

impl TargetSpecifier {
    pub fn literal(target: impl Into<String>) -> Self {
        Self::Literal(target.into())
    }

    /// Path target that is used verbatim until made relative
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(TargetPath {
            path: path.into(),
            ..Default::default()
        })
    }

    /// Resolve relative to the referencing file's directory
    pub fn relative(self) -> Self {
        match self {
            Self::Literal(path) => Self::Path(TargetPath {
                path,
                relative: true,
                relative_to: None,
            }),
            Self::Path(target) => Self::Path(TargetPath {
                relative: true,
                ..target
            }),
        }
    }

    /// Resolve relative to the referencing file as located under `base`
    pub fn relative_to(self, base: impl Into<PathBuf>) -> Self {
        let base = Some(base.into());
        match self {
            Self::Literal(path) => Self::Path(TargetPath {
                path,
                relative: false,
                relative_to: base,
            }),
            Self::Path(target) => Self::Path(TargetPath {
                relative_to: base,
                ..target
            }),
        }
    }

    /// The configured target string, before any resolution
    pub fn raw_path(&self) -> &str {
        match self {
            Self::Literal(path) => path,
            Self::Path(target) => &target.path,
        }
    }
}

impl From<&str> for TargetSpecifier {
    fn from(target: &str) -> Self {
        Self::literal(target)
    }
}

impl From<String> for TargetSpecifier {
    fn from(target: String) -> Self {
        Self::Literal(target)
    }
}

impl From<TargetPath> for TargetSpecifier {
    fn from(target: TargetPath) -> Self {
        Self::Path(target)
    }
}

/// Per-invocation options.
///
/// Field names serialize in camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RewriteOptions {
    pub mappings: Mappings,

    /// Accept stream contents
    pub experimental_enable_streams: bool,

    /// Skip dynamic `import('...')` calls
    pub no_import: bool,

    /// Skip static `import ... from '...'` statements
    pub no_import_from: bool,

    /// Skip `require('...')` calls
    pub no_require: bool,

    /// Skip `export ... from '...'` statements
    pub no_export_from: bool,

    /// Longest reference the streaming engine must be able to hold back
    pub max_match_length: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            mappings: Mappings::new(),
            experimental_enable_streams: false,
            no_import: false,
            no_import_from: false,
            no_require: false,
            no_export_from: false,
            max_match_length: DEFAULT_MAX_MATCH_LENGTH,
        }
    }
}

impl RewriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping entry, replacing any previous target for `specifier`
    pub fn with_mapping(
        mut self,
        specifier: impl Into<String>,
        target: impl Into<TargetSpecifier>,
    ) -> Self {
        self.mappings.insert(specifier.into(), target.into());
        self
    }

    pub fn with_streams(mut self, enabled: bool) -> Self {
        self.experimental_enable_streams = enabled;
        self
    }

    /// Whether references of `kind` are rewritten
    pub fn is_enabled(&self, kind: ReferenceKind) -> bool {
        match kind {
            ReferenceKind::ImportFrom => !self.no_import_from,
            ReferenceKind::ExportFrom => !self.no_export_from,
            ReferenceKind::RequireCall => !self.no_require,
            ReferenceKind::DynamicImport => !self.no_import,
        }
    }

    /// Reject options the engines cannot work with
    pub fn validate(&self) -> RewriteResult<()> {
        if self.max_match_length == 0 {
            return Err(RewriteError::invalid_options(
                "maxMatchLength must be greater than zero",
            ));
        }
        for (specifier, target) in &self.mappings {
            if specifier.is_empty() {
                return Err(RewriteError::invalid_options(
                    "mapping keys must not be empty",
                ));
            }
            if target.raw_path().is_empty() {
                return Err(RewriteError::invalid_options(format!(
                    "mapping for '{}' has an empty target",
                    specifier
                )));
            }
        }
        Ok(())
    }
}
