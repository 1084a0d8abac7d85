//! Configuration for the import rewriter
//!
//! Rewrite options and logging settings are merged from three layers, lowest
//! precedence first:
//!
//! 1. Built-in defaults.
//! 2. `rewrite-imports.toml` in the project directory.
//! 3. Environment variables prefixed with `REWRITE_IMPORTS_`, using `__` to
//!    separate nested keys (`REWRITE_IMPORTS_REWRITE__NO_REQUIRE=true`).
//!
//! # Example file
//!
//! ```toml
//! [rewrite]
//! noRequire = false
//! experimentalEnableStreams = true
//!
//! [rewrite.mappings]
//! nowhere = "somewhere"
//! shared = { path = "dist/shared/index.js", relativeTo = "dist" }
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

pub mod logging;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use rewrite_imports::{ImportRewriter, RewriteError, RewriteOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Name of the project-level config file
pub const CONFIG_FILE_NAME: &str = "rewrite-imports.toml";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "REWRITE_IMPORTS_";

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Options handed to the rewriter
    pub rewrite: RewriteOptions,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format for development
    #[default]
    Pretty,
    /// Structured JSON format for production
    Json,
}

impl RewriteConfig {
    /// Load from `project_dir/rewrite-imports.toml` and the environment.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        Self::from_file(&project_dir.join(CONFIG_FILE_NAME))
    }

    /// Load from an explicit file path and the environment
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract()?;
        tracing::debug!(
            path = %path.display(),
            mappings = config.rewrite.mappings.len(),
            "Loaded rewrite configuration"
        );
        Ok(config)
    }

    /// The layered provider, exposed so hosts can merge further sources
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .split("__")
                    .lowercase(false)
                    .map(env_key),
            )
    }

    /// Build the rewriter described by this configuration
    pub fn into_rewriter(self) -> Result<ImportRewriter, ConfigError> {
        Ok(ImportRewriter::new(self.rewrite)?)
    }
}

/// Environment keys arrive as written (`REWRITE.NO_REQUIRE`); option names are
/// camelCase. The segment after `rewrite.mappings` is a module specifier and
/// keeps its case; any segments below it are option names again.
fn env_key(key: &UncasedStr) -> Uncased<'_> {
    let segments: Vec<&str> = key.as_str().split('.').collect();
    let is_mapping = segments.len() > 2
        && segments[0].eq_ignore_ascii_case("rewrite")
        && segments[1].eq_ignore_ascii_case("mappings");

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            if is_mapping && i == 2 {
                segment.to_string()
            } else {
                camel_case(&segment.to_ascii_lowercase())
            }
        })
        .collect::<Vec<_>>()
        .join(".")
        .into()
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Figment error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid rewrite options: {0}")]
    Rewrite(#[from] RewriteError),
}
