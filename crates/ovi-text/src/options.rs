//! Editing options, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! [`Options::default`]. Unknown keys are rejected to surface typos.
//!
//! | Key                    | Type           | Default     |
//! |------------------------|----------------|-------------|
//! | `backup_suffix`        | string         | `".bak"`    |
//! | `create_backup`        | bool           | `true`      |
//! | `track_desired_column` | bool           | `false`     |
//! | `tab_inserts_spaces`   | integer / none | none (`\t`) |
//! | `max_count`            | integer        | `1000000`   |

use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Appended to a file's path to name its backup copy.
    pub backup_suffix: String,
    /// Copy an existing file aside before overwriting it on save.
    pub create_backup: bool,
    /// Remember the starting column across vertical motion.
    pub track_desired_column: bool,
    /// Tab inserts this many spaces instead of a literal `\t`.
    pub tab_inserts_spaces: Option<usize>,
    /// Upper bound for a typed repeat count. Larger counts saturate.
    pub max_count: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            backup_suffix: ".bak".to_owned(),
            create_backup: true,
            track_desired_column: false,
            tab_inserts_spaces: None,
            max_count: 1_000_000,
        }
    }
}

/// Failure to read or parse an options file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Options {
    /// Parse options from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed text, wrong value types or
    /// unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load options from a TOML file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] when the file exists but cannot be read,
    /// [`ConfigError::Parse`] when its content is not valid options.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The text a Tab key inserts.
    #[must_use]
    pub fn tab_text(&self) -> String {
        match self.tab_inserts_spaces {
            Some(n) => " ".repeat(n),
            None => "\t".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
