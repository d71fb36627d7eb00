#![doc = include_str!("../README.md")]

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};
use thiserror::Error;
use unic_langid::{LanguageIdentifier, LanguageIdentifierError};

/// Name of the configuration file looked up in a manifest directory.
pub const CONFIG_FILE_NAME: &str = "l10n.toml";

#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    /// Configuration file not found.
    #[error("l10n.toml configuration file not found")]
    NotFound,
    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The fallback locale is not a valid language identifier.
    #[error("Invalid fallback locale '{name}'")]
    InvalidFallbackLocale {
        /// The invalid identifier.
        name: String,
        /// The parsing error produced by `unic-langid`.
        #[source]
        source: LanguageIdentifierError,
    },
    /// The defer marker is not usable as an attribute name.
    #[error("Invalid defer marker '{0}': expected a non-empty attribute name")]
    InvalidDeferMarker(String),
}

/// Runtime configuration for one document activation.
///
/// ```toml
/// fallback_locale = "en-US"
/// defer_marker = "data-no-complete-bug"
/// always_defer = false
/// pseudo_locales = true
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Locale the engine falls back to when discovery yields no default.
    #[serde(default = "default_fallback_locale")]
    pub fallback_locale: String,
    /// Attribute on the document element that forces the full translation
    /// pass even when the document language already matches.
    #[serde(default = "default_defer_marker")]
    pub defer_marker: String,
    /// Forces the full translation pass for every document.
    #[serde(default)]
    pub always_defer: bool,
    /// Exposes the `qps-ploc` and `qps-plocm` pseudo-locales.
    #[serde(default = "default_pseudo_locales")]
    pub pseudo_locales: bool,
}

fn default_fallback_locale() -> String {
    "en".to_string()
}

fn default_defer_marker() -> String {
    "data-no-complete-bug".to_string()
}

fn default_pseudo_locales() -> bool {
    true
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fallback_locale: default_fallback_locale(),
            defer_marker: default_defer_marker(),
            always_defer: false,
            pseudo_locales: default_pseudo_locales(),
        }
    }
}

impl RuntimeConfig {
    /// Parses and validates configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, RuntimeConfigError> {
        let config: RuntimeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from a path.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, RuntimeConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RuntimeConfigError::NotFound);
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reads `l10n.toml` from the given directory.
    pub fn from_dir(dir: &Path) -> Result<Self, RuntimeConfigError> {
        Self::read_from_path(dir.join(CONFIG_FILE_NAME))
    }

    /// Reads `l10n.toml` from `CARGO_MANIFEST_DIR`.
    pub fn read_from_manifest_dir() -> Result<Self, RuntimeConfigError> {
        let manifest_dir =
            env::var("CARGO_MANIFEST_DIR").map_err(|_| RuntimeConfigError::NotFound)?;
        Self::from_dir(Path::new(&manifest_dir))
    }

    /// Like [`RuntimeConfig::from_dir`], but a missing file yields the defaults.
    pub fn from_dir_or_default(dir: &Path) -> Result<Self, RuntimeConfigError> {
        match Self::from_dir(dir) {
            Err(RuntimeConfigError::NotFound) => Ok(Self::default()),
            other => other,
        }
    }

    /// Returns the fallback locale as a `LanguageIdentifier`.
    pub fn fallback_locale_identifier(&self) -> Result<LanguageIdentifier, RuntimeConfigError> {
        self.fallback_locale
            .parse::<LanguageIdentifier>()
            .map_err(|source| RuntimeConfigError::InvalidFallbackLocale {
                name: self.fallback_locale.clone(),
                source,
            })
    }

    fn validate(&self) -> Result<(), RuntimeConfigError> {
        self.fallback_locale_identifier()?;

        let marker = self.defer_marker.trim();
        if marker.is_empty() || marker.contains(char::is_whitespace) {
            return Err(RuntimeConfigError::InvalidDeferMarker(
                self.defer_marker.clone(),
            ));
        }

        Ok(())
    }
}
