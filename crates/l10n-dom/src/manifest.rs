//! Locale metadata gathered from `<meta>` tags and fetched manifests.

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

/// Locale metadata handed to the engine once discovery has it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub default_locale: Option<String>,
    pub locales: Vec<String>,
}

/// One recognized manifest key together with its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestField {
    Locales(Vec<String>),
    DefaultLocale(String),
}

impl ManifestField {
    /// Builds the `locales` field from comma separated `<meta>` content.
    pub fn locales_from_meta(content: &str) -> Self {
        ManifestField::Locales(
            content
                .split(',')
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn key(&self) -> &'static str {
        match self {
            ManifestField::Locales(_) => "locales",
            ManifestField::DefaultLocale(_) => "default_locale",
        }
    }
}

/// Accumulates manifest fields from the head scan and the manifest fetch.
///
/// The first source to supply a field owns it. Once both fields are known the
/// merger seals and every later `supply` is ignored.
#[derive(Debug, Default)]
pub struct ManifestMerger {
    locales: Option<Vec<String>>,
    default_locale: Option<String>,
    sealed: bool,
}

impl ManifestMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a field. Returns the sealed manifest from the call that
    /// completes it, and `None` from every other call.
    pub fn supply(&mut self, field: ManifestField) -> Option<Manifest> {
        if self.sealed {
            debug!("Manifest already sealed, ignoring '{}'", field.key());
            return None;
        }

        match field {
            ManifestField::Locales(locales) if self.locales.is_none() => {
                self.locales = Some(locales);
            },
            ManifestField::DefaultLocale(code) if self.default_locale.is_none() => {
                self.default_locale = Some(code);
            },
            field => {
                debug!("Manifest field '{}' already supplied", field.key());
            },
        }

        if self.locales.is_some() && self.default_locale.is_some() {
            return self.seal();
        }
        None
    }

    /// Seals with whatever is known. Returns `None` when already sealed or
    /// when no field was ever supplied.
    pub fn close(&mut self) -> Option<Manifest> {
        if self.sealed {
            return None;
        }
        if self.locales.is_none() && self.default_locale.is_none() {
            self.sealed = true;
            return None;
        }
        self.seal()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn seal(&mut self) -> Option<Manifest> {
        self.sealed = true;
        Some(Manifest {
            default_locale: self.default_locale.take(),
            locales: self.locales.take().unwrap_or_default(),
        })
    }
}

/// The JSON document behind `<link rel="manifest">`.
///
/// Only `default_locale` and the keys of `locales` are read; the order of the
/// `locales` keys is kept.
#[derive(Debug, Default, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub default_locale: Option<String>,
    #[serde(default)]
    pub locales: Option<IndexMap<String, serde_json::Value>>,
}

impl ManifestDocument {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The fields this document provides, `default_locale` first.
    pub fn into_fields(self) -> Vec<ManifestField> {
        let mut fields = Vec::with_capacity(2);
        if let Some(code) = self.default_locale {
            fields.push(ManifestField::DefaultLocale(code));
        }
        if let Some(locales) = self.locales {
            fields.push(ManifestField::Locales(locales.into_keys().collect()));
        }
        fields
    }
}
