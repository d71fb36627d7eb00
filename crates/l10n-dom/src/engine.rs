//! Contract of the message-resolution engine.

use crate::error::L10nError;

/// Translation arguments, as carried by `data-l10n-args`.
pub type L10nArgs = serde_json::Map<String, serde_json::Value>;

/// A translation id together with its arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct L10nKey {
    pub id: String,
    pub args: Option<L10nArgs>,
}

impl L10nKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            args: None,
        }
    }

    pub fn with_args(mut self, args: L10nArgs) -> Self {
        self.args = Some(args);
        self
    }
}

/// Rendered content for one key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Translation {
    /// Text content of the element, if the message has a value.
    pub value: Option<String>,
    /// Attribute name/value pairs.
    pub attributes: Vec<(String, String)>,
}

impl Translation {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            attributes: Vec::new(),
        }
    }
}

/// An outstanding locale request.
///
/// Tickets grow with every request; readiness is only accepted for the most
/// recent one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Negotiation {
    pub ticket: u64,
    pub locale: String,
}

/// Resolves translation ids into rendered content.
pub trait ResolutionEngine {
    /// Seeds the set of locales the document supports.
    fn register_locales(&mut self, default_locale: Option<&str>, available: &[String]);

    /// Picks a locale from the host preferences. The engine reports the
    /// locale usable later, through `Localization::engine_ready`.
    fn request_locales(&mut self, preferred: &[String]) -> Negotiation;

    /// Appends a resource URL to the engine's fetch list.
    fn add_resource(&mut self, url: &str);

    /// Adds a payload embedded in the document for `locale`.
    fn add_inline_resource(&mut self, locale: &str, payload: &str) -> Result<(), L10nError>;

    fn default_locale(&self) -> Option<String>;

    /// Resolves every key in one call. The result has one entry per key, in
    /// order; `None` marks a missing message.
    fn resolve(&self, locale: &str, keys: &[L10nKey]) -> Vec<Option<Translation>>;
}
