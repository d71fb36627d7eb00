/// Payload of the document-scoped `localized` notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalizedEvent {
    /// The negotiated locale code.
    pub language: String,
}

/// The environment a document lives in.
pub trait Host {
    /// Languages in the user's preference order.
    fn preferred_languages(&self) -> Vec<String>;

    /// Starts loading a manifest. The outcome is handed back through
    /// `Localization::manifest_loaded`.
    fn fetch_manifest(&mut self, url: &str);

    fn dispatch_localized(&mut self, event: &LocalizedEvent);
}
