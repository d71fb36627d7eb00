use thiserror::Error;

#[derive(Debug, Error)]
pub enum L10nError {
    /// The host could not load a manifest.
    #[error("Failed to fetch manifest '{url}': {reason}")]
    ManifestFetch { url: String, reason: String },
    /// A fetched manifest is not valid JSON.
    #[error("Failed to parse manifest '{url}': {source}")]
    ManifestParse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    /// The payload embedded in the document for the inline pass is malformed.
    #[error("Malformed inline localization payload for '{locale}': {source}")]
    InlinePayload {
        locale: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("An underlying localization backend error occurred: {0}")]
    BackendError(#[from] anyhow::Error),
}
