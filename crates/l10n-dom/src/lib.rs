#![doc = include_str!("../README.md")]

pub mod discovery;
pub mod dispatcher;
pub mod dom;
pub mod engine;
pub mod error;
pub mod host;
pub mod locale;
pub mod manifest;
pub mod readiness;
pub mod runtime;
pub mod signal;
pub mod translate;

pub use dom::{Document, HeadDeclaration, MemoryDocument, MutationRecord, NodeId, ReadyState};
pub use engine::{L10nArgs, L10nKey, Negotiation, ResolutionEngine, Translation};
pub use error::L10nError;
pub use host::{Host, LocalizedEvent};
pub use l10n_dom_toml::RuntimeConfig;
pub use locale::Direction;
pub use readiness::ActivationMode;
pub use runtime::Localization;
