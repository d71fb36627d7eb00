//! The narrow slice of a document tree the runtime needs.

mod memory;

pub use memory::MemoryDocument;

use std::ops::{Deref, DerefMut};

/// Attribute carrying the translation id of an element.
pub const L10N_ID_ATTRIBUTE: &str = "data-l10n-id";
/// Attribute carrying the JSON-encoded translation arguments of an element.
pub const L10N_ARGS_ATTRIBUTE: &str = "data-l10n-args";
/// Attribute changes that are reported to the mutation dispatcher.
pub const OBSERVED_ATTRIBUTES: [&str; 2] = [L10N_ID_ATTRIBUTE, L10N_ARGS_ATTRIBUTE];

/// Handle to a node of a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Load lifecycle of the host document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

/// A localization-related `<link>` or `<meta>` found in the document head.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadDeclaration {
    /// `<link rel="localization" href="..">`
    ResourceLink(String),
    /// `<link rel="manifest" href="..">`
    ManifestLink(String),
    /// `<meta name="locales" content="..">`, comma separated.
    LocalesMeta(String),
    /// `<meta name="default_locale" content="..">`
    DefaultLocaleMeta(String),
}

/// One observed change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList { target: NodeId, added: Vec<NodeId> },
    Attributes { target: NodeId, name: String },
}

/// Records delivered together, in the order they happened.
pub type MutationBatch = Vec<MutationRecord>;

/// Document primitives consumed by the runtime.
///
/// Observation reports child-list insertions and changes to
/// [`OBSERVED_ATTRIBUTES`] on connected nodes for as long as it is active.
pub trait Document {
    fn ready_state(&self) -> ReadyState;

    /// The root (`<html>`) element.
    fn document_element(&self) -> NodeId;

    /// Localization declarations of the head, in document order.
    fn head_declarations(&self) -> Vec<HeadDeclaration>;

    /// Text of the inline payload embedded for `locale`, if any.
    fn inline_payload(&self, locale: &str) -> Option<String>;

    fn is_element(&self, node: NodeId) -> bool;

    /// Whether the node is still attached to the document.
    fn is_connected(&self, node: NodeId) -> bool;

    fn child_element_count(&self, node: NodeId) -> usize;

    /// Element descendants of `node` in document order, `node` excluded.
    fn descendant_elements(&self, node: NodeId) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Replaces the children of `node` with a single text node.
    fn set_text_content(&mut self, node: NodeId, text: &str);

    fn observe(&mut self);

    fn disconnect(&mut self);

    fn is_observing(&self) -> bool;

    /// Drains the records collected since the last call.
    fn take_records(&mut self) -> MutationBatch;
}

/// Suspends observation for as long as it is alive.
///
/// Observation is resumed on drop, on every exit path, if and only if it was
/// active when the pause began.
pub struct ObservationPause<'a, D: Document + ?Sized> {
    document: &'a mut D,
    resume: bool,
}

impl<'a, D: Document + ?Sized> ObservationPause<'a, D> {
    pub fn new(document: &'a mut D) -> Self {
        let resume = document.is_observing();
        if resume {
            document.disconnect();
        }
        Self { document, resume }
    }
}

impl<D: Document + ?Sized> Deref for ObservationPause<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.document
    }
}

impl<D: Document + ?Sized> DerefMut for ObservationPause<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.document
    }
}

impl<D: Document + ?Sized> Drop for ObservationPause<'_, D> {
    fn drop(&mut self) {
        if self.resume {
            self.document.observe();
        }
    }
}
