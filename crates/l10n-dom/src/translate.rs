//! Writes resolved translations back into the document.

use crate::dom::{Document, L10N_ARGS_ATTRIBUTE, L10N_ID_ATTRIBUTE, NodeId};
use crate::engine::{L10nArgs, L10nKey, ResolutionEngine, Translation};
use crate::locale::direction;
use tracing::{debug, warn};

/// Attributes a translation is allowed to set.
pub const LOCALIZABLE_ATTRIBUTES: &[&str] = &[
    "alt",
    "aria-label",
    "aria-valuetext",
    "label",
    "placeholder",
    "title",
    "value",
];

/// The localization attributes of an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct L10nAttributes {
    pub id: Option<String>,
    pub args: Option<L10nArgs>,
}

/// Reads `data-l10n-id` and `data-l10n-args`. Malformed arguments are
/// reported and dropped.
pub fn l10n_attributes<D: Document + ?Sized>(doc: &D, node: NodeId) -> L10nAttributes {
    let id = doc.attribute(node, L10N_ID_ATTRIBUTE);
    let args = doc
        .attribute(node, L10N_ARGS_ATTRIBUTE)
        .and_then(|raw| match serde_json::from_str::<L10nArgs>(&raw) {
            Ok(args) => Some(args),
            Err(e) => {
                warn!(
                    "Ignoring malformed {} on {:?} ({:?}): {}",
                    L10N_ARGS_ATTRIBUTE, node, id, e
                );
                None
            },
        });
    L10nAttributes { id, args }
}

/// Sets or clears the localization attributes of an element.
pub fn set_l10n_attributes<D: Document + ?Sized>(
    doc: &mut D,
    node: NodeId,
    id: Option<&str>,
    args: Option<&L10nArgs>,
) {
    let Some(id) = id else {
        doc.remove_attribute(node, L10N_ID_ATTRIBUTE);
        doc.remove_attribute(node, L10N_ARGS_ATTRIBUTE);
        return;
    };

    doc.set_attribute(node, L10N_ID_ATTRIBUTE, id);
    match args {
        Some(args) => {
            let encoded = serde_json::Value::Object(args.clone()).to_string();
            doc.set_attribute(node, L10N_ARGS_ATTRIBUTE, &encoded);
        },
        None => doc.remove_attribute(node, L10N_ARGS_ATTRIBUTE),
    }
}

fn key_for<D: Document + ?Sized>(doc: &D, node: NodeId) -> Option<L10nKey> {
    let L10nAttributes { id, args } = l10n_attributes(doc, node);
    Some(L10nKey { id: id?, args })
}

/// Translates a single element. Returns `false` without calling the engine
/// when the element is detached or carries no translation id.
pub fn translate_element<D, E>(doc: &mut D, engine: &E, locale: &str, node: NodeId) -> bool
where
    D: Document + ?Sized,
    E: ResolutionEngine + ?Sized,
{
    if !doc.is_connected(node) {
        debug!("Skipping detached node {:?}", node);
        return false;
    }
    let Some(key) = key_for(doc, node) else {
        return false;
    };

    let translation = engine
        .resolve(locale, std::slice::from_ref(&key))
        .into_iter()
        .next()
        .flatten();
    match translation {
        Some(translation) => apply(doc, node, &translation),
        None => debug!("No translation for '{}' in {}", key.id, locale),
    }
    true
}

/// Translates `root` and every localizable descendant with one batched
/// engine call. Returns the number of elements submitted.
pub fn translate_fragment<D, E>(doc: &mut D, engine: &E, locale: &str, root: NodeId) -> usize
where
    D: Document + ?Sized,
    E: ResolutionEngine + ?Sized,
{
    if !doc.is_connected(root) {
        debug!("Skipping detached fragment {:?}", root);
        return 0;
    }

    let (nodes, keys): (Vec<NodeId>, Vec<L10nKey>) = std::iter::once(root)
        .chain(doc.descendant_elements(root))
        .filter_map(|node| key_for(doc, node).map(|key| (node, key)))
        .unzip();
    if keys.is_empty() {
        return 0;
    }

    let translations = engine.resolve(locale, &keys);
    for ((node, key), translation) in nodes.iter().zip(&keys).zip(translations) {
        match translation {
            Some(translation) => apply(doc, *node, &translation),
            None => debug!("No translation for '{}' in {}", key.id, locale),
        }
    }
    keys.len()
}

/// Sets `lang`/`dir` on the document element and translates the whole tree.
pub fn translate_document<D, E>(doc: &mut D, engine: &E, locale: &str) -> usize
where
    D: Document + ?Sized,
    E: ResolutionEngine + ?Sized,
{
    let root = doc.document_element();
    doc.set_attribute(root, "lang", locale);
    doc.set_attribute(root, "dir", direction(locale).as_str());
    translate_fragment(doc, engine, locale, root)
}

fn apply<D: Document + ?Sized>(doc: &mut D, node: NodeId, translation: &Translation) {
    if let Some(value) = &translation.value {
        if doc.child_element_count(node) == 0 {
            doc.set_text_content(node, value);
        } else {
            debug!("Keeping element children of {:?}, value not applied", node);
        }
    }

    for (name, value) in &translation.attributes {
        if LOCALIZABLE_ATTRIBUTES.contains(&name.as_str()) {
            doc.set_attribute(node, name, value);
        } else {
            debug!("Attribute '{}' is not localizable, skipped on {:?}", name, node);
        }
    }
}
