//! Retranslates the parts of the document that change at runtime.

use crate::dom::{Document, L10N_ID_ATTRIBUTE, MutationBatch, MutationRecord, NodeId, ObservationPause};
use crate::engine::ResolutionEngine;
use crate::translate::{translate_element, translate_fragment};
use tracing::debug;

/// Something waiting for the engine to become ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingTarget {
    Element(NodeId),
    Fragment(NodeId),
}

/// Turns mutation batches and explicit requests into translation calls.
///
/// Before the engine is ready (`locale` is `None`) requests are queued and
/// later drained in arrival order. Observation is suspended while a batch is
/// processed, so the dispatcher never sees its own writes.
#[derive(Debug, Default)]
pub struct MutationDispatcher {
    armed: bool,
    pending: Option<Vec<PendingTarget>>,
}

impl MutationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts observing the document. No-op when already armed.
    pub fn arm<D: Document + ?Sized>(&mut self, doc: &mut D) {
        if self.is_armed() {
            return;
        }
        doc.observe();
        self.armed = true;
        debug!("Mutation observation armed");
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn pending_len(&self) -> usize {
        self.pending.as_ref().map_or(0, Vec::len)
    }

    /// Processes one batch, records in delivery order. Returns the number of
    /// translation invocations made (queued requests are not counted).
    pub fn process<D, E>(
        &mut self,
        batch: MutationBatch,
        doc: &mut D,
        engine: &E,
        locale: Option<&str>,
    ) -> usize
    where
        D: Document + ?Sized,
        E: ResolutionEngine + ?Sized,
    {
        if !self.is_armed() {
            debug!("Dispatcher not armed, dropping {} records", batch.len());
            return 0;
        }

        let mut doc = ObservationPause::new(doc);
        let mut invocations = 0;
        for record in batch {
            match record {
                MutationRecord::ChildList { added, .. } => {
                    for node in added {
                        if !doc.is_element(node) || !doc.is_connected(node) {
                            continue;
                        }
                        let target = if doc.child_element_count(node) > 0 {
                            PendingTarget::Fragment(node)
                        } else if doc.has_attribute(node, L10N_ID_ATTRIBUTE) {
                            PendingTarget::Element(node)
                        } else {
                            continue;
                        };
                        invocations += self.request(target, &mut *doc, engine, locale);
                    }
                },
                MutationRecord::Attributes { target, .. } => {
                    if !doc.is_connected(target) {
                        debug!("Attribute record for removed node {:?} skipped", target);
                        continue;
                    }
                    invocations +=
                        self.request(PendingTarget::Element(target), &mut *doc, engine, locale);
                },
            }
        }
        invocations
    }

    /// Translates `target` now, or queues it when there is no locale yet.
    /// Returns the number of translation invocations made.
    pub fn request<D, E>(
        &mut self,
        target: PendingTarget,
        doc: &mut D,
        engine: &E,
        locale: Option<&str>,
    ) -> usize
    where
        D: Document + ?Sized,
        E: ResolutionEngine + ?Sized,
    {
        match locale {
            Some(locale) => usize::from(translate(target, doc, engine, locale)),
            None => {
                self.pending.get_or_insert_with(Vec::new).push(target);
                0
            },
        }
    }

    /// Translates every queued target in arrival order and discards the
    /// queue. Returns the number of translation invocations made.
    pub fn drain<D, E>(&mut self, doc: &mut D, engine: &E, locale: &str) -> usize
    where
        D: Document + ?Sized,
        E: ResolutionEngine + ?Sized,
    {
        let Some(pending) = self.pending.take() else {
            return 0;
        };
        debug!("Draining {} pending translation requests", pending.len());
        let mut doc = ObservationPause::new(doc);
        pending
            .into_iter()
            .filter(|target| translate(*target, &mut *doc, engine, locale))
            .count()
    }
}

fn translate<D, E>(target: PendingTarget, doc: &mut D, engine: &E, locale: &str) -> bool
where
    D: Document + ?Sized,
    E: ResolutionEngine + ?Sized,
{
    match target {
        PendingTarget::Element(node) => translate_element(doc, engine, locale, node),
        PendingTarget::Fragment(node) => translate_fragment(doc, engine, locale, node) > 0,
    }
}
