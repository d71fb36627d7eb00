#![allow(dead_code)] // Helpers used by different test binaries appear unused per-binary

//! Shared test doubles for l10n-dom integration tests.

use l10n_dom::{
    Host, L10nError, L10nKey, Localization, LocalizedEvent, MemoryDocument, Negotiation,
    ResolutionEngine, RuntimeConfig, Translation,
};
use std::cell::RefCell;
use std::collections::HashMap;

/// Engine that renders `locale:id` (plus sorted args) and records every call.
#[derive(Default)]
pub struct RecordingEngine {
    pub resources: Vec<String>,
    pub registrations: Vec<(Option<String>, Vec<String>)>,
    pub negotiations: Vec<Negotiation>,
    pub inline: HashMap<String, HashMap<String, String>>,
    pub default: Option<String>,
    batches: RefCell<Vec<Vec<String>>>,
    next_ticket: u64,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every `resolve` call, one entry per call.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.borrow().clone()
    }

    pub fn resolve_calls(&self) -> usize {
        self.batches.borrow().len()
    }

    pub fn clear_batches(&self) {
        self.batches.borrow_mut().clear();
    }

    pub fn last_ticket(&self) -> u64 {
        self.negotiations.last().map_or(0, |n| n.ticket)
    }

    fn available(&self) -> (Option<String>, Vec<String>) {
        self.registrations.last().cloned().unwrap_or_default()
    }
}

impl ResolutionEngine for RecordingEngine {
    fn register_locales(&mut self, default_locale: Option<&str>, available: &[String]) {
        if let Some(default) = default_locale {
            self.default = Some(default.to_string());
        }
        self.registrations
            .push((default_locale.map(str::to_string), available.to_vec()));
    }

    fn request_locales(&mut self, preferred: &[String]) -> Negotiation {
        let (default, available) = self.available();
        let locale = preferred
            .iter()
            .find(|code| available.contains(code))
            .cloned()
            .or(default)
            .unwrap_or_else(|| "en".to_string());
        self.next_ticket += 1;
        let negotiation = Negotiation {
            ticket: self.next_ticket,
            locale,
        };
        self.negotiations.push(negotiation.clone());
        negotiation
    }

    fn add_resource(&mut self, url: &str) {
        self.resources.push(url.to_string());
    }

    fn add_inline_resource(&mut self, locale: &str, payload: &str) -> Result<(), L10nError> {
        let entries: HashMap<String, String> =
            serde_json::from_str(payload).map_err(|source| L10nError::InlinePayload {
                locale: locale.to_string(),
                source,
            })?;
        self.inline.insert(locale.to_string(), entries);
        Ok(())
    }

    fn default_locale(&self) -> Option<String> {
        self.default.clone()
    }

    fn resolve(&self, locale: &str, keys: &[L10nKey]) -> Vec<Option<Translation>> {
        self.batches
            .borrow_mut()
            .push(keys.iter().map(|key| key.id.clone()).collect());
        keys.iter()
            .map(|key| {
                if let Some(text) = self.inline.get(locale).and_then(|m| m.get(&key.id)) {
                    return Some(Translation::text(text.clone()));
                }
                if key.id.starts_with("missing") {
                    return None;
                }
                let mut text = format!("{}:{}", locale, key.id);
                if let Some(args) = &key.args {
                    let mut pairs: Vec<_> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    pairs.sort();
                    text.push_str(&format!("({})", pairs.join(",")));
                }
                Some(Translation::text(text))
            })
            .collect()
    }
}

/// Host with fixed preferences that records fetches and notifications.
#[derive(Default)]
pub struct RecordingHost {
    pub preferred: Vec<String>,
    pub fetches: Vec<String>,
    pub events: Vec<LocalizedEvent>,
}

impl RecordingHost {
    pub fn preferring(codes: &[&str]) -> Self {
        Self {
            preferred: codes.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Host for RecordingHost {
    fn preferred_languages(&self) -> Vec<String> {
        self.preferred.clone()
    }

    fn fetch_manifest(&mut self, url: &str) {
        self.fetches.push(url.to_string());
    }

    fn dispatch_localized(&mut self, event: &LocalizedEvent) {
        self.events.push(event.clone());
    }
}

pub type TestLocalization = Localization<MemoryDocument, RecordingEngine, RecordingHost>;

pub fn localization(document: MemoryDocument, preferred: &[&str]) -> TestLocalization {
    Localization::new(
        document,
        RecordingEngine::new(),
        RecordingHost::preferring(preferred),
        RuntimeConfig::default(),
    )
}

/// Completes the latest negotiation and returns whether it was accepted.
pub fn finish_negotiation(l10n: &mut TestLocalization) -> bool {
    let ticket = l10n.engine().last_ticket();
    l10n.engine_ready(ticket)
}

pub fn owned(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}
