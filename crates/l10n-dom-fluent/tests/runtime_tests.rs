//! Drives the document runtime with the Fluent engine, the host playing the
//! part of the network.

use l10n_dom::{
    Direction, Document, Host, L10nError, Localization, LocalizedEvent, MemoryDocument, ReadyState,
    RuntimeConfig,
};
use l10n_dom_fluent::FluentEngine;
use std::collections::HashMap;

#[derive(Default)]
struct FakeNetwork {
    preferred: Vec<String>,
    files: HashMap<String, String>,
    requested: Vec<String>,
    events: Vec<LocalizedEvent>,
}

impl Host for FakeNetwork {
    fn preferred_languages(&self) -> Vec<String> {
        self.preferred.clone()
    }

    fn fetch_manifest(&mut self, url: &str) {
        self.requested.push(url.to_string());
    }

    fn dispatch_localized(&mut self, event: &LocalizedEvent) {
        self.events.push(event.clone());
    }
}

type App = Localization<MemoryDocument, FluentEngine, FakeNetwork>;

fn app(document: MemoryDocument, preferred: &[&str]) -> App {
    let mut network = FakeNetwork {
        preferred: preferred.iter().map(|c| c.to_string()).collect(),
        ..FakeNetwork::default()
    };
    for (url, body) in [
        (
            "/manifest.json",
            r#"{"default_locale": "en", "locales": {"en": {}, "fr": {}, "ar": {}}}"#,
        ),
        ("/locales/en/app.ftl", "title = Inbox\nunread = { $count } unread\n"),
        ("/locales/fr/app.ftl", "title = Boîte de réception\nunread = { $count } non lus\n"),
        ("/locales/ar/app.ftl", "title = البريد\n"),
    ] {
        network.files.insert(url.to_string(), body.to_string());
    }
    let config = RuntimeConfig::default();
    Localization::new(document, FluentEngine::new(&config), network, config)
}

fn serve_manifests(app: &mut App) {
    let requested = std::mem::take(&mut app.host_mut().requested);
    for url in requested {
        let result = app
            .host()
            .files
            .get(&url)
            .cloned()
            .ok_or_else(|| L10nError::ManifestFetch {
                url: url.clone(),
                reason: "not found".into(),
            });
        app.manifest_loaded(&url, result);
    }
}

/// Loads the resources of the latest negotiation and reports readiness.
fn serve_resources(app: &mut App, ticket: u64, locale: &str) -> bool {
    for url in app.engine().resource_urls(locale) {
        if let Some(body) = app.host().files.get(&url).cloned() {
            app.engine_mut().add_resource_source(locale, &body).unwrap();
        }
    }
    app.engine_ready(ticket)
}

fn document() -> MemoryDocument {
    let mut doc = MemoryDocument::new().with_lang("en");
    doc.set_ready_state(ReadyState::Interactive);
    doc.add_link("manifest", "/manifest.json");
    doc.add_link("localization", "/locales/{locale}/app.ftl");
    doc
}

#[test]
fn french_document_end_to_end() {
    let mut doc = document();
    let body = doc.body();
    let title = doc.append_element(body, "h1", &[("data-l10n-id", "title")]);
    let counter = doc.append_element(
        body,
        "span",
        &[("data-l10n-id", "unread"), ("data-l10n-args", r#"{"count": 4}"#)],
    );
    let mut app = app(doc, &["fr-CA", "en"]);

    app.activate().unwrap();
    app.run_deferred();
    serve_manifests(&mut app);

    let ticket = 1;
    assert!(serve_resources(&mut app, ticket, "fr"));

    assert_eq!(app.language(), Some("fr"));
    assert_eq!(app.document().text_content(title), "Boîte de réception");
    assert_eq!(app.document().text_content(counter), "4 non lus");
    assert_eq!(app.host().events.len(), 1);

    let later = app.document_mut().append_element(body, "p", &[("data-l10n-id", "title")]);
    assert_eq!(app.flush_mutations(), 1);
    assert_eq!(app.document().text_content(later), "Boîte de réception");
}

#[test]
fn arabic_switches_direction_and_falls_back_per_message() {
    let mut doc = document();
    let body = doc.body();
    let counter = doc.append_element(
        body,
        "span",
        &[("data-l10n-id", "unread"), ("data-l10n-args", r#"{"count": 2}"#)],
    );
    let mut app = app(doc, &["ar"]);

    app.activate().unwrap();
    app.run_deferred();
    serve_manifests(&mut app);
    app.engine_mut()
        .add_resource_source("en", "unread = { $count } unread\n")
        .unwrap();
    assert!(serve_resources(&mut app, 1, "ar"));

    assert_eq!(app.direction(), Direction::Rtl);
    let root = app.document().document_element();
    assert_eq!(app.document().attribute(root, "dir").as_deref(), Some("rtl"));
    assert_eq!(app.document().text_content(counter), "2 unread");
}

#[test]
fn pretranslated_document_uses_the_inline_payload() {
    let mut doc = document();
    doc.add_inline_payload("en", r#"{"title": "Inbox (inline)"}"#);
    let body = doc.body();
    let title = doc.append_element(body, "h1", &[("data-l10n-id", "title")]);
    let mut app = app(doc, &["en"]);

    app.activate().unwrap();
    assert_eq!(app.document().text_content(title), "Inbox (inline)");
    assert!(!app.has_deferred_work());

    serve_manifests(&mut app);
    assert!(serve_resources(&mut app, 1, "en"));
    assert_eq!(app.document().text_content(title), "Inbox (inline)");
    assert_eq!(app.host().events.len(), 1);

    app.set_language("fr");
    assert!(serve_resources(&mut app, 2, "fr"));
    assert_eq!(app.document().text_content(title), "Boîte de réception");
}
