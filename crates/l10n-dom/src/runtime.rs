//! The activation-scoped localization context.

use crate::discovery::ResourceDiscovery;
use crate::dispatcher::{MutationDispatcher, PendingTarget};
use crate::dom::{Document, HeadDeclaration, MutationBatch, NodeId, ObservationPause, ReadyState};
use crate::engine::{L10nArgs, L10nKey, ResolutionEngine};
use crate::error::L10nError;
use crate::host::{Host, LocalizedEvent};
use crate::locale::{Direction, direction};
use crate::readiness::{ActivationMode, ReadinessController};
use crate::translate::{self, L10nAttributes};
use l10n_dom_toml::RuntimeConfig;
use tracing::{debug, info};

/// Localization state of one document activation.
///
/// The host feeds events in through the entry points (`activate`,
/// `document_state_changed`, `run_deferred`, `manifest_loaded`,
/// `engine_ready`, `flush_mutations`, `languages_changed`) and the context
/// drives the document, the engine and the host in response.
pub struct Localization<D, E, H> {
    document: D,
    engine: E,
    host: H,
    config: RuntimeConfig,
    readiness: ReadinessController,
    discovery: ResourceDiscovery,
    dispatcher: MutationDispatcher,
    awaiting_interactive: bool,
    discovery_scheduled: bool,
    locale_initialized: bool,
    requested_language: Option<String>,
}

impl<D, E, H> Localization<D, E, H>
where
    D: Document,
    E: ResolutionEngine,
    H: Host,
{
    pub fn new(document: D, engine: E, host: H, config: RuntimeConfig) -> Self {
        Self {
            document,
            engine,
            host,
            config,
            readiness: ReadinessController::new(),
            discovery: ResourceDiscovery::new(),
            dispatcher: MutationDispatcher::new(),
            awaiting_interactive: false,
            discovery_scheduled: false,
            locale_initialized: false,
            requested_language: None,
        }
    }

    /// Starts the activation. Initialization runs right away when the
    /// document is already interactive, otherwise on the matching
    /// [`Self::document_state_changed`].
    ///
    /// An error means the inline payload could not be applied; discovery has
    /// been started regardless.
    pub fn activate(&mut self) -> Result<(), L10nError> {
        if self.readiness.mode().is_some() || self.awaiting_interactive {
            debug!("Localization already activated");
            return Ok(());
        }
        if self.document.ready_state() >= ReadyState::Interactive {
            return self.init();
        }
        debug!("Waiting for the document to become interactive");
        self.awaiting_interactive = true;
        Ok(())
    }

    pub fn document_state_changed(&mut self, state: ReadyState) -> Result<(), L10nError> {
        if !self.awaiting_interactive || state < ReadyState::Interactive {
            return Ok(());
        }
        self.awaiting_interactive = false;
        self.init()
    }

    fn init(&mut self) -> Result<(), L10nError> {
        let preferred = self.host.preferred_languages();
        let preferred = preferred.first().map(String::as_str);
        let root = self.document.document_element();
        let lang = self.document.attribute(root, "lang");
        let defer =
            self.config.always_defer || self.document.has_attribute(root, &self.config.defer_marker);

        let mode = ActivationMode::detect(lang.as_deref(), preferred, defer);
        match self.readiness.decide(mode, lang.as_deref()) {
            ActivationMode::Pretranslated => {
                let inline = match preferred {
                    Some(preferred) => self.inline_localization(preferred),
                    None => Ok(()),
                };
                self.start_discovery();
                inline
            },
            ActivationMode::NeedsFullPass => {
                self.dispatcher.arm(&mut self.document);
                self.discovery_scheduled = true;
                Ok(())
            },
        }
    }

    /// Applies the payload embedded for `preferred`, if there is one.
    fn inline_localization(&mut self, preferred: &str) -> Result<(), L10nError> {
        let Some(payload) = self.document.inline_payload(preferred) else {
            debug!("No inline payload for '{}'", preferred);
            return Ok(());
        };
        self.engine.add_inline_resource(preferred, &payload)?;

        let mut doc = ObservationPause::new(&mut self.document);
        let translated = translate::translate_document(&mut *doc, &self.engine, preferred);
        info!("Inline pass translated {} elements in '{}'", translated, preferred);
        Ok(())
    }

    /// Runs work scheduled for the next tick.
    pub fn run_deferred(&mut self) {
        if std::mem::take(&mut self.discovery_scheduled) {
            self.start_discovery();
        }
    }

    pub fn has_deferred_work(&self) -> bool {
        self.discovery_scheduled
    }

    fn start_discovery(&mut self) {
        let declarations = self.document.head_declarations();
        if self
            .discovery
            .discover(declarations, &mut self.engine, &mut self.host)
        {
            self.init_locale();
        }
    }

    /// Hands the outcome of a `Host::fetch_manifest` call back.
    pub fn manifest_loaded(&mut self, url: &str, result: Result<String, L10nError>) {
        if self
            .discovery
            .manifest_loaded(url, result, &mut self.engine)
        {
            self.init_locale();
        }
    }

    /// Handles a `<link>` or `<meta>` added to the head after activation.
    pub fn inject_head_declaration(&mut self, declaration: HeadDeclaration) {
        if self
            .discovery
            .inject(declaration, &mut self.engine, &mut self.host)
        {
            self.init_locale();
        }
    }

    fn init_locale(&mut self) {
        self.locale_initialized = true;
        let preferred = match self.requested_language.take() {
            Some(code) => vec![code],
            None => self.host.preferred_languages(),
        };
        self.request_locales(&preferred);
    }

    fn request_locales(&mut self, preferred: &[String]) {
        let negotiation = self.engine.request_locales(preferred);
        self.readiness.begin(negotiation);
    }

    /// Reports that the engine can serve the negotiation `ticket`. Returns
    /// `false` when the ticket is not the latest request.
    pub fn engine_ready(&mut self, ticket: u64) -> bool {
        let Some(locale) = self.readiness.accept(ticket) else {
            return false;
        };

        if self.readiness.take_pretranslated(&locale) {
            debug!("Document pretranslated in '{}', skipping the full pass", locale);
        } else {
            let mut doc = ObservationPause::new(&mut self.document);
            let translated = translate::translate_document(&mut *doc, &self.engine, &locale);
            info!("Translated {} elements in '{}'", translated, locale);
        }
        self.dispatcher
            .drain(&mut self.document, &self.engine, &locale);
        self.dispatcher.arm(&mut self.document);

        self.host.dispatch_localized(&LocalizedEvent {
            language: locale.clone(),
        });
        self.readiness.complete(locale);
        true
    }

    /// Processes a batch of mutation records. Returns the number of
    /// translation invocations made.
    pub fn process_mutations(&mut self, batch: MutationBatch) -> usize {
        self.dispatcher.process(
            batch,
            &mut self.document,
            &self.engine,
            self.readiness.locale(),
        )
    }

    /// Takes the records the document collected since the last flush and
    /// processes them as one batch.
    pub fn flush_mutations(&mut self) -> usize {
        let batch = self.document.take_records();
        if batch.is_empty() {
            return 0;
        }
        self.process_mutations(batch)
    }

    /// The host's preferred languages changed.
    pub fn languages_changed(&mut self) {
        if !self.locale_initialized {
            debug!("Language change before discovery completed, nothing to renegotiate");
            return;
        }
        let preferred = self.host.preferred_languages();
        self.request_locales(&preferred);
    }

    /// Requests `code` as the only preferred language. Before discovery
    /// completes the request is kept for the first negotiation.
    pub fn set_language(&mut self, code: &str) {
        if self.locale_initialized {
            self.request_locales(&[code.to_string()]);
        } else {
            self.requested_language = Some(code.to_string());
        }
    }

    /// The negotiated locale, once ready.
    pub fn language(&self) -> Option<&str> {
        self.readiness.locale()
    }

    pub fn direction(&self) -> Direction {
        self.language().map(direction).unwrap_or_default()
    }

    pub fn ready(&mut self, callback: impl FnMut(&String) + 'static) {
        self.readiness.signal_mut().ready(callback);
    }

    pub fn once(&mut self, callback: impl FnOnce(&String) + 'static) {
        self.readiness.signal_mut().once(callback);
    }

    /// `Complete` once the first negotiation finished, `Loading` before.
    pub fn ready_state(&self) -> ReadyState {
        if self.readiness.is_ready() {
            ReadyState::Complete
        } else {
            ReadyState::Loading
        }
    }

    /// Sets (or with `None`, clears) the translation id and arguments of
    /// `node` and translates it, or queues it until ready.
    pub fn localize(&mut self, node: NodeId, id: Option<&str>, args: Option<&L10nArgs>) -> usize {
        let mut doc = ObservationPause::new(&mut self.document);
        translate::set_l10n_attributes(&mut *doc, node, id, args);
        if id.is_none() {
            return 0;
        }
        self.dispatcher.request(
            PendingTarget::Element(node),
            &mut *doc,
            &self.engine,
            self.readiness.locale(),
        )
    }

    /// Translates `node` and its descendants, or queues them until ready.
    pub fn translate_fragment(&mut self, node: NodeId) -> usize {
        let mut doc = ObservationPause::new(&mut self.document);
        self.dispatcher.request(
            PendingTarget::Fragment(node),
            &mut *doc,
            &self.engine,
            self.readiness.locale(),
        )
    }

    /// Resolves `id` in the negotiated locale.
    pub fn get(&self, id: &str, args: Option<L10nArgs>) -> Option<String> {
        let locale = self.readiness.locale()?;
        let key = L10nKey {
            id: id.to_string(),
            args,
        };
        self.engine
            .resolve(locale, std::slice::from_ref(&key))
            .into_iter()
            .next()
            .flatten()?
            .value
    }

    pub fn l10n_attributes(&self, node: NodeId) -> L10nAttributes {
        translate::l10n_attributes(&self.document, node)
    }

    pub fn activation_mode(&self) -> Option<ActivationMode> {
        self.readiness.mode()
    }

    pub fn is_discovery_completed(&self) -> bool {
        self.discovery.is_completed()
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
