//! Activation mode and the ready signal.

use crate::engine::Negotiation;
use crate::locale::is_pseudo_locale;
use crate::signal::ReadySignal;
use tracing::{debug, info};

/// How the document is brought into its first localized state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationMode {
    /// The served document already is in the preferred language. Only the
    /// inline payload is applied and the first full pass is skipped.
    Pretranslated,
    /// The document is translated from scratch once the engine is ready.
    NeedsFullPass,
}

impl ActivationMode {
    /// Compares the declared document language with the first preferred
    /// language. Pseudo-locales and an explicit deferral always need a full
    /// pass.
    pub fn detect(
        document_lang: Option<&str>,
        preferred: Option<&str>,
        defer_requested: bool,
    ) -> Self {
        match (document_lang, preferred) {
            (Some(lang), Some(preferred))
                if !defer_requested && !is_pseudo_locale(preferred) && lang == preferred =>
            {
                Self::Pretranslated
            },
            _ => Self::NeedsFullPass,
        }
    }
}

/// Tracks negotiations and the locale they produced.
///
/// Only the most recent negotiation may complete; an older ticket reported
/// late is dropped, as is a ticket reported twice.
#[derive(Default)]
pub struct ReadinessController {
    mode: Option<ActivationMode>,
    pretranslated: Option<String>,
    outstanding: Option<Negotiation>,
    locale: Option<String>,
    signal: ReadySignal<String>,
}

impl ReadinessController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the activation mode. The first decision sticks for the lifetime
    /// of the controller. A pretranslated document is recorded as rendered
    /// in `document_lang`.
    pub fn decide(&mut self, mode: ActivationMode, document_lang: Option<&str>) -> ActivationMode {
        if let Some(existing) = self.mode {
            debug!("Activation mode already decided as {:?}", existing);
            return existing;
        }
        info!("Activation mode: {:?}", mode);
        self.mode = Some(mode);
        if mode == ActivationMode::Pretranslated {
            self.pretranslated = document_lang.map(str::to_string);
        }
        mode
    }

    pub fn mode(&self) -> Option<ActivationMode> {
        self.mode
    }

    /// Records a new negotiation, superseding any outstanding one.
    pub fn begin(&mut self, negotiation: Negotiation) {
        if let Some(previous) = &self.outstanding {
            debug!(
                "Negotiation #{} superseded by #{}",
                previous.ticket, negotiation.ticket
            );
        }
        info!(
            "Negotiation #{} requested locale '{}'",
            negotiation.ticket, negotiation.locale
        );
        self.outstanding = Some(negotiation);
    }

    pub fn is_negotiating(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Accepts readiness for `ticket` and returns the locale to switch to.
    pub fn accept(&mut self, ticket: u64) -> Option<String> {
        match self.outstanding.take() {
            Some(negotiation) if negotiation.ticket == ticket => {
                self.locale = Some(negotiation.locale.clone());
                Some(negotiation.locale)
            },
            outstanding => {
                debug!("Ignoring readiness of stale negotiation #{}", ticket);
                self.outstanding = outstanding;
                None
            },
        }
    }

    /// Returns whether the document is already rendered in `locale`,
    /// clearing the mark either way.
    pub fn take_pretranslated(&mut self, locale: &str) -> bool {
        self.pretranslated.take().as_deref() == Some(locale)
    }

    /// The locale of the last accepted negotiation.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.signal.is_complete()
    }

    pub fn complete(&mut self, locale: String) {
        info!("Localization ready in '{}'", locale);
        self.signal.complete(locale);
    }

    pub fn signal_mut(&mut self) -> &mut ReadySignal<String> {
        &mut self.signal
    }
}
