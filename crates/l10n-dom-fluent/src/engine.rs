//! A [`ResolutionEngine`] backed by `fluent-bundle`.

use crate::fallback::{negotiate, resolution_chain};
use crate::inline::{InlineEntry, InlineMessages};
use crate::pseudo::PseudoStrategy;
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource, FluentValue};
use l10n_dom::{L10nArgs, L10nError, L10nKey, Negotiation, ResolutionEngine, Translation};
use l10n_dom_toml::RuntimeConfig;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use unic_langid::LanguageIdentifier;

/// Placeholder substituted by the locale code in resource links.
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

type Bundle = FluentBundle<Arc<FluentResource>>;

/// Formats messages from Fluent resources the host loads on its behalf.
///
/// Resource links are treated as URL templates. After a negotiation the host
/// loads [`FluentEngine::resource_urls`] for the negotiated locale, hands the
/// text to [`FluentEngine::add_resource_source`] and reports readiness.
pub struct FluentEngine {
    fallback: LanguageIdentifier,
    pseudo_enabled: bool,
    available: Vec<LanguageIdentifier>,
    default: Option<LanguageIdentifier>,
    templates: Vec<String>,
    resources: FxHashMap<LanguageIdentifier, Vec<Arc<FluentResource>>>,
    inline: FxHashMap<LanguageIdentifier, InlineMessages>,
    next_ticket: u64,
}

impl FluentEngine {
    pub fn new(config: &RuntimeConfig) -> Self {
        let fallback = config.fallback_locale_identifier().unwrap_or_else(|e| {
            warn!("{}, using 'en'", e);
            LanguageIdentifier::from_bytes(b"en").unwrap_or_default()
        });
        Self {
            fallback,
            pseudo_enabled: config.pseudo_locales,
            available: Vec::new(),
            default: None,
            templates: Vec::new(),
            resources: FxHashMap::default(),
            inline: FxHashMap::default(),
            next_ticket: 0,
        }
    }

    /// Registered locales, in declaration order.
    pub fn available_locales(&self) -> &[LanguageIdentifier] {
        &self.available
    }

    /// Resource URLs to load for `locale`. Pseudo-locales load the default
    /// locale's resources.
    pub fn resource_urls(&self, locale: &str) -> Vec<String> {
        let locale = match self.pseudo(locale) {
            Some(_) => self.base_locale().to_string(),
            None => locale.to_string(),
        };
        self.templates
            .iter()
            .map(|template| template.replace(LOCALE_PLACEHOLDER, &locale))
            .collect()
    }

    /// Adds the text of a loaded resource for `locale`.
    pub fn add_resource_source(&mut self, locale: &str, source: &str) -> Result<(), L10nError> {
        let langid = parse_locale(locale)?;
        let resource = FluentResource::try_new(source.to_string()).map_err(|(_, errs)| {
            L10nError::BackendError(anyhow::anyhow!(
                "Failed to parse fluent resource for '{}': {:?}",
                locale,
                errs
            ))
        })?;
        debug!("Added resource for '{}'", langid);
        self.resources
            .entry(langid)
            .or_default()
            .push(Arc::new(resource));
        Ok(())
    }

    fn pseudo(&self, locale: &str) -> Option<PseudoStrategy> {
        self.pseudo_enabled
            .then(|| PseudoStrategy::from_code(locale))
            .flatten()
    }

    fn base_locale(&self) -> &LanguageIdentifier {
        self.default.as_ref().unwrap_or(&self.fallback)
    }

    fn bundle(&self, locale: &LanguageIdentifier, pseudo: Option<PseudoStrategy>) -> Option<Bundle> {
        let resources = self.resources.get(locale)?;
        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        bundle.set_use_isolating(false);
        if let Some(strategy) = pseudo {
            bundle.set_transform(Some(strategy.transform()));
        }
        for resource in resources {
            if let Err(errs) = bundle.add_resource(resource.clone()) {
                warn!("Overlapping messages in '{}': {:?}", locale, errs);
            }
        }
        Some(bundle)
    }

    fn chain(&self, locale: &str) -> Vec<(LanguageIdentifier, Option<Bundle>)> {
        let pseudo = self.pseudo(locale);
        let locales = match pseudo {
            Some(_) => vec![self.base_locale().clone()],
            None => match locale.parse::<LanguageIdentifier>() {
                Ok(langid) => resolution_chain(
                    &langid,
                    self.default.iter().cloned().chain([self.fallback.clone()]),
                ),
                Err(e) => {
                    warn!("Cannot resolve in invalid locale '{}': {}", locale, e);
                    return Vec::new();
                },
            },
        };
        locales
            .into_iter()
            .map(|langid| {
                let bundle = self.bundle(&langid, pseudo);
                (langid, bundle)
            })
            .collect()
    }
}

impl ResolutionEngine for FluentEngine {
    fn register_locales(&mut self, default_locale: Option<&str>, available: &[String]) {
        self.available = available
            .iter()
            .filter_map(|code| match code.parse::<LanguageIdentifier>() {
                Ok(langid) => Some(langid),
                Err(e) => {
                    warn!("Ignoring invalid locale '{}': {}", code, e);
                    None
                },
            })
            .collect();
        if let Some(default) = default_locale {
            match default.parse::<LanguageIdentifier>() {
                Ok(langid) => self.default = Some(langid),
                Err(e) => warn!("Ignoring invalid default locale '{}': {}", default, e),
            }
        }
    }

    fn request_locales(&mut self, preferred: &[String]) -> Negotiation {
        self.next_ticket += 1;
        let locale = match preferred.first().and_then(|code| self.pseudo(code)) {
            Some(strategy) => strategy.code().to_string(),
            None => negotiate(preferred, &self.available)
                .unwrap_or_else(|| self.base_locale().clone())
                .to_string(),
        };
        info!(
            "Negotiated '{}' from {:?} (ticket #{})",
            locale, preferred, self.next_ticket
        );
        Negotiation {
            ticket: self.next_ticket,
            locale,
        }
    }

    fn add_resource(&mut self, url: &str) {
        self.templates.push(url.to_string());
    }

    fn add_inline_resource(&mut self, locale: &str, payload: &str) -> Result<(), L10nError> {
        let messages: InlineMessages =
            serde_json::from_str(payload).map_err(|source| L10nError::InlinePayload {
                locale: locale.to_string(),
                source,
            })?;
        let langid = parse_locale(locale)?;
        self.inline.entry(langid).or_default().extend(messages);
        Ok(())
    }

    fn default_locale(&self) -> Option<String> {
        self.default.as_ref().map(ToString::to_string)
    }

    fn resolve(&self, locale: &str, keys: &[L10nKey]) -> Vec<Option<Translation>> {
        let chain = self.chain(locale);
        keys.iter()
            .map(|key| {
                chain.iter().find_map(|(langid, bundle)| {
                    bundle
                        .as_ref()
                        .and_then(|bundle| format_message(bundle, key))
                        .or_else(|| {
                            self.inline
                                .get(langid)
                                .and_then(|messages| messages.get(&key.id))
                                .map(InlineEntry::to_translation)
                        })
                })
            })
            .collect()
    }
}

fn parse_locale(locale: &str) -> Result<LanguageIdentifier, L10nError> {
    locale.parse().map_err(|e| {
        L10nError::BackendError(anyhow::anyhow!("Invalid locale '{}': {}", locale, e))
    })
}

fn fluent_args(args: &L10nArgs) -> FluentArgs<'_> {
    let mut fa = FluentArgs::new();
    for (name, value) in args {
        let value = match value {
            serde_json::Value::String(s) => FluentValue::from(s.as_str()),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(n) => FluentValue::from(n),
                None => FluentValue::from(n.to_string()),
            },
            serde_json::Value::Null => FluentValue::None,
            other => FluentValue::from(other.to_string()),
        };
        fa.set(name.as_str(), value);
    }
    fa
}

fn format_message(bundle: &Bundle, key: &L10nKey) -> Option<Translation> {
    let message = bundle.get_message(&key.id)?;
    let args = key.args.as_ref().map(fluent_args);
    let mut errors = Vec::new();

    let value = message
        .value()
        .map(|pattern| bundle.format_pattern(pattern, args.as_ref(), &mut errors).into_owned());
    let attributes = message
        .attributes()
        .map(|attr| {
            let value = bundle.format_pattern(attr.value(), args.as_ref(), &mut errors);
            (attr.id().to_string(), value.into_owned())
        })
        .collect();

    if !errors.is_empty() {
        error!("Fluent formatting errors for id '{}': {:?}", key.id, errors);
        return None;
    }

    Some(Translation { value, attributes })
}
