//! Finds the resources and locales a document declares.
//!
//! Locale metadata arrives from two racing sources: `<meta>` tags read during
//! the synchronous head scan, and the manifest behind `<link rel="manifest">`
//! which the host loads asynchronously. Discovery completes once the head scan
//! is over and the manifest is either sealed or no fetch is outstanding;
//! whichever source settles last runs that check.

use crate::dom::HeadDeclaration;
use crate::engine::ResolutionEngine;
use crate::error::L10nError;
use crate::host::Host;
use crate::manifest::{Manifest, ManifestDocument, ManifestField, ManifestMerger};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct ResourceDiscovery {
    merger: ManifestMerger,
    head_scan_completed: bool,
    manifest_in_flight: Option<String>,
    registered: bool,
    completed: bool,
}

impl ResourceDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the head scan. Returns `true` if discovery completed during this
    /// call.
    #[must_use]
    pub fn discover<E, H>(
        &mut self,
        declarations: Vec<HeadDeclaration>,
        engine: &mut E,
        host: &mut H,
    ) -> bool
    where
        E: ResolutionEngine + ?Sized,
        H: Host + ?Sized,
    {
        debug!("Scanning {} head declarations", declarations.len());
        for declaration in declarations {
            self.apply(declaration, engine, host);
        }
        self.head_scan_completed = true;
        self.check_completion(engine)
    }

    /// Handles a declaration injected after the head scan started.
    ///
    /// Resource links always reach the engine; manifest links and meta tags
    /// are ignored once discovery completed.
    #[must_use]
    pub fn inject<E, H>(&mut self, declaration: HeadDeclaration, engine: &mut E, host: &mut H) -> bool
    where
        E: ResolutionEngine + ?Sized,
        H: Host + ?Sized,
    {
        if self.completed && !matches!(declaration, HeadDeclaration::ResourceLink(_)) {
            debug!("Discovery already completed, ignoring {:?}", declaration);
            return false;
        }
        self.apply(declaration, engine, host);
        self.check_completion(engine)
    }

    /// Settles the outstanding manifest fetch. Returns `true` if discovery
    /// completed during this call.
    #[must_use]
    pub fn manifest_loaded<E>(
        &mut self,
        url: &str,
        result: Result<String, L10nError>,
        engine: &mut E,
    ) -> bool
    where
        E: ResolutionEngine + ?Sized,
    {
        if self.manifest_in_flight.as_deref() != Some(url) {
            debug!("No fetch outstanding for manifest '{}', response dropped", url);
            return false;
        }
        self.manifest_in_flight = None;

        if self.merger.is_sealed() {
            debug!("Manifest already sealed, stale response for '{}' discarded", url);
            return self.check_completion(engine);
        }

        let parsed = result.and_then(|text| {
            ManifestDocument::from_json(&text).map_err(|source| L10nError::ManifestParse {
                url: url.to_string(),
                source,
            })
        });

        match parsed {
            Ok(document) => {
                for field in document.into_fields() {
                    if let Some(manifest) = self.merger.supply(field) {
                        self.register(manifest, engine);
                    }
                }
            },
            Err(e) => warn!("Continuing without manifest: {}", e),
        }

        self.check_completion(engine)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_fetch_outstanding(&self) -> bool {
        self.manifest_in_flight.is_some()
    }

    fn apply<E, H>(&mut self, declaration: HeadDeclaration, engine: &mut E, host: &mut H)
    where
        E: ResolutionEngine + ?Sized,
        H: Host + ?Sized,
    {
        match declaration {
            HeadDeclaration::ResourceLink(url) => engine.add_resource(&url),
            HeadDeclaration::ManifestLink(url) => self.load_manifest(url, host),
            HeadDeclaration::LocalesMeta(content) => {
                self.supply(ManifestField::locales_from_meta(&content), engine)
            },
            HeadDeclaration::DefaultLocaleMeta(content) => self.supply(
                ManifestField::DefaultLocale(content.trim().to_string()),
                engine,
            ),
        }
    }

    fn load_manifest<H: Host + ?Sized>(&mut self, url: String, host: &mut H) {
        if self.merger.is_sealed() {
            debug!("Manifest already sealed, not fetching '{}'", url);
            return;
        }
        if let Some(in_flight) = &self.manifest_in_flight {
            debug!("Manifest '{}' already loading, ignoring '{}'", in_flight, url);
            return;
        }
        info!("Fetching manifest '{}'", url);
        host.fetch_manifest(&url);
        self.manifest_in_flight = Some(url);
    }

    fn supply<E: ResolutionEngine + ?Sized>(&mut self, field: ManifestField, engine: &mut E) {
        if let Some(manifest) = self.merger.supply(field) {
            self.register(manifest, engine);
        }
    }

    fn register<E: ResolutionEngine + ?Sized>(&mut self, manifest: Manifest, engine: &mut E) {
        info!(
            "Registering locales {:?} (default {:?})",
            manifest.locales, manifest.default_locale
        );
        engine.register_locales(manifest.default_locale.as_deref(), &manifest.locales);
        self.registered = true;
    }

    fn check_completion<E: ResolutionEngine + ?Sized>(&mut self, engine: &mut E) -> bool {
        if self.completed || !self.head_scan_completed {
            return false;
        }
        if self.manifest_in_flight.is_some() && !self.merger.is_sealed() {
            return false;
        }

        if !self.registered {
            match self.merger.close() {
                Some(manifest) => self.register(manifest, engine),
                None => debug!("No locale metadata found, engine defaults apply"),
            }
        }
        self.completed = true;
        info!("Resource discovery completed");
        true
    }
}
