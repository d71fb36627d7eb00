use fluent_fallback::env::LocalesProvider;
use unic_langid::LanguageIdentifier;

/// Fallback chain for a requested locale: the locale itself, then its
/// primary language when it carries script, region or variant subtags.
pub fn fallback_locales(requested: &LanguageIdentifier) -> impl LocalesProvider {
    let mut chain = vec![requested.clone()];

    let has_subtags = requested.script.is_some()
        || requested.region.is_some()
        || requested.variants().next().is_some();

    if has_subtags
        && let Ok(primary) = requested.language.as_str().parse::<LanguageIdentifier>()
        && !chain.contains(&primary)
    {
        chain.push(primary);
    }

    chain
}

/// Picks a locale for the first preference that has a match in `available`.
///
/// Each preference is tried through its fallback chain before moving on to
/// the next one. Unparsable preferences are skipped.
pub fn negotiate<S: AsRef<str>>(
    preferred: &[S],
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    preferred
        .iter()
        .filter_map(|code| code.as_ref().parse::<LanguageIdentifier>().ok())
        .find_map(|requested| {
            fallback_locales(&requested)
                .locales()
                .find(|candidate| available.contains(candidate))
        })
}

/// Locales whose bundles are consulted, in order, when resolving in
/// `locale`: its fallback chain followed by `defaults` not already present.
pub fn resolution_chain(
    locale: &LanguageIdentifier,
    defaults: impl IntoIterator<Item = LanguageIdentifier>,
) -> Vec<LanguageIdentifier> {
    let mut chain: Vec<_> = fallback_locales(locale).locales().collect();
    for default in defaults {
        if !chain.contains(&default) {
            chain.push(default);
        }
    }
    chain
}
