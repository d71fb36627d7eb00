use std::fmt;

/// Locales written right to left. `qps-plocm` is the mirrored pseudo-locale.
pub const RTL_LOCALES: &[&str] = &["ar", "he", "fa", "ps", "qps-plocm", "ur"];

/// Synthetic locales used to check localization coverage.
pub const PSEUDO_LOCALES: &[&str] = &["qps-ploc", "qps-plocm"];

/// Writing direction of a locale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the writing direction for a locale code.
pub fn direction(locale: &str) -> Direction {
    if RTL_LOCALES.contains(&locale) {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

/// Returns `true` for the pseudo-locales.
pub fn is_pseudo_locale(locale: &str) -> bool {
    PSEUDO_LOCALES.contains(&locale)
}
