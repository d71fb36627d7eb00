//! Pseudo-localization strategies.
//!
//! Pseudo-locales render the default locale's messages through a text
//! transform so untranslated strings and layout problems stand out.

use std::borrow::Cow;

const ACCENTED_UPPER: [char; 26] = [
    'Ȧ', 'Ɓ', 'Ƈ', 'Ḓ', 'Ḗ', 'Ƒ', 'Ɠ', 'Ħ', 'Ī', 'Ĵ', 'Ķ', 'Ŀ', 'Ḿ', 'Ƞ', 'Ǿ', 'Ƥ', 'Ɋ', 'Ř', 'Ş',
    'Ŧ', 'Ŭ', 'Ṽ', 'Ẇ', 'Ẋ', 'Ẏ', 'Ẑ',
];
const ACCENTED_LOWER: [char; 26] = [
    'ȧ', 'ƀ', 'ƈ', 'ḓ', 'ḗ', 'ƒ', 'ɠ', 'ħ', 'ī', 'ĵ', 'ķ', 'ŀ', 'ḿ', 'ƞ', 'ǿ', 'ƥ', 'ɋ', 'ř', 'ş',
    'ŧ', 'ŭ', 'ṽ', 'ẇ', 'ẋ', 'ẏ', 'ẑ',
];
const FLIPPED_UPPER: [char; 26] = [
    '∀', 'Ԑ', 'Ↄ', 'ᗡ', 'Ǝ', 'Ⅎ', '⅁', 'H', 'I', 'ſ', 'Ӽ', '⅂', 'W', 'N', 'O', 'Ԁ', 'Ò', 'ᴚ', 'S',
    '⊥', '∩', 'Ʌ', 'M', 'X', '⅄', 'Z',
];
const FLIPPED_LOWER: [char; 26] = [
    'ɐ', 'q', 'ɔ', 'p', 'ǝ', 'ɟ', 'ƃ', 'ɥ', 'ı', 'ɾ', 'ʞ', 'ʅ', 'ɯ', 'u', 'o', 'd', 'b', 'ɹ', 's',
    'ʇ', 'n', 'ʌ', 'ʍ', 'x', 'ʎ', 'z',
];

/// Right-to-left override and pop directional formatting.
const RLO: char = '\u{202e}';
const PDF: char = '\u{202c}';

/// A pseudo-locale code and how it renders text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PseudoStrategy {
    /// `qps-ploc`: elongated vowels, accented letters.
    Accented,
    /// `qps-plocm`: mirrored letters wrapped in a right-to-left override.
    Bidi,
}

impl PseudoStrategy {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "qps-ploc" => Some(Self::Accented),
            "qps-plocm" => Some(Self::Bidi),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Accented => "qps-ploc",
            Self::Bidi => "qps-plocm",
        }
    }

    /// The transform handed to `FluentBundle::set_transform`.
    pub fn transform(self) -> fn(&str) -> Cow<'_, str> {
        match self {
            Self::Accented => accented,
            Self::Bidi => bidi,
        }
    }
}

fn map_ascii(c: char, upper: &[char; 26], lower: &[char; 26]) -> char {
    match c {
        'A'..='Z' => upper[c as usize - 'A' as usize],
        'a'..='z' => lower[c as usize - 'a' as usize],
        _ => c,
    }
}

/// Doubles vowels and replaces ASCII letters with accented look-alikes.
pub fn accented(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| c.is_ascii_alphabetic()) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u' | 'y') {
            out.push(map_ascii(c, &ACCENTED_UPPER, &ACCENTED_LOWER));
            out.push(map_ascii(c.to_ascii_lowercase(), &ACCENTED_UPPER, &ACCENTED_LOWER));
        } else {
            out.push(map_ascii(c, &ACCENTED_UPPER, &ACCENTED_LOWER));
        }
    }
    Cow::Owned(out)
}

/// Mirrors ASCII letters and forces right-to-left rendering.
pub fn bidi(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| c.is_ascii_alphabetic()) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() * 3 + 6);
    out.push(RLO);
    out.extend(text.chars().map(|c| map_ascii(c, &FLIPPED_UPPER, &FLIPPED_LOWER)));
    out.push(PDF);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("qps-ploc", Some(PseudoStrategy::Accented))]
    #[case("qps-plocm", Some(PseudoStrategy::Bidi))]
    #[case("qps", None)]
    #[case("en", None)]
    fn strategies_by_code(#[case] code: &str, #[case] expected: Option<PseudoStrategy>) {
        assert_eq!(PseudoStrategy::from_code(code), expected);
        if let Some(strategy) = expected {
            assert_eq!(strategy.code(), code);
        }
    }

    #[test]
    fn accented_elongates_vowels() {
        assert_eq!(accented("Hello"), "Ħḗḗŀŀǿǿ");
        assert_eq!(accented("Open"), "Ǿǿƥḗḗƞ");
    }

    #[test]
    fn bidi_wraps_in_override() {
        assert_eq!(bidi("Hi"), "\u{202e}Hı\u{202c}");
    }

    #[test]
    fn text_without_letters_is_borrowed() {
        assert!(matches!(accented(" 42 "), Cow::Borrowed(" 42 ")));
        assert!(matches!(bidi("…"), Cow::Borrowed("…")));
    }
}
