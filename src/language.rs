//! Language inference from track titles.
//!
//! Script detection is authoritative: a single code point inside a target
//! language's Unicode block decides the language. Keyword matching is the
//! fallback for transliterated titles. When neither fires the result is
//! `None`, which downstream code treats as "no language preference", never
//! as English.

use crate::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Telugu,
    Hindi,
    Tamil,
    Kannada,
    Malayalam,
    Gujarati,
    Bengali,
    Punjabi,
    English,
}

/// All languages with a script or keyword table. Table order decides which
/// script wins for mixed-script titles.
const ALL: &[Language] = &[
    Language::Telugu,
    Language::Hindi,
    Language::Tamil,
    Language::Kannada,
    Language::Malayalam,
    Language::Gujarati,
    Language::Bengali,
    Language::Punjabi,
    Language::English,
];

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::Telugu => "telugu",
            Language::Hindi => "hindi",
            Language::Tamil => "tamil",
            Language::Kannada => "kannada",
            Language::Malayalam => "malayalam",
            Language::Gujarati => "gujarati",
            Language::Bengali => "bengali",
            Language::Punjabi => "punjabi",
            Language::English => "english",
        }
    }

    /// Token appended to search queries to bias results toward the language.
    pub fn search_token(&self) -> &'static str {
        self.name()
    }

    /// Unicode block(s) for the language's script. English has none: Latin
    /// script says nothing about language.
    fn script_ranges(&self) -> &'static [(u32, u32)] {
        match self {
            Language::Hindi => &[(0x0900, 0x097F)],    // Devanagari
            Language::Bengali => &[(0x0980, 0x09FF)],
            Language::Punjabi => &[(0x0A00, 0x0A7F)],  // Gurmukhi
            Language::Gujarati => &[(0x0A80, 0x0AFF)],
            Language::Tamil => &[(0x0B80, 0x0BFF)],
            Language::Telugu => &[(0x0C00, 0x0C7F)],
            Language::Kannada => &[(0x0C80, 0x0CFF)],
            Language::Malayalam => &[(0x0D00, 0x0D7F)],
            Language::English => &[],
        }
    }

    /// Whole-word hints that identify the language in transliterated titles.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Language::Telugu => &["telugu", "tollywood"],
            Language::Hindi => &["hindi", "bollywood"],
            Language::Tamil => &["tamil", "kollywood"],
            Language::Kannada => &["kannada", "sandalwood"],
            Language::Malayalam => &["malayalam", "mollywood"],
            Language::Gujarati => &["gujarati"],
            Language::Bengali => &["bengali", "bangla"],
            Language::Punjabi => &["punjabi"],
            Language::English => &["english", "hollywood"],
        }
    }
}

/// Infer a language from text: script first, keywords second, `None` last.
pub fn infer_language(input: &str) -> Option<Language> {
    if input.is_empty() {
        return None;
    }

    for c in input.chars() {
        let cp = c as u32;
        for lang in ALL {
            for (start, end) in lang.script_ranges() {
                if cp >= *start && cp <= *end {
                    return Some(*lang);
                }
            }
        }
    }

    let normalized = text::normalize(input);
    for lang in ALL {
        for kw in lang.keywords() {
            if normalized.split(' ').any(|w| w == *kw) {
                return Some(*lang);
            }
        }
    }

    None
}

/// True when the text carries a token that positively marks the language.
pub fn has_inclusion_token(input: &str, lang: Language) -> bool {
    let normalized = text::normalize(input);
    lang.keywords()
        .iter()
        .any(|kw| normalized.split(' ').any(|w| w == *kw))
}

/// True when the text carries a token marking a *different* language.
///
/// Used as a hard filter in autoplay: a "hindi" tag on a candidate disquali-
/// fies it when the preferred language is Telugu.
pub fn has_exclusion_token(input: &str, lang: Language) -> bool {
    let normalized = text::normalize(input);
    ALL.iter()
        .filter(|other| **other != lang)
        .any(|other| {
            other
                .keywords()
                .iter()
                .any(|kw| normalized.split(' ').any(|w| w == *kw))
        })
}
