//! Text normalization shared by every matcher in the crate.

use std::collections::HashSet;

/// Tokens that carry no identity: upload boilerplate, quality tags, etc.
/// Stripped by [`clean_title`] before fuzzy comparison, never by
/// [`normalize`] itself.
const NOISE_TOKENS: &[&str] = &[
    "official",
    "audio",
    "video",
    "lyric",
    "lyrics",
    "lyrical",
    "hd",
    "hq",
    "4k",
    "full",
    "song",
    "music",
    "remastered",
    "remaster",
    "visualizer",
    "mv",
    "ft",
    "feat",
    "featuring",
];

/// Lower-case, strip punctuation, collapse whitespace, trim.
///
/// Alphanumeric characters of any script are kept so that titles in
/// non-Latin scripts survive for language detection. Idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lc in c.to_lowercase() {
                out.push(lc);
            }
        } else {
            // Any run of punctuation/whitespace collapses to one space.
            pending_space = true;
        }
    }

    out
}

/// Normalize and drop noise tokens and bracketed annotations.
///
/// Bracketed segments are dropped wholesale because they are almost always
/// annotations ("(Official Video)", "[Remastered 2011]") rather than part of
/// the song identity. Falls back to the plain normalized form when stripping
/// would leave nothing.
pub fn clean_title(title: &str) -> String {
    let without_brackets = strip_bracketed(title);
    let normalized = normalize(&without_brackets);

    let kept: Vec<&str> = normalized
        .split(' ')
        .filter(|w| !w.is_empty() && !NOISE_TOKENS.contains(w))
        .collect();

    if kept.is_empty() {
        normalize(title)
    } else {
        kept.join(" ")
    }
}

/// Split normalized text into words, dropping empties.
pub fn words(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Word set of the normalized text.
pub fn word_set(text: &str) -> HashSet<String> {
    words(text).into_iter().collect()
}

/// Whole-word containment check on normalized text.
pub fn contains_word(text: &str, word: &str) -> bool {
    normalize(text).split(' ').any(|w| w == word)
}

fn strip_bracketed(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0u32;
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
