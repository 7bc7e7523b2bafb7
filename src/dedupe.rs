//! Track identity: fingerprints for exact dedup, fuzzy matching for the
//! same song re-uploaded with cosmetic title differences.

use crate::protocol::Track;
use crate::text;

/// Derived identity key for a track.
///
/// Prefers the upstream identifier, falls back to the URI, then to
/// normalized title+author metadata. Stable: identical fields always
/// produce identical strings.
pub fn fingerprint(track: &Track) -> String {
    if !track.identifier.is_empty() {
        return track.identifier.clone();
    }
    if let Some(uri) = track.uri.as_deref() {
        let trimmed = uri.trim().to_lowercase();
        if !trimmed.is_empty() {
            return trimmed;
        }
    }
    format!(
        "meta:{}:{}",
        text::normalize(&track.title),
        text::normalize(&track.author)
    )
}

/// Exact identity: fingerprint equality.
pub fn same_track(a: &Track, b: &Track) -> bool {
    fingerprint(a) == fingerprint(b)
}

/// Fuzzy identity: the same song under a cosmetically different title.
///
/// Sources duplicate songs with remaster tags, bracketed annotations and
/// channel suffixes that fingerprints cannot see. Treated as the same song
/// when cleaned titles are equal, when one contains the other (shorter side
/// at least 8 chars), or when word overlap over the smaller title's word set
/// reaches 75% (55% if the authors match exactly).
pub fn looks_like_same_song(a: &Track, b: &Track) -> bool {
    if same_track(a, b) {
        return true;
    }

    let title_a = text::clean_title(&a.title);
    let title_b = text::clean_title(&b.title);
    if title_a.is_empty() || title_b.is_empty() {
        return false;
    }

    if title_a == title_b {
        return true;
    }

    let (shorter, longer) = if title_a.len() <= title_b.len() {
        (&title_a, &title_b)
    } else {
        (&title_b, &title_a)
    };
    if shorter.len() >= 8 && longer.contains(shorter.as_str()) {
        return true;
    }

    let words_a = text::word_set(&title_a);
    let words_b = text::word_set(&title_b);
    if words_a.is_empty() || words_b.is_empty() {
        return false;
    }

    let smaller = words_a.len().min(words_b.len());
    let overlap = words_a.intersection(&words_b).count();
    let ratio = overlap as f64 / smaller as f64;

    let authors_match = !a.author.is_empty()
        && text::normalize(&a.author) == text::normalize(&b.author);
    let threshold = if authors_match { 0.55 } else { 0.75 };

    ratio >= threshold
}
