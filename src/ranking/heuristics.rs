//! Individual scoring heuristics, each a small pure function so weights can
//! be tuned and tested in isolation. `rank` composes them additively.

use crate::text;

pub(crate) const EXACT_MATCH_BONUS: f64 = 120.0;
pub(crate) const TITLE_WORD_WEIGHT: f64 = 14.0;
pub(crate) const AUTHOR_WORD_WEIGHT: f64 = 6.0;
pub(crate) const ALL_WORDS_BONUS: f64 = 30.0;
pub(crate) const AUTHORITY_BONUS: f64 = 10.0;
pub(crate) const ALT_VERSION_PENALTY: f64 = 35.0;
pub(crate) const DURATION_SWEET_SPOT_BONUS: f64 = 8.0;
pub(crate) const OVERLONG_PENALTY: f64 = 25.0;

/// Minimum plausible song length; shorter known durations are pre-filtered.
pub(crate) const MIN_SONG_MS: u64 = 45_000;
const SWEET_SPOT_MIN_MS: u64 = 120_000;
const SWEET_SPOT_MAX_MS: u64 = 420_000;
const OVERLONG_MS: u64 = 1_800_000;

/// Titles carrying these are not songs at all.
const NON_SONG_MARKERS: &[&str] = &[
    "ringtone",
    "alarm",
    "shorts",
    "status",
    "whatsapp",
    "tutorial",
    "reaction",
    "teaser",
    "trailer",
];

/// Alternate renditions of a song, penalized unless explicitly requested.
pub(crate) const ALT_VERSION_MARKERS: &[&str] = &[
    "slowed",
    "reverb",
    "nightcore",
    "sped",
    "speed",
    "cover",
    "live",
    "remix",
    "instrumental",
    "karaoke",
    "8d",
    "mashup",
    "lofi",
    "acoustic",
    "remake",
];

/// Compilation/mix markers; used by the autoplay song-likeness gate.
pub(crate) const COMPILATION_MARKERS: &[&str] = &[
    "jukebox",
    "nonstop",
    "compilation",
    "megamix",
    "mixtape",
    "playlist",
    "medley",
    "back to back",
    "all songs",
    "full album",
    "top 10",
    "top 20",
];

pub fn is_non_song_title(title: &str) -> bool {
    let normalized = text::normalize(title);
    NON_SONG_MARKERS
        .iter()
        .any(|m| normalized.split(' ').any(|w| w == *m))
}

pub fn has_alt_version_marker(title: &str) -> bool {
    let normalized = text::normalize(title);
    ALT_VERSION_MARKERS
        .iter()
        .any(|m| normalized.split(' ').any(|w| w == *m))
}

pub fn has_compilation_marker(title: &str) -> bool {
    let normalized = text::normalize(title);
    COMPILATION_MARKERS.iter().any(|m| {
        if m.contains(' ') {
            normalized.contains(m)
        } else {
            normalized.split(' ').any(|w| w == *m)
        }
    })
}

/// Large fixed bonus when the whole normalized query appears in the title.
pub fn title_containment_bonus(query: &str, title: &str) -> f64 {
    let q = text::normalize(query);
    if q.is_empty() {
        return 0.0;
    }
    if text::normalize(title).contains(&q) {
        EXACT_MATCH_BONUS
    } else {
        0.0
    }
}

/// Count-weighted query-word presence in title and author, plus a bonus
/// when every query word landed in the title.
pub fn word_overlap_score(query: &str, title: &str, author: &str) -> f64 {
    let query_words = text::words(query);
    if query_words.is_empty() {
        return 0.0;
    }
    let title_words = text::word_set(title);
    let author_words = text::word_set(author);

    let mut score = 0.0;
    let mut title_hits = 0usize;
    for word in &query_words {
        if title_words.contains(word) {
            score += TITLE_WORD_WEIGHT;
            title_hits += 1;
        }
        if author_words.contains(word) {
            score += AUTHOR_WORD_WEIGHT;
        }
    }

    if title_hits == query_words.len() {
        score += ALL_WORDS_BONUS;
    }

    score
}

/// Fixed bonus for official-upload markers in title or author.
pub fn authority_bonus(title: &str, author: &str) -> f64 {
    let title = text::normalize(title);
    let author = text::normalize(author);

    let title_marked = ["official", "audio", "video"]
        .iter()
        .any(|m| title.split(' ').any(|w| w == *m));
    let author_marked = ["vevo", "topic"]
        .iter()
        .any(|m| author.split(' ').any(|w| w == *m));

    if title_marked || author_marked {
        AUTHORITY_BONUS
    } else {
        0.0
    }
}

/// Penalty for alternate-version markers the query did not ask for.
/// Asking for any one marker waives the whole penalty; "believer slowed"
/// should not punish an upload that also says "reverb".
pub fn alt_version_penalty(title: &str, query: &str) -> f64 {
    let title = text::normalize(title);
    let query = text::normalize(query);

    let title_marked = ALT_VERSION_MARKERS
        .iter()
        .any(|m| title.split(' ').any(|w| w == *m));
    if !title_marked {
        return 0.0;
    }

    let requested = ALT_VERSION_MARKERS
        .iter()
        .any(|m| query.split(' ').any(|w| w == *m));
    if requested { 0.0 } else { -ALT_VERSION_PENALTY }
}

/// Bonus for typical song lengths, penalty for very long uploads.
/// Zero duration means unknown/live and scores neutrally here.
pub fn duration_shape_score(duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    if (SWEET_SPOT_MIN_MS..=SWEET_SPOT_MAX_MS).contains(&duration_ms) {
        return DURATION_SWEET_SPOT_BONUS;
    }
    if duration_ms > OVERLONG_MS {
        return -OVERLONG_PENALTY;
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_containment_bonus() {
        assert_eq!(
            title_containment_bonus("shape of you", "Shape of You (Official Video)"),
            EXACT_MATCH_BONUS
        );
        assert_eq!(title_containment_bonus("shape of you", "Perfect"), 0.0);
        assert_eq!(title_containment_bonus("", "anything"), 0.0);
    }

    #[test]
    fn test_word_overlap_rewards_title_over_author() {
        let title_only = word_overlap_score("believer", "Believer", "Someone");
        let author_only = word_overlap_score("believer", "Some Song", "Believer Band");
        assert!(title_only > author_only);
        // Full title coverage also earns the all-words bonus.
        assert_eq!(title_only, TITLE_WORD_WEIGHT + ALL_WORDS_BONUS);
    }

    #[test]
    fn test_all_words_bonus_requires_every_word() {
        let partial = word_overlap_score("shape of you", "Shape Video", "x");
        assert!(partial < TITLE_WORD_WEIGHT * 3.0);

        let full = word_overlap_score("shape of you", "Shape of You", "x");
        assert_eq!(full, TITLE_WORD_WEIGHT * 3.0 + ALL_WORDS_BONUS);
    }

    #[test]
    fn test_authority_bonus() {
        assert_eq!(authority_bonus("Song (Official Video)", "x"), AUTHORITY_BONUS);
        assert_eq!(authority_bonus("Song", "Artist - Topic"), AUTHORITY_BONUS);
        assert_eq!(authority_bonus("Song", "ArtistVEVO"), 0.0); // not a whole word
        assert_eq!(authority_bonus("Song", "Artist Vevo"), AUTHORITY_BONUS);
        assert_eq!(authority_bonus("Song", "Random Channel"), 0.0);
    }

    #[test]
    fn test_alt_version_penalty_unless_requested() {
        assert_eq!(
            alt_version_penalty("Believer Slowed Reverb", "believer"),
            -ALT_VERSION_PENALTY
        );
        assert_eq!(alt_version_penalty("Believer Slowed Reverb", "believer slowed"), 0.0);
        assert_eq!(alt_version_penalty("Believer Lofi Remake", "believer remix"), 0.0);
        assert_eq!(alt_version_penalty("Believer", "believer"), 0.0);
    }

    #[test]
    fn test_duration_shape() {
        assert_eq!(duration_shape_score(0), 0.0);
        assert_eq!(duration_shape_score(200_000), DURATION_SWEET_SPOT_BONUS);
        assert_eq!(duration_shape_score(2_000_000), -OVERLONG_PENALTY);
        assert_eq!(duration_shape_score(500_000), 0.0);
    }

    #[test]
    fn test_non_song_and_compilation_markers() {
        assert!(is_non_song_title("Believer Ringtone"));
        assert!(!is_non_song_title("Believer"));
        assert!(has_compilation_marker("Best of 2020 Audio Jukebox"));
        assert!(has_compilation_marker("Hits Back To Back"));
        assert!(!has_compilation_marker("Shape of You"));
    }
}
