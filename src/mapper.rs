//! Maps a track resolved from a streaming-service deep link (metadata only,
//! not directly streamable) to the best equivalent candidate from the
//! generic search backend.

use std::cmp::Ordering;

use crate::protocol::{Candidate, Track};
use crate::ranking::heuristics as h;
use crate::text;

const TITLE_COVERAGE_WEIGHT: f64 = 100.0;
const ARTIST_WORD_WEIGHT: f64 = 18.0;
const ARTIST_WORDS_CONSIDERED: usize = 3;
const DURATION_MISMATCH_PENALTY: f64 = 120.0;
const ALT_VERSION_MISMATCH_PENALTY: f64 = 80.0;
const AUTHORITY_BONUS: f64 = 6.0;
/// Near-disqualifying but not an outright reject: source metadata
/// is noisy enough that the right upload sometimes names no artist at all.
const NO_ARTIST_MATCH_PENALTY: f64 = 220.0;

/// Synthetic search query for a service-link track, "title author" order.
pub fn synthetic_query(origin: &Track) -> String {
    let title = text::clean_title(&origin.title);
    let author = text::normalize(&origin.author);
    let combined = format!("{} {}", title, author);
    combined.trim().to_string()
}

/// Pick the pool member that best matches the origin track.
///
/// Returns `None` for an empty pool or when every score comes out
/// non-finite; the caller then falls back to the origin as-is.
pub fn map_to_playable(origin: &Track, pool: Vec<Candidate>) -> Option<Candidate> {
    if pool.is_empty() {
        return None;
    }

    let mut scored: Vec<Candidate> = pool;
    for candidate in &mut scored {
        candidate.score = score_against_origin(origin, &candidate.track);
        tracing::trace!(
            "Mapper scored '{}' by '{}' at {:.1}",
            candidate.track.title,
            candidate.track.author,
            candidate.score
        );
    }

    scored.retain(|c| c.score.is_finite());
    if scored.is_empty() {
        return None;
    }

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.into_iter().next()
}

fn score_against_origin(origin: &Track, candidate: &Track) -> f64 {
    let mut score = 0.0;

    // Fractional coverage of the origin title inside the candidate title is
    // the dominant signal.
    let origin_title = text::clean_title(&origin.title);
    let origin_words = text::words(&origin_title);
    let candidate_words = text::word_set(&candidate.title);
    if !origin_words.is_empty() {
        let covered = origin_words
            .iter()
            .filter(|w| candidate_words.contains(*w))
            .count();
        score += (covered as f64 / origin_words.len() as f64) * TITLE_COVERAGE_WEIGHT;
    }

    // Leading artist words, bounded so long collaborator lists don't dominate.
    let artist_words: Vec<String> = text::words(&origin.author)
        .into_iter()
        .take(ARTIST_WORDS_CONSIDERED)
        .collect();
    if !artist_words.is_empty() {
        let candidate_text = format!("{} {}", candidate.title, candidate.author);
        let candidate_all = text::word_set(&candidate_text);
        let matched = artist_words
            .iter()
            .filter(|w| candidate_all.contains(*w))
            .count();
        if matched == 0 {
            score -= NO_ARTIST_MATCH_PENALTY;
        } else {
            score += matched.min(ARTIST_WORDS_CONSIDERED) as f64 * ARTIST_WORD_WEIGHT;
        }
    }

    score += duration_tolerance_score(origin.duration_ms, candidate.duration_ms);

    // Penalize renditions the origin is not: a studio track must not map to
    // a live or slowed upload.
    if h::has_alt_version_marker(&candidate.title) && !h::has_alt_version_marker(&origin.title) {
        score -= ALT_VERSION_MISMATCH_PENALTY;
    }

    if h::authority_bonus(&candidate.title, &candidate.author) > 0.0 {
        score += AUTHORITY_BONUS;
    }

    score
}

/// Zero within tolerance, heavy penalty outside. Tolerance is
/// `max(15s, min(45s, 12% of origin duration))`; unknown durations on
/// either side are never penalized.
fn duration_tolerance_score(origin_ms: u64, candidate_ms: u64) -> f64 {
    if origin_ms == 0 || candidate_ms == 0 {
        return 0.0;
    }
    let twelve_percent = origin_ms as f64 * 0.12;
    let tolerance = twelve_percent.clamp(15_000.0, 45_000.0);
    let diff = origin_ms.abs_diff(candidate_ms) as f64;
    if diff > tolerance {
        -DURATION_MISMATCH_PENALTY
    } else {
        0.0
    }
}
