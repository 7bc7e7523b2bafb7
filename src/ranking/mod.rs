//! Scores search candidates against the query that produced them.

pub mod heuristics;

use std::cmp::Ordering;

use crate::protocol::Candidate;

use self::heuristics as h;

/// Score every candidate against the query and sort best-first.
///
/// Returns a permutation of the input: nothing is created, and dropping only
/// happens in the pre-filter, which fails open when it would remove every
/// candidate. The sort is stable, so equal scores keep first-seen order.
pub fn rank(candidates: Vec<Candidate>, query: &str) -> Vec<Candidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let mut usable = pre_filter(candidates);

    for candidate in &mut usable {
        candidate.score = score_candidate(candidate, query);
        tracing::trace!(
            "Scored '{}' by '{}' at {:.1}",
            candidate.track.title,
            candidate.track.author,
            candidate.score
        );
    }

    usable.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    usable
}

/// Drop implausible candidates, unless that would drop all of them.
fn pre_filter(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let kept: Vec<Candidate> = candidates
        .iter()
        .filter(|c| {
            let d = c.track.duration_ms;
            if d > 0 && d < h::MIN_SONG_MS {
                return false;
            }
            !h::is_non_song_title(&c.track.title)
        })
        .cloned()
        .collect();

    if kept.is_empty() {
        tracing::debug!("Pre-filter would drop every candidate; skipping it");
        candidates
    } else {
        kept
    }
}

fn score_candidate(candidate: &Candidate, query: &str) -> f64 {
    let title = &candidate.track.title;
    let author = &candidate.track.author;

    h::title_containment_bonus(query, title)
        + h::word_overlap_score(query, title, author)
        + h::authority_bonus(title, author)
        + h::alt_version_penalty(title, query)
        + h::duration_shape_score(candidate.track.duration_ms)
}
