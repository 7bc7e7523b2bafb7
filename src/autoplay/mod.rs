//! End-of-queue recommendation: turns the track that just finished into one
//! next track, or nothing.
//!
//! Every failure path degrades to `None`; callers treat that as "skip this
//! autoplay cycle", never as a fault.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::AutoplayConfig;
use crate::dedupe;
use crate::fetch::CandidateFetcher;
use crate::history::HistoryStore;
use crate::language::{self, Language};
use crate::protocol::{Candidate, Track};
use crate::ranking::heuristics as h;
use crate::text;

const SONG_MIN_MS: u64 = 60_000;
const SONG_MAX_MS: u64 = 720_000;
const RANDOM_PICK_POOL: usize = 3;
const RECENT_REPEAT_PENALTY: f64 = 40.0;
const SAME_AUTHOR_PENALTY: f64 = 25.0;
const RECENT_RING_LOOKBACK: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayMode {
    Similar,
    Artist,
    Random,
}

/// Read-only view of a guild's playback state at selection time.
#[derive(Debug, Clone, Copy)]
pub struct GuildContext<'a> {
    pub guild_id: &'a str,
    /// Whatever is playing right now, if anything.
    pub current: Option<&'a Track>,
}

/// Picks the next track after the queue empties.
pub struct AutoplaySelector {
    fetcher: Arc<CandidateFetcher>,
    history: Arc<dyn HistoryStore>,
    sources: Vec<String>,
    history_block: usize,
    rng: Mutex<StdRng>,
}

impl AutoplaySelector {
    pub fn new(
        fetcher: Arc<CandidateFetcher>,
        history: Arc<dyn HistoryStore>,
        sources: Vec<String>,
        config: &AutoplayConfig,
    ) -> Self {
        Self {
            fetcher,
            history,
            sources,
            history_block: config.history_block,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Pin the RNG so random-mode selection is reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Select one track to follow `seed`, or `None` when nothing eligible
    /// remains after blocking, gating and language filtering.
    pub async fn select_next(
        &self,
        seed: &Track,
        mode: AutoplayMode,
        ctx: GuildContext<'_>,
    ) -> Option<Track> {
        let preferred = language::infer_language(&format!("{} {}", seed.title, seed.author));
        tracing::debug!(
            "Autoplay for guild {} ({:?} mode), preferred language {:?}",
            ctx.guild_id,
            mode,
            preferred.map(|l| l.name())
        );

        let queries = {
            let mut rng = self.rng.lock();
            build_queries(seed, mode, preferred, &mut rng)
        };
        if queries.is_empty() {
            return None;
        }

        let candidates = self.fetcher.fetch_many(&queries, &self.sources, None).await;
        if candidates.is_empty() {
            tracing::debug!("Autoplay found no candidates for guild {}", ctx.guild_id);
            return None;
        }

        let block = self.block_set(seed, &ctx);
        let recent_keys: HashSet<String> = self
            .history
            .recently_played(RECENT_RING_LOOKBACK)
            .iter()
            .map(|e| e.meta_key())
            .collect();

        let mut matched: Vec<Candidate> = Vec::new();
        let mut neutral: Vec<Candidate> = Vec::new();

        for mut candidate in candidates {
            if block.iter().any(|b| {
                dedupe::same_track(b, &candidate.track)
                    || dedupe::looks_like_same_song(b, &candidate.track)
            }) {
                continue;
            }
            if !passes_song_gate(&candidate.track, mode) {
                continue;
            }

            match language_verdict(&candidate.track, preferred) {
                LanguageVerdict::Excluded => continue,
                LanguageVerdict::Matched => {
                    candidate.score = self.score(seed, &candidate.track, mode, &recent_keys);
                    matched.push(candidate);
                }
                LanguageVerdict::Neutral => {
                    candidate.score = self.score(seed, &candidate.track, mode, &recent_keys);
                    neutral.push(candidate);
                }
            }
        }

        // Language-matched candidates win outright; neutral ones are only a
        // fallback when no match exists. With no preferred language every
        // candidate landed in the neutral pool.
        let pool = if !matched.is_empty() { matched } else { neutral };
        if pool.is_empty() {
            tracing::debug!("Autoplay: every candidate blocked or gated out");
            return None;
        }

        let selected = self.pick(pool, mode);
        self.history.note_recommended(ctx.guild_id, &selected);
        tracing::info!(
            "Autoplay selected '{}' by '{}' for guild {}",
            selected.title,
            selected.author,
            ctx.guild_id
        );
        Some(selected)
    }

    /// Seed, current track and the last N guild history entries.
    fn block_set(&self, seed: &Track, ctx: &GuildContext<'_>) -> Vec<Track> {
        let mut block = vec![seed.clone()];
        if let Some(current) = ctx.current {
            block.push(current.clone());
        }
        block.extend(self.history.recent_for(ctx.guild_id, self.history_block));
        block
    }

    fn score(
        &self,
        seed: &Track,
        candidate: &Track,
        mode: AutoplayMode,
        recent_keys: &HashSet<String>,
    ) -> f64 {
        let seed_title_words = text::word_set(&text::clean_title(&seed.title));
        let seed_author_words = text::word_set(&seed.author);
        let cand_title_words = text::word_set(&text::clean_title(&candidate.title));
        let cand_author_words = text::word_set(&candidate.author);

        let title_overlap = overlap_fraction(&seed_title_words, &cand_title_words);
        let author_overlap = overlap_fraction(&seed_author_words, &cand_author_words);
        let same_author = !seed.author.is_empty()
            && text::normalize(&seed.author) == text::normalize(&candidate.author);

        let mut score = match mode {
            AutoplayMode::Artist => author_overlap * 60.0 + title_overlap * 10.0,
            AutoplayMode::Similar => title_overlap * 50.0 + author_overlap * 15.0,
            AutoplayMode::Random => {
                let mut s = title_overlap * 8.0 + author_overlap * 5.0;
                if same_author {
                    s -= SAME_AUTHOR_PENALTY;
                }
                s
            }
        };

        let meta_key = format!(
            "{}:{}",
            text::normalize(&candidate.title),
            text::normalize(&candidate.author)
        );
        if recent_keys.contains(&meta_key) {
            score -= RECENT_REPEAT_PENALTY;
        }

        score += h::alt_version_penalty(&candidate.title, &seed.title);

        score
    }

    fn pick(&self, mut pool: Vec<Candidate>, mode: AutoplayMode) -> Track {
        pool.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let index = if mode == AutoplayMode::Random && pool.len() > 1 {
            // Uniform among the best few so repeated random cycles don't
            // converge on a single track.
            let top = pool.len().min(RANDOM_PICK_POOL);
            self.rng.lock().gen_range(0..top)
        } else {
            0
        };

        pool.swap_remove(index).track
    }
}

enum LanguageVerdict {
    Matched,
    Neutral,
    Excluded,
}

/// Partition/hard-exclude by language. No preferred language means no
/// constraint at all: everything is neutral.
fn language_verdict(track: &Track, preferred: Option<Language>) -> LanguageVerdict {
    let Some(preferred) = preferred else {
        return LanguageVerdict::Neutral;
    };

    let track_text = format!("{} {}", track.title, track.author);
    if language::has_exclusion_token(&track_text, preferred) {
        return LanguageVerdict::Excluded;
    }
    match language::infer_language(&track_text) {
        Some(lang) if lang == preferred => LanguageVerdict::Matched,
        Some(_) => LanguageVerdict::Excluded,
        None => {
            if language::has_inclusion_token(&track_text, preferred) {
                LanguageVerdict::Matched
            } else {
                LanguageVerdict::Neutral
            }
        }
    }
}

/// The song-likeness gate: live streams, implausible durations and
/// compilation uploads never qualify; random mode also refuses alternate
/// renditions.
fn passes_song_gate(track: &Track, mode: AutoplayMode) -> bool {
    if track.is_stream {
        return false;
    }
    if !(SONG_MIN_MS..=SONG_MAX_MS).contains(&track.duration_ms) {
        return false;
    }
    if h::is_non_song_title(&track.title) || h::has_compilation_marker(&track.title) {
        return false;
    }
    if mode == AutoplayMode::Random && h::has_alt_version_marker(&track.title) {
        return false;
    }
    true
}

fn overlap_fraction(reference: &HashSet<String>, other: &HashSet<String>) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    reference.intersection(other).count() as f64 / reference.len() as f64
}

/// Build the mode-specific query variants, each with a language-biased
/// sibling when a preferred language is known. Capped at six.
fn build_queries(
    seed: &Track,
    mode: AutoplayMode,
    preferred: Option<Language>,
    rng: &mut StdRng,
) -> Vec<String> {
    let title = text::clean_title(&seed.title);
    let author = text::normalize(&seed.author);

    let mut queries: Vec<String> = match mode {
        AutoplayMode::Artist if !author.is_empty() => vec![
            format!("{} top songs", author),
            format!("{} hit songs", author),
            format!("{} popular songs", author),
        ],
        // Artist mode without an author degenerates to similar-style queries.
        AutoplayMode::Artist | AutoplayMode::Similar if author.is_empty() => vec![
            format!("{} official audio", title),
            format!("{} similar songs", title),
            format!("{} related songs", title),
        ],
        AutoplayMode::Artist | AutoplayMode::Similar => vec![
            format!("{} {} official audio", title, author),
            format!("{} similar songs", title),
            format!("{} {} related songs", title, author),
        ],
        AutoplayMode::Random => vec![
            "trending songs".to_string(),
            "top songs today".to_string(),
            "latest songs".to_string(),
        ],
    };

    if let Some(lang) = preferred {
        let siblings: Vec<String> = queries
            .iter()
            .map(|q| format!("{} {}", lang.search_token(), q))
            .collect();
        queries.extend(siblings);
    }

    if mode == AutoplayMode::Random {
        queries.shuffle(rng);
    }

    queries.retain(|q| !q.trim().is_empty());
    queries.truncate(6);
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{FailingBackend, StaticBackend, make_track};
    use crate::config::SearchConfig;
    use crate::history::InMemoryHistory;

    fn seed_track() -> Track {
        make_track("seed-id", "Tum Hi Ho", "Arijit Singh", 240_000)
    }

    fn selector_with(backend: impl crate::backend::SearchBackend + 'static) -> AutoplaySelector {
        let cfg = AutoplayConfig {
            history_block: 10,
            guild_history_cap: 30,
            global_recent_cap: 200,
        };
        let fetcher = Arc::new(CandidateFetcher::new(
            Arc::new(backend),
            &SearchConfig::default(),
        ));
        let history = Arc::new(InMemoryHistory::new(&cfg));
        AutoplaySelector::new(
            fetcher,
            history,
            vec!["ytsearch".to_string(), "ytmsearch".to_string()],
            &cfg,
        )
        .with_rng_seed(7)
    }

    fn ctx(guild: &str) -> GuildContext<'_> {
        GuildContext {
            guild_id: guild,
            current: None,
        }
    }

    #[tokio::test]
    async fn test_selects_a_similar_track() {
        let backend = StaticBackend::new().with_fallback(vec![
            make_track("c1", "Tum Hi Ho Reprise", "Arijit Singh", 230_000),
            make_track("c2", "Random Unrelated", "Someone", 180_000),
        ]);
        let selector = selector_with(backend);

        let picked = selector
            .select_next(&seed_track(), AutoplayMode::Similar, ctx("g1"))
            .await;

        // "Tum Hi Ho Reprise" fuzzily matches the seed title and is blocked;
        // the unrelated track is the only eligible candidate.
        assert_eq!(picked.unwrap().identifier, "c2");
    }

    #[tokio::test]
    async fn test_never_returns_seed_current_or_recent_history() {
        let seed = seed_track();
        let current = make_track("cur-id", "Current Song", "Somebody", 200_000);
        let historical = make_track("hist-id", "Old Favourite", "Somebody Else", 210_000);

        let backend = StaticBackend::new().with_fallback(vec![
            seed.clone(),
            current.clone(),
            historical.clone(),
            make_track("fresh", "A Fresh Pick", "New Artist", 200_000),
        ]);
        let selector = selector_with(backend);
        selector.history.record("g1", &historical);

        let picked = selector
            .select_next(
                &seed,
                AutoplayMode::Similar,
                GuildContext {
                    guild_id: "g1",
                    current: Some(&current),
                },
            )
            .await
            .unwrap();

        let blocked = [
            dedupe::fingerprint(&seed),
            dedupe::fingerprint(&current),
            dedupe::fingerprint(&historical),
        ];
        assert!(!blocked.contains(&dedupe::fingerprint(&picked)));
        assert_eq!(picked.identifier, "fresh");
    }

    #[tokio::test]
    async fn test_history_block_window_is_bounded_at_ten() {
        let oldest = make_track("old", "Evergreen Waltz", "Quiet Trio", 210_000);
        let recent: Vec<Track> = (0..10)
            .map(|i| {
                make_track(
                    &format!("r{}", i),
                    &format!("Filler Cut {}", i),
                    "Busy Band",
                    210_000,
                )
            })
            .collect();

        let mut pool = vec![oldest.clone()];
        pool.extend(recent.iter().cloned());
        let backend = StaticBackend::new().with_fallback(pool);
        let selector = selector_with(backend);

        // Eleven plays recorded; only the newest ten block. The entry that
        // fell out of the window is the one eligible candidate left.
        selector.history.record("g1", &oldest);
        for track in &recent {
            selector.history.record("g1", track);
        }

        let picked = selector
            .select_next(&seed_track(), AutoplayMode::Similar, ctx("g1"))
            .await
            .unwrap();
        assert_eq!(picked.identifier, "old");
    }

    #[tokio::test]
    async fn test_no_language_means_no_language_exclusion() {
        // Seed is transliterated Hindi: no script, no keyword, so there is
        // no preferred language and nothing may be excluded on language
        // grounds, not even explicitly tagged candidates.
        let seed = seed_track();
        assert_eq!(
            language::infer_language(&format!("{} {}", seed.title, seed.author)),
            None
        );

        let backend = StaticBackend::new().with_fallback(vec![make_track(
            "tagged",
            "Raabta hindi romantic song",
            "Cover Artist",
            220_000,
        )]);
        let selector = selector_with(backend);

        let picked = selector
            .select_next(&seed, AutoplayMode::Similar, ctx("g1"))
            .await;
        assert!(picked.is_some());
    }

    #[tokio::test]
    async fn test_preferred_language_hard_excludes_conflicts() {
        let seed = make_track("seed-te", "సామజవరగమన", "Sid Sriram", 260_000);

        let backend = StaticBackend::new().with_fallback(vec![
            make_track("hindi", "hindi romantic hits song", "Mix Channel", 200_000),
            make_track("telugu", "telugu melody beats", "Music South", 210_000),
        ]);
        let selector = selector_with(backend);

        let picked = selector
            .select_next(&seed, AutoplayMode::Similar, ctx("g1"))
            .await
            .unwrap();
        assert_eq!(picked.identifier, "telugu");
    }

    #[tokio::test]
    async fn test_gate_rejects_streams_compilations_and_bad_durations() {
        let mut stream = make_track("live", "Radio Live Stream", "Station", 0);
        stream.is_stream = true;

        let backend = StaticBackend::new().with_fallback(vec![
            stream,
            make_track("long", "Every Hit Ever", "Channel", 3_600_000),
            make_track("short", "Intro", "Channel", 20_000),
            make_track("juke", "2010s Audio Jukebox", "Channel", 300_000),
        ]);
        let selector = selector_with(backend);

        let picked = selector
            .select_next(&seed_track(), AutoplayMode::Similar, ctx("g1"))
            .await;
        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_artist_mode_prefers_same_author() {
        let backend = StaticBackend::new().with_fallback(vec![
            make_track("other", "Nice Song", "Different Artist", 220_000),
            make_track("same", "Channa Mereya", "Arijit Singh", 290_000),
        ]);
        let selector = selector_with(backend);

        let picked = selector
            .select_next(&seed_track(), AutoplayMode::Artist, ctx("g1"))
            .await
            .unwrap();
        assert_eq!(picked.identifier, "same");
    }

    #[tokio::test]
    async fn test_random_mode_rejects_alt_versions() {
        let backend = StaticBackend::new().with_fallback(vec![
            make_track("slowed", "Some Song Slowed Reverb", "edits", 200_000),
            make_track("plain", "Some Other Song", "Artist", 200_000),
        ]);
        let selector = selector_with(backend);

        let picked = selector
            .select_next(&seed_track(), AutoplayMode::Random, ctx("g1"))
            .await
            .unwrap();
        assert_eq!(picked.identifier, "plain");
    }

    #[tokio::test]
    async fn test_backend_failure_yields_none_not_error() {
        let selector = selector_with(FailingBackend);
        let picked = selector
            .select_next(&seed_track(), AutoplayMode::Similar, ctx("g1"))
            .await;
        assert!(picked.is_none());
    }

    #[test]
    fn test_query_variants_get_language_siblings() {
        let mut rng = StdRng::seed_from_u64(1);
        let seed = make_track("s", "సామజవరగమన", "Sid Sriram", 260_000);

        let queries = build_queries(&seed, AutoplayMode::Similar, Some(Language::Telugu), &mut rng);
        assert!(queries.len() >= 3 && queries.len() <= 6);
        assert!(queries.iter().any(|q| q.starts_with("telugu ")));

        let none = build_queries(&seed_track(), AutoplayMode::Similar, None, &mut rng);
        assert_eq!(none.len(), 3);
    }
}
