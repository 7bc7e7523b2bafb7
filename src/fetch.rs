//! Candidate fetching across (query, source) pairs.
//!
//! A single failing pair never aborts a fetch; the failure is logged and the
//! remaining pairs still run. Only when every pair fails or loads empty does
//! the caller see an empty list, and that is a normal outcome, not an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures::future::join_all;

use crate::backend::SearchBackend;
use crate::config::SearchConfig;
use crate::dedupe;
use crate::protocol::{Candidate, Track};

struct CacheEntry {
    at: Instant,
    tracks: Vec<Track>,
}

/// Fetches and deduplicates search candidates from the backend.
pub struct CandidateFetcher {
    backend: Arc<dyn SearchBackend>,
    cache: DashMap<String, CacheEntry>,
    cache_ttl: Duration,
    per_source_cap: usize,
}

impl CandidateFetcher {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &SearchConfig) -> Self {
        Self {
            backend,
            cache: DashMap::new(),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            per_source_cap: config.per_source_cap,
        }
    }

    /// Fetch candidates for one query across the given sources, deduplicated
    /// by fingerprint in first-seen order.
    pub async fn fetch(
        &self,
        query: &str,
        sources: &[String],
        requester: Option<&str>,
    ) -> Vec<Candidate> {
        let queries = [query.to_string()];
        self.fetch_many(&queries, sources, requester).await
    }

    /// Fetch and merge candidates for several queries across all sources.
    ///
    /// All (query, source) pairs run concurrently; merge order follows the
    /// pair order so dedup keeps the earliest occurrence.
    pub async fn fetch_many(
        &self,
        queries: &[String],
        sources: &[String],
        requester: Option<&str>,
    ) -> Vec<Candidate> {
        let mut calls = Vec::new();
        let mut pair_sources = Vec::new();
        for query in queries {
            for source in sources {
                calls.push(self.search_one(query, source));
                pair_sources.push(source.clone());
            }
        }

        let results = join_all(calls).await;

        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates = Vec::new();
        for (tracks, source) in results.into_iter().zip(pair_sources) {
            let Some(tracks) = tracks else { continue };
            for mut track in tracks {
                let fp = dedupe::fingerprint(&track);
                if !seen.insert(fp) {
                    continue;
                }
                track.requester = requester.map(str::to_string);
                candidates.push(Candidate::new(track, source.clone()));
            }
        }

        candidates
    }

    /// Load a URL or opaque identifier directly, bypassing search prefixes.
    pub async fn fetch_url(&self, url: &str, requester: Option<&str>) -> Vec<Candidate> {
        match self.backend.resolve(url, None).await {
            Ok(result) => result
                .into_tracks()
                .into_iter()
                .map(|mut track| {
                    track.requester = requester.map(str::to_string);
                    let source = track.source_name.clone();
                    Candidate::new(track, source)
                })
                .collect(),
            Err(err) => {
                tracing::debug!("Direct load failed for '{}': {}", url, err);
                Vec::new()
            }
        }
    }

    /// One (query, source) call: cache lookup, backend call, cap. Returns
    /// `None` on failure so the caller can skip the pair.
    async fn search_one(&self, query: &str, source: &str) -> Option<Vec<Track>> {
        let cache_key = format!("{}:{}", source, query.to_lowercase());

        // Clone out of the cache before any await; map guards must not be
        // held across suspension points.
        if let Some(entry) = self.cache.get(&cache_key) {
            if entry.at.elapsed() < self.cache_ttl {
                tracing::trace!("Cache hit for '{}'", cache_key);
                return Some(entry.tracks.clone());
            }
        }
        self.cache
            .remove_if(&cache_key, |_, entry| entry.at.elapsed() >= self.cache_ttl);

        let mut tracks = match self.backend.resolve(query, Some(source)).await {
            Ok(result) => result.into_tracks(),
            Err(err) => {
                tracing::debug!("Search failed for '{}' on {}: {}", query, source, err);
                return None;
            }
        };

        tracks.truncate(self.per_source_cap);

        // Only non-empty results are worth caching.
        if !tracks.is_empty() {
            self.cache.insert(
                cache_key,
                CacheEntry {
                    at: Instant::now(),
                    tracks: tracks.clone(),
                },
            );
        }

        Some(tracks)
    }
}
