//! One entry point for turning a play request into a single track.

use std::sync::Arc;

use crate::fetch::CandidateFetcher;
use crate::mapper;
use crate::protocol::{Candidate, Track};
use crate::query::{self, QueryKind};
use crate::ranking;

/// Composes fetching, ranking and cross-service mapping.
pub struct Resolver {
    fetcher: Arc<CandidateFetcher>,
    sources: Vec<String>,
}

impl Resolver {
    pub fn new(fetcher: Arc<CandidateFetcher>, sources: Vec<String>) -> Self {
        Self { fetcher, sources }
    }

    /// Resolve a free-text query or URL into the single best track.
    ///
    /// `None` means nothing playable was found anywhere; callers show a
    /// user-facing message, nothing here is an error.
    pub async fn resolve(&self, input: &str, requester: Option<&str>) -> Option<Track> {
        match query::classify(input) {
            QueryKind::Text => self.resolve_text(input, requester).await,
            QueryKind::DirectUrl => self.resolve_direct(input, requester).await,
            QueryKind::ServiceLink => self.resolve_service_link(input, requester).await,
        }
    }

    /// Search each source in order and stop at the first that yields
    /// anything rankable.
    async fn resolve_text(&self, input: &str, requester: Option<&str>) -> Option<Track> {
        for source in &self.sources {
            let one = std::slice::from_ref(source);
            let candidates = self.fetcher.fetch(input, one, requester).await;
            if candidates.is_empty() {
                tracing::debug!("No results for '{}' on {}, trying next source", input, source);
                continue;
            }
            let ranked = ranking::rank(candidates, input);
            if let Some(best) = ranked.into_iter().next() {
                return Some(best.track);
            }
        }
        None
    }

    /// A direct URL is already a concrete item; the first loaded track wins.
    async fn resolve_direct(&self, url: &str, requester: Option<&str>) -> Option<Track> {
        self.fetcher
            .fetch_url(url, requester)
            .await
            .into_iter()
            .next()
            .map(|c| c.track)
    }

    /// Resolve the link for its metadata, then map to a playable candidate
    /// from the generic sources. Falls back to the origin track as-is when
    /// no safe mapping exists.
    async fn resolve_service_link(&self, url: &str, requester: Option<&str>) -> Option<Track> {
        let origin = self
            .fetcher
            .fetch_url(url, requester)
            .await
            .into_iter()
            .next()?
            .track;

        let pool = self.service_link_pool(&origin, requester).await;
        match mapper::map_to_playable(&origin, pool) {
            Some(candidate) => Some(candidate.track),
            None => {
                tracing::debug!(
                    "No safe mapping for '{}' by '{}'; falling back to origin",
                    origin.title,
                    origin.author
                );
                Some(origin)
            }
        }
    }

    /// Pool for the mapper: the synthetic query across all sources, merged
    /// exhaustively rather than short-circuited.
    async fn service_link_pool(&self, origin: &Track, requester: Option<&str>) -> Vec<Candidate> {
        let synthetic = mapper::synthetic_query(origin);
        if synthetic.is_empty() {
            return Vec::new();
        }
        self.fetcher.fetch(&synthetic, &self.sources, requester).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{FailingBackend, StaticBackend, make_track};
    use crate::config::SearchConfig;

    fn sources() -> Vec<String> {
        vec!["ytsearch".to_string(), "ytmsearch".to_string()]
    }

    fn resolver(backend: impl crate::backend::SearchBackend + 'static) -> Resolver {
        let fetcher = Arc::new(CandidateFetcher::new(
            Arc::new(backend),
            &SearchConfig::default(),
        ));
        Resolver::new(fetcher, sources())
    }

    #[tokio::test]
    async fn test_text_query_short_circuits_on_first_source() {
        let backend = StaticBackend::new()
            .with(
                "ytsearch:believer",
                vec![make_track("yt", "Believer", "Imagine Dragons", 204_000)],
            )
            .with(
                "ytmsearch:believer",
                vec![make_track("ytm", "Believer", "Imagine Dragons", 204_000)],
            );
        let r = resolver(backend);

        let track = r.resolve("believer", Some("u1")).await.unwrap();
        assert_eq!(track.identifier, "yt");
        assert_eq!(track.requester.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_text_query_falls_through_to_next_source() {
        let backend = StaticBackend::new().with(
            "ytmsearch:believer",
            vec![make_track("ytm", "Believer", "Imagine Dragons", 204_000)],
        );
        let r = resolver(backend);

        let track = r.resolve("believer", None).await.unwrap();
        assert_eq!(track.identifier, "ytm");
    }

    #[tokio::test]
    async fn test_direct_url_takes_first_track() {
        let url = "https://www.youtube.com/watch?v=abc";
        let backend = StaticBackend::new().with(
            url,
            vec![
                make_track("abc", "Loaded Song", "Channel", 200_000),
                make_track("def", "Second", "Channel", 200_000),
            ],
        );
        let r = resolver(backend);

        let track = r.resolve(url, None).await.unwrap();
        assert_eq!(track.identifier, "abc");
    }

    #[tokio::test]
    async fn test_service_link_maps_through_pool() {
        let link = "https://open.spotify.com/track/xyz";
        let mut origin = make_track("sp-xyz", "Blinding Lights", "The Weeknd", 200_000);
        origin.uri = Some(link.to_string());
        origin.source_name = "spotify".to_string();

        let backend = StaticBackend::new()
            .with(link, vec![origin])
            .with(
                "ytsearch:blinding lights the weeknd",
                vec![
                    make_track("bad", "Blinding Lights Slowed", "edits", 200_000),
                    make_track("good", "Blinding Lights", "The Weeknd", 201_000),
                ],
            );
        let r = resolver(backend);

        let track = r.resolve(link, None).await.unwrap();
        assert_eq!(track.identifier, "good");
    }

    #[tokio::test]
    async fn test_service_link_falls_back_to_origin_when_pool_empty() {
        let link = "https://open.spotify.com/track/xyz";
        let mut origin = make_track("sp-xyz", "Blinding Lights", "The Weeknd", 200_000);
        origin.uri = Some(link.to_string());

        let backend = StaticBackend::new().with(link, vec![origin]);
        let r = resolver(backend);

        let track = r.resolve(link, None).await.unwrap();
        assert_eq!(track.identifier, "sp-xyz");
    }

    #[tokio::test]
    async fn test_everything_failing_resolves_to_none() {
        let r = resolver(FailingBackend);
        assert!(r.resolve("anything", None).await.is_none());
        assert!(r.resolve("https://example.com/x", None).await.is_none());
        assert!(
            r.resolve("https://open.spotify.com/track/xyz", None)
                .await
                .is_none()
        );
    }
}
