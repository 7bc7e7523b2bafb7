//! Classifies a raw play request before resolution.

use std::sync::LazyLock;

use regex::Regex;

/// Streaming-service pages whose audio cannot be pulled directly; tracks
/// resolved from these carry metadata only and go through the mapper.
static SERVICE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(open\.spotify\.com/(intl-[a-z-]+/)?(track|album|playlist)|spotify\.link/|music\.apple\.com/|deezer\.com/(\w+/)?(track|album|playlist)|deezer\.page\.link/)",
    )
    .unwrap()
});

static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://\S+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Free text, resolved by searching.
    Text,
    /// A URL the backend can load and stream directly.
    DirectUrl,
    /// A streaming-service deep link needing cross-service mapping.
    ServiceLink,
}

pub fn classify(input: &str) -> QueryKind {
    let trimmed = input.trim();
    if SERVICE_LINK.is_match(trimmed) {
        QueryKind::ServiceLink
    } else if URL.is_match(trimmed) {
        QueryKind::DirectUrl
    } else {
        QueryKind::Text
    }
}
