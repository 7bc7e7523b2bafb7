pub mod lavalink;

pub use lavalink::LavalinkRestBackend;

use async_trait::async_trait;

use crate::common::BackendError;
use crate::protocol::LoadResult;

/// The external search backend the resolution pipeline runs against.
///
/// `source` is a search prefix ("ytsearch", "ytmsearch", ...); `None` means
/// the query is a URL or opaque identifier passed through as-is. One attempt
/// per call; retry policy, if any, belongs behind this trait, not in the
/// callers.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn resolve(&self, query: &str, source: Option<&str>) -> Result<LoadResult, BackendError>;
}
