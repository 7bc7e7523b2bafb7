use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exception severity levels reported by the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Common,
    Suspicious,
    Fault,
}

/// Errors at the search-backend boundary.
///
/// None of these are fatal to resolution: the fetcher logs them and skips the
/// failing (query, source) pair.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("node returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The node answered but reported a load failure for this identifier.
    #[error("load failed ({cause}): {message}")]
    Load { cause: String, message: String },
}
