use serde::{Deserialize, Serialize};

use crate::common::Severity;

/// Metadata for a resolved audio track.
///
/// Once resolved, a track is treated as immutable; ownership transfers to the
/// external queue when it is selected for playback.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Opaque identifier assigned by the upstream source.
    pub identifier: String,
    pub title: String,
    pub author: String,
    /// Duration in milliseconds. 0 for live streams and unknown durations.
    #[serde(rename = "length")]
    pub duration_ms: u64,
    pub is_stream: bool,
    pub uri: Option<String>,
    #[serde(default)]
    pub source_name: String,
    /// Discord user id of the requester, if any. Not present on the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
}

/// A track as returned by the node's load endpoint: encoded blob plus info.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedTrack {
    /// Base64-encoded track data, opaque to this crate.
    #[serde(default)]
    pub encoded: String,
    pub info: Track,
}

/// Result of a track load operation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "loadType", content = "data", rename_all = "camelCase")]
pub enum LoadResult {
    /// A single track was loaded.
    Track(LoadedTrack),
    /// A playlist was loaded.
    Playlist(PlaylistData),
    /// A search returned results.
    Search(Vec<LoadedTrack>),
    /// No matches found.
    Empty {},
    /// An error occurred during loading.
    Error(LoadError),
}

impl LoadResult {
    /// Flatten a load result into plain tracks, dropping the encoded blobs.
    ///
    /// `Empty` and `Error` both yield an empty vec; the error arm is logged by
    /// the caller and never propagated as a failure.
    pub fn into_tracks(self) -> Vec<Track> {
        match self {
            LoadResult::Track(t) => vec![t.info],
            LoadResult::Search(tracks) => tracks.into_iter().map(|t| t.info).collect(),
            LoadResult::Playlist(playlist) => {
                playlist.tracks.into_iter().map(|t| t.info).collect()
            }
            LoadResult::Empty {} | LoadResult::Error(_) => Vec::new(),
        }
    }
}

/// Playlist data returned from a load operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistData {
    pub info: PlaylistInfo,
    #[serde(default)]
    pub plugin_info: serde_json::Value,
    pub tracks: Vec<LoadedTrack>,
}

/// Playlist metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistInfo {
    pub name: String,
    /// Index of the selected track, or -1 if none.
    pub selected_track: i32,
}

/// Error from a failed track load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadError {
    /// Human-readable error message.
    pub message: Option<String>,
    /// How severe the error is.
    pub severity: Severity,
    /// Exception class / short cause description.
    pub cause: String,
}

/// A track under consideration during one ranking pass.
///
/// The score is ephemeral and never persisted; candidates live only inside a
/// single resolution or autoplay call.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub track: Track,
    pub score: f64,
    /// Name of the source the candidate came from (e.g. "ytsearch").
    pub source: String,
}

impl Candidate {
    pub fn new(track: Track, source: impl Into<String>) -> Self {
        Self {
            track,
            score: 0.0,
            source: source.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
