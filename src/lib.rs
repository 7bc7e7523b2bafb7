//! Track resolution, ranking and autoplay selection for a Discord music bot.
//!
//! The bot's command and playback layers hand this crate a free-text query,
//! a URL, or a just-finished seed track; it hands back at most one concrete
//! playable track. Audio itself stays with the external node.

pub mod autoplay;
pub mod backend;
pub mod common;
pub mod config;
pub mod dedupe;
pub mod fetch;
pub mod history;
pub mod language;
pub mod mapper;
pub mod protocol;
pub mod query;
pub mod ranking;
pub mod resolver;
pub mod text;

pub use autoplay::{AutoplayMode, AutoplaySelector, GuildContext};
pub use backend::{LavalinkRestBackend, SearchBackend};
pub use common::BackendError;
pub use config::Config;
pub use fetch::CandidateFetcher;
pub use history::{HistoryStore, InMemoryHistory, RecentHistoryEntry};
pub use protocol::{Candidate, LoadResult, Track};
pub use resolver::Resolver;
