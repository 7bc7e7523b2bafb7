//! Recently-played history, injected into the autoplay selector instead of
//! living in ambient globals so it can be swapped in tests.

use std::collections::{HashMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::config::AutoplayConfig;
use crate::protocol::Track;
use crate::text;

/// One entry of the global recently-played ring, keyed loosely by
/// title+author rather than track identity.
#[derive(Debug, Clone)]
pub struct RecentHistoryEntry {
    pub title: String,
    pub author: String,
    pub guild_id: String,
    /// Unix millis.
    pub timestamp: u64,
}

impl RecentHistoryEntry {
    /// Loose key used for the repeat-recommendation penalty.
    pub fn meta_key(&self) -> String {
        format!(
            "{}:{}",
            text::normalize(&self.title),
            text::normalize(&self.author)
        )
    }
}

/// Read access to playback history. The bot's playback layer owns the
/// writes; the selector only records what it hands back.
pub trait HistoryStore: Send + Sync {
    /// Most recent `n` tracks played in a guild, newest first.
    fn recent_for(&self, guild_id: &str, n: usize) -> Vec<Track>;

    /// Most recent `n` entries of the global recently-played ring.
    fn recently_played(&self, n: usize) -> Vec<RecentHistoryEntry>;

    /// Record a played track.
    fn record(&self, guild_id: &str, track: &Track);

    /// Note a track the autoplay selector handed back. Feeds only the global
    /// recency bias; guild history stays with the playback layer.
    fn note_recommended(&self, guild_id: &str, track: &Track);
}

/// Bounded in-memory history: one ring per guild plus one global ring.
pub struct InMemoryHistory {
    per_guild: Mutex<HashMap<String, VecDeque<Track>>>,
    global: Mutex<VecDeque<RecentHistoryEntry>>,
    guild_cap: usize,
    global_cap: usize,
}

impl InMemoryHistory {
    pub fn new(config: &AutoplayConfig) -> Self {
        Self {
            per_guild: Mutex::new(HashMap::new()),
            global: Mutex::new(VecDeque::new()),
            guild_cap: config.guild_history_cap,
            global_cap: config.global_recent_cap,
        }
    }
}

impl HistoryStore for InMemoryHistory {
    fn recent_for(&self, guild_id: &str, n: usize) -> Vec<Track> {
        let guard = self.per_guild.lock();
        match guard.get(guild_id) {
            Some(ring) => ring.iter().rev().take(n).cloned().collect(),
            None => Vec::new(),
        }
    }

    fn recently_played(&self, n: usize) -> Vec<RecentHistoryEntry> {
        let guard = self.global.lock();
        guard.iter().rev().take(n).cloned().collect()
    }

    fn record(&self, guild_id: &str, track: &Track) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        {
            let mut guard = self.per_guild.lock();
            let ring = guard.entry(guild_id.to_string()).or_default();
            ring.push_back(track.clone());
            while ring.len() > self.guild_cap {
                ring.pop_front();
            }
        }

        self.push_global(guild_id, track, now);
    }

    fn note_recommended(&self, guild_id: &str, track: &Track) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.push_global(guild_id, track, now);
    }
}

impl InMemoryHistory {
    fn push_global(&self, guild_id: &str, track: &Track, now: u64) {
        let mut guard = self.global.lock();
        guard.push_back(RecentHistoryEntry {
            title: track.title.clone(),
            author: track.author.clone(),
            guild_id: guild_id.to_string(),
            timestamp: now,
        });
        while guard.len() > self.global_cap {
            guard.pop_front();
        }
    }
}
