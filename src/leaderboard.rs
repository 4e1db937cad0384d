//! High score leaderboard
//!
//! Persisted to LocalStorage, keeps the top 20 scores.

use serde::{Deserialize, Serialize};

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 20;

/// Name used when the player leaves the name field blank
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Unique per submission (creation time in ms on the web)
    pub id: String,
    pub name: String,
    pub score: u64,
    /// Local time formatted as `YYYY-MM-DD HH:MM`
    pub date: String,
}

/// Score table, sorted by descending score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fish_frenzy_leaderboard";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a finished session. Returns the 1-based rank, or `None` if the
    /// score fell off the bottom of a full table. Equal scores keep
    /// submission order.
    pub fn submit(&mut self, name: &str, score: u64, id: String, date: String) -> Option<usize> {
        let name = match name.trim() {
            "" => ANONYMOUS_NAME.to_string(),
            trimmed => trimmed.to_string(),
        };
        let entry = LeaderboardEntry {
            id,
            name,
            score,
            date,
        };

        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        if pos >= MAX_ENTRIES {
            return None;
        }
        log::info!("{} scored {score}, rank {}", entry.name, pos + 1);
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_ENTRIES);
        Some(pos + 1)
    }

    /// 1-based rank of the entry with `id`
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id).map(|i| i + 1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        log::info!("Leaderboard cleared");
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Parse a stored table, re-sorting and capping it
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Leaderboard>(json) {
            Ok(mut board) => {
                board.entries.sort_by(|a, b| b.score.cmp(&a.score));
                board.entries.truncate(MAX_ENTRIES);
                board
            }
            Err(e) => {
                log::warn!("Ignoring stored leaderboard: {e}");
                Self::new()
            }
        }
    }

    /// Load the leaderboard from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                let board = Self::from_json(&json);
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                return board;
            }
        }

        log::info!("No leaderboard found, starting fresh");
        Self::new()
    }

    /// Save the leaderboard to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Leaderboard saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// `YYYY-MM-DD HH:MM`, month 1-based
pub fn format_date(year: u32, month: u32, day: u32, hour: u32, minute: u32) -> String {
    format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")
}

/// Current local time as an entry date
#[cfg(target_arch = "wasm32")]
pub fn local_date_now() -> String {
    let date = js_sys::Date::new_0();
    format_date(
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date(),
        date.get_hours(),
        date.get_minutes(),
    )
}
