use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Content maturity classification of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "s", alias = "safe")]
    Safe,
    #[serde(rename = "q", alias = "questionable")]
    Questionable,
    #[serde(rename = "e", alias = "explicit")]
    Explicit,
}

impl Rating {
    /// Parse the short or long rating name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "s" | "safe" => Some(Rating::Safe),
            "q" | "questionable" => Some(Rating::Questionable),
            "e" | "explicit" => Some(Rating::Explicit),
            _ => None,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Rating::Safe => "s",
            Rating::Questionable => "q",
            Rating::Explicit => "e",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// One line of blacklist text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub positive_tags: Vec<String>,
    /// Stored without the leading `-`
    pub negative_tags: Vec<String>,
}

impl BlacklistEntry {
    /// Text shown to the user when this entry hides a post
    pub fn display_text(&self) -> String {
        self.positive_tags.join(" ")
    }
}

/// Result of checking a post against the blacklist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistResult {
    pub blacklisted: bool,
    pub matched_entries: Vec<String>,
}

/// Hit counts of every blacklist line over a set of posts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistSummary {
    pub total_items: u64,
    pub hidden_items: u64,
    /// (entry text, number of posts it matched) in rule order
    pub entry_hits: Vec<(String, u64)>,
}

impl BlacklistSummary {
    pub fn hidden_percentage(&self) -> f64 {
        percentage(self.hidden_items, self.total_items)
    }
}

/// Counters kept by a `BlacklistFilter`
#[derive(Debug, Default)]
pub struct BlacklistStats {
    items_checked: AtomicU64,
    items_hidden: AtomicU64,
}

/// Point-in-time copy of `BlacklistStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub items_checked: u64,
    pub items_hidden: u64,
}

impl StatsSnapshot {
    pub fn hidden_percentage(&self) -> f64 {
        percentage(self.items_hidden, self.items_checked)
    }
}

impl BlacklistStats {
    pub fn record(&self, hidden: bool) {
        self.items_checked.fetch_add(1, Ordering::Relaxed);
        if hidden {
            self.items_hidden.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            items_checked: self.items_checked.load(Ordering::Relaxed),
            items_hidden: self.items_hidden.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.items_checked.store(0, Ordering::Relaxed);
        self.items_hidden.store(0, Ordering::Relaxed);
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}
