use crate::config::BlacklistConfig;
use crate::filters::{CompiledEntry, parse_blacklist};
use crate::item::{ContentItem, ItemFacts};
use crate::types::{BlacklistEntry, BlacklistResult, BlacklistStats, BlacklistSummary, StatsSnapshot};

use tracing::{debug, info};

/// Entries to evaluate, or `None` when nothing can match
fn active_entries(rules: &str, enabled: bool) -> Option<Vec<BlacklistEntry>> {
    if !enabled || rules.trim().is_empty() {
        return None;
    }
    let entries = parse_blacklist(rules);
    if entries.is_empty() { None } else { Some(entries) }
}

/// Check whether any blacklist line hides `item`
pub fn is_blacklisted<I: ContentItem + ?Sized>(item: &I, rules: &str, enabled: bool) -> bool {
    let Some(entries) = active_entries(rules, enabled) else {
        return false;
    };
    let facts = ItemFacts::from_item(item);

    entries.iter().map(CompiledEntry::new).any(|compiled| {
        let fired = compiled.fires(&facts);
        if fired {
            debug!(entry = %compiled.entry.display_text(), "blacklist entry matched");
        }
        fired
    })
}

/// Every blacklist line that hides `item`, rendered without its negative
/// tokens, in rule order
pub fn matching_entries<I: ContentItem + ?Sized>(
    item: &I,
    rules: &str,
    enabled: bool,
) -> Vec<String> {
    let Some(entries) = active_entries(rules, enabled) else {
        return vec![];
    };
    let facts = ItemFacts::from_item(item);

    entries
        .iter()
        .map(CompiledEntry::new)
        .filter(|compiled| compiled.fires(&facts))
        .map(|compiled| compiled.entry.display_text())
        .collect()
}

/// Both answers for `item` in one value
pub fn check<I: ContentItem + ?Sized>(item: &I, config: &BlacklistConfig) -> BlacklistResult {
    let matched_entries = matching_entries(item, &config.rules, config.enabled);
    BlacklistResult {
        blacklisted: !matched_entries.is_empty(),
        matched_entries,
    }
}

/// Count how many of `items` each line hides
pub fn summarize<I: ContentItem>(items: &[I], rules: &str, enabled: bool) -> BlacklistSummary {
    let mut summary = BlacklistSummary {
        total_items: items.len() as u64,
        ..Default::default()
    };
    let Some(entries) = active_entries(rules, enabled) else {
        return summary;
    };

    let compiled: Vec<CompiledEntry<'_>> = entries.iter().map(CompiledEntry::new).collect();
    let mut hits = vec![0u64; compiled.len()];

    for item in items {
        let facts = ItemFacts::from_item(item);
        let mut hidden = false;
        for (idx, entry) in compiled.iter().enumerate() {
            if entry.fires(&facts) {
                hits[idx] += 1;
                hidden = true;
            }
        }
        if hidden {
            summary.hidden_items += 1;
        }
    }

    summary.entry_hits = entries
        .iter()
        .map(BlacklistEntry::display_text)
        .zip(hits)
        .collect();

    info!(
        total = summary.total_items,
        hidden = summary.hidden_items,
        "blacklist summary computed"
    );
    summary
}

/// A user's blacklist together with counters of what it has hidden
#[derive(Debug, Default)]
pub struct BlacklistFilter {
    config: BlacklistConfig,
    stats: BlacklistStats,
}

impl BlacklistFilter {
    pub fn new(config: BlacklistConfig) -> Self {
        Self {
            config,
            stats: BlacklistStats::default(),
        }
    }

    pub fn config(&self) -> &BlacklistConfig {
        &self.config
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    pub fn set_rules(&mut self, rules: impl Into<String>) {
        self.config.rules = rules.into();
    }

    pub fn add_rule(&mut self, rule: &str) -> bool {
        self.config.add_rule(rule)
    }

    pub fn remove_rule(&mut self, rule: &str) -> bool {
        self.config.remove_rule(rule)
    }

    pub fn is_blacklisted<I: ContentItem + ?Sized>(&self, item: &I) -> bool {
        let hidden = is_blacklisted(item, &self.config.rules, self.config.enabled);
        self.stats.record(hidden);
        hidden
    }

    pub fn check<I: ContentItem + ?Sized>(&self, item: &I) -> BlacklistResult {
        let result = check(item, &self.config);
        self.stats.record(result.blacklisted);
        result
    }

    pub fn matching_entries<I: ContentItem + ?Sized>(&self, item: &I) -> Vec<String> {
        matching_entries(item, &self.config.rules, self.config.enabled)
    }

    /// Drop the items the blacklist hides, keeping order
    pub fn retain_visible<I: ContentItem>(&self, items: Vec<I>) -> Vec<I> {
        items
            .into_iter()
            .filter(|item| !self.is_blacklisted(item))
            .collect()
    }

    pub fn summarize<I: ContentItem>(&self, items: &[I]) -> BlacklistSummary {
        summarize(items, &self.config.rules, self.config.enabled)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }
}
