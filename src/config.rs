use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tag lines the site itself blacklists for new accounts
pub const E621_DEFAULT_RULES: &str = "gore\nscat\nwatersports\nyoung -rating:s\nloli\nshota";

/// User blacklist preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Newline separated rule text, exactly as the user typed it
    #[serde(default)]
    pub rules: String,
}

fn default_enabled() -> bool {
    true
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: String::new(),
        }
    }
}

impl BlacklistConfig {
    /// Enabled blacklist with the given rule text
    pub fn from_rules(rules: impl Into<String>) -> Self {
        Self {
            enabled: true,
            rules: rules.into(),
        }
    }

    /// The blacklist a fresh e621 account starts with
    pub fn e621_default() -> Self {
        Self::from_rules(E621_DEFAULT_RULES)
    }

    /// Blacklist switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            rules: String::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse blacklist config")
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize blacklist config")
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Load a plain rule file, one rule per line
    pub fn load_rules(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rules = fs::read_to_string(path)
            .with_context(|| format!("Failed to read blacklist file {}", path.display()))?;
        Ok(Self::from_rules(rules))
    }

    /// Append a rule line unless an identical one exists. Returns whether it was added.
    pub fn add_rule(&mut self, rule: &str) -> bool {
        let rule = rule.trim();
        if rule.is_empty() || self.rules.lines().any(|line| line.trim() == rule) {
            return false;
        }
        if !self.rules.is_empty() && !self.rules.ends_with('\n') {
            self.rules.push('\n');
        }
        self.rules.push_str(rule);
        true
    }

    /// Drop every line equal to `rule`. Returns whether anything was removed.
    pub fn remove_rule(&mut self, rule: &str) -> bool {
        let rule = rule.trim();
        let before = self.rules.lines().count();
        let kept: Vec<&str> = self
            .rules
            .lines()
            .filter(|line| line.trim() != rule)
            .collect();
        if kept.len() == before {
            return false;
        }
        self.rules = kept.join("\n");
        true
    }
}
