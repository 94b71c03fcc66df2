//! Tag Blacklist API Library
//!
//! Decides whether an image-board post should be hidden according to a
//! user's tag blacklist, and reports which blacklist lines matched.
//!
//! Each line of the blacklist is one rule. A rule hides a post when every
//! plain token matches and no `-`prefixed token does. Besides plain tags,
//! tokens may be `rating:s|q|e`, `score:<N` style comparisons or
//! `favcount:>=N` style comparisons.
//!
//! # Quick Start
//!
//! ```rust
//! use tag_blacklist_api::prelude::*;
//! use serde_json::json;
//!
//! let post = RawPost::new(json!({
//!     "id": 1,
//!     "rating": "s",
//!     "score": { "up": 12, "down": -2, "total": 10 },
//!     "tags": { "species": ["fox"] }
//! }));
//!
//! let rules = "rating:e\nfox -canine";
//! assert!(is_blacklisted(&post, rules, true));
//! assert_eq!(matching_entries(&post, rules, true), vec!["fox"]);
//! ```

pub mod blacklist;
pub mod config;
pub mod filters;
pub mod item;
pub mod types;

pub use blacklist::{BlacklistFilter, check, is_blacklisted, matching_entries, summarize};
pub use config::BlacklistConfig;
pub use filters::{CompareOp, Token, parse_blacklist};
pub use item::{ContentItem, Post, PostPage, RawPost};
pub use types::{BlacklistEntry, BlacklistResult, BlacklistSummary, Rating, StatsSnapshot};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        BlacklistConfig, BlacklistEntry, BlacklistFilter, BlacklistResult, ContentItem, Post,
        Rating, RawPost, is_blacklisted, matching_entries,
    };
}
