use nom::{
    IResult,
    Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::value,
};
use tracing::trace;

use crate::item::ItemFacts;
use crate::types::{BlacklistEntry, Rating};

const RATING_PREFIX: &str = "rating:";
const SCORE_PREFIX: &str = "score:";
const FAVCOUNT_PREFIX: &str = "favcount:";

/// Numeric comparison used by `score:` and `favcount:` tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn test(&self, lhs: i64, rhs: i64) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

/// A single blacklist token compiled into a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Rating(Rating),
    Score(CompareOp, i64),
    FavCount(CompareOp, i64),
    /// Numeric token with an unreadable threshold
    Never,
    Tag(String),
}

impl Token {
    /// Compile a positive token. Matching is case-insensitive.
    pub fn positive(raw: &str) -> Self {
        let lower = raw.to_lowercase();

        if let Some(token) = rating_token(&lower) {
            return token;
        }
        if let Some(rest) = lower.strip_prefix(SCORE_PREFIX) {
            if let Some(token) = numeric_token(rest, Token::Score) {
                return token;
            }
        }
        if let Some(rest) = lower.strip_prefix(FAVCOUNT_PREFIX) {
            if let Some(token) = numeric_token(rest, Token::FavCount) {
                return token;
            }
        }

        Token::Tag(lower)
    }

    /// Compile a negative token (stored without its `-`).
    ///
    /// Only ratings and plain tags are understood here; numeric forms are
    /// looked up as literal tags.
    pub fn negative(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        rating_token(&lower).unwrap_or(Token::Tag(lower))
    }

    pub fn matches(&self, item: &ItemFacts) -> bool {
        match self {
            Token::Rating(rating) => item.rating == Some(*rating),
            Token::Score(op, n) => op.test(item.score, *n),
            Token::FavCount(op, n) => op.test(item.fav_count, *n),
            Token::Never => false,
            Token::Tag(tag) => item.tags.contains(tag),
        }
    }
}

fn rating_token(lower: &str) -> Option<Token> {
    lower
        .strip_prefix(RATING_PREFIX)
        .and_then(Rating::from_name)
        .map(Token::Rating)
}

fn compare_op(input: &str) -> IResult<&str, CompareOp> {
    alt((
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Lt, char('<')),
        value(CompareOp::Gt, char('>')),
    ))
    .parse(input)
}

/// `None` when `rest` does not start with a comparison operator, so the
/// caller falls back to a literal tag.
fn numeric_token(rest: &str, build: fn(CompareOp, i64) -> Token) -> Option<Token> {
    let (threshold, op) = compare_op(rest).ok()?;
    match threshold.parse::<i64>() {
        Ok(n) => Some(build(op, n)),
        Err(_) => {
            trace!(threshold, "unreadable numeric threshold, token never matches");
            Some(Token::Never)
        }
    }
}

/// Parse raw blacklist text into one entry per rule line
pub fn parse_blacklist(text: &str) -> Vec<BlacklistEntry> {
    text.split('\n')
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            Some(parse_line(line))
        })
        .collect()
}

fn parse_line(line: &str) -> BlacklistEntry {
    let mut entry = BlacklistEntry::default();

    for token in line.split(' ').filter(|t| !t.is_empty()) {
        match token.strip_prefix('-') {
            Some("") => trace!(line, "dropping bare '-' token"),
            Some(negative) => entry.negative_tags.push(negative.to_string()),
            None => entry.positive_tags.push(token.to_string()),
        }
    }

    entry
}

/// An entry with its tokens compiled, ready to test posts against
#[derive(Debug, Clone)]
pub(crate) struct CompiledEntry<'a> {
    pub entry: &'a BlacklistEntry,
    positive: Vec<Token>,
    negative: Vec<Token>,
}

impl<'a> CompiledEntry<'a> {
    pub fn new(entry: &'a BlacklistEntry) -> Self {
        Self {
            entry,
            positive: entry.positive_tags.iter().map(|t| Token::positive(t)).collect(),
            negative: entry.negative_tags.iter().map(|t| Token::negative(t)).collect(),
        }
    }

    pub fn fires(&self, item: &ItemFacts) -> bool {
        let positive_match =
            !self.positive.is_empty() && self.positive.iter().all(|t| t.matches(item));
        positive_match && !self.negative.iter().any(|t| t.matches(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn facts(tags: &[&str], rating: Rating, score: i64, fav_count: i64) -> ItemFacts {
        ItemFacts {
            tags: tags.iter().map(|t| t.to_string()).collect::<HashSet<_>>(),
            rating: Some(rating),
            score,
            fav_count,
        }
    }

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let entries = parse_blacklist("# comment\n\n   \nfox\n  # indented comment\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].positive_tags, vec!["fox"]);
    }

    #[test]
    fn parse_splits_positive_and_negative() {
        let entries = parse_blacklist("fox  wolf -canine   -rating:s");
        assert_eq!(
            entries,
            vec![BlacklistEntry {
                positive_tags: vec!["fox".into(), "wolf".into()],
                negative_tags: vec!["canine".into(), "rating:s".into()],
            }]
        );
    }

    #[test]
    fn parse_keeps_line_grouping() {
        let entries = parse_blacklist("fox\r\nwolf canine\n-only_negative");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].positive_tags, vec!["fox"]);
        assert_eq!(entries[1].positive_tags, vec!["wolf", "canine"]);
        assert!(entries[2].positive_tags.is_empty());
        assert_eq!(entries[2].negative_tags, vec!["only_negative"]);
    }

    #[test]
    fn parse_drops_bare_dash() {
        let entries = parse_blacklist("fox - -");
        assert_eq!(entries[0].positive_tags, vec!["fox"]);
        assert!(entries[0].negative_tags.is_empty());
    }

    #[test]
    fn parse_is_deterministic() {
        let text = "rating:e\nscore:<-50\nfox -canine";
        assert_eq!(parse_blacklist(text), parse_blacklist(text));
    }

    #[test]
    fn rating_tokens() {
        assert_eq!(Token::positive("rating:e"), Token::Rating(Rating::Explicit));
        assert_eq!(Token::positive("Rating:Explicit"), Token::Rating(Rating::Explicit));
        assert_eq!(Token::positive("rating:q"), Token::Rating(Rating::Questionable));
        assert_eq!(Token::positive("rating:safe"), Token::Rating(Rating::Safe));
        assert_eq!(Token::positive("rating:x"), Token::Tag("rating:x".into()));
    }

    #[test]
    fn numeric_tokens() {
        assert_eq!(Token::positive("score:<=5"), Token::Score(CompareOp::Le, 5));
        assert_eq!(Token::positive("score:<-50"), Token::Score(CompareOp::Lt, -50));
        assert_eq!(Token::positive("score:>=100"), Token::Score(CompareOp::Ge, 100));
        assert_eq!(Token::positive("favcount:>10"), Token::FavCount(CompareOp::Gt, 10));
        assert_eq!(Token::positive("score:>abc"), Token::Never);
        assert_eq!(Token::positive("favcount:>="), Token::Never);
        assert_eq!(Token::positive("score:5"), Token::Tag("score:5".into()));
    }

    #[test]
    fn negative_tokens_have_no_numeric_form() {
        assert_eq!(Token::negative("rating:s"), Token::Rating(Rating::Safe));
        assert_eq!(Token::negative("score:>5"), Token::Tag("score:>5".into()));
        assert_eq!(Token::negative("Canine"), Token::Tag("canine".into()));
    }

    #[test]
    fn token_matching() {
        let item = facts(&["fox"], Rating::Questionable, 150, 3);

        assert!(Token::positive("FOX").matches(&item));
        assert!(!Token::positive("wolf").matches(&item));
        assert!(Token::positive("rating:q").matches(&item));
        assert!(!Token::positive("rating:e").matches(&item));
        assert!(Token::positive("score:>=100").matches(&item));
        assert!(!Token::positive("score:<150").matches(&item));
        assert!(Token::positive("score:<=150").matches(&item));
        assert!(Token::positive("favcount:<4").matches(&item));
        assert!(!Token::positive("favcount:>3").matches(&item));
        assert!(!Token::Never.matches(&item));
    }

    #[test]
    fn unknown_rating_never_matches_rating_tokens() {
        let mut item = facts(&[], Rating::Safe, 0, 0);
        item.rating = None;
        assert!(!Token::positive("rating:s").matches(&item));
    }

    #[test]
    fn compiled_entry_semantics() {
        let entries = parse_blacklist("fox -canine\n-fox");
        let fox_only = facts(&["fox"], Rating::Safe, 0, 0);
        let fox_canine = facts(&["fox", "canine"], Rating::Safe, 0, 0);

        let first = CompiledEntry::new(&entries[0]);
        assert!(first.fires(&fox_only));
        assert!(!first.fires(&fox_canine));

        let negative_only = CompiledEntry::new(&entries[1]);
        assert!(!negative_only.fires(&fox_only));
        assert!(!negative_only.fires(&facts(&[], Rating::Safe, 0, 0)));
    }
}
