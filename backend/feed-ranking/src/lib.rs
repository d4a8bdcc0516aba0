//! Feed ranking engine
//!
//! Orders posts, marketplace listings and events for a viewer by combining time
//! decay, social affinity, locality, engagement, watch time, interest matching and
//! a new-author boost into one deterministic score.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{ConfigError, RankingConfig, ScoringWeights, TieBreak};
pub use models::{
    ContentItem, ContentKind, Identity, RankedItem, Reaction, Relationship, ScoreBreakdown,
};
pub use services::{
    rank_feed, Event, FeedCandidates, FeedRanker, FeedSource, IdentityLookup, Listing,
    ScoreCalculator,
};
