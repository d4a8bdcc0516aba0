pub mod adapters;
pub mod ranking;
pub mod scoring;

pub use adapters::{Event, FeedCandidates, FeedSource, Listing};
pub use ranking::{rank_feed, FeedRanker, IdentityLookup};
pub use scoring::ScoreCalculator;
