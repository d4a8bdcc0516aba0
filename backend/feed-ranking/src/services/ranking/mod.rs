//! Feed Ranking Module
//!
//! Orders a heterogeneous candidate set (posts, listings, events) for one viewer.
//!
//! # Workflow
//! 1. Build an id -> identity lookup from the directory
//! 2. Capture "now" once for the whole pass
//! 3. Score every candidate (unresolved authors score 0 but stay in the feed)
//! 4. Stable sort by score descending, optionally breaking ties by id
use crate::config::{RankingConfig, TieBreak};
use crate::models::{ContentItem, Identity, RankedItem};
use crate::services::scoring::ScoreCalculator;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Borrowed id -> identity index. The first identity with a given id wins.
#[derive(Debug, Default)]
pub struct IdentityLookup<'a> {
    by_id: HashMap<Uuid, &'a Identity>,
}

impl<'a> IdentityLookup<'a> {
    pub fn new(identities: &'a [Identity]) -> Self {
        let mut by_id = HashMap::with_capacity(identities.len());
        for identity in identities {
            by_id.entry(identity.id).or_insert(identity);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &Uuid) -> Option<&'a Identity> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Feed Ranker
///
/// Stateless between calls; safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct FeedRanker {
    calculator: ScoreCalculator,
    tie_break: TieBreak,
}

impl FeedRanker {
    pub fn new(config: RankingConfig) -> Self {
        Self {
            calculator: ScoreCalculator::new(config.weights),
            tie_break: config.tie_break,
        }
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    /// Rank `items` for `viewer` (or an anonymous viewer) at the current time.
    pub fn rank<'a>(
        &self,
        items: &'a [ContentItem],
        viewer: Option<&Identity>,
        identities: &[Identity],
    ) -> Vec<&'a ContentItem> {
        self.rank_at(items, viewer, identities, Utc::now())
    }

    /// Rank against a fixed clock. Output is a permutation of `items`.
    pub fn rank_at<'a>(
        &self,
        items: &'a [ContentItem],
        viewer: Option<&Identity>,
        identities: &[Identity],
        now: DateTime<Utc>,
    ) -> Vec<&'a ContentItem> {
        self.rank_scored(items, viewer, identities, now)
            .into_iter()
            .map(|ranked| ranked.item)
            .collect()
    }

    /// Rank and keep each candidate's score and breakdown.
    pub fn rank_scored<'a>(
        &self,
        items: &'a [ContentItem],
        viewer: Option<&Identity>,
        identities: &[Identity],
        now: DateTime<Utc>,
    ) -> Vec<RankedItem<'a>> {
        if items.is_empty() {
            return Vec::new();
        }

        let lookup = IdentityLookup::new(identities);
        let mut unresolved = 0usize;

        let mut ranked: Vec<RankedItem<'a>> = items
            .iter()
            .map(|item| match lookup.get(&item.author_id) {
                Some(author) => {
                    let breakdown = self.calculator.breakdown(item, viewer, author, now);
                    RankedItem {
                        item,
                        score: breakdown.total,
                        breakdown: Some(breakdown),
                    }
                }
                None => {
                    unresolved += 1;
                    warn!(
                        item_id = %item.id,
                        author_id = %item.author_id,
                        "Feed item author not in identity directory, scoring 0"
                    );
                    RankedItem {
                        item,
                        score: 0.0,
                        breakdown: None,
                    }
                }
            })
            .collect();

        // sort_by is stable: equal scores keep input order unless a tie-break is configured
        let tie_break = self.tie_break;
        ranked.sort_by(|a, b| {
            let by_score = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
            match tie_break {
                TieBreak::Stable => by_score,
                TieBreak::IdDescending => by_score.then_with(|| b.item.id.cmp(&a.item.id)),
            }
        });

        info!(
            item_count = ranked.len(),
            identity_count = lookup.len(),
            unresolved_authors = unresolved,
            anonymous = viewer.is_none(),
            "Feed ranking completed"
        );

        ranked
    }
}

/// Rank with the default production weights.
pub fn rank_feed<'a>(
    items: &'a [ContentItem],
    viewer: Option<&Identity>,
    identities: &[Identity],
) -> Vec<&'a ContentItem> {
    FeedRanker::default().rank(items, viewer, identities)
}
