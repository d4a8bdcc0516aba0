//! Score Calculator
//!
//! Multi-factor scoring of a single feed candidate for a viewer:
//! - Freshness: exponential time decay
//! - Affinity: social-graph relationship between viewer and author
//! - Local relevance: overlapping viewer/author locations
//! - Engagement: reactions, comments and shares with viral/velocity boosts
//! - Views: watch-time signal
//! - Interest clustering: viewer interests vs. item category and tags
//! - New-user boost: multiplier for recently joined authors
//!
//! Scoring is pure: it depends only on `(item, viewer, author, now)`.

use crate::config::ScoringWeights;
use crate::models::{ContentItem, Identity, Relationship, ScoreBreakdown};
use crate::utils::{exponential_decay, hours_since, locations_overlap};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a candidate. An unresolved author scores exactly 0.
    pub fn score(
        &self,
        item: &ContentItem,
        viewer: Option<&Identity>,
        author: Option<&Identity>,
        now: DateTime<Utc>,
    ) -> f64 {
        match author {
            Some(author) => self.breakdown(item, viewer, author, now).total,
            None => 0.0,
        }
    }

    /// Compute every signal for a candidate whose author is known.
    pub fn breakdown(
        &self,
        item: &ContentItem,
        viewer: Option<&Identity>,
        author: &Identity,
        now: DateTime<Utc>,
    ) -> ScoreBreakdown {
        let hours_old = hours_since(item.created_at.unwrap_or(now), now);

        let mut breakdown = ScoreBreakdown {
            freshness: self.freshness(hours_old),
            affinity: viewer.map_or(0.0, |v| self.affinity(v, author)),
            local: viewer.map_or(0.0, |v| self.local_relevance(v, author)),
            engagement: self.engagement(item, hours_old),
            views: item.view_count as f64 * self.weights.view_weight,
            interest: viewer.map_or(0.0, |v| self.interest(v, item)),
            new_user_boost: self.new_user_boost(author, now),
            total: 0.0,
        };
        breakdown.total = breakdown.base() * breakdown.new_user_boost;

        debug!(
            item_id = %item.id,
            author_id = %author.id,
            freshness = breakdown.freshness,
            affinity = breakdown.affinity,
            local = breakdown.local,
            engagement = breakdown.engagement,
            views = breakdown.views,
            interest = breakdown.interest,
            new_user_boost = breakdown.new_user_boost,
            total = breakdown.total,
            "Feed item scored"
        );

        breakdown
    }

    /// 1000 at age 0, ~223 at 48h, never negative.
    fn freshness(&self, hours_old: f64) -> f64 {
        let w = &self.weights;
        exponential_decay(hours_old, w.freshness_window_hours, w.freshness_decay_rate)
            * w.freshness_scale
    }

    fn affinity(&self, viewer: &Identity, author: &Identity) -> f64 {
        let w = &self.weights;
        let tier = match Relationship::between(viewer, author) {
            Relationship::SelfAuthored => 0.0,
            Relationship::Mutual => w.affinity_mutual,
            Relationship::Following => w.affinity_following,
            Relationship::FollowedBy => w.affinity_followed_by,
            Relationship::Stranger => w.affinity_stranger,
        };
        tier * w.affinity_weight
    }

    fn local_relevance(&self, viewer: &Identity, author: &Identity) -> f64 {
        match (viewer.location.as_deref(), author.location.as_deref()) {
            (Some(a), Some(b)) if locations_overlap(a, b) => self.weights.local_weight,
            _ => 0.0,
        }
    }

    fn engagement(&self, item: &ContentItem, hours_old: f64) -> f64 {
        let w = &self.weights;
        let raw = item.reactions.len() as f64 * w.reaction_weight
            + item.comment_count as f64 * w.comment_weight
            + item.share_count as f64 * w.share_weight;

        let mut boosted = raw;
        if raw > w.viral_threshold {
            boosted *= w.viral_multiplier;
        }
        if hours_old < w.velocity_window_hours && raw > w.velocity_threshold {
            boosted *= w.velocity_multiplier;
        }

        boosted * w.engagement_weight
    }

    fn interest(&self, viewer: &Identity, item: &ContentItem) -> f64 {
        if viewer.interests.is_empty() {
            return 0.0;
        }

        let w = &self.weights;
        let mut units = 0.0;

        if let Some(category) = item.category.as_deref() {
            if viewer.interests.contains(&category.to_lowercase()) {
                units += w.interest_category_units;
            }
        }

        for tag in &item.tags {
            if viewer.interests.contains(&tag.to_lowercase()) {
                units += w.interest_tag_units;
            }
        }

        units * w.interest_weight
    }

    /// Authors who joined within the window (inclusive) get the multiplier.
    /// A window chrono cannot represent disables the boost.
    fn new_user_boost(&self, author: &Identity, now: DateTime<Utc>) -> f64 {
        let Some(window) = Duration::try_days(self.weights.new_user_window_days) else {
            return 1.0;
        };
        match author.joined_at {
            Some(joined_at) if now - joined_at <= window => self.weights.new_user_multiplier,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reaction;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn veteran(now: DateTime<Utc>) -> Identity {
        Identity::new(Uuid::new_v4()).with_joined_at(now - Duration::days(400))
    }

    fn fresh_item(author: &Identity, now: DateTime<Utc>) -> ContentItem {
        ContentItem::new(Uuid::new_v4(), author.id).with_created_at(now)
    }

    fn reactions(count: usize) -> Vec<Reaction> {
        (0..count)
            .map(|_| Reaction::new(Uuid::new_v4(), "like"))
            .collect()
    }

    #[test]
    fn test_stranger_fresh_post_scores_1250() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let viewer = Identity::new(Uuid::new_v4());
        let author = veteran(now);
        let item = fresh_item(&author, now);

        let breakdown = calc.breakdown(&item, Some(&viewer), &author, now);

        assert_eq!(breakdown.freshness, 1000.0);
        assert_eq!(breakdown.affinity, 250.0);
        assert_eq!(breakdown.local, 0.0);
        assert_eq!(breakdown.engagement, 0.0);
        assert_eq!(breakdown.views, 0.0);
        assert_eq!(breakdown.interest, 0.0);
        assert_eq!(breakdown.new_user_boost, 1.0);
        assert!((breakdown.total - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn test_viral_and_velocity_stack() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let viewer = Identity::new(Uuid::new_v4());
        let author = veteran(now);
        let item = fresh_item(&author, now).with_engagement(Vec::new(), 0, 20);

        let breakdown = calc.breakdown(&item, Some(&viewer), &author, now);

        // raw 100 * viral 1.3 * velocity 1.5 * weight 10
        assert!((breakdown.engagement - 1950.0).abs() < 1e-6);
        assert!((breakdown.total - 3200.0).abs() < 1e-6);
    }

    #[test]
    fn test_viral_without_velocity_when_old() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = veteran(now);
        let item = ContentItem::new(Uuid::new_v4(), author.id)
            .with_created_at(now - Duration::hours(3))
            .with_engagement(Vec::new(), 0, 20);

        let breakdown = calc.breakdown(&item, None, &author, now);
        assert!((breakdown.engagement - 1300.0).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_without_viral() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = veteran(now);
        // raw = 5 + 2*3 + 1*5 = 16: above velocity threshold, below viral
        let item = fresh_item(&author, now).with_engagement(reactions(5), 2, 1);

        let breakdown = calc.breakdown(&item, None, &author, now);
        assert!((breakdown.engagement - 16.0 * 1.5 * 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = veteran(now);

        // raw exactly 50: no viral; exactly 10: no velocity
        let at_viral = fresh_item(&author, now).with_engagement(Vec::new(), 0, 10);
        let at_velocity = fresh_item(&author, now).with_engagement(Vec::new(), 0, 2);

        let viral = calc.breakdown(&at_viral, None, &author, now);
        let velocity = calc.breakdown(&at_velocity, None, &author, now);

        assert!((viral.engagement - 50.0 * 1.5 * 10.0).abs() < 1e-6);
        assert!((velocity.engagement - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_freshness_decay() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = veteran(now);

        let day_old = ContentItem::new(Uuid::new_v4(), author.id)
            .with_created_at(now - Duration::hours(48));
        let breakdown = calc.breakdown(&day_old, None, &author, now);
        assert!((breakdown.freshness - (-1.5f64).exp() * 1000.0).abs() < 1e-9);

        let ancient = ContentItem::new(Uuid::new_v4(), author.id)
            .with_created_at(now - Duration::days(3650));
        let breakdown = calc.breakdown(&ancient, None, &author, now);
        assert!(breakdown.freshness >= 0.0);
        assert!(breakdown.total.is_finite());
    }

    #[test]
    fn test_future_timestamp_clamped() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = veteran(now);
        let item = ContentItem::new(Uuid::new_v4(), author.id)
            .with_created_at(now + Duration::hours(5));

        let breakdown = calc.breakdown(&item, None, &author, now);
        assert_eq!(breakdown.freshness, 1000.0);
    }

    #[test]
    fn test_missing_fields_reduce_to_freshness() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = Identity::new(Uuid::new_v4());
        let item = ContentItem::new(Uuid::new_v4(), author.id);

        let score = calc.score(&item, None, Some(&author), now);
        assert_eq!(score, 1000.0);
    }

    #[test]
    fn test_unresolved_author_scores_zero() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let viewer = Identity::new(Uuid::new_v4());
        let item = ContentItem::new(Uuid::new_v4(), Uuid::new_v4())
            .with_created_at(now)
            .with_engagement(reactions(100), 50, 50);

        assert_eq!(calc.score(&item, Some(&viewer), None, now), 0.0);
    }

    #[test]
    fn test_affinity_ordering() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();

        let mut viewer = Identity::new(Uuid::new_v4());
        let mut mutual = veteran(now);
        let mut followed = veteran(now);
        let mut follower = veteran(now);
        let stranger = veteran(now);

        viewer.follow(&mut mutual);
        mutual.follow(&mut viewer);
        viewer.follow(&mut followed);
        follower.follow(&mut viewer);
        let viewer_as_author = viewer.clone();

        let score_for = |author: &Identity| {
            let item = ContentItem::new(Uuid::nil(), author.id).with_created_at(now);
            calc.score(&item, Some(&viewer), Some(author), now)
        };

        let s_mutual = score_for(&mutual);
        let s_following = score_for(&followed);
        let s_follower = score_for(&follower);
        let s_stranger = score_for(&stranger);
        let s_self = score_for(&viewer_as_author);

        assert!((s_mutual - 1500.0).abs() < 1e-9);
        assert!((s_following - 1375.0).abs() < 1e-9);
        assert!((s_follower - 1275.0).abs() < 1e-9);
        assert!(s_mutual > s_following);
        assert!(s_following > s_follower);
        assert!(s_follower > s_stranger);
        assert!(s_stranger > s_self);
    }

    #[test]
    fn test_local_relevance() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let viewer = Identity::new(Uuid::new_v4()).with_location("Brooklyn, New York");
        let neighbour = veteran(now).with_location("New York City, NY");
        let distant = veteran(now).with_location("Lisbon, Portugal");
        let nowhere = veteran(now);

        let item_by = |a: &Identity| ContentItem::new(Uuid::new_v4(), a.id).with_created_at(now);

        let b = calc.breakdown(&item_by(&neighbour), Some(&viewer), &neighbour, now);
        assert_eq!(b.local, 150.0);
        let b = calc.breakdown(&item_by(&distant), Some(&viewer), &distant, now);
        assert_eq!(b.local, 0.0);
        let b = calc.breakdown(&item_by(&nowhere), Some(&viewer), &nowhere, now);
        assert_eq!(b.local, 0.0);
    }

    #[test]
    fn test_interest_clustering() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let viewer = Identity::new(Uuid::new_v4()).with_interests(["photography", "travel", "food"]);
        let author = veteran(now);

        let item = fresh_item(&author, now)
            .with_category("Photography")
            .with_tags(["TRAVEL", "food", "cars"]);

        let breakdown = calc.breakdown(&item, Some(&viewer), &author, now);
        // category 2 + two tags 1 each = 4 units
        assert_eq!(breakdown.interest, 800.0);

        let no_interests = Identity::new(Uuid::new_v4());
        let breakdown = calc.breakdown(&item, Some(&no_interests), &author, now);
        assert_eq!(breakdown.interest, 0.0);
    }

    #[test]
    fn test_view_term() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = veteran(now);
        let item = fresh_item(&author, now).with_view_count(1234);

        let breakdown = calc.breakdown(&item, None, &author, now);
        assert!((breakdown.views - 123.4).abs() < 1e-9);
    }

    #[test]
    fn test_anonymous_viewer_is_neutral() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();
        let author = veteran(now).with_location("Paris");
        let item = fresh_item(&author, now).with_category("art").with_tags(["paris"]);

        let breakdown = calc.breakdown(&item, None, &author, now);
        assert_eq!(breakdown.affinity, 0.0);
        assert_eq!(breakdown.local, 0.0);
        assert_eq!(breakdown.interest, 0.0);
        assert_eq!(breakdown.total, 1000.0);
    }

    #[test]
    fn test_new_user_boost_cutoff() {
        let calc = ScoreCalculator::default();
        let now = fixed_now();

        let at_cutoff = Identity::new(Uuid::new_v4()).with_joined_at(now - Duration::days(60));
        let past_cutoff = Identity::new(Uuid::new_v4()).with_joined_at(now - Duration::days(61));

        let item = ContentItem::new(Uuid::new_v4(), Uuid::nil()).with_created_at(now);

        let boosted = calc.breakdown(&item, None, &at_cutoff, now);
        let plain = calc.breakdown(&item, None, &past_cutoff, now);

        assert_eq!(boosted.new_user_boost, 1.4);
        assert!((boosted.total - 1400.0).abs() < 1e-9);
        assert_eq!(plain.new_user_boost, 1.0);
        assert_eq!(plain.total, 1000.0);
    }

    #[test]
    fn test_unrepresentable_new_user_window_does_not_panic() {
        let calc = ScoreCalculator::new(ScoringWeights {
            new_user_window_days: 1_000_000_000_000,
            ..Default::default()
        });
        let now = fixed_now();
        let author = Identity::new(Uuid::new_v4()).with_joined_at(now - Duration::days(1));
        let item = fresh_item(&author, now);

        let breakdown = calc.breakdown(&item, None, &author, now);
        assert_eq!(breakdown.new_user_boost, 1.0);
        assert_eq!(breakdown.total, 1000.0);
    }

    #[test]
    fn test_custom_weights() {
        let calc = ScoreCalculator::new(ScoringWeights {
            affinity_weight: 0.0,
            freshness_scale: 10.0,
            ..Default::default()
        });
        let now = fixed_now();
        let viewer = Identity::new(Uuid::new_v4());
        let author = veteran(now);
        let item = fresh_item(&author, now);

        assert_eq!(calc.score(&item, Some(&viewer), Some(&author), now), 10.0);
    }
}
