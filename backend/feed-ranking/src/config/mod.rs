use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix for every environment override, e.g. `FEED_RANKING_AFFINITY_WEIGHT=300`.
pub const ENV_PREFIX: &str = "FEED_RANKING_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read ranking config from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid ranking weight {field}: {value}")]
    InvalidWeight { field: &'static str, value: f64 },
}

/// Constants of the scoring formula.
///
/// Defaults reproduce the production feed:
/// `(freshness + affinity + local + engagement + views + interest) * new_user_boost`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    // Freshness: exp(-(hours_old / window) * rate) * scale
    pub freshness_scale: f64,
    pub freshness_window_hours: f64,
    pub freshness_decay_rate: f64,

    // Affinity tiers, multiplied by affinity_weight. Self-authored content gets 0.
    pub affinity_weight: f64,
    pub affinity_mutual: f64,
    pub affinity_following: f64,
    pub affinity_followed_by: f64,
    pub affinity_stranger: f64,

    pub local_weight: f64,

    // Engagement: reactions*1 + comments*3 + shares*5
    pub reaction_weight: f64,
    pub comment_weight: f64,
    pub share_weight: f64,
    pub viral_threshold: f64,
    pub viral_multiplier: f64,
    pub velocity_window_hours: f64,
    pub velocity_threshold: f64,
    pub velocity_multiplier: f64,
    pub engagement_weight: f64,

    pub view_weight: f64,

    // Interest clustering, in match units
    pub interest_weight: f64,
    pub interest_category_units: f64,
    pub interest_tag_units: f64,

    pub new_user_window_days: i64,
    pub new_user_multiplier: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            freshness_scale: 1000.0,
            freshness_window_hours: 48.0,
            freshness_decay_rate: 1.5,
            affinity_weight: 250.0,
            affinity_mutual: 2.0,
            affinity_following: 1.5,
            affinity_followed_by: 1.1,
            affinity_stranger: 1.0,
            local_weight: 150.0,
            reaction_weight: 1.0,
            comment_weight: 3.0,
            share_weight: 5.0,
            viral_threshold: 50.0,
            viral_multiplier: 1.3,
            velocity_window_hours: 2.0,
            velocity_threshold: 10.0,
            velocity_multiplier: 1.5,
            engagement_weight: 10.0,
            view_weight: 0.1,
            interest_weight: 200.0,
            interest_category_units: 2.0,
            interest_tag_units: 1.0,
            new_user_window_days: 60,
            new_user_multiplier: 1.4,
        }
    }
}

impl ScoringWeights {
    fn non_negative_fields(&self) -> [(&'static str, f64); 21] {
        [
            ("freshness_scale", self.freshness_scale),
            ("freshness_decay_rate", self.freshness_decay_rate),
            ("affinity_weight", self.affinity_weight),
            ("affinity_mutual", self.affinity_mutual),
            ("affinity_following", self.affinity_following),
            ("affinity_followed_by", self.affinity_followed_by),
            ("affinity_stranger", self.affinity_stranger),
            ("local_weight", self.local_weight),
            ("reaction_weight", self.reaction_weight),
            ("comment_weight", self.comment_weight),
            ("share_weight", self.share_weight),
            ("viral_threshold", self.viral_threshold),
            ("viral_multiplier", self.viral_multiplier),
            ("velocity_threshold", self.velocity_threshold),
            ("velocity_multiplier", self.velocity_multiplier),
            ("engagement_weight", self.engagement_weight),
            ("view_weight", self.view_weight),
            ("interest_weight", self.interest_weight),
            ("interest_category_units", self.interest_category_units),
            ("interest_tag_units", self.interest_tag_units),
            ("new_user_multiplier", self.new_user_multiplier),
        ]
    }

    /// Reject weights that could make a score NaN, infinite or negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in self.non_negative_fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { field, value });
            }
        }

        for (field, value) in [
            ("freshness_window_hours", self.freshness_window_hours),
            ("velocity_window_hours", self.velocity_window_hours),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidWeight { field, value });
            }
        }

        // Must be representable as a chrono duration
        if self.new_user_window_days < 1
            || chrono::Duration::try_days(self.new_user_window_days).is_none()
        {
            return Err(ConfigError::InvalidWeight {
                field: "new_user_window_days",
                value: self.new_user_window_days as f64,
            });
        }

        Ok(())
    }
}

/// Ordering applied to candidates with exactly equal scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep input order (stable sort).
    #[default]
    Stable,
    /// Higher id first, so repeated renders paginate identically.
    IdDescending,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RankingOptions {
    #[serde(default)]
    tie_break: TieBreak,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    pub weights: ScoringWeights,
    pub tie_break: TieBreak,
}

impl RankingConfig {
    /// Load defaults overlaid with `FEED_RANKING_*` variables (a `.env` file is honoured).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let weights: ScoringWeights = envy::prefixed(ENV_PREFIX).from_env()?;
        let options: RankingOptions = envy::prefixed(ENV_PREFIX).from_env()?;

        let config = RankingConfig {
            weights,
            tie_break: options.tie_break,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()
    }
}
