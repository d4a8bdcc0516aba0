use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Origin of a feed candidate.
///
/// Marketplace listings and events are adapted into [`ContentItem`] before ranking
/// (see `services::adapters`), the kind is kept so the view layer can render them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Standard,
    Listing,
    Event,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Standard => "standard",
            ContentKind::Listing => "listing",
            ContentKind::Event => "event",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub user_id: Uuid,
    /// Reaction type ("like", "love", "save", ...). Only the count matters for ranking.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Reaction {
    pub fn new(user_id: Uuid, kind: impl Into<String>) -> Self {
        Self {
            user_id,
            kind: kind.into(),
        }
    }
}

/// Canonical unit ranked by the engine (posts, listings and events).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub author_id: Uuid,
    #[serde(default)]
    pub kind: ContentKind,
    #[serde(default)]
    pub content: String,
    /// Epoch milliseconds on the wire. `None` is scored as "just posted".
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub share_count: u32,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ContentItem {
    pub fn new(id: Uuid, author_id: Uuid) -> Self {
        Self {
            id,
            author_id,
            kind: ContentKind::Standard,
            content: String::new(),
            created_at: None,
            reactions: Vec::new(),
            comment_count: 0,
            share_count: 0,
            view_count: 0,
            category: None,
            tags: Vec::new(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_engagement(mut self, reactions: Vec<Reaction>, comments: u32, shares: u32) -> Self {
        self.reactions = reactions;
        self.comment_count = comments;
        self.share_count = shares;
        self
    }

    pub fn with_view_count(mut self, view_count: u64) -> Self {
        self.view_count = view_count;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A member of the identity directory (author or viewer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    /// Accounts this identity follows.
    #[serde(default)]
    pub following_ids: HashSet<Uuid>,
    /// Accounts following this identity.
    #[serde(default)]
    pub followed_by_ids: HashSet<Uuid>,
    /// Free-text location, e.g. "Brooklyn, New York, USA".
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    /// Lower-cased interest labels.
    #[serde(default, deserialize_with = "deserialize_interests")]
    pub interests: HashSet<String>,
}

fn normalize_interests<I, S>(interests: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    interests
        .into_iter()
        .map(|i| i.as_ref().trim().to_lowercase())
        .filter(|i| !i.is_empty())
        .collect()
}

fn deserialize_interests<'de, D>(deserializer: D) -> Result<HashSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(normalize_interests(raw))
}

impl Identity {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            following_ids: HashSet::new(),
            followed_by_ids: HashSet::new(),
            location: None,
            joined_at: None,
            interests: HashSet::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_joined_at(mut self, joined_at: DateTime<Utc>) -> Self {
        self.joined_at = Some(joined_at);
        self
    }

    /// Interests are stored lower-cased.
    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.interests = normalize_interests(interests);
        self
    }

    /// Record that `self` follows `other`, updating both sides of the edge.
    pub fn follow(&mut self, other: &mut Identity) {
        self.following_ids.insert(other.id);
        other.followed_by_ids.insert(self.id);
    }
}

/// Social-graph relationship between a viewer and an author, from the viewer's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    SelfAuthored,
    Mutual,
    Following,
    FollowedBy,
    Stranger,
}

impl Relationship {
    /// Classify using the viewer's own follow sets, which are authoritative.
    pub fn between(viewer: &Identity, author: &Identity) -> Self {
        if viewer.id == author.id {
            return Relationship::SelfAuthored;
        }

        let follows = viewer.following_ids.contains(&author.id);
        let followed_by = viewer.followed_by_ids.contains(&author.id);

        match (follows, followed_by) {
            (true, true) => Relationship::Mutual,
            (true, false) => Relationship::Following,
            (false, true) => Relationship::FollowedBy,
            (false, false) => Relationship::Stranger,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::SelfAuthored => "self",
            Relationship::Mutual => "mutual",
            Relationship::Following => "following",
            Relationship::FollowedBy => "followed_by",
            Relationship::Stranger => "stranger",
        }
    }
}

/// Per-signal contributions to a candidate's score.
///
/// `total = (freshness + affinity + local + engagement + views + interest) * new_user_boost`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub freshness: f64,
    pub affinity: f64,
    pub local: f64,
    pub engagement: f64,
    pub views: f64,
    pub interest: f64,
    pub new_user_boost: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    /// Sum of the additive signals, before the new-user multiplier.
    pub fn base(&self) -> f64 {
        self.freshness + self.affinity + self.local + self.engagement + self.views + self.interest
    }
}

/// A candidate with the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem<'a> {
    pub item: &'a ContentItem,
    pub score: f64,
    /// `None` when the author could not be resolved (score is 0).
    pub breakdown: Option<ScoreBreakdown>,
}
