// ============================================
// Feed Candidate Adapters
// ============================================
//
// Marketplace listings and events are ranked alongside posts. Each kind is
// converted into a canonical ContentItem before scoring:
// - Listing: title/price/description become the content, saves become reactions
// - Event: start time stands in for created_at, RSVPs become reactions

use crate::models::{ContentItem, ContentKind, Reaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub const LISTING_TAG: &str = "marketplace";
pub const EVENT_TAG: &str = "event";

/// Marketplace listing as stored by the marketplace module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    /// Users who saved the listing.
    #[serde(default)]
    pub saved_by: Vec<Uuid>,
    #[serde(default)]
    pub view_count: u64,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Community or group event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub interested_user_ids: Vec<Uuid>,
    #[serde(default)]
    pub going_user_ids: Vec<Uuid>,
}

impl From<Listing> for ContentItem {
    fn from(listing: Listing) -> Self {
        let mut content = format!(
            "{} · {:.2} {}",
            listing.title, listing.price, listing.currency
        );
        if !listing.description.is_empty() {
            content.push_str(" · ");
            content.push_str(&listing.description);
        }

        let reactions = listing
            .saved_by
            .into_iter()
            .map(|user_id| Reaction::new(user_id, "save"))
            .collect();

        ContentItem {
            id: listing.id,
            author_id: listing.seller_id,
            kind: ContentKind::Listing,
            content,
            created_at: listing.created_at,
            reactions,
            comment_count: 0,
            share_count: 0,
            view_count: listing.view_count,
            category: listing.category,
            tags: vec![LISTING_TAG.to_string()],
        }
    }
}

impl From<Event> for ContentItem {
    fn from(event: Event) -> Self {
        let content = if event.description.is_empty() {
            event.title
        } else {
            format!("{}\n{}", event.title, event.description)
        };

        let reactions = event
            .interested_user_ids
            .into_iter()
            .map(|user_id| Reaction::new(user_id, "interested"))
            .chain(
                event
                    .going_user_ids
                    .into_iter()
                    .map(|user_id| Reaction::new(user_id, "going")),
            )
            .collect();

        ContentItem {
            id: event.id,
            author_id: event.host_id,
            kind: ContentKind::Event,
            content,
            created_at: Some(event.starts_at),
            reactions,
            comment_count: 0,
            share_count: 0,
            view_count: 0,
            category: event.category,
            tags: vec![EVENT_TAG.to_string()],
        }
    }
}

/// Anything the feed can show, before adaptation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum FeedSource {
    Post(ContentItem),
    Listing(Listing),
    Event(Event),
}

impl FeedSource {
    pub fn kind(&self) -> ContentKind {
        match self {
            FeedSource::Post(_) => ContentKind::Standard,
            FeedSource::Listing(_) => ContentKind::Listing,
            FeedSource::Event(_) => ContentKind::Event,
        }
    }

    pub fn into_content_item(self) -> ContentItem {
        match self {
            FeedSource::Post(post) => post,
            FeedSource::Listing(listing) => listing.into(),
            FeedSource::Event(event) => event.into(),
        }
    }
}

/// Collects posts, listings and events into one candidate set for ranking.
///
/// No deduplication is performed.
#[derive(Debug, Clone, Default)]
pub struct FeedCandidates {
    sources: Vec<FeedSource>,
}

impl FeedCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: FeedSource) {
        self.sources.push(source);
    }

    pub fn with_posts(mut self, posts: impl IntoIterator<Item = ContentItem>) -> Self {
        self.sources.extend(posts.into_iter().map(FeedSource::Post));
        self
    }

    pub fn with_listings(mut self, listings: impl IntoIterator<Item = Listing>) -> Self {
        self.sources
            .extend(listings.into_iter().map(FeedSource::Listing));
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.sources.extend(events.into_iter().map(FeedSource::Event));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Adapt every source into a `ContentItem`, preserving insertion order.
    pub fn build(self) -> Vec<ContentItem> {
        let total = self.sources.len();
        let items: Vec<ContentItem> = self
            .sources
            .into_iter()
            .map(FeedSource::into_content_item)
            .collect();

        debug!(
            total = total,
            posts = items.iter().filter(|i| i.kind == ContentKind::Standard).count(),
            listings = items.iter().filter(|i| i.kind == ContentKind::Listing).count(),
            events = items.iter().filter(|i| i.kind == ContentKind::Event).count(),
            "Feed candidates assembled"
        );

        items
    }
}
