//! The normalized item every plugin produces.
//!
//! `Item` is source-agnostic. Whatever a source needs to remember about an
//! item (the id it uses as an incremental-fetch cursor, a caption) goes in
//! the one-to-one [`Extension`] stored next to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{FeedId, ItemId};

/// A single persisted entry of a lifestream.
///
/// ## Sorting
///
/// `Item` implements [`Ord`] for **timeline** ordering: newest `published`
/// first, ties broken by `created` then `updated` (newest first), and finally
/// by id so the order is total.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub feed: FeedId,
    pub content: String,
    pub author: String,
    /// Source permalink. RSS feeds deduplicate on it.
    pub link: String,
    pub published: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Fields a plugin supplies to create an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub feed: FeedId,
    pub content: String,
    pub author: String,
    pub link: String,
    pub published: DateTime<Utc>,
}

/// Source-specific side record of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Extension {
    Tweet { tweet_id: String },
    Media { instagram_id: String, caption: String },
}

impl Extension {
    pub fn name(&self) -> &'static str {
        match self {
            Extension::Tweet { .. } => "tweet",
            Extension::Media { .. } => "media",
        }
    }

    /// The record's id at its source, as used for incremental fetching.
    pub fn source_id(&self) -> &str {
        match self {
            Extension::Tweet { tweet_id } => tweet_id,
            Extension::Media { instagram_id, .. } => instagram_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering: newest first
// ---------------------------------------------------------------------------

impl Ord for Item {
    fn cmp(&self, other: &Self) -> Ordering {
        // `other` first so that newer sorts before older.
        other
            .published
            .cmp(&self.published)
            .then_with(|| other.created.cmp(&self.created))
            .then_with(|| other.updated.cmp(&self.updated))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
