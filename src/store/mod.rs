//! Storage contract consumed by the update pipeline.
//!
//! The pipeline only ever talks to storage through [`Store`], so a SQL
//! backend can replace [`MemoryStore`] without touching plugins or the
//! driver. Methods take `&self`; implementations own their locking.
//!
//! ## For contributors: writing a backend
//!
//! [`Store::create_item`] must write the item and its extension as one unit:
//! a reader may never observe an item whose extension is missing.

mod memory;

pub use memory::MemoryStore;

use thiserror::Error;

use crate::model::{
    Credential, Extension, Feed, FeedId, Item, ItemId, Lifestream, LifestreamId, NewFeed, NewItem,
};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lifestream {0} does not exist")]
    LifestreamNotFound(LifestreamId),

    #[error("feed {0} does not exist")]
    FeedNotFound(FeedId),

    #[error("item {0} does not exist")]
    ItemNotFound(ItemId),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Store {
    /// Return the lifestream called `name`, creating it if needed.
    fn get_or_create_lifestream(&self, name: &str) -> StoreResult<Lifestream>;

    fn lifestream_by_name(&self, name: &str) -> StoreResult<Option<Lifestream>>;

    fn create_feed(&self, lifestream: LifestreamId, feed: NewFeed) -> StoreResult<Feed>;

    fn feed(&self, id: FeedId) -> StoreResult<Feed>;

    /// All feeds, or those of one lifestream, ordered by
    /// `(ordering, created, id)`.
    fn feeds(&self, lifestream: Option<LifestreamId>) -> StoreResult<Vec<Feed>>;

    fn set_fetchable(&self, id: FeedId, fetchable: bool) -> StoreResult<()>;

    /// Attach a credential to a feed, replacing any previous one.
    fn set_credential(&self, id: FeedId, credential: Credential) -> StoreResult<()>;

    fn credential(&self, id: FeedId) -> StoreResult<Option<Credential>>;

    /// The feed's most recent item in timeline order, if any.
    fn latest_item(&self, feed: FeedId) -> StoreResult<Option<Item>>;

    /// Every item of the feed published at the feed's latest `published`
    /// time, oldest id first. Empty when the feed has no items.
    fn latest_items(&self, feed: FeedId) -> StoreResult<Vec<Item>>;

    fn extension(&self, item: ItemId) -> StoreResult<Option<Extension>>;

    /// Whether the feed already holds an item with this permalink.
    fn link_exists(&self, feed: FeedId, link: &str) -> StoreResult<bool>;

    /// Persist an item together with its optional extension, atomically.
    fn create_item(&self, item: NewItem, extension: Option<Extension>) -> StoreResult<Item>;

    /// Every item of a lifestream, newest first.
    fn timeline(&self, lifestream: LifestreamId) -> StoreResult<Vec<Item>>;
}
