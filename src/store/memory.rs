//! In-process [`Store`] with optional JSON persistence.
//!
//! All tables sit behind one [`Mutex`], so every trait method is a single
//! critical section; in particular an item and its extension are inserted
//! together. [`MemoryStore::save`] writes the whole state to a sibling
//! `.new` file and renames it over the target, so a crash mid-save leaves
//! the previous snapshot intact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Store, StoreError, StoreResult};
use crate::model::{
    Credential, Extension, Feed, FeedId, Item, ItemId, Lifestream, LifestreamId, NewFeed, NewItem,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Tables {
    next_id: u64,
    lifestreams: Vec<Lifestream>,
    feeds: Vec<FeedRow>,
    items: Vec<ItemRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FeedRow {
    feed: Feed,
    #[serde(default)]
    credential: Option<Credential>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemRow {
    item: Item,
    #[serde(default)]
    extension: Option<Extension>,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn feed_row(&mut self, id: FeedId) -> StoreResult<&mut FeedRow> {
        self.feeds
            .iter_mut()
            .find(|row| row.feed.id == id)
            .ok_or(StoreError::FeedNotFound(id))
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    path: Option<PathBuf>,
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// An empty store that lives only in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store persisted at `path`. A missing or empty file yields an
    /// empty store that [`save`](Self::save) will create.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let tables = match File::open(&path) {
            Ok(file) => {
                if file.metadata()?.len() == 0 {
                    Tables::default()
                } else {
                    serde_json::from_reader(BufReader::new(file))?
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Tables::default(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), feeds = tables.feeds.len(), "store loaded");
        Ok(Self {
            path: Some(path),
            tables: Mutex::new(tables),
        })
    }

    /// Persist to the path the store was opened from. No-op for a purely
    /// in-memory store.
    pub fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".new");
        let tmp = PathBuf::from(tmp);

        {
            let tables = self.lock()?;
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &*tables)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "store saved");
        Ok(())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn get_or_create_lifestream(&self, name: &str) -> StoreResult<Lifestream> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables.lifestreams.iter().find(|l| l.name == name) {
            return Ok(existing.clone());
        }
        let lifestream = Lifestream {
            id: LifestreamId(tables.allocate_id()),
            name: name.to_string(),
        };
        tables.lifestreams.push(lifestream.clone());
        Ok(lifestream)
    }

    fn lifestream_by_name(&self, name: &str) -> StoreResult<Option<Lifestream>> {
        let tables = self.lock()?;
        Ok(tables.lifestreams.iter().find(|l| l.name == name).cloned())
    }

    fn create_feed(&self, lifestream: LifestreamId, new: NewFeed) -> StoreResult<Feed> {
        let mut tables = self.lock()?;
        if !tables.lifestreams.iter().any(|l| l.id == lifestream) {
            return Err(StoreError::LifestreamNotFound(lifestream));
        }
        let now = Utc::now();
        let feed = Feed {
            id: FeedId(tables.allocate_id()),
            lifestream,
            title: new.title,
            plugin: new.plugin,
            ordering: new.ordering,
            fetchable: true,
            created: now,
            updated: now,
        };
        tables.feeds.push(FeedRow {
            feed: feed.clone(),
            credential: None,
        });
        Ok(feed)
    }

    fn feed(&self, id: FeedId) -> StoreResult<Feed> {
        let mut tables = self.lock()?;
        Ok(tables.feed_row(id)?.feed.clone())
    }

    fn feeds(&self, lifestream: Option<LifestreamId>) -> StoreResult<Vec<Feed>> {
        let tables = self.lock()?;
        let mut feeds: Vec<Feed> = tables
            .feeds
            .iter()
            .map(|row| &row.feed)
            .filter(|feed| lifestream.map_or(true, |id| feed.lifestream == id))
            .cloned()
            .collect();
        feeds.sort_by(|a, b| (a.ordering, a.created, a.id).cmp(&(b.ordering, b.created, b.id)));
        Ok(feeds)
    }

    fn set_fetchable(&self, id: FeedId, fetchable: bool) -> StoreResult<()> {
        let mut tables = self.lock()?;
        let row = tables.feed_row(id)?;
        row.feed.fetchable = fetchable;
        row.feed.updated = Utc::now();
        Ok(())
    }

    fn set_credential(&self, id: FeedId, credential: Credential) -> StoreResult<()> {
        let mut tables = self.lock()?;
        tables.feed_row(id)?.credential = Some(credential);
        Ok(())
    }

    fn credential(&self, id: FeedId) -> StoreResult<Option<Credential>> {
        let mut tables = self.lock()?;
        Ok(tables.feed_row(id)?.credential.clone())
    }

    fn latest_item(&self, feed: FeedId) -> StoreResult<Option<Item>> {
        let tables = self.lock()?;
        // Timeline order is newest-first, so the latest item is the minimum.
        Ok(tables
            .items
            .iter()
            .map(|row| &row.item)
            .filter(|item| item.feed == feed)
            .min()
            .cloned())
    }

    fn latest_items(&self, feed: FeedId) -> StoreResult<Vec<Item>> {
        let tables = self.lock()?;
        let items = tables.items.iter().map(|row| &row.item).filter(|item| item.feed == feed);
        let Some(latest) = items.clone().map(|item| item.published).max() else {
            return Ok(Vec::new());
        };
        let mut tied: Vec<Item> = items.filter(|item| item.published == latest).cloned().collect();
        tied.sort_by_key(|item| item.id);
        Ok(tied)
    }

    fn extension(&self, item: ItemId) -> StoreResult<Option<Extension>> {
        let tables = self.lock()?;
        tables
            .items
            .iter()
            .find(|row| row.item.id == item)
            .map(|row| row.extension.clone())
            .ok_or(StoreError::ItemNotFound(item))
    }

    fn link_exists(&self, feed: FeedId, link: &str) -> StoreResult<bool> {
        let tables = self.lock()?;
        Ok(tables
            .items
            .iter()
            .any(|row| row.item.feed == feed && row.item.link == link))
    }

    fn create_item(&self, new: NewItem, extension: Option<Extension>) -> StoreResult<Item> {
        let mut tables = self.lock()?;
        tables.feed_row(new.feed)?;
        let now = Utc::now();
        let item = Item {
            id: ItemId(tables.allocate_id()),
            feed: new.feed,
            content: new.content,
            author: new.author,
            link: new.link,
            published: new.published,
            created: now,
            updated: now,
        };
        tables.items.push(ItemRow {
            item: item.clone(),
            extension,
        });
        Ok(item)
    }

    fn timeline(&self, lifestream: LifestreamId) -> StoreResult<Vec<Item>> {
        let tables = self.lock()?;
        if !tables.lifestreams.iter().any(|l| l.id == lifestream) {
            return Err(StoreError::LifestreamNotFound(lifestream));
        }
        let mut items: Vec<Item> = tables
            .items
            .iter()
            .map(|row| &row.item)
            .filter(|item| {
                tables
                    .feeds
                    .iter()
                    .any(|row| row.feed.id == item.feed && row.feed.lifestream == lifestream)
            })
            .cloned()
            .collect();
        items.sort();
        Ok(items)
    }
}
