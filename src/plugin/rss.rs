use tracing::warn;

use super::{not_configured, FeedPlugin};
use crate::error::FeedResult;
use crate::model::{Credential, Feed, Item, NewItem};
use crate::source::{BoxedHandler, Cursor, Entry, SourceHandler, Sources};
use crate::store::Store;

/// Mirrors an RSS or Atom feed.
///
/// The source returns the whole document on every poll, so entries whose
/// link is already stored under this feed are skipped. Every item is
/// attributed to the feed's own title.
#[derive(Debug, Clone)]
pub struct RssPlugin {
    feed: Feed,
}

impl RssPlugin {
    pub fn new(feed: Feed) -> Self {
        Self { feed }
    }

    /// Whether an entry with this link still needs to be stored.
    pub fn include_entry(&self, store: &dyn Store, link: &str) -> FeedResult<bool> {
        Ok(!store.link_exists(self.feed.id, link)?)
    }
}

impl FeedPlugin for RssPlugin {
    type Record = Entry;

    fn feed(&self) -> &Feed {
        &self.feed
    }

    fn handler(&self, store: &dyn Store, sources: &dyn Sources) -> FeedResult<BoxedHandler<Entry>> {
        match store.credential(self.feed.id)? {
            Some(Credential::Rss(credential)) => sources.rss(&credential),
            other => Err(not_configured(&self.feed, other.as_ref())),
        }
    }

    fn update_cursor(&self, _store: &dyn Store) -> FeedResult<Option<Cursor>> {
        Ok(None)
    }

    fn create_item(
        &self,
        store: &dyn Store,
        handler: &dyn SourceHandler<Record = Entry>,
        entry: Entry,
    ) -> FeedResult<Option<Item>> {
        let Some(link) = entry.link else {
            warn!(feed = %self.feed.id, title = ?entry.title, "entry has no link, skipping");
            return Ok(None);
        };
        if !self.include_entry(store, &link)? {
            return Ok(None);
        }
        let Some(published) = entry.published else {
            warn!(feed = %self.feed.id, %link, "entry has no usable date, skipping");
            return Ok(None);
        };

        let item = NewItem {
            feed: self.feed.id,
            content: entry.summary,
            author: handler.title().unwrap_or(&self.feed.title).to_string(),
            link,
            published,
        };
        Ok(Some(store.create_item(item, None)?))
    }

    fn template_name(&self) -> &'static str {
        "lifestreams/rss/item.html"
    }
}
