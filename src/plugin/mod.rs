//! Feed plugins: one per source, each turning a feed's source records into
//! persisted items.
//!
//! [`FeedPlugin::update`] is the whole per-feed pipeline and is shared by
//! every plugin:
//!
//! 1. [`handler`](FeedPlugin::handler): build the source handler from the
//!    feed's credential, or fail with `NotConfigured`.
//! 2. [`update_cursor`](FeedPlugin::update_cursor): derive the
//!    incremental-fetch cursor from the feed's latest item.
//! 3. One fetch through the handler.
//! 4. [`check_record`](FeedPlugin::check_record) for every record, then
//!    [`create_item`](FeedPlugin::create_item) for each, in the order the
//!    source returned them.
//!
//! ## For contributors: adding a plugin
//!
//! Add a variant to [`PluginKind`] and its registry, a file here
//! implementing [`FeedPlugin`], and a matching arm in [`Plugin`].

mod instagram;
mod rss;
mod twitter;

pub use instagram::InstagramPlugin;
pub use rss::RssPlugin;
pub use twitter::TwitterPlugin;

use tracing::debug;

use crate::error::{FeedError, FeedResult};
use crate::model::{Credential, Extension, Feed, Item, PluginKind};
use crate::source::{BoxedHandler, Cursor, SourceHandler, Sources};
use crate::store::Store;

/// What one [`FeedPlugin::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Records returned by the source.
    pub fetched: usize,
    /// Items persisted.
    pub created: usize,
    /// Records dropped as duplicates or unusable.
    pub skipped: usize,
}

pub trait FeedPlugin {
    type Record: 'static;

    fn feed(&self) -> &Feed;

    fn handler(
        &self,
        store: &dyn Store,
        sources: &dyn Sources,
    ) -> FeedResult<BoxedHandler<Self::Record>>;

    /// Cursor for the next fetch; `None` when the feed has no items yet or
    /// the source has no incremental fetch.
    fn update_cursor(&self, store: &dyn Store) -> FeedResult<Option<Cursor>>;

    /// Persist one record. Returns `None` when the record was skipped.
    fn create_item(
        &self,
        store: &dyn Store,
        handler: &dyn SourceHandler<Record = Self::Record>,
        record: Self::Record,
    ) -> FeedResult<Option<Item>>;

    /// Reject a record that could not be persisted. Runs on the whole fetch
    /// before any item is written: one bad record stores nothing.
    fn check_record(&self, _record: &Self::Record) -> FeedResult<()> {
        Ok(())
    }

    /// Template the rendering layer uses for this plugin's items.
    fn template_name(&self) -> &'static str;

    fn update(&self, store: &dyn Store, sources: &dyn Sources) -> FeedResult<UpdateOutcome> {
        let mut handler = self.handler(store, sources)?;
        let cursor = self.update_cursor(store)?;
        debug!(feed = %self.feed().id, ?cursor, "fetching");
        let records = handler.update(cursor.as_ref())?;
        for record in &records {
            self.check_record(record)?;
        }

        let mut outcome = UpdateOutcome {
            fetched: records.len(),
            ..UpdateOutcome::default()
        };
        for record in records {
            match self.create_item(store, handler.as_ref(), record)? {
                Some(_) => outcome.created += 1,
                None => outcome.skipped += 1,
            }
        }
        Ok(outcome)
    }
}

/// A feed's plugin, resolved from its [`PluginKind`].
#[derive(Debug, Clone)]
pub enum Plugin {
    Twitter(TwitterPlugin),
    Instagram(InstagramPlugin),
    Rss(RssPlugin),
}

impl Plugin {
    pub fn kind(&self) -> PluginKind {
        match self {
            Plugin::Twitter(_) => PluginKind::Twitter,
            Plugin::Instagram(_) => PluginKind::Instagram,
            Plugin::Rss(_) => PluginKind::Rss,
        }
    }

    pub fn update(&self, store: &dyn Store, sources: &dyn Sources) -> FeedResult<UpdateOutcome> {
        match self {
            Plugin::Twitter(p) => p.update(store, sources),
            Plugin::Instagram(p) => p.update(store, sources),
            Plugin::Rss(p) => p.update(store, sources),
        }
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            Plugin::Twitter(p) => p.template_name(),
            Plugin::Instagram(p) => p.template_name(),
            Plugin::Rss(p) => p.template_name(),
        }
    }
}

impl Feed {
    /// The plugin governing this feed.
    pub fn plugin(&self) -> Plugin {
        match self.plugin {
            PluginKind::Twitter => Plugin::Twitter(TwitterPlugin::new(self.clone())),
            PluginKind::Instagram => Plugin::Instagram(InstagramPlugin::new(self.clone())),
            PluginKind::Rss => Plugin::Rss(RssPlugin::new(self.clone())),
        }
    }

    /// Run this feed's update. `Ok(None)` when the feed is not fetchable, in
    /// which case nothing is fetched or written.
    pub fn update(
        &self,
        store: &dyn Store,
        sources: &dyn Sources,
    ) -> FeedResult<Option<UpdateOutcome>> {
        if !self.fetchable {
            return Ok(None);
        }
        self.plugin().update(store, sources).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the plugins
// ---------------------------------------------------------------------------

/// `NotConfigured` for a feed whose credential is missing or belongs to
/// another source.
fn not_configured(feed: &Feed, found: Option<&Credential>) -> FeedError {
    match found {
        Some(credential) => FeedError::not_configured(format!(
            "feed {} has a {} credential but uses the {} plugin",
            feed.id,
            credential.kind(),
            feed.plugin
        )),
        None => FeedError::not_configured(format!(
            "feed {} has no {} credential",
            feed.id, feed.plugin
        )),
    }
}

/// The extension to derive the feed's update cursor from.
///
/// Sources return newest first, so records sharing the latest `published`
/// time are stored newest first too; among those items the greatest source
/// id wins. `Ok(None)` when the feed has no items. An item without an
/// extension is a broken cursor chain and is reported as
/// [`FeedError::BrokenCursor`].
fn latest_extension(
    store: &dyn Store,
    feed: &Feed,
    expected: &'static str,
) -> FeedResult<Option<Extension>> {
    let mut latest: Option<Extension> = None;
    for item in store.latest_items(feed.id)? {
        let extension = match store.extension(item.id)? {
            Some(extension) if extension.name() == expected => extension,
            _ => {
                return Err(FeedError::BrokenCursor {
                    item: item.id,
                    expected,
                })
            }
        };
        let newer = latest.as_ref().map_or(true, |best| {
            source_id_key(extension.source_id()) > source_id_key(best.source_id())
        });
        if newer {
            latest = Some(extension);
        }
    }
    Ok(latest)
}

/// Sort key for source ids. Tweet ids are decimal and Instagram ids are
/// `<media>_<user>`, so the leading number is compared numerically.
fn source_id_key(id: &str) -> (Option<u128>, &str) {
    let number = id.split('_').next().and_then(|n| n.parse().ok());
    (number, id)
}
