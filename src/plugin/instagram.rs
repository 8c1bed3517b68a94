use super::{latest_extension, not_configured, FeedPlugin};
use crate::error::FeedResult;
use crate::model::{Credential, Extension, Feed, Item, NewItem};
use crate::source::{BoxedHandler, Cursor, Media, SourceHandler, Sources};
use crate::store::Store;

/// Mirrors a user's recent Instagram media. Like Twitter, it relies on the
/// `min_id` cursor rather than re-checking the store for duplicates.
#[derive(Debug, Clone)]
pub struct InstagramPlugin {
    feed: Feed,
}

impl InstagramPlugin {
    pub fn new(feed: Feed) -> Self {
        Self { feed }
    }
}

impl FeedPlugin for InstagramPlugin {
    type Record = Media;

    fn feed(&self) -> &Feed {
        &self.feed
    }

    fn handler(&self, store: &dyn Store, sources: &dyn Sources) -> FeedResult<BoxedHandler<Media>> {
        match store.credential(self.feed.id)? {
            Some(Credential::Instagram(credential)) => sources.instagram(&credential),
            other => Err(not_configured(&self.feed, other.as_ref())),
        }
    }

    fn update_cursor(&self, store: &dyn Store) -> FeedResult<Option<Cursor>> {
        Ok(match latest_extension(store, &self.feed, "media")? {
            Some(Extension::Media { instagram_id, .. }) => Some(Cursor::MinId(instagram_id)),
            _ => None,
        })
    }

    fn create_item(
        &self,
        store: &dyn Store,
        _handler: &dyn SourceHandler<Record = Media>,
        media: Media,
    ) -> FeedResult<Option<Item>> {
        let item = NewItem {
            feed: self.feed.id,
            content: media.images.standard_resolution.url.clone(),
            author: media.user.username.clone(),
            link: media.link.clone(),
            published: media.published()?,
        };
        let extension = Extension::Media {
            caption: media.caption_text().to_string(),
            instagram_id: media.id,
        };
        Ok(Some(store.create_item(item, Some(extension))?))
    }

    fn check_record(&self, media: &Media) -> FeedResult<()> {
        media.published().map(|_| ())
    }

    fn template_name(&self) -> &'static str {
        "lifestreams/instagram/item.html"
    }
}
