use super::{latest_extension, not_configured, FeedPlugin};
use crate::error::FeedResult;
use crate::model::{Credential, Extension, Feed, Item, NewItem};
use crate::source::{BoxedHandler, Cursor, SourceHandler, Sources, Tweet};
use crate::store::Store;

/// Mirrors a user's tweets.
///
/// `since_id` from the latest stored tweet keeps each poll to new tweets
/// only, so records are not re-checked against the store.
#[derive(Debug, Clone)]
pub struct TwitterPlugin {
    feed: Feed,
}

impl TwitterPlugin {
    pub fn new(feed: Feed) -> Self {
        Self { feed }
    }
}

impl FeedPlugin for TwitterPlugin {
    type Record = Tweet;

    fn feed(&self) -> &Feed {
        &self.feed
    }

    fn handler(&self, store: &dyn Store, sources: &dyn Sources) -> FeedResult<BoxedHandler<Tweet>> {
        match store.credential(self.feed.id)? {
            Some(Credential::Twitter(credential)) => sources.twitter(&credential),
            other => Err(not_configured(&self.feed, other.as_ref())),
        }
    }

    fn update_cursor(&self, store: &dyn Store) -> FeedResult<Option<Cursor>> {
        Ok(match latest_extension(store, &self.feed, "tweet")? {
            Some(Extension::Tweet { tweet_id }) => Some(Cursor::SinceId(tweet_id)),
            _ => None,
        })
    }

    fn create_item(
        &self,
        store: &dyn Store,
        _handler: &dyn SourceHandler<Record = Tweet>,
        tweet: Tweet,
    ) -> FeedResult<Option<Item>> {
        let item = NewItem {
            feed: self.feed.id,
            content: tweet.text.clone(),
            author: tweet.author().to_string(),
            link: tweet.permalink(),
            published: tweet.published()?,
        };
        let extension = Extension::Tweet {
            tweet_id: tweet.id_str,
        };
        Ok(Some(store.create_item(item, Some(extension))?))
    }

    fn check_record(&self, tweet: &Tweet) -> FeedResult<()> {
        tweet.published().map(|_| ())
    }

    fn template_name(&self) -> &'static str {
        "lifestreams/twitter/item.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::model::{NewFeed, PluginKind, TwitterCredential};
    use crate::store::MemoryStore;
    use crate::testing::FakeSources;
    use chrono::{TimeZone, Utc};

    fn setup() -> (MemoryStore, Feed) {
        let store = MemoryStore::new();
        let ls = store.get_or_create_lifestream("dummy").unwrap();
        let feed = store
            .create_feed(ls.id, NewFeed::new("twitter", PluginKind::Twitter))
            .unwrap();
        store
            .set_credential(
                feed.id,
                Credential::Twitter(TwitterCredential {
                    access_token: "token".into(),
                    access_token_secret: "secret".into(),
                    screen_name: "someone".into(),
                }),
            )
            .unwrap();
        (store, feed)
    }

    fn stored_tweet(store: &MemoryStore, feed: &Feed, id: &str, day: u32) {
        store
            .create_item(
                NewItem {
                    feed: feed.id,
                    content: "tweet".into(),
                    author: "someone".into(),
                    link: format!("https://twitter.com/someone/status/{id}"),
                    published: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
                },
                Some(Extension::Tweet {
                    tweet_id: id.into(),
                }),
            )
            .unwrap();
    }

    #[test]
    fn no_cursor_without_items() {
        let (store, feed) = setup();
        assert_eq!(TwitterPlugin::new(feed).update_cursor(&store).unwrap(), None);
    }

    #[test]
    fn cursor_is_latest_tweet_id() {
        let (store, feed) = setup();
        stored_tweet(&store, &feed, "1", 1);
        stored_tweet(&store, &feed, "2", 2);

        let sources = FakeSources::new();
        TwitterPlugin::new(feed).update(&store, &sources).unwrap();

        let calls = sources.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].cursor, Some(Cursor::SinceId("2".into())));
    }

    #[test]
    fn creates_item_with_extension() {
        let (store, feed) = setup();
        let sources = FakeSources::new().with_tweets(vec![FakeSources::tweet("10", "hello")]);

        let outcome = TwitterPlugin::new(feed.clone()).update(&store, &sources).unwrap();
        assert_eq!(outcome.created, 1);

        let item = store.latest_item(feed.id).unwrap().unwrap();
        assert_eq!(item.content, "hello");
        assert_eq!(item.author, "Some One");
        assert_eq!(item.link, "https://twitter.com/someone/status/10");
        assert_eq!(
            store.extension(item.id).unwrap(),
            Some(Extension::Tweet {
                tweet_id: "10".into()
            })
        );
    }

    #[test]
    fn second_run_asks_only_for_newer_tweets() {
        let (store, feed) = setup();
        let sources = FakeSources::new().with_tweets(vec![FakeSources::tweet("10", "hello")]);
        let plugin = TwitterPlugin::new(feed.clone());

        plugin.update(&store, &sources).unwrap();
        // A source honouring since_id returns nothing new.
        let quiet = FakeSources::new();
        let outcome = plugin.update(&store, &quiet).unwrap();

        assert_eq!(outcome.created, 0);
        assert_eq!(quiet.calls()[0].cursor, Some(Cursor::SinceId("10".into())));
        assert_eq!(store.timeline(feed.lifestream).unwrap().len(), 1);
    }

    #[test]
    fn rerun_after_same_second_tweets_stores_no_duplicate() {
        let (store, feed) = setup();
        // Newest first, both posted in the same second; "9" < "10" only
        // numerically.
        let sources = FakeSources::new().with_tweets(vec![
            FakeSources::tweet("10", "newer"),
            FakeSources::tweet("9", "older"),
        ]);
        let plugin = TwitterPlugin::new(feed.clone());
        plugin.update(&store, &sources).unwrap();

        assert_eq!(
            plugin.update_cursor(&store).unwrap(),
            Some(Cursor::SinceId("10".into()))
        );

        let outcome = plugin.update(&store, &sources).unwrap();
        assert_eq!(outcome.created, 0);
        assert_eq!(store.timeline(feed.lifestream).unwrap().len(), 2);
    }

    #[test]
    fn malformed_date_stores_nothing() {
        let (store, feed) = setup();
        let mut bad = FakeSources::tweet("9", "older");
        bad.created_at = "yesterday".into();
        let sources =
            FakeSources::new().with_tweets(vec![FakeSources::tweet("10", "newer"), bad]);

        let err = TwitterPlugin::new(feed.clone()).update(&store, &sources).unwrap_err();

        assert!(matches!(err, FeedError::Source(_)));
        assert_eq!(store.latest_item(feed.id).unwrap(), None);
        assert_eq!(TwitterPlugin::new(feed).update_cursor(&store).unwrap(), None);
    }

    #[test]
    fn latest_item_without_extension_is_a_broken_cursor() {
        let (store, feed) = setup();
        store
            .create_item(
                NewItem {
                    feed: feed.id,
                    content: "orphan".into(),
                    author: "someone".into(),
                    link: "https://twitter.com/someone/status/5".into(),
                    published: Utc::now(),
                },
                None,
            )
            .unwrap();

        let err = TwitterPlugin::new(feed).update_cursor(&store).unwrap_err();
        assert!(matches!(err, FeedError::BrokenCursor { expected: "tweet", .. }));
        assert!(!err.is_recoverable());
    }
}
