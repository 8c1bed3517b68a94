//! Test doubles for [`Sources`].

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{TimeZone, Utc};

use crate::error::{FeedError, FeedResult};
use crate::model::{InstagramCredential, PluginKind, RssCredential, TwitterCredential};
use crate::source::{
    BoxedHandler, Cursor, Entry, Media, MediaCaption, MediaImage, MediaImages, MediaUser,
    SourceHandler, Sources, Tweet, TwitterUser,
};

/// One `SourceHandler::update` call seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub source: PluginKind,
    pub cursor: Option<Cursor>,
}

/// Serves canned records and records every fetch. Like the real APIs,
/// Twitter and Instagram fetches only return records newer than the cursor.
#[derive(Default)]
pub struct FakeSources {
    calls: Rc<RefCell<Vec<Call>>>,
    tweets: Vec<Tweet>,
    media: Vec<Media>,
    rss_title: String,
    entries: Vec<Entry>,
    failing: Vec<PluginKind>,
}

impl FakeSources {
    pub fn new() -> Self {
        Self {
            rss_title: "Fake Feed".into(),
            ..Self::default()
        }
    }

    pub fn with_tweets(mut self, tweets: Vec<Tweet>) -> Self {
        self.tweets = tweets;
        self
    }

    pub fn with_media(mut self, media: Vec<Media>) -> Self {
        self.media = media;
        self
    }

    pub fn with_rss(mut self, title: &str, entries: Vec<Entry>) -> Self {
        self.rss_title = title.into();
        self.entries = entries;
        self
    }

    /// Make every fetch from `kind` fail with a source error.
    pub fn failing(mut self, kind: PluginKind) -> Self {
        self.failing.push(kind);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn tweet(id: &str, text: &str) -> Tweet {
        Tweet {
            id_str: id.into(),
            text: text.into(),
            created_at: "Wed Oct 10 20:19:24 +0000 2018".into(),
            user: TwitterUser {
                screen_name: "someone".into(),
                name: "Some One".into(),
            },
        }
    }

    pub fn media(id: &str, caption: Option<&str>) -> Media {
        Media {
            id: id.into(),
            link: format!("http://instagr.am/p/{id}/"),
            created_time: "1296710327".into(),
            user: MediaUser {
                username: "kevin".into(),
            },
            caption: caption.map(|text| MediaCaption { text: text.into() }),
            images: MediaImages {
                standard_resolution: MediaImage {
                    url: format!("http://example.com/{id}.jpg"),
                },
            },
        }
    }

    /// An entry linking to `link`, published on 2012-06-`day`.
    pub fn entry(link: &str, day: u32) -> Entry {
        Entry {
            title: Some(format!("Post {link}")),
            link: Some(link.into()),
            summary: format!("Summary of {link}"),
            published: Some(Utc.with_ymd_and_hms(2012, 6, day, 0, 0, 0).unwrap()),
        }
    }

    fn handler<R: Clone + 'static>(
        &self,
        source: PluginKind,
        records: &[R],
        title: Option<&str>,
        id: fn(&R) -> Option<&str>,
    ) -> BoxedHandler<R> {
        Box::new(FakeHandler {
            source,
            calls: Rc::clone(&self.calls),
            records: records.to_vec(),
            title: title.map(String::from),
            fetched_title: None,
            fail: self.failing.contains(&source),
            id,
        })
    }
}

impl Sources for FakeSources {
    fn twitter(&self, _credential: &TwitterCredential) -> FeedResult<BoxedHandler<Tweet>> {
        Ok(self.handler(PluginKind::Twitter, &self.tweets, None, |t| {
            Some(t.id_str.as_str())
        }))
    }

    fn instagram(&self, _credential: &InstagramCredential) -> FeedResult<BoxedHandler<Media>> {
        Ok(self.handler(PluginKind::Instagram, &self.media, None, |m| {
            Some(m.id.as_str())
        }))
    }

    fn rss(&self, _credential: &RssCredential) -> FeedResult<BoxedHandler<Entry>> {
        Ok(self.handler(PluginKind::Rss, &self.entries, Some(&self.rss_title), |_| None))
    }
}

struct FakeHandler<R> {
    source: PluginKind,
    calls: Rc<RefCell<Vec<Call>>>,
    records: Vec<R>,
    title: Option<String>,
    fetched_title: Option<String>,
    fail: bool,
    /// Source id of a record, for sources with a cursor.
    id: fn(&R) -> Option<&str>,
}

impl<R: Clone> SourceHandler for FakeHandler<R> {
    type Record = R;

    fn update(&mut self, cursor: Option<&Cursor>) -> FeedResult<Vec<R>> {
        self.calls.borrow_mut().push(Call {
            source: self.source,
            cursor: cursor.cloned(),
        });
        if self.fail {
            return Err(FeedError::Source(format!("{} is down", self.source)));
        }
        self.fetched_title = self.title.clone();
        let id = self.id;
        Ok(self
            .records
            .iter()
            .filter(|record| match (cursor, id(record)) {
                (Some(cursor), Some(id)) => newer_than(id, cursor),
                _ => true,
            })
            .cloned()
            .collect())
    }

    fn title(&self) -> Option<&str> {
        self.fetched_title.as_deref()
    }
}

fn newer_than(id: &str, cursor: &Cursor) -> bool {
    let (_, since) = cursor.query_param();
    match (id.parse::<u64>(), since.parse::<u64>()) {
        (Ok(id), Ok(since)) => id > since,
        _ => true,
    }
}
