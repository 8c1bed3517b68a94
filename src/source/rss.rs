//! RSS (and Atom) feed source.
//!
//! Feeds have no incremental-fetch parameter: every poll returns the whole
//! document and the RSS plugin deduplicates entries by link. The feed-level
//! title is captured on each poll and used as the author of every entry.
//!
//! Documents are parsed as RSS 2.0 first, then as Atom.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use tracing::debug;

use super::{http, Cursor, SourceHandler};
use crate::error::{FeedError, FeedResult};

/// One feed entry, before it becomes an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: Option<String>,
    pub link: Option<String>,
    /// Description, falling back to full content, then the title.
    pub summary: String,
    /// `None` when the entry had no date or it did not parse.
    pub published: Option<DateTime<Utc>>,
}

/// An RSS or Atom feed reachable at a URL.
pub struct RssHandler {
    client: Client,
    url: String,
    title: Option<String>,
}

impl RssHandler {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            title: None,
        }
    }
}

impl SourceHandler for RssHandler {
    type Record = Entry;

    fn update(&mut self, _cursor: Option<&Cursor>) -> FeedResult<Vec<Entry>> {
        let body = http::send_ok(self.client.get(&self.url))?;
        let (title, entries) = parse_feed(&body)?;
        debug!(url = %self.url, count = entries.len(), "fetched feed");
        self.title = Some(title);
        Ok(entries)
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

/// Parse a fetched document into its title and entries.
///
/// Pure (no I/O). A document that is neither RSS nor Atom, or that has no
/// title, is a [`FeedError::Source`].
pub fn parse_feed(body: &[u8]) -> FeedResult<(String, Vec<Entry>)> {
    let (title, entries) = match rss::Channel::read_from(body) {
        Ok(channel) => parse_channel(&channel),
        Err(rss_err) => match atom_syndication::Feed::read_from(body) {
            Ok(feed) => parse_atom(&feed),
            Err(atom_err) => {
                return Err(FeedError::Source(format!(
                    "not an RSS ({rss_err}) or Atom ({atom_err}) document"
                )))
            }
        },
    };
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(FeedError::Source("feed has no title".into()));
    }
    Ok((title, entries))
}

fn parse_channel(channel: &rss::Channel) -> (String, Vec<Entry>) {
    let entries = channel
        .items()
        .iter()
        .map(|item| Entry {
            title: item.title().map(String::from),
            // A permalink <guid> stands in for a missing <link>.
            link: item.link().map(String::from).or_else(|| {
                item.guid()
                    .filter(|guid| guid.is_permalink())
                    .map(|guid| guid.value().to_string())
            }),
            summary: item
                .description()
                .or_else(|| item.content())
                .or_else(|| item.title())
                .unwrap_or_default()
                .to_string(),
            published: item.pub_date().and_then(parse_date),
        })
        .collect();
    (channel.title().to_string(), entries)
}

fn parse_atom(feed: &atom_syndication::Feed) -> (String, Vec<Entry>) {
    let entries = feed
        .entries()
        .iter()
        .map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .map(|l| l.href().to_string());
            let summary = entry
                .summary()
                .map(|s| s.value.clone())
                .or_else(|| entry.content().and_then(|c| c.value()).map(String::from))
                .unwrap_or_else(|| entry.title().value.clone());
            let published = entry.published().unwrap_or(entry.updated());
            Entry {
                title: Some(entry.title().value.clone()),
                link,
                summary,
                published: Some(published.with_timezone(&Utc)),
            }
        })
        .collect();
    (feed.title().value.clone(), entries)
}

/// RFC 2822 as RSS requires, RFC 3339 as many feeds send anyway.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
