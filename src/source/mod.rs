//! Source handlers: thin wrappers around one external API each.
//!
//! A handler performs exactly **one** request per [`SourceHandler::update`]
//! call, returns that source's records, and turns every transport or API
//! failure into [`FeedError::Source`]. It never retries; retrying is the
//! scheduler's business.
//!
//! Plugins never build handlers directly. They go through [`Sources`], which
//! the binary implements with [`HttpSources`] and tests replace with fakes.
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a file in this directory with the record type and a handler
//!    implementing [`SourceHandler`].
//! 2. Add a constructor for it to [`Sources`] and [`HttpSources`].
//! 3. Write the matching plugin under `src/plugin/`.

mod http;
mod instagram;
mod oauth;
mod rss;
mod twitter;

pub use instagram::{InstagramHandler, Media, MediaCaption, MediaImage, MediaImages, MediaUser};
pub use rss::{parse_feed, Entry, RssHandler};
pub use twitter::{Tweet, TwitterHandler, TwitterUser};

use reqwest::blocking::Client;

use crate::config::Config;
use crate::error::{FeedError, FeedResult};
use crate::model::{InstagramCredential, RssCredential, TwitterCredential};

/// Incremental-fetch marker handed to a handler so only newer records come
/// back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Twitter: only tweets newer than this id.
    SinceId(String),
    /// Instagram: only media newer than this id.
    MinId(String),
}

impl Cursor {
    /// Query parameter name and value understood by the source.
    pub fn query_param(&self) -> (&'static str, &str) {
        match self {
            Cursor::SinceId(id) => ("since_id", id),
            Cursor::MinId(id) => ("min_id", id),
        }
    }
}

/// One external source, bound to one feed's credentials.
pub trait SourceHandler {
    type Record;

    /// Fetch records, newer than `cursor` when the source supports it.
    fn update(&mut self, cursor: Option<&Cursor>) -> FeedResult<Vec<Self::Record>>;

    /// Feed-level title captured by the last [`update`](Self::update), for
    /// sources that carry one.
    fn title(&self) -> Option<&str> {
        None
    }
}

pub type BoxedHandler<R> = Box<dyn SourceHandler<Record = R>>;

/// Factory for handlers.
pub trait Sources {
    fn twitter(&self, credential: &TwitterCredential) -> FeedResult<BoxedHandler<Tweet>>;

    fn instagram(&self, credential: &InstagramCredential) -> FeedResult<BoxedHandler<Media>>;

    fn rss(&self, credential: &RssCredential) -> FeedResult<BoxedHandler<Entry>>;
}

/// [`Sources`] backed by real HTTP requests.
pub struct HttpSources {
    client: Client,
    config: Config,
}

impl HttpSources {
    /// Build the shared blocking client. Every request it sends is bounded
    /// by `config.http.timeout_secs`.
    pub fn new(config: &Config) -> FeedResult<Self> {
        Ok(Self {
            client: http::client(&config.http)?,
            config: config.clone(),
        })
    }
}

impl Sources for HttpSources {
    fn twitter(&self, credential: &TwitterCredential) -> FeedResult<BoxedHandler<Tweet>> {
        let app = &self.config.twitter;
        if app.consumer_key.is_empty() || app.consumer_secret.is_empty() {
            return Err(FeedError::not_configured(
                "twitter consumer key/secret missing from configuration",
            ));
        }
        Ok(Box::new(TwitterHandler::new(
            self.client.clone(),
            app,
            credential,
        )))
    }

    fn instagram(&self, credential: &InstagramCredential) -> FeedResult<BoxedHandler<Media>> {
        Ok(Box::new(InstagramHandler::new(
            self.client.clone(),
            &self.config.instagram.api_base,
            &credential.access_token,
        )))
    }

    fn rss(&self, credential: &RssCredential) -> FeedResult<BoxedHandler<Entry>> {
        Ok(Box::new(RssHandler::new(self.client.clone(), &credential.url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_maps_to_source_parameter() {
        assert_eq!(Cursor::SinceId("2".into()).query_param(), ("since_id", "2"));
        assert_eq!(Cursor::MinId("abc".into()).query_param(), ("min_id", "abc"));
    }

    #[test]
    fn twitter_needs_app_credentials() {
        let sources = HttpSources::new(&Config::default()).unwrap();
        let credential = TwitterCredential {
            access_token: "t".into(),
            access_token_secret: "s".into(),
            screen_name: "someone".into(),
        };
        let err = sources.twitter(&credential).err().unwrap();
        assert!(matches!(err, FeedError::NotConfigured { .. }));
    }
}
