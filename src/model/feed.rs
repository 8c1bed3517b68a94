use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedId, LifestreamId};
use crate::error::FeedError;

/// A user's named timeline, grouping feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifestream {
    pub id: LifestreamId,
    pub name: String,
}

/// One configured source within a lifestream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: FeedId,
    pub lifestream: LifestreamId,
    pub title: String,
    /// Which plugin governs this feed. Fixed at creation.
    pub plugin: PluginKind,
    /// Display rank; feeds are listed by `(ordering, created)`.
    pub ordering: i32,
    /// When `false`, [`Feed::update`] is a no-op.
    pub fetchable: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Fields supplied by the caller when creating a feed; the store fills in
/// the id and the timestamps.
#[derive(Debug, Clone)]
pub struct NewFeed {
    pub title: String,
    pub plugin: PluginKind,
    pub ordering: i32,
}

impl NewFeed {
    pub fn new(title: impl Into<String>, plugin: PluginKind) -> Self {
        Self {
            title: title.into(),
            plugin,
            ordering: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin selector
// ---------------------------------------------------------------------------

/// Closed set of feed plugins.
///
/// Persisted as its selector string. Parsing goes through [`REGISTRY`], so an
/// unknown selector is rejected as soon as a feed is created or loaded rather
/// than on its first update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PluginKind {
    Twitter,
    Instagram,
    Rss,
}

/// Selector string → plugin variant.
const REGISTRY: &[(&str, PluginKind)] = &[
    ("twitter", PluginKind::Twitter),
    ("instagram", PluginKind::Instagram),
    ("rss", PluginKind::Rss),
];

impl PluginKind {
    pub const ALL: [PluginKind; 3] = [PluginKind::Twitter, PluginKind::Instagram, PluginKind::Rss];

    pub fn from_selector(selector: &str) -> Result<Self, FeedError> {
        REGISTRY
            .iter()
            .find(|(name, _)| *name == selector)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| FeedError::UnknownPlugin(selector.to_string()))
    }

    pub fn selector(self) -> &'static str {
        match self {
            PluginKind::Twitter => "twitter",
            PluginKind::Instagram => "instagram",
            PluginKind::Rss => "rss",
        }
    }

    /// Label used when no display label is configured.
    pub fn default_label(self) -> &'static str {
        match self {
            PluginKind::Twitter => "Twitter",
            PluginKind::Instagram => "Instagram",
            PluginKind::Rss => "RSS",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl FromStr for PluginKind {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_selector(s)
    }
}

impl TryFrom<String> for PluginKind {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_selector(&value)
    }
}

impl From<PluginKind> for String {
    fn from(kind: PluginKind) -> Self {
        kind.selector().to_string()
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Per-feed data a source needs to locate or authenticate content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Credential {
    Twitter(TwitterCredential),
    Instagram(InstagramCredential),
    Rss(RssCredential),
}

impl Credential {
    pub fn kind(&self) -> PluginKind {
        match self {
            Credential::Twitter(_) => PluginKind::Twitter,
            Credential::Instagram(_) => PluginKind::Instagram,
            Credential::Rss(_) => PluginKind::Rss,
        }
    }
}

/// User-level Twitter tokens. The app-level consumer key and secret are
/// deployment configuration, see [`crate::config::TwitterConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterCredential {
    pub access_token: String,
    pub access_token_secret: String,
    pub screen_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramCredential {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssCredential {
    pub url: String,
}
