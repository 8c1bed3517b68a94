//! Entities shared by the store, the plugins and the driver.
//!
//! Everything here is plain data: no I/O and no knowledge of any particular
//! source. Source-specific state lives in [`Credential`] (how to reach a
//! source) and [`Extension`] (what a source needs to remember per item).

mod feed;
mod item;

pub use feed::{
    Credential, Feed, InstagramCredential, Lifestream, NewFeed, PluginKind, RssCredential,
    TwitterCredential,
};
pub use item::{Extension, Item, NewItem};

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Primary key of a [`Lifestream`].
    LifestreamId
);
id_type!(
    /// Primary key of a [`Feed`].
    FeedId
);
id_type!(
    /// Primary key of an [`Item`].
    ItemId
);
