//! Error types for the update pipeline.
//!
//! Two conditions are *expected* while polling external sources and are
//! handled per feed by the [`UpdateDriver`](crate::driver::UpdateDriver):
//!
//! * [`FeedError::NotConfigured`]: the feed lacks the credential its plugin
//!   needs. The user has to link the account again.
//! * [`FeedError::Source`]: the remote API or transport failed. Waiting and
//!   polling again later is the remedy.
//!
//! Every other variant describes a defect (broken storage, an unknown plugin
//! selector, a corrupted cursor chain) and must propagate to the caller.

use thiserror::Error;

use crate::model::ItemId;
use crate::store::StoreError;

pub type FeedResult<T> = Result<T, FeedError>;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed has no usable credential for its plugin.
    #[error("feed is not configured: {reason}")]
    NotConfigured { reason: String },

    /// The external source rejected or failed the request.
    #[error("source error: {0}")]
    Source(String),

    /// A plugin selector did not resolve to a known plugin.
    #[error("unknown feed plugin `{0}`")]
    UnknownPlugin(String),

    /// The latest item of a feed has no extension record to read the
    /// incremental-fetch cursor from.
    #[error("item {item} has no {expected} record to derive an update cursor from")]
    BrokenCursor { item: ItemId, expected: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FeedError {
    pub fn not_configured(reason: impl Into<String>) -> Self {
        FeedError::NotConfigured {
            reason: reason.into(),
        }
    }

    /// Wrap any displayable upstream failure as a [`FeedError::Source`].
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        FeedError::Source(err.to_string())
    }

    /// `true` for the two conditions a batch run logs and skips.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeedError::NotConfigured { .. } | FeedError::Source(_))
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::upstream(err)
    }
}
