//! Batch update of every configured feed.
//!
//! Feeds are updated one after another on the calling thread. The two
//! expected failures of [`FeedError`] are logged and recorded per feed so a
//! broken account never stops the rest of the batch; anything else is a
//! defect and ends the run.
//!
//! ## For contributors
//!
//! Cancellation is only observed between feeds: an in-flight request always
//! finishes (or times out) before the run stops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, info_span, warn};

use crate::error::FeedResult;
use crate::model::FeedId;
use crate::plugin::UpdateOutcome;
use crate::source::Sources;
use crate::store::Store;

/// A feed the run skipped after a recoverable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFailure {
    pub feed: FeedId,
    pub error: String,
}

/// Summary of one [`UpdateDriver::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub updated: Vec<(FeedId, UpdateOutcome)>,
    /// Feeds left alone because they are not fetchable.
    pub paused: Vec<FeedId>,
    pub failed: Vec<FeedFailure>,
    /// Set when the run stopped early on request.
    pub cancelled: bool,
}

impl RunReport {
    /// Items created across all updated feeds.
    pub fn created(&self) -> usize {
        self.updated.iter().map(|(_, outcome)| outcome.created).sum()
    }
}

pub struct UpdateDriver<'a> {
    store: &'a dyn Store,
    sources: &'a dyn Sources,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> UpdateDriver<'a> {
    pub fn new(store: &'a dyn Store, sources: &'a dyn Sources) -> Self {
        Self {
            store,
            sources,
            cancel: None,
        }
    }

    /// Stop before the next feed once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Update all feeds, or only those of the lifestream called `lifestream`.
    pub fn run(&self, lifestream: Option<&str>) -> FeedResult<RunReport> {
        let filter = match lifestream {
            Some(name) => match self.store.lifestream_by_name(name)? {
                Some(ls) => Some(ls.id),
                None => {
                    warn!(lifestream = name, "no such lifestream, nothing to update");
                    return Ok(RunReport::default());
                }
            },
            None => None,
        };

        let mut report = RunReport::default();
        for feed in self.store.feeds(filter)? {
            if self.cancelled() {
                info!("update cancelled");
                report.cancelled = true;
                break;
            }

            let _span = info_span!("feed", feed = %feed.id, plugin = %feed.plugin).entered();
            match feed.update(self.store, self.sources) {
                Ok(Some(outcome)) => {
                    info!(
                        title = %feed.title,
                        fetched = outcome.fetched,
                        created = outcome.created,
                        "feed updated"
                    );
                    report.updated.push((feed.id, outcome));
                }
                Ok(None) => report.paused.push(feed.id),
                Err(err) if err.is_recoverable() => {
                    warn!(title = %feed.title, error = %err, "feed update failed");
                    report.failed.push(FeedFailure {
                        feed: feed.id,
                        error: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(report)
    }
}

/// Update every feed, or the feeds of one lifestream.
pub fn update_lifestreams(
    store: &dyn Store,
    sources: &dyn Sources,
    lifestream: Option<&str>,
) -> FeedResult<RunReport> {
    UpdateDriver::new(store, sources).run(lifestream)
}

// ---- Tests ----
