use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use lifestreams::config::Config;
use lifestreams::model::{
    Credential, FeedId, InstagramCredential, NewFeed, PluginKind, RssCredential,
    TwitterCredential,
};
use lifestreams::source::HttpSources;
use lifestreams::store::{MemoryStore, Store};
use lifestreams::{RunReport, UpdateDriver};

use crate::cli::{AddSource, FeedArgs};

/// Default location of the data file.
pub fn default_data_path() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("no data directory for this platform; pass --data")?;
    Ok(dir.join("lifestreams").join("lifestreams.json"))
}

pub fn open(path: &Path) -> Result<MemoryStore> {
    MemoryStore::open(path).with_context(|| format!("opening data file {}", path.display()))
}

fn save(store: &MemoryStore) -> Result<()> {
    store.save().context("saving data file")
}

/// Run the batch update off the async runtime. Ctrl-C stops the run after
/// the feed in progress; whatever was fetched until then is kept.
pub async fn update(config: &Config, data: PathBuf, lifestream: Option<String>) -> Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let config = config.clone();

    let task = tokio::task::spawn_blocking(move || -> Result<RunReport> {
        let store = open(&data)?;
        let sources = HttpSources::new(&config)?;
        let result = UpdateDriver::new(&store, &sources)
            .with_cancel(flag)
            .run(lifestream.as_deref());
        save(&store)?;
        Ok(result?)
    });
    let report = until_interrupted(task, tokio::signal::ctrl_c(), &cancel).await?;

    info!(
        updated = report.updated.len(),
        created = report.created(),
        paused = report.paused.len(),
        failed = report.failed.len(),
        cancelled = report.cancelled,
        "update finished"
    );
    Ok(())
}

/// Await `task`, setting `cancel` if `interrupt` fires first. An interrupt
/// that fails to install leaves the task running to completion.
async fn until_interrupted<T>(
    mut task: JoinHandle<Result<T>>,
    interrupt: impl Future<Output = io::Result<()>>,
    cancel: &AtomicBool,
) -> Result<T> {
    tokio::select! {
        joined = &mut task => joined?,
        signal = interrupt => {
            match signal {
                Ok(()) => {
                    warn!("interrupted, stopping after the current feed");
                    cancel.store(true, Ordering::Relaxed);
                }
                Err(err) => {
                    warn!(error = %err, "cannot listen for Ctrl-C, update runs to completion");
                }
            }
            task.await?
        }
    }
}

pub fn add(data: &Path, source: AddSource) -> Result<FeedId> {
    let (args, kind, credential) = match source {
        AddSource::Rss { feed, url } => {
            (feed, PluginKind::Rss, Credential::Rss(RssCredential { url }))
        }
        AddSource::Twitter {
            feed,
            screen_name,
            access_token,
            access_token_secret,
        } => (
            feed,
            PluginKind::Twitter,
            Credential::Twitter(TwitterCredential {
                access_token,
                access_token_secret,
                screen_name,
            }),
        ),
        AddSource::Instagram { feed, access_token } => (
            feed,
            PluginKind::Instagram,
            Credential::Instagram(InstagramCredential { access_token }),
        ),
    };

    with_store(data, |store| add_feed(store, args, kind, credential))
}

fn add_feed(
    store: &dyn Store,
    args: FeedArgs,
    kind: PluginKind,
    credential: Credential,
) -> Result<FeedId> {
    let lifestream = store.get_or_create_lifestream(&args.lifestream)?;
    let mut new = NewFeed::new(args.title, kind);
    new.ordering = args.ordering;
    let feed = store.create_feed(lifestream.id, new)?;
    store.set_credential(feed.id, credential)?;
    info!(feed = %feed.id, lifestream = %lifestream.name, plugin = %kind, "feed added");
    Ok(feed.id)
}

pub fn list(
    out: &mut dyn Write,
    config: &Config,
    store: &dyn Store,
    lifestream: Option<&str>,
) -> Result<()> {
    let filter = match lifestream {
        Some(name) => match store.lifestream_by_name(name)? {
            Some(ls) => Some(ls.id),
            None => bail!("no lifestream named `{name}`"),
        },
        None => None,
    };
    for feed in store.feeds(filter)? {
        writeln!(
            out,
            "{}: [{}] {} {}",
            feed.id,
            if feed.fetchable { "*" } else { " " },
            config.plugin_label(feed.plugin),
            feed.title,
        )?;
    }
    Ok(())
}

pub fn set_fetchable(store: &dyn Store, ids: &[u64], fetchable: bool) -> Result<()> {
    for &id in ids {
        store
            .set_fetchable(FeedId(id), fetchable)
            .with_context(|| format!("updating feed {id}"))?;
    }
    Ok(())
}

pub fn timeline(out: &mut dyn Write, store: &dyn Store, lifestream: &str, limit: usize) -> Result<()> {
    let Some(ls) = store.lifestream_by_name(lifestream)? else {
        bail!("no lifestream named `{lifestream}`");
    };
    for item in store.timeline(ls.id)?.into_iter().take(limit) {
        writeln!(
            out,
            "{}  {}  {}",
            item.published.format("%Y-%m-%d %H:%M"),
            item.author,
            item.link
        )?;
        let content = item.content.trim();
        if !content.is_empty() {
            writeln!(out, "    {}", first_line(content))?;
        }
    }
    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or(text)
}

/// Open the store, run `f` and save the result.
pub fn with_store<T>(data: &Path, f: impl FnOnce(&MemoryStore) -> Result<T>) -> Result<T> {
    let store = open(data)?;
    let value = f(&store)?;
    save(&store)?;
    Ok(value)
}
