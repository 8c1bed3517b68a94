//! lifestreams: aggregates a user's Twitter, Instagram and RSS activity into
//! reverse-chronological timelines.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐  Feed::update  ┌───────────┐  handler()  ┌───────────┐
//! │ driver.rs │ ─────────────► │  plugin/  │ ──────────► │  source/  │
//! │  (batch)  │                │ (per feed)│  records    │  (HTTP)   │
//! └───────────┘                └───────────┘ ◄────────── └───────────┘
//!       │                            │ create_item()
//!       │ feeds()                    ▼
//!       │                      ┌───────────┐
//!       └────────────────────► │  store/   │
//!                              └───────────┘
//! ```
//!
//! * **`model`**: lifestreams, feeds, items, extensions and credentials.
//! * **`source`**: one handler per external API plus the [`Sources`]
//!   factory the plugins build them through.
//! * **`plugin`**: the per-source update pipeline behind [`Feed::update`].
//! * **`driver`**: updates many feeds, isolating recoverable failures.
//! * **`store`**: the storage contract and the JSON-backed [`MemoryStore`].
//! * **`config`** / **`logging`**: process-wide settings and tracing setup.
//!
//! [`Sources`]: source::Sources
//! [`Feed::update`]: model::Feed::update
//! [`MemoryStore`]: store::MemoryStore

pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod model;
pub mod plugin;
pub mod source;
pub mod store;

#[cfg(test)]
mod testing;

pub use driver::{update_lifestreams, RunReport, UpdateDriver};
pub use error::{FeedError, FeedResult};
