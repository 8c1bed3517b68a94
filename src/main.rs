//! lifestreams command line.
//!
//! * **`cli`**: argument parsing (clap derive).
//! * **`commands`**: one function per subcommand, working on the JSON data
//!   file through [`MemoryStore`](lifestreams::store::MemoryStore).
//! * **`main`**: loads configuration, installs logging and dispatches.

mod cli;
mod commands;

use std::io;

use anyhow::Result;

use cli::{Cli, Command};
use lifestreams::config::Config;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = <Cli as clap::Parser>::parse();

    // -- configuration and logging -------------------------------------------
    let config = Config::load(cli.config.as_deref())?;
    lifestreams::logging::init(&config.log, cli.verbose)?;

    let data = match cli.data {
        Some(path) => path,
        None => commands::default_data_path()?,
    };

    // -- dispatch ------------------------------------------------------------
    match cli.command {
        Command::Update { lifestream } => commands::update(&config, data, lifestream).await,
        Command::Add(source) => {
            let id = commands::add(&data, source)?;
            println!("added feed {id}");
            Ok(())
        }
        Command::List { lifestream } => {
            let store = commands::open(&data)?;
            commands::list(&mut io::stdout().lock(), &config, &store, lifestream.as_deref())
        }
        Command::Pause { ids } => {
            commands::with_store(&data, |store| commands::set_fetchable(store, &ids, false))
        }
        Command::Unpause { ids } => {
            commands::with_store(&data, |store| commands::set_fetchable(store, &ids, true))
        }
        Command::Timeline { lifestream, limit } => {
            let store = commands::open(&data)?;
            commands::timeline(&mut io::stdout().lock(), &store, &lifestream, limit)
        }
    }
}
