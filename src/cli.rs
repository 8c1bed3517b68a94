use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// lifestreams: mirror Twitter, Instagram and RSS activity into timelines
#[derive(Parser, Debug)]
#[command(name = "lifestreams", version)]
#[command(about = "Aggregate Twitter, Instagram and RSS activity into lifestreams", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the data file
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch every fetchable feed and store new items
    Update {
        /// Only update the feeds of this lifestream
        lifestream: Option<String>,
    },
    /// Add a feed to a lifestream
    #[command(subcommand)]
    Add(AddSource),
    /// List feeds
    List {
        /// Only list the feeds of this lifestream
        lifestream: Option<String>,
    },
    /// Pause feeds (disable fetching)
    Pause {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Unpause feeds (enable fetching)
    Unpause {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Show a lifestream's items, newest first
    Timeline {
        lifestream: String,

        /// Maximum number of items to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum AddSource {
    /// An RSS or Atom feed
    Rss {
        #[command(flatten)]
        feed: FeedArgs,

        /// Feed URL
        #[arg(long)]
        url: String,
    },
    /// A Twitter account
    Twitter {
        #[command(flatten)]
        feed: FeedArgs,

        #[arg(long)]
        screen_name: String,

        #[arg(long)]
        access_token: String,

        #[arg(long)]
        access_token_secret: String,
    },
    /// An Instagram account
    Instagram {
        #[command(flatten)]
        feed: FeedArgs,

        #[arg(long)]
        access_token: String,
    },
}

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Lifestream to add the feed to (created if it doesn't exist)
    #[arg(long)]
    pub lifestream: String,

    /// Display title of the feed
    #[arg(long)]
    pub title: String,

    /// Display rank among the lifestream's feeds
    #[arg(long, default_value_t = 0)]
    pub ordering: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_lifestream() {
        let cli = Cli::try_parse_from(["lifestreams", "update"]).unwrap();
        assert!(matches!(cli.command, Command::Update { lifestream: None }));
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["lifestreams", "update", "me", "-vv", "-d", "/tmp/ls.json"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/ls.json")));
        match cli.command {
            Command::Update { lifestream } => assert_eq!(lifestream.as_deref(), Some("me")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn add_rss() {
        let cli = Cli::try_parse_from([
            "lifestreams",
            "add",
            "rss",
            "--lifestream",
            "me",
            "--title",
            "Blog",
            "--url",
            "http://example.com/feed.xml",
        ])
        .unwrap();
        match cli.command {
            Command::Add(AddSource::Rss { feed, url }) => {
                assert_eq!(feed.lifestream, "me");
                assert_eq!(feed.title, "Blog");
                assert_eq!(feed.ordering, 0);
                assert_eq!(url, "http://example.com/feed.xml");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn add_twitter_requires_tokens() {
        let result = Cli::try_parse_from([
            "lifestreams",
            "add",
            "twitter",
            "--lifestream",
            "me",
            "--title",
            "Tweets",
            "--screen-name",
            "someone",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn pause_needs_ids() {
        assert!(Cli::try_parse_from(["lifestreams", "pause"]).is_err());
        let cli = Cli::try_parse_from(["lifestreams", "pause", "1", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Pause { ref ids } if ids == &[1, 3]));
    }

    #[test]
    fn timeline_limit_default() {
        let cli = Cli::try_parse_from(["lifestreams", "timeline", "me"]).unwrap();
        assert!(matches!(cli.command, Command::Timeline { limit: 20, .. }));
    }
}
