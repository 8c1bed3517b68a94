// Logging setup: tracing-subscriber writing to stderr.
//
// `RUST_LOG` wins when set. Otherwise the configured level is used, raised
// one step per `-v`, with chatty HTTP crates capped at `warn`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text: timestamp LEVEL target: message fields
    Compact,
    /// JSON lines
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

const NOISY: &[(&str, &str)] = &[
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("reqwest", "warn"),
    ("rustls", "warn"),
];

/// Raise `base` by `verbosity` steps, saturating at `trace`.
fn effective_level(base: &str, verbosity: u8) -> &'static str {
    let base = base.to_lowercase();
    let start = LEVELS.iter().position(|l| *l == base).unwrap_or(2);
    let index = (start + verbosity as usize).min(LEVELS.len() - 1);
    LEVELS[index]
}

fn build_filter(config: &LogConfig, verbosity: u8) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let mut directives = vec![effective_level(&config.level, verbosity).to_string()];
    for (target, level) in NOISY {
        directives.push(format!("{target}={level}"));
    }
    let filter = directives.join(",");
    EnvFilter::try_new(&filter)
        .map_err(|e| anyhow::anyhow!("invalid tracing filter '{}': {}", filter, e))
}

pub fn init(config: &LogConfig, verbosity: u8) -> Result<()> {
    let filter = build_filter(config, verbosity)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match LogFormat::parse(&config.format) {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(effective_level("info", 0), "info");
        assert_eq!(effective_level("info", 1), "debug");
        assert_eq!(effective_level("WARN", 1), "info");
        assert_eq!(effective_level("info", 9), "trace");
    }

    #[test]
    fn unknown_level_starts_at_info() {
        assert_eq!(effective_level("loud", 0), "info");
    }

    #[test]
    fn format_parsing() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Compact);
    }
}
