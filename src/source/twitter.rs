//! Twitter user timeline over the v1.1 REST API.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::oauth::OAuth1;
use super::{http, Cursor, SourceHandler};
use crate::config::TwitterConfig;
use crate::error::{FeedError, FeedResult};
use crate::model::TwitterCredential;

/// `created_at` as Twitter formats it, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A tweet as returned by `statuses/user_timeline`.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id_str: String,
    /// `full_text` in extended mode, `text` otherwise.
    #[serde(alias = "full_text")]
    pub text: String,
    pub created_at: String,
    pub user: TwitterUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    pub screen_name: String,
    #[serde(default)]
    pub name: String,
}

impl Tweet {
    pub fn published(&self) -> FeedResult<DateTime<Utc>> {
        DateTime::parse_from_str(&self.created_at, CREATED_AT_FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                FeedError::Source(format!(
                    "tweet {} has malformed created_at {:?}: {e}",
                    self.id_str, self.created_at
                ))
            })
    }

    pub fn permalink(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.user.screen_name, self.id_str
        )
    }

    /// Display name, falling back to the handle.
    pub fn author(&self) -> &str {
        if self.user.name.is_empty() {
            &self.user.screen_name
        } else {
            &self.user.name
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: i64,
    message: String,
}

pub struct TwitterHandler {
    client: Client,
    endpoint: String,
    page_size: String,
    screen_name: String,
    oauth: OAuth1,
}

impl TwitterHandler {
    pub fn new(client: Client, app: &TwitterConfig, credential: &TwitterCredential) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/statuses/user_timeline.json",
                app.api_base.trim_end_matches('/')
            ),
            page_size: app.page_size.to_string(),
            screen_name: credential.screen_name.clone(),
            oauth: OAuth1 {
                consumer_key: app.consumer_key.clone(),
                consumer_secret: app.consumer_secret.clone(),
                token: credential.access_token.clone(),
                token_secret: credential.access_token_secret.clone(),
            },
        }
    }

    fn params<'a>(&'a self, cursor: Option<&'a Cursor>) -> Vec<(&'a str, &'a str)> {
        let mut params = vec![
            ("screen_name", self.screen_name.as_str()),
            ("count", self.page_size.as_str()),
            ("tweet_mode", "extended"),
        ];
        if let Some(cursor) = cursor {
            params.push(cursor.query_param());
        }
        params
    }
}

impl SourceHandler for TwitterHandler {
    type Record = Tweet;

    fn update(&mut self, cursor: Option<&Cursor>) -> FeedResult<Vec<Tweet>> {
        let params = self.params(cursor);
        let authorization = self.oauth.authorization(
            "GET",
            &self.endpoint,
            &params,
            &uuid::Uuid::new_v4().simple().to_string(),
            Utc::now().timestamp(),
        )?;

        let request = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .header(reqwest::header::AUTHORIZATION, authorization);
        let (status, body) = http::send(request)?;

        if !status.is_success() {
            return Err(FeedError::Source(describe_error(status, &body)));
        }
        let tweets: Vec<Tweet> = serde_json::from_slice(&body).map_err(FeedError::upstream)?;
        debug!(screen_name = %self.screen_name, count = tweets.len(), "fetched tweets");
        Ok(tweets)
    }
}

fn describe_error(status: reqwest::StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => {
            let messages: Vec<String> = parsed
                .errors
                .iter()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .collect();
            format!("twitter returned {status}: {}", messages.join("; "))
        }
        _ => format!("twitter returned {status}"),
    }
}
