//! Instagram recent media of the authenticated user.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::{http, Cursor, SourceHandler};
use crate::error::{FeedError, FeedResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    pub id: String,
    pub link: String,
    /// Unix seconds, sent as a string.
    pub created_time: String,
    pub user: MediaUser,
    #[serde(default)]
    pub caption: Option<MediaCaption>,
    pub images: MediaImages,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaUser {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaCaption {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaImages {
    pub standard_resolution: MediaImage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaImage {
    pub url: String,
}

impl Media {
    pub fn published(&self) -> FeedResult<DateTime<Utc>> {
        self.created_time
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| {
                FeedError::Source(format!(
                    "media {} has malformed created_time {:?}",
                    self.id, self.created_time
                ))
            })
    }

    pub fn caption_text(&self) -> &str {
        self.caption.as_ref().map_or("", |c| c.text.as_str())
    }
}

/// Every response is wrapped in `{meta, data}`; errors only fill `meta`.
#[derive(Debug, Deserialize)]
struct Envelope {
    meta: Meta,
    #[serde(default)]
    data: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    code: u16,
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

pub struct InstagramHandler {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl InstagramHandler {
    pub fn new(client: Client, api_base: &str, access_token: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/users/self/media/recent/", api_base.trim_end_matches('/')),
            access_token: access_token.to_string(),
        }
    }
}

impl SourceHandler for InstagramHandler {
    type Record = Media;

    fn update(&mut self, cursor: Option<&Cursor>) -> FeedResult<Vec<Media>> {
        let mut params = vec![("access_token", self.access_token.as_str())];
        if let Some(cursor) = cursor {
            params.push(cursor.query_param());
        }
        let (status, body) = http::send(self.client.get(&self.endpoint).query(&params))?;
        let media = parse_envelope(status, &body)?;
        debug!(count = media.len(), "fetched instagram media");
        Ok(media)
    }
}

fn parse_envelope(status: reqwest::StatusCode, body: &[u8]) -> FeedResult<Vec<Media>> {
    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(FeedError::Source(format!("instagram returned {status}")))
        }
        Err(err) => return Err(FeedError::upstream(err)),
    };
    if envelope.meta.code != 200 {
        return Err(FeedError::Source(format!(
            "instagram error {}: {}: {}",
            envelope.meta.code,
            envelope.meta.error_type.as_deref().unwrap_or("unknown"),
            envelope.meta.error_message.as_deref().unwrap_or("no message"),
        )));
    }
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    const RECENT: &str = r#"{
        "meta": {"code": 200},
        "pagination": {},
        "data": [
            {
                "id": "22721881_3",
                "link": "http://instagr.am/p/BWrVZ/",
                "created_time": "1296710327",
                "user": {"username": "kevin"},
                "caption": {"text": "Inside le truc #foodtruck"},
                "images": {"standard_resolution": {"url": "http://distillery.s3.amazonaws.com/media/2011/02/02/6ea7baea55774c5e81e7e3e1f6e791a7_7.jpg"}}
            },
            {
                "id": "22721881_2",
                "link": "http://instagr.am/p/BWrVY/",
                "created_time": "1296710000",
                "user": {"username": "kevin"},
                "caption": null,
                "images": {"standard_resolution": {"url": "http://example.com/2.jpg"}}
            }
        ]
    }"#;

    #[test]
    fn parses_recent_media() {
        let media = parse_envelope(StatusCode::OK, RECENT.as_bytes()).unwrap();
        assert_eq!(media.len(), 2);
        assert_eq!(media[0].id, "22721881_3");
        assert_eq!(media[0].caption_text(), "Inside le truc #foodtruck");
        assert_eq!(media[1].caption_text(), "");
        assert_eq!(
            media[0].published().unwrap(),
            Utc.timestamp_opt(1296710327, 0).unwrap()
        );
    }

    #[test]
    fn api_error_envelope_is_a_source_error() {
        let body = br#"{"meta":{"code":400,"error_type":"OAuthAccessTokenException","error_message":"The access_token provided is invalid."}}"#;
        let err = parse_envelope(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            FeedError::Source(message) => {
                assert!(message.contains("OAuthAccessTokenException"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_json_failure_is_a_source_error() {
        let err = parse_envelope(StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert!(matches!(err, FeedError::Source(ref m) if m.contains("502")));
    }

    #[test]
    fn malformed_created_time() {
        let mut media = parse_envelope(StatusCode::OK, RECENT.as_bytes()).unwrap();
        media[0].created_time = "soon".into();
        assert!(media[0].published().is_err());
    }
}
