use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;

use crate::config::HttpConfig;
use crate::error::{FeedError, FeedResult};

pub(crate) fn client(config: &HttpConfig) -> FeedResult<Client> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(FeedError::upstream)
}

/// Send a request and return the status with the raw body, whatever the
/// status. For APIs that put error details in non-2xx bodies.
pub(crate) fn send(request: RequestBuilder) -> FeedResult<(StatusCode, Vec<u8>)> {
    let response = request.send()?;
    let status = response.status();
    let body = response.bytes()?;
    Ok((status, body.to_vec()))
}

/// Send a request and return the body of a successful response.
pub(crate) fn send_ok(request: RequestBuilder) -> FeedResult<Vec<u8>> {
    let response = request.send()?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}
