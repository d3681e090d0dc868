//! Request handles bound to one server and at most one bearer token.
//!
//! Callers get the decoded response body directly. Non-2xx responses map to
//! [`Error::Rejected`] carrying the server's own message when it sends one,
//! and failures to reach the server map to [`Error::Transport`].

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Header the platform reads bearer tokens from.
const AUTH_HEADER: &str = "X-Authorization";

/// Structured error body sent by the platform on rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// A request handle for one base URL, with the token baked into every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a handle for `base_url`, attaching `token` when given.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::TokenDecode("token is not a valid header value".to_string()))?;
            headers.insert(AUTH_HEADER, value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` with `query` parameters, decoding the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(response).await
    }

    /// POST `body` as JSON to `path`, decoding the JSON response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::decode(response).await
    }

    /// Unwrap the response: 2xx bodies decode to `T`, everything else becomes
    /// a rejection with the server's message when the body is parseable.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(Error::Transport);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        debug!(%status, %message, "request rejected");
        Err(Error::Rejected { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/", None).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn control_characters_in_token_are_rejected() {
        let result = ApiClient::new("http://localhost:8080", Some("bad\ntoken"));
        assert!(matches!(result, Err(Error::TokenDecode(_))));
    }
}
