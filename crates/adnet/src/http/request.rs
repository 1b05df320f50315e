//! Request builder carrying a network's base URL and static headers.

use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

use crate::error::AdapterError;
use crate::network::Network;

/// Base request state shared by every call an adapter makes.
///
/// Holds the network's base URL and the headers that go on every request
/// (static API keys, version pins); per-call auth such as signatures and
/// bearer tokens is added to the returned [`RequestBuilder`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub network: Network,
    pub base_url: String,
    pub client: Client,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(network: Network, base_url: impl Into<String>, client: Client) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        Self {
            network,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            headers,
        }
    }

    /// Insert a header, skipping (with a debug log) names or values that are
    /// not valid HTTP.
    pub fn add_header_str<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) {
        match HeaderName::from_str(key.as_ref()) {
            Ok(name) => match HeaderValue::from_str(value.as_ref()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    self.headers.insert(name, value);
                }
                Err(e) => {
                    debug!(network = %self.network, error = %e, "Invalid header value; skipping");
                }
            },
            Err(e) => {
                debug!(network = %self.network, error = %e, "Invalid header name; skipping");
            }
        }
    }

    pub fn add_header_static(&mut self, key: &'static str, value: &'static str) {
        self.headers
            .insert(HeaderName::from_static(key), HeaderValue::from_static(value));
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Absolute URL of `path` under the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(network = %self.network, %method, %url, "Dispatching request");
        self.client
            .request(method, url)
            .headers(self.headers.clone())
    }

    #[inline]
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    #[inline]
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }
}

/// Status and body of an upstream response, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Send a request and read the whole body as text.
pub async fn send(request: RequestBuilder) -> Result<RawResponse, AdapterError> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    debug!(status, bytes = body.len(), "Received response");
    Ok(RawResponse { status, body })
}
