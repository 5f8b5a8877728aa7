//! HTTP transport abstraction and its reqwest implementation.
//!
//! The core only needs GET and HEAD with request headers, the status code,
//! response headers, and the body. Timeouts are the transport's business.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::BoxFuture;
use crate::config::HttpConfig;

/// A completed HTTP exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues HTTP requests. `Err` means no response was received at all.
pub trait HttpTransport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, io::Result<HttpResponse>>;

    fn head<'a>(&'a self, url: &'a str) -> BoxFuture<'a, io::Result<HttpResponse>>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> io::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| io::Error::other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> io::Result<HttpResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| io::Error::other(format!("Failed to fetch '{}': {}", url, e)))?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .await
            .map_err(|e| io::Error::other(format!("Failed to read response from '{}': {}", url, e)))?
            .to_vec();
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn collect_headers(map: &HeaderMap) -> HashMap<String, String> {
    map.iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn build_headers(headers: &[(&str, &str)]) -> io::Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        map.insert(name, value);
    }
    Ok(map)
}

impl HttpTransport for ReqwestTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, io::Result<HttpResponse>> {
        Box::pin(async move {
            let request = self.client.get(url).headers(build_headers(headers)?);
            self.send(request, url).await
        })
    }

    fn head<'a>(&'a self, url: &'a str) -> BoxFuture<'a, io::Result<HttpResponse>> {
        Box::pin(async move { self.send(self.client.head(url), url).await })
    }
}
