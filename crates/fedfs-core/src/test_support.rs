//! Shared fakes for unit tests across modules.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use crate::BoxFuture;
use crate::transport::{HttpResponse, HttpTransport};

/// A request seen by [`FakeTransport`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: &'static str,
    pub(crate) url: String,
    pub(crate) headers: Vec<(String, String)>,
}

/// In-memory transport. Unrouted URLs fail like an unreachable host.
pub(crate) struct FakeTransport {
    routes: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn route(&self, url: &str, response: HttpResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    /// Make `url` unreachable again.
    pub(crate) fn unroute(&self, url: &str) {
        self.routes.lock().unwrap().remove(url);
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made to `url`.
    pub(crate) fn hits(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    fn respond(
        &self,
        method: &'static str,
        url: &str,
        headers: &[(&str, &str)],
    ) -> io::Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.routes
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, format!("no route to {}", url)))
    }
}

impl HttpTransport for FakeTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        headers: &'a [(&'a str, &'a str)],
    ) -> BoxFuture<'a, io::Result<HttpResponse>> {
        Box::pin(async move { self.respond("GET", url, headers) })
    }

    fn head<'a>(&'a self, url: &'a str) -> BoxFuture<'a, io::Result<HttpResponse>> {
        Box::pin(async move {
            let mut response = self.respond("HEAD", url, &[])?;
            response.body.clear();
            Ok(response)
        })
    }
}
