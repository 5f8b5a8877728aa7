//! Remote directory client: fetches a source's `index.json`.
//!
//! Returns entries exactly as the remote reports them. Prefix filtering,
//! name rewriting and permissions are applied by the aggregator.

use std::io::{self, ErrorKind};
use std::sync::Arc;

use crate::config::FederationConfig;
use crate::resolve::UrlResolver;
use crate::transport::HttpTransport;
use crate::types::IndexEntry;

/// Status of an index fetch, with the parsed entries on 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexResponse {
    pub status: u16,
    pub entries: Vec<IndexEntry>,
}

pub struct RemoteDirectoryClient {
    transport: Arc<dyn HttpTransport>,
    resolver: Arc<dyn UrlResolver>,
}

impl RemoteDirectoryClient {
    pub fn new(transport: Arc<dyn HttpTransport>, resolver: Arc<dyn UrlResolver>) -> Self {
        Self {
            transport,
            resolver,
        }
    }

    /// Fetch `<rootUri>/index.json`.
    ///
    /// `Err` on transport failure, or when a 200 body is not a JSON array of
    /// index entries. Other statuses come back with no entries.
    pub async fn fetch_index(&self, config: &FederationConfig) -> io::Result<IndexResponse> {
        let url = self
            .resolver
            .resolve(&format!("{}/index.json", config.root_uri()));
        let response = self
            .transport
            .get(&url, &[("Accept", "application/json")])
            .await?;
        if response.status != 200 {
            return Ok(IndexResponse {
                status: response.status,
                entries: Vec::new(),
            });
        }
        let entries = serde_json::from_slice(&response.body).map_err(|e| {
            io::Error::new(
                ErrorKind::InvalidData,
                format!("malformed index from '{}': {}", url, e),
            )
        })?;
        Ok(IndexResponse {
            status: response.status,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::DefaultUrlResolver;
    use crate::test_support::FakeTransport;
    use crate::transport::HttpResponse;

    fn client(transport: Arc<FakeTransport>) -> RemoteDirectoryClient {
        RemoteDirectoryClient::new(transport, Arc::new(DefaultUrlResolver))
    }

    #[tokio::test]
    async fn test_fetches_root_index_with_json_accept() {
        let transport = Arc::new(FakeTransport::new());
        transport.route(
            "https://docs/index.json",
            HttpResponse::new(200).with_body(
                r#"[{"name":"sub/x.md","size":3,"contentType":"text/markdown","lastModified":9}]"#,
            ),
        );
        let response = client(transport.clone())
            .fetch_index(&FederationConfig::new("docs/sub", None))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.entries.len(), 1);
        assert_eq!(response.entries[0].name, "sub/x.md");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(
            requests[0].headers,
            vec![("Accept".to_string(), "application/json".to_string())]
        );
    }

    #[tokio::test]
    async fn test_non_200_has_no_entries() {
        let transport = Arc::new(FakeTransport::new());
        transport.route("https://a/index.json", HttpResponse::new(500).with_body("[]"));
        let response = client(transport)
            .fetch_index(&FederationConfig::new("a", None))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert!(response.entries.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let transport = Arc::new(FakeTransport::new());
        transport.route("https://a/index.json", HttpResponse::new(200).with_body("<html>"));
        let err = client(transport)
            .fetch_index(&FederationConfig::new("a", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = Arc::new(FakeTransport::new());
        let result = client(transport)
            .fetch_index(&FederationConfig::new("unreachable", None))
            .await;
        assert!(result.is_err());
    }
}
