//! Mapping of federated paths to fetchable URLs.

/// Turns a federated path (`<rootUri>/<rest>`) into a URL.
pub trait UrlResolver: Send + Sync {
    fn resolve(&self, path: &str) -> String;
}

/// Loopback hosts are fetched over plain HTTP, everything else over HTTPS.
/// Paths that already carry a scheme pass through untouched.
pub struct DefaultUrlResolver;

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

fn is_loopback(root: &str) -> bool {
    let host = if root.starts_with('[') {
        root.split_inclusive(']').next().unwrap_or(root)
    } else {
        root.split(':').next().unwrap_or(root)
    };
    LOOPBACK_HOSTS.contains(&host)
}

impl UrlResolver for DefaultUrlResolver {
    fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let root = path.split('/').next().unwrap_or(path);
        if is_loopback(root) {
            format!("http://{}", path)
        } else {
            format!("https://{}", path)
        }
    }
}
