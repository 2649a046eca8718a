//! Endpoint construction for path-style and virtual-host-style addressing
//!
//! The endpoint URL from the configuration is parsed once; each object
//! key then resolves to the request URL, the Host header and the
//! canonical URI used for signing. The Host header carries the port
//! only when it is not the scheme default, and the signature always
//! covers exactly the Host header that is sent.

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::s3::signer::uri_encode;
use url::Url;

/// Parsed form of the configured endpoint URL, bound to the bucket and
/// addressing style it was parsed with.
#[derive(Debug, Clone)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: Option<u16>,
    /// Base path without trailing slash, or empty
    base_path: String,
    bucket: String,
    path_style: bool,
}

/// One object key resolved against an endpoint.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    /// Full request URL without query string
    pub url: String,
    /// Host header value (and the only host ever signed)
    pub host: String,
    /// Percent-encoded path used in the canonical request
    pub canonical_uri: String,
}

impl Endpoint {
    /// Parse `cfg.endpoint`, accepting an optional port and base path.
    pub fn parse(cfg: &StorageConfig) -> Result<Self> {
        let trimmed = cfg.endpoint.trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| {
            StorageError::Configuration(format!("invalid object storage endpoint URL: {}", e))
        })?;

        let scheme = parsed.scheme().to_string();
        if scheme != "http" && scheme != "https" {
            return Err(StorageError::Configuration(format!(
                "unsupported object storage endpoint scheme: {}",
                scheme
            )));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| {
                StorageError::Configuration(
                    "object storage endpoint URL has no host".to_string(),
                )
            })?
            .to_ascii_lowercase();

        let base_path = parsed.path().trim_end_matches('/').to_string();

        Ok(Self {
            scheme,
            host,
            // Url::port() already swallows scheme-default ports
            port: parsed.port(),
            base_path,
            bucket: cfg.bucket.clone(),
            path_style: cfg.path_style,
        })
    }

    /// Resolve an object key to URL, Host header and canonical URI.
    pub fn resolve(&self, object_key: &str) -> ResolvedRequest {
        let encoded_key = uri_encode(object_key, false);
        let port = match self.port {
            Some(p) => format!(":{}", p),
            None => String::new(),
        };

        if self.path_style {
            let encoded_bucket = uri_encode(&self.bucket, true);
            let host = format!("{}{}", self.host, port);
            let canonical_uri =
                format!("{}/{}/{}", self.base_path, encoded_bucket, encoded_key);
            let url = format!("{}://{}{}", self.scheme, host, canonical_uri);
            ResolvedRequest {
                url,
                host,
                canonical_uri,
            }
        } else {
            let host = format!("{}.{}{}", self.bucket, self.host, port);
            let canonical_uri = format!("{}/{}", self.base_path, encoded_key);
            let url = format!("{}://{}{}", self.scheme, host, canonical_uri);
            ResolvedRequest {
                url,
                host,
                canonical_uri,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(endpoint: &str, path_style: bool) -> StorageConfig {
        StorageConfig {
            enabled: true,
            endpoint: endpoint.to_string(),
            region: "us-east-1".to_string(),
            bucket: "b".to_string(),
            access_key: "k".to_string(),
            secret_key: "s".to_string(),
            prefix: "p/".to_string(),
            path_style,
            verify_ssl: true,
        }
    }

    #[test]
    fn test_path_style_addressing() {
        let cfg = cfg("https://s3.example.com", true);
        let endpoint = Endpoint::parse(&cfg).unwrap();
        let resolved = endpoint.resolve("p/f.txt");
        assert_eq!(resolved.url, "https://s3.example.com/b/p/f.txt");
        assert_eq!(resolved.host, "s3.example.com");
        assert_eq!(resolved.canonical_uri, "/b/p/f.txt");
    }

    #[test]
    fn test_virtual_host_addressing() {
        let cfg = cfg("https://s3.example.com", false);
        let endpoint = Endpoint::parse(&cfg).unwrap();
        let resolved = endpoint.resolve("p/f.txt");
        assert_eq!(resolved.url, "https://b.s3.example.com/p/f.txt");
        assert_eq!(resolved.host, "b.s3.example.com");
        assert_eq!(resolved.canonical_uri, "/p/f.txt");
    }

    #[test]
    fn test_non_default_port_kept_in_host() {
        let cfg = cfg("http://minio.local:9000", true);
        let endpoint = Endpoint::parse(&cfg).unwrap();
        let resolved = endpoint.resolve("f.txt");
        assert_eq!(resolved.url, "http://minio.local:9000/b/f.txt");
        assert_eq!(resolved.host, "minio.local:9000");
    }

    #[test]
    fn test_default_port_stripped() {
        let cfg = cfg("https://s3.example.com:443", true);
        let endpoint = Endpoint::parse(&cfg).unwrap();
        let resolved = endpoint.resolve("f.txt");
        assert_eq!(resolved.host, "s3.example.com");
    }

    #[test]
    fn test_base_path_preserved() {
        let cfg = cfg("https://gateway.example.com/storage/", true);
        let endpoint = Endpoint::parse(&cfg).unwrap();
        let resolved = endpoint.resolve("f.txt");
        assert_eq!(resolved.url, "https://gateway.example.com/storage/b/f.txt");
        assert_eq!(resolved.canonical_uri, "/storage/b/f.txt");
    }

    #[test]
    fn test_key_segments_encoded_slash_preserved() {
        let cfg = cfg("https://s3.example.com", true);
        let endpoint = Endpoint::parse(&cfg).unwrap();
        let resolved = endpoint.resolve("dir/my file+v2.txt");
        assert_eq!(resolved.canonical_uri, "/b/dir/my%20file%2Bv2.txt");
    }

    #[test]
    fn test_resolution_bound_to_parse_time_config() {
        let mut cfg = cfg("https://s3.example.com", false);
        let endpoint = Endpoint::parse(&cfg).unwrap();

        // Later edits to the config do not leak into an already
        // parsed endpoint
        cfg.bucket = "other".to_string();
        cfg.path_style = true;

        let resolved = endpoint.resolve("f.txt");
        assert_eq!(resolved.host, "b.s3.example.com");
        assert_eq!(resolved.canonical_uri, "/f.txt");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let bad = cfg("not a url", true);
        assert!(Endpoint::parse(&bad).is_err());
        let bad = cfg("ftp://x.example.com", true);
        assert!(Endpoint::parse(&bad).is_err());
    }
}
