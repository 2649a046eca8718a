//! Error taxonomy for object storage operations
//!
//! Nothing in this crate retries: every error propagates synchronously
//! to the immediate caller, which owns any retry policy. The secret key
//! must never be formatted into an error message.

use hyper::StatusCode;
use thiserror::Error;

/// Maximum length of a response body carried inside a protocol error.
const BODY_SNIPPET_MAX: usize = 300;

/// Object storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Missing or invalid settings. Never retried; the operator must
    /// correct the configuration.
    #[error("object storage configuration invalid: {0}")]
    Configuration(String),

    /// Network or TLS failure before an HTTP status was obtained.
    #[error("object storage request failed: {0}")]
    Transport(String),

    /// Non-2xx HTTP response from the storage endpoint.
    #[error("object storage request failed (HTTP {status}){}", fmt_body(.body))]
    Protocol { status: StatusCode, body: String },

    /// Save-time rejection by the configuration gate.
    #[error("{0}")]
    Validation(String),

    /// Local filesystem failure (reading a file staged for upload).
    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

impl StorageError {
    /// Build a protocol error carrying a truncated body snippet.
    pub fn protocol(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let snippet = if text.len() > BODY_SNIPPET_MAX {
            let mut end = BODY_SNIPPET_MAX;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &text[..end])
        } else {
            text.trim_end().to_string()
        };
        StorageError::Protocol {
            status,
            body: snippet,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_snippet_truncated() {
        let body = vec![b'x'; 5000];
        let err = StorageError::protocol(StatusCode::FORBIDDEN, &body);
        match err {
            StorageError::Protocol { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert!(body.len() <= 310);
                assert!(body.ends_with("..."));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_protocol_empty_body_message() {
        let err = StorageError::protocol(StatusCode::NOT_FOUND, b"");
        assert_eq!(
            err.to_string(),
            "object storage request failed (HTTP 404 Not Found)"
        );
    }

    #[test]
    fn test_protocol_snippet_respects_char_boundary() {
        let mut body = "a".repeat(299);
        body.push('ü'); // two bytes, straddles the cut
        body.push_str(&"b".repeat(100));
        let err = StorageError::protocol(StatusCode::BAD_REQUEST, body.as_bytes());
        match err {
            StorageError::Protocol { body, .. } => assert!(body.ends_with("...")),
            _ => panic!("wrong variant"),
        }
    }
}
