//! Connection tester: prove write access before settings are trusted
//!
//! Runs a PUT+DELETE round-trip against a candidate (not yet saved)
//! configuration with a uniquely named throwaway object. The ordered
//! step list feeds both the JSON test-trigger response and plain
//! message output.

use crate::config::Settings;
use crate::s3::ObjectStorageClient;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

/// Marker embedded in every connection-test object key
const TEST_KEY_MARKER: &str = "hashtopolis-conn-test-";

/// One executed step of the round-trip
#[derive(Debug, Clone, Serialize)]
pub struct TestStep {
    pub name: String,
    pub ok: bool,
}

impl TestStep {
    fn ok(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ok: true,
        }
    }

    fn failed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ok: false,
        }
    }
}

/// Result of a connection test, produced once per invocation.
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub ok: bool,
    pub skipped: bool,
    pub steps: Vec<TestStep>,
    pub error: Option<String>,
}

impl TestReport {
    fn skipped() -> Self {
        Self {
            ok: true,
            skipped: true,
            steps: vec![TestStep::ok("disabled")],
            error: None,
        }
    }

    fn passed(steps: Vec<TestStep>) -> Self {
        Self {
            ok: true,
            skipped: false,
            steps,
            error: None,
        }
    }

    fn failed(steps: Vec<TestStep>, error: String) -> Self {
        Self {
            ok: false,
            skipped: false,
            steps,
            error: Some(error),
        }
    }
}

/// Unique throwaway key for one test run: marker, UTC timestamp and a
/// random suffix under the configured prefix.
pub fn test_object_key(prefix: &str, now: DateTime<Utc>) -> String {
    let suffix: [u8; 4] = rand::thread_rng().gen();
    format!(
        "{}{}{}-{}.txt",
        prefix,
        TEST_KEY_MARKER,
        now.format("%Y%m%dT%H%M%SZ"),
        hex::encode(suffix)
    )
}

/// Execute a write/delete round-trip against a candidate configuration.
///
/// Disabled storage short-circuits without any network call; that is a
/// skip, not an error. Otherwise the sequence stops at the first
/// failing step. A PUT failure leaves nothing behind; a DELETE failure
/// leaves the test object in the bucket, which is logged and accepted.
pub async fn test_connection(settings: &Settings) -> TestReport {
    if !settings.storage.enabled {
        return TestReport::skipped();
    }

    let client = match ObjectStorageClient::new(settings) {
        Ok(client) => client,
        Err(e) => return TestReport::failed(Vec::new(), e.to_string()),
    };

    let now = Utc::now();
    let key = test_object_key(&settings.storage.prefix, now);
    let body = format!(
        "object storage connection test\n{}\n",
        now.format("%Y-%m-%dT%H:%M:%S%z")
    );

    let mut steps = Vec::new();

    if let Err(e) = client
        .put_object_bytes(&key, Bytes::from(body), "text/plain")
        .await
    {
        steps.push(TestStep::failed("PUT"));
        return TestReport::failed(steps, e.to_string());
    }
    steps.push(TestStep::ok("PUT"));

    if let Err(e) = client.delete_object(&key).await {
        tracing::warn!(key = %key, "connection test object could not be deleted; residue left in bucket");
        steps.push(TestStep::failed("DELETE"));
        return TestReport::failed(steps, e.to_string());
    }
    steps.push(TestStep::ok("DELETE"));

    TestReport::passed(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, StorageConfig};
    use chrono::TimeZone;

    #[test]
    fn test_key_format() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 30, 5).unwrap();
        let key = test_object_key("mirror/", now);

        assert!(key.starts_with("mirror/hashtopolis-conn-test-20260829T123005Z-"));
        assert!(key.ends_with(".txt"));
        // 8 hex chars between the timestamp dash and the extension
        let suffix = key
            .trim_end_matches(".txt")
            .rsplit('-')
            .next()
            .unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_keys_are_unique() {
        let now = Utc::now();
        assert_ne!(test_object_key("", now), test_object_key("", now));
    }

    #[tokio::test]
    async fn test_disabled_storage_skips_without_network() {
        let settings = Settings {
            storage: StorageConfig::default(),
            ..Settings::default()
        };
        let report = test_connection(&settings).await;
        assert!(report.ok);
        assert!(report.skipped);
        assert!(report.error.is_none());
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].name, "disabled");
    }

    #[tokio::test]
    async fn test_incomplete_config_fails_without_steps() {
        let settings = Settings {
            storage: StorageConfig {
                enabled: true,
                ..StorageConfig::default()
            },
            ..Settings::default()
        };
        let report = test_connection(&settings).await;
        assert!(!report.ok);
        assert!(!report.skipped);
        assert!(report.steps.is_empty());
        assert!(report.error.is_some());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = TestReport::passed(vec![TestStep::ok("PUT"), TestStep::ok("DELETE")]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["steps"][0]["name"], "PUT");
        assert_eq!(json["steps"][1]["name"], "DELETE");
    }
}
