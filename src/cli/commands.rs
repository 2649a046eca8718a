//! Command implementations for the s3mirror CLI

use crate::config::{self, Settings};
use crate::gate::ConfigChangeGate;
use crate::s3::ObjectStorageClient;
use crate::tester;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Run the connection test against the loaded settings.
///
/// With `json`, the structured report is printed for machine consumers;
/// otherwise the steps are printed one per line. A failed test is a
/// non-zero exit.
pub async fn cmd_test(settings: &Settings, json: bool) -> Result<()> {
    let report = tester::test_connection(settings).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for step in &report.steps {
            println!("{:<8} {}", step.name, if step.ok { "ok" } else { "failed" });
        }
        if report.skipped {
            println!("object storage is disabled; nothing to test");
        } else if report.ok {
            println!("connection test passed");
        }
    }

    if !report.ok {
        bail!(
            "connection test failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Upload a local file under its mirrored key.
pub async fn cmd_put(
    settings: &Settings,
    file: &Path,
    name: Option<&str>,
    content_type: &str,
) -> Result<()> {
    let client = ObjectStorageClient::new(settings)?;

    let filename = match name {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .and_then(|n| n.to_str())
            .context("source path has no usable file name; pass --name")?
            .to_string(),
    };

    let key = client.object_key(&filename);
    client.put_object(&key, file, content_type).await?;
    println!("uploaded {} -> {}", file.display(), key);
    Ok(())
}

/// Delete a mirrored file.
pub async fn cmd_rm(settings: &Settings, name: &str) -> Result<()> {
    let client = ObjectStorageClient::new(settings)?;
    let key = client.object_key(name);
    client.delete_object(&key).await?;
    println!("deleted {}", key);
    Ok(())
}

/// Rename a mirrored file (server-side copy, then delete of the source).
pub async fn cmd_mv(settings: &Settings, old_name: &str, new_name: &str) -> Result<()> {
    let client = ObjectStorageClient::new(settings)?;
    let old_key = client.object_key(old_name);
    let new_key = client.object_key(new_name);
    client.rename_object(&old_key, &new_key).await?;
    println!("renamed {} -> {}", old_key, new_key);
    Ok(())
}

/// Print a presigned GET URL for a mirrored file.
pub async fn cmd_presign(settings: &Settings, name: &str, ttl: Option<i64>) -> Result<()> {
    let client = ObjectStorageClient::new(settings)?;
    let url = client.presign_get(name, ttl)?;
    println!("{}", url);
    Ok(())
}

/// Apply a candidate settings file over the persisted one, running the
/// write test when the connection settings changed.
///
/// The gate is created for this save, fed by the tester, evaluated, and
/// consumed after a successful save. A rejected save leaves the
/// persisted file completely unmodified.
pub async fn cmd_apply(persisted_path: &str, candidate_path: &str) -> Result<()> {
    let persisted = if Path::new(persisted_path).exists() {
        config::load_from_yaml(persisted_path)?
    } else {
        Settings::default()
    };
    let posted = config::load_from_yaml(candidate_path)?;

    let mut gate = ConfigChangeGate::new();
    let fields_posted = true;

    if ConfigChangeGate::requires_test(&posted.storage, &persisted.storage, fields_posted) {
        tracing::info!("connection settings changed; running write test before save");
        let report = tester::test_connection(&posted).await;
        for step in &report.steps {
            println!("{:<8} {}", step.name, if step.ok { "ok" } else { "failed" });
        }
        if report.ok {
            gate.record_test_pass(posted.storage.fingerprint());
        } else if let Some(error) = &report.error {
            eprintln!("connection test failed: {}", error);
        }
    }

    gate.evaluate_save(&posted.storage, &persisted.storage, fields_posted)?;
    config::save_to_yaml(&posted, persisted_path)?;
    gate.consume();

    println!("settings saved to {}", persisted_path);
    Ok(())
}
