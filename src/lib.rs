//! s3mirror - mirror locally stored files to an S3-compatible bucket
//!
//! From-scratch AWS SigV4 signing (header-based and presigned),
//! signed PUT/DELETE/COPY operations, a write/delete connection test,
//! and a save-time gate that refuses to persist connection settings
//! that have not passed a test.

pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod s3;
pub mod tester;

pub use config::{Settings, StorageConfig};
pub use error::{Result, StorageError};
pub use gate::ConfigChangeGate;
pub use s3::ObjectStorageClient;
