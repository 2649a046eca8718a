//! S3-compatible client with AWS SigV4 signing
//!
//! This module provides:
//! - AWS Signature Version 4 signing (header-based and presigned-query)
//! - Path-style and virtual-host-style endpoint resolution
//! - Signed async operations (put, delete, rename, presigned GET)

pub mod client;
pub mod endpoint;
pub mod signer;

pub use client::ObjectStorageClient;
pub use endpoint::{Endpoint, ResolvedRequest};
pub use signer::{SignedRequest, SignerV4, EMPTY_SHA256, UNSIGNED_PAYLOAD};
