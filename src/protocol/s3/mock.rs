//! In-memory storage for unit tests
//!
//! Records every call made through [`S3Operations`] so tests can assert on
//! buckets, keys and strategies without a live S3 endpoint.

use super::error::{S3Error, S3Result};
use super::operations::S3Operations;
use super::types::{S3ListResult, S3Object};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tokio::fs::File;
use tokio_util::sync::CancellationToken;

/// One observed storage call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List {
        bucket: String,
        prefix: Option<String>,
    },
    Put {
        bucket: String,
        key: String,
        size: u64,
    },
    Multipart {
        bucket: String,
        key: String,
        size: u64,
        part_size: u64,
    },
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<String, Vec<S3Object>>,
    calls: Vec<Call>,
    failing_keys: HashSet<String>,
    list_error: Option<S3Error>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object so that listings under its bucket return it
    pub fn add_object(&self, bucket: &str, key: &str, size: u64) {
        self.state
            .write()
            .unwrap()
            .objects
            .entry(bucket.to_string())
            .or_default()
            .push(S3Object::new(key, size));
    }

    /// Make uploads to `key` fail with a service error
    pub fn fail_key(&self, key: &str) {
        self.state
            .write()
            .unwrap()
            .failing_keys
            .insert(key.to_string());
    }

    /// Make every listing fail with `error`
    pub fn fail_listing(&self, error: S3Error) {
        self.state.write().unwrap().list_error = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.read().unwrap().calls.clone()
    }

    fn record(&self, call: Call) {
        self.state.write().unwrap().calls.push(call);
    }

    fn check_key(&self, key: &str) -> S3Result<()> {
        if self.state.read().unwrap().failing_keys.contains(key) {
            return Err(S3Error::Service {
                code: "InternalError".to_string(),
                message: format!("injected failure for {}", key),
            });
        }
        Ok(())
    }
}

fn check_cancel(cancel: &CancellationToken, operation: &str) -> S3Result<()> {
    if cancel.is_cancelled() {
        return Err(S3Error::Cancelled(operation.to_string()));
    }
    Ok(())
}

#[async_trait]
impl S3Operations for MemoryStore {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        cancel: &CancellationToken,
    ) -> S3Result<S3ListResult> {
        check_cancel(cancel, "list objects")?;
        self.record(Call::List {
            bucket: bucket.to_string(),
            prefix: prefix.map(str::to_string),
        });

        let state = self.state.read().unwrap();
        if let Some(error) = &state.list_error {
            return Err(error.clone());
        }

        let objects = state
            .objects
            .get(bucket)
            .map(|objects| {
                objects
                    .iter()
                    .filter(|o| prefix.map_or(true, |p| o.key.starts_with(p)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(S3ListResult {
            objects,
            is_truncated: false,
        })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        cancel: &CancellationToken,
    ) -> S3Result<()> {
        check_cancel(cancel, key)?;
        let size = body.metadata().await?.len();
        self.record(Call::Put {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size,
        });
        self.check_key(key)
    }

    async fn multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        body: File,
        part_size: u64,
        cancel: &CancellationToken,
    ) -> S3Result<()> {
        check_cancel(cancel, key)?;
        let size = body.metadata().await?.len();
        self.record(Call::Multipart {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size,
            part_size,
        });
        self.check_key(key)
    }
}
