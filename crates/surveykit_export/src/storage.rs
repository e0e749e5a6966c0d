//! Object-storage boundary for report inputs and exported workbooks.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::TryStreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::StorageError;

/// Parse a raw storage key without re-encoding its characters.
///
/// Keys are stored verbatim, so `Q3 #2` or `kim%20lee.json` address objects
/// with exactly those names.
pub fn parse_key(key: &str) -> Result<Path, StorageError> {
    Path::parse(key).map_err(|source| StorageError::InvalidKey {
        key: key.to_string(),
        source,
    })
}

/// Storage operations the export pipeline needs.
///
/// Locations returned by [`ReportStore::list_keys`] are passed back to
/// [`ReportStore::get_bytes`] unchanged.
pub trait ReportStore: Send + Sync {
    /// Locations of all objects under `prefix`, in listing order.
    fn list_keys(&self, prefix: &Path) -> impl Future<Output = Result<Vec<Path>, StorageError>> + Send;

    /// Full object body.
    fn get_bytes(&self, key: &Path) -> impl Future<Output = Result<Vec<u8>, StorageError>> + Send;

    /// Create or overwrite an object.
    fn put_bytes(&self, key: &Path, v_bytes: Vec<u8>) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Time-bound unauthenticated GET link for `key`.
    fn signed_url(&self, key: &Path, expires_in: Duration) -> impl Future<Output = Result<String, StorageError>> + Send;
}

async fn list_store_keys<S: ObjectStore + ?Sized>(store: &S, prefix: &Path) -> Result<Vec<Path>, StorageError> {
    let l_metas: Vec<_> = store
        .list(Some(prefix))
        .try_collect()
        .await
        .map_err(|source| StorageError::List {
            prefix: prefix.to_string(),
            source,
        })?;
    Ok(l_metas.into_iter().map(|meta| meta.location).collect())
}

async fn get_store_bytes<S: ObjectStore + ?Sized>(store: &S, key: &Path) -> Result<Vec<u8>, StorageError> {
    let map_err = |source| StorageError::Read {
        key: key.to_string(),
        source,
    };
    let result = store.get(key).await.map_err(map_err)?;
    let v_bytes = result.bytes().await.map_err(map_err)?;
    Ok(v_bytes.to_vec())
}

async fn put_store_bytes<S: ObjectStore + ?Sized>(store: &S, key: &Path, v_bytes: Vec<u8>) -> Result<(), StorageError> {
    store
        .put(key, PutPayload::from(v_bytes))
        .await
        .map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })?;
    Ok(())
}

/// Any `object_store` backend that can also presign URLs.
#[derive(Debug)]
pub struct ObjectReportStore<S> {
    store: S,
}

impl<S> ObjectReportStore<S>
where
    S: ObjectStore + Signer,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

/// S3-backed report store.
pub type S3ReportStore = ObjectReportStore<AmazonS3>;

impl S3ReportStore {
    /// S3 client for the configured bucket; credentials come from the AWS environment.
    pub fn from_config(config: &ExportConfig) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&config.bucket_name);
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        let store = builder
            .with_allow_http(config.allow_http)
            .build()
            .map_err(StorageError::Client)?;
        debug!(bucket = %config.bucket_name, "built S3 report store");
        Ok(Self::new(store))
    }
}

impl<S> ReportStore for ObjectReportStore<S>
where
    S: ObjectStore + Signer,
{
    async fn list_keys(&self, prefix: &Path) -> Result<Vec<Path>, StorageError> {
        list_store_keys(&self.store, prefix).await
    }

    async fn get_bytes(&self, key: &Path) -> Result<Vec<u8>, StorageError> {
        get_store_bytes(&self.store, key).await
    }

    async fn put_bytes(&self, key: &Path, v_bytes: Vec<u8>) -> Result<(), StorageError> {
        put_store_bytes(&self.store, key, v_bytes).await
    }

    async fn signed_url(&self, key: &Path, expires_in: Duration) -> Result<String, StorageError> {
        let url = self
            .store
            .signed_url(http::Method::GET, key, expires_in)
            .await
            .map_err(|source| StorageError::Sign {
                key: key.to_string(),
                source,
            })?;
        Ok(url.to_string())
    }
}

/// In-process store that counts traffic and mints `memory://` links.
#[derive(Debug)]
pub struct MemoryReportStore {
    store: InMemory,
    bucket_name: String,
    n_reads: AtomicUsize,
    n_writes: AtomicUsize,
}

impl MemoryReportStore {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            store: InMemory::new(),
            bucket_name: bucket_name.into(),
            n_reads: AtomicUsize::new(0),
            n_writes: AtomicUsize::new(0),
        }
    }

    /// Place an object under a raw key without counting it as pipeline traffic.
    pub async fn seed(&self, key: &str, v_bytes: impl Into<Vec<u8>>) -> Result<(), StorageError> {
        put_store_bytes(&self.store, &parse_key(key)?, v_bytes.into()).await
    }

    /// List and get calls made through `ReportStore`.
    pub fn read_count(&self) -> usize {
        self.n_reads.load(Ordering::SeqCst)
    }

    /// Put calls made through `ReportStore`.
    pub fn write_count(&self) -> usize {
        self.n_writes.load(Ordering::SeqCst)
    }

    /// Object body under a raw key, bypassing the counters.
    pub async fn peek(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        get_store_bytes(&self.store, &parse_key(key)?).await
    }
}

impl Default for MemoryReportStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BUCKET_NAME)
    }
}

impl ReportStore for MemoryReportStore {
    async fn list_keys(&self, prefix: &Path) -> Result<Vec<Path>, StorageError> {
        self.n_reads.fetch_add(1, Ordering::SeqCst);
        list_store_keys(&self.store, prefix).await
    }

    async fn get_bytes(&self, key: &Path) -> Result<Vec<u8>, StorageError> {
        self.n_reads.fetch_add(1, Ordering::SeqCst);
        get_store_bytes(&self.store, key).await
    }

    async fn put_bytes(&self, key: &Path, v_bytes: Vec<u8>) -> Result<(), StorageError> {
        self.n_writes.fetch_add(1, Ordering::SeqCst);
        put_store_bytes(&self.store, key, v_bytes).await
    }

    async fn signed_url(&self, key: &Path, expires_in: Duration) -> Result<String, StorageError> {
        Ok(format!(
            "memory://{}/{key}?expires_in={}",
            self.bucket_name,
            expires_in.as_secs()
        ))
    }
}
