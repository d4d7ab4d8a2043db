//! Image uploads.
//!
//! Blobs go to an [`ObjectStore`], which hands back a URL that stays valid
//! for as long as the store keeps the blob. Batches are uploaded
//! concurrently; one failing file never aborts the rest.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::Image;
use crate::records::RecordStore;

const BLOB_URL_PREFIX: &str = "blob://sha256/";

/// Storage for uploaded binary objects.
#[async_trait]
pub trait ObjectStore: Debug + Send + Sync {
    /// Stores `bytes` and returns a URL that retrieves them.
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<String>;

    /// Fetches the object behind `url`.
    async fn get(&self, url: &str) -> Result<Option<Arc<[u8]>>>;
}

/// Content-addressed in-memory object store.
///
/// URLs have the form `blob://sha256/<hex digest>`, so uploading identical
/// content twice yields the same URL and keeps a single copy.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    blobs: Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
}

impl MemoryObjectStore {
    /// An empty object store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total size of the distinct blobs held.
    pub async fn stored_bytes(&self) -> u64 {
        self.blobs
            .lock()
            .await
            .values()
            .map(|blob| blob.len() as u64)
            .sum()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::EmptyUpload(filename.to_string()));
        }

        let digest = hex::encode(Sha256::digest(&bytes));
        self.blobs
            .lock()
            .await
            .entry(digest.clone())
            .or_insert_with(|| Arc::from(bytes));

        Ok(format!("{BLOB_URL_PREFIX}{digest}"))
    }

    async fn get(&self, url: &str) -> Result<Option<Arc<[u8]>>> {
        let Some(digest) = url.strip_prefix(BLOB_URL_PREFIX) else {
            return Ok(None);
        };
        Ok(self.blobs.lock().await.get(digest).cloned())
    }
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// A file named `filename` holding `bytes`.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// A file that could not be uploaded, and why.
#[derive(Debug)]
pub struct UploadFailure {
    pub filename: String,
    pub error: Error,
}

/// Outcome of a batch upload.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<Image>,
    pub failed: Vec<UploadFailure>,
}

impl UploadReport {
    /// Number of files stored.
    pub fn success_count(&self) -> usize {
        self.uploaded.len()
    }

    /// Number of files that failed.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Uploads image files into a user's projects.
#[derive(Debug, Clone)]
pub struct Uploader {
    records: RecordStore,
    objects: Arc<dyn ObjectStore>,
}

impl Uploader {
    /// Uploads blobs into `objects` and records the images in `records`.
    pub fn new(records: RecordStore, objects: Arc<dyn ObjectStore>) -> Self {
        Self { records, objects }
    }

    /// Uploads `files` into `project_id`, tagging every image with `tags`.
    ///
    /// Fails with [`Error::NoProjects`] before uploading anything when
    /// `owner` has no project yet. Otherwise every file is attempted and the
    /// report lists which ones made it.
    pub async fn upload_images(
        &self,
        owner: &str,
        project_id: &str,
        files: Vec<UploadFile>,
        tags: &BTreeSet<String>,
    ) -> Result<UploadReport> {
        if self.records.projects(owner).await.is_empty() {
            return Err(Error::NoProjects);
        }

        let outcomes = join_all(
            files
                .into_iter()
                .map(|file| self.upload_one(owner, project_id, file, tags)),
        )
        .await;

        let mut report = UploadReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(image) => report.uploaded.push(image),
                Err(failure) => {
                    warn!(filename = %failure.filename, error = %failure.error, "upload failed");
                    report.failed.push(failure);
                }
            }
        }

        info!(
            project_id,
            uploaded = report.success_count(),
            failed = report.failure_count(),
            "upload batch finished"
        );
        Ok(report)
    }

    async fn upload_one(
        &self,
        owner: &str,
        project_id: &str,
        file: UploadFile,
        tags: &BTreeSet<String>,
    ) -> std::result::Result<Image, UploadFailure> {
        let UploadFile { filename, bytes } = file;
        let size_bytes = bytes.len() as u64;

        let result = async {
            let url = self.objects.put(&filename, bytes).await?;
            let image = Image {
                id: Uuid::new_v4().to_string(),
                url,
                filename: filename.clone(),
                project_id: project_id.to_string(),
                tags: tags.clone(),
                size_bytes,
                created_at: OffsetDateTime::now_utc(),
            };
            self.records.add_image(owner, image.clone()).await?;
            Ok::<_, Error>(image)
        }
        .await;

        result.map_err(|error| UploadFailure { filename, error })
    }
}
