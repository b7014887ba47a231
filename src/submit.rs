use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::SubmitError;
use crate::form::{PropertyForm, Submission};
use crate::models::{Labelled, PropertyDocument};
use crate::stores::{BlobStore, RecordStore};

pub const COLLECTION: &str = "properties";
pub const MAX_ID_ATTEMPTS: u32 = 5;
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

type IdSource = Box<dyn Fn() -> String + Send + Sync>;

/// Listing id: the letter `F` followed by nine random digits
pub fn generate_listing_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("F{}", rng.gen_range(100_000_000u32..=999_999_999))
}

/// Object path for an uploaded image, always inside the listing's folder
///
/// The position prefix keeps two files with the same name from landing on
/// the same object.
pub fn blob_path(id: &str, index: usize, file_name: &str) -> String {
    let name = Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "image".to_string());
    format!("{COLLECTION}/{id}/{index}-{name}")
}

/// Uploads images and writes the listing document, in that order
pub struct ListingSubmitter {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    timeout: Duration,
    next_id: IdSource,
}

impl ListingSubmitter {
    pub fn new(records: Arc<dyn RecordStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            records,
            blobs,
            timeout: DEFAULT_SUBMIT_TIMEOUT,
            next_id: Box::new(|| generate_listing_id(&mut rand::thread_rng())),
        }
    }

    /// Upper bound on the whole submission, uploads included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_id_source(mut self, next_id: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.next_id = Box::new(next_id);
        self
    }

    /// Validate the form and submit it; nothing is uploaded if validation fails
    pub async fn submit_form(&self, form: PropertyForm) -> Result<PropertyDocument, SubmitError> {
        let submission = form.into_submission().map_err(SubmitError::Validation)?;
        self.submit(submission).await
    }

    pub async fn submit(&self, submission: Submission) -> Result<PropertyDocument, SubmitError> {
        match tokio::time::timeout(self.timeout, self.run(submission)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Listing submission timed out after {:?}", self.timeout);
                Err(SubmitError::TimedOut(self.timeout))
            }
        }
    }

    async fn run(&self, submission: Submission) -> Result<PropertyDocument, SubmitError> {
        let Submission { listing, images } = submission;
        let id = self.allocate_id().await?;
        let created_at = Utc::now();

        info!(
            "Submitting {} listing {} with {} image(s) via {}/{}",
            listing.property_type().label(),
            id,
            images.len(),
            self.blobs.backend_name(),
            self.records.backend_name()
        );

        let mut uploaded = Vec::with_capacity(images.len());
        let mut urls = Vec::with_capacity(images.len());
        for (index, file) in images.iter().enumerate() {
            let path = blob_path(&id, index, &file.name);
            debug!("Uploading {} ({} bytes) to {}", file.name, file.size(), path);
            match self.blobs.upload(&path, &file.bytes, &file.content_type).await {
                Ok(url) => {
                    urls.push(url);
                    uploaded.push(path);
                }
                Err(source) => {
                    warn!("Upload of {} failed: {:#}", file.name, source);
                    self.discard_uploads(&uploaded).await;
                    return Err(SubmitError::Upload {
                        file: file.name.clone(),
                        source,
                    });
                }
            }
        }

        let document = PropertyDocument::assemble(&listing, id.clone(), urls, created_at);
        let stored = match serde_json::to_value(&document) {
            Ok(value) => self.records.store(COLLECTION, &id, &value).await,
            Err(e) => Err(e.into()),
        };
        if let Err(source) = stored {
            warn!("Writing listing {} failed: {:#}", id, source);
            self.discard_uploads(&uploaded).await;
            return Err(SubmitError::Store { id, source });
        }

        info!("✅ Listed property {}", id);
        Ok(document)
    }

    async fn allocate_id(&self) -> Result<String, SubmitError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.next_id)();
            match self.records.exists(COLLECTION, &id).await {
                Ok(false) => return Ok(id),
                Ok(true) => warn!("Listing id {} already taken, drawing another", id),
                Err(source) => return Err(SubmitError::Store { id, source }),
            }
        }
        Err(SubmitError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    /// Best-effort cleanup of blobs uploaded before a later step failed
    async fn discard_uploads(&self, paths: &[String]) {
        for path in paths.iter().rev() {
            if let Err(e) = self.blobs.delete(path).await {
                warn!("Could not remove orphaned upload {}: {:#}", path, e);
            }
        }
    }
}
