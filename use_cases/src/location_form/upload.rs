use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use entities::locations::{OwnerId, PhotoUrl};
use futures::future::join_all;
#[cfg(test)]
use mockall::automock;
use std::path::Path;
use std::sync::Arc;

/// A photo picked for upload but not stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl PhotoFile {
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .filter(|extension| !extension.is_empty())
    }
}

/// The blob-storage collaborator. Returns the public URL of the stored object.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(&self, path: String, photo: PhotoFile) -> anyhow::Result<PhotoUrl>;
}

/// `{owner}/{unix millis}-{random}.{ext}`, unique per upload.
pub fn storage_path(owner: OwnerId, photo: &PhotoFile) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    let millis = Utc::now().timestamp_millis();
    match photo.extension() {
        Some(extension) => format!("{owner}/{millis}-{random}.{extension}"),
        None => format!("{owner}/{millis}-{random}"),
    }
}

/// Uploads every photo concurrently and waits for all of them. Succeeds only
/// when every upload did, keeping the input order of the URLs.
#[tracing::instrument(err, skip(storage, photos), fields(count = photos.len()), level = "info")]
pub async fn upload_photos(
    storage: Arc<dyn BlobStorage>,
    owner: OwnerId,
    photos: Vec<PhotoFile>,
) -> anyhow::Result<Vec<PhotoUrl>> {
    let uploads = photos.into_iter().map(|photo| {
        let storage = storage.clone();
        let path = storage_path(owner, &photo);
        async move {
            let result = storage.upload(path.clone(), photo).await;
            (path, result)
        }
    });

    let mut urls = Vec::new();
    let mut first_error = None;
    let mut stored = Vec::new();
    for (path, result) in join_all(uploads).await {
        match result {
            Ok(url) => {
                stored.push(path);
                urls.push(url);
            }
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(err) => tracing::warn!(error = ?err, path = %path, "Upload failed"),
        }
    }

    match first_error {
        None => Ok(urls),
        Some(err) => {
            if !stored.is_empty() {
                tracing::warn!(?stored, "Leaving uploaded photos behind after a failed upload");
            }
            Err(err)
        }
    }
}
