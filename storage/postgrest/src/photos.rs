use crate::repository::Repository;
use async_trait::async_trait;
use entities::locations::PhotoUrl;
use shared_kernel::http_client::HttpClient;
use use_cases::location_form::{BlobStorage, PhotoFile};

const OBJECT: [&str; 3] = ["storage", "v1", "object"];

fn content_type(photo: &PhotoFile) -> String {
    if let Some(content_type) = &photo.content_type {
        return content_type.clone();
    }
    let guessed = match photo.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    };
    guessed.to_owned()
}

impl Repository {
    fn object_url(&self, public: bool, path: &str) -> anyhow::Result<url::Url> {
        let prefix = OBJECT.into_iter().chain(public.then_some("public"));
        self.endpoint(
            prefix
                .chain(std::iter::once(self.bucket()))
                .chain(path.split('/').filter(|segment| !segment.is_empty())),
        )
    }
}

#[async_trait]
impl BlobStorage for Repository {
    #[tracing::instrument(err, skip(self, photo), level = "info")]
    async fn upload(&self, path: String, photo: PhotoFile) -> anyhow::Result<PhotoUrl> {
        let url = self.object_url(false, &path)?;
        let content_type = content_type(&photo);

        HttpClient::post_bytes(url, self.headers(), &content_type, photo.bytes)
            .await
            .map_err(anyhow::Error::from)?;

        let public_url = self.object_url(true, &path)?;
        Ok(PhotoUrl::new(public_url.to_string()))
    }
}
