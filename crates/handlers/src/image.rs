use crate::content_type::image_content_type_for_path;
use crate::file::{file_headers, read_file};

use std::path::PathBuf;

use async_trait::async_trait;
use minitoolstream_connector::{BoxError, CancellationToken, MessagePreparer, PublishMessage};
use tracing::debug;

/// Options for the image preparer.
#[derive(Clone, Debug, Default)]
pub struct ImagePreparerOptions {
    /// Destination subject.
    pub subject: String,

    /// Image file published on every call.
    pub path: PathBuf,
}

/// Publishes an image file with a content type guessed from its extension.
#[derive(Clone, Debug)]
pub struct ImagePreparer {
    path: PathBuf,
    subject: String,
}

impl ImagePreparer {
    /// Creates a new image preparer.
    #[must_use]
    pub fn new(ImagePreparerOptions { subject, path }: ImagePreparerOptions) -> Self {
        Self { path, subject }
    }
}

#[async_trait]
impl MessagePreparer for ImagePreparer {
    async fn prepare(
        &self,
        _shutdown_token: &CancellationToken,
    ) -> Result<PublishMessage, BoxError> {
        let data = read_file(&self.path).await?;
        debug!(subject = %self.subject, path = %self.path.display(), size = data.len(), "read image");

        Ok(PublishMessage {
            subject: self.subject.clone(),
            data,
            headers: file_headers(&self.path, image_content_type_for_path(&self.path)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Error;

    use minitoolstream_connector::{CONTENT_TYPE_HEADER, FILENAME_HEADER};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_png_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let message = ImagePreparer::new(ImagePreparerOptions {
            subject: "images".to_string(),
            path,
        })
        .prepare(&CancellationToken::new())
        .await
        .unwrap();

        assert_eq!(
            message.headers.get(CONTENT_TYPE_HEADER).map(String::as_str),
            Some("image/png")
        );
        assert_eq!(
            message.headers.get(FILENAME_HEADER).map(String::as_str),
            Some("chart.png")
        );
    }

    #[tokio::test]
    async fn test_unknown_extension_defaults_to_jpeg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.raw");
        std::fs::write(&path, b"pixels").unwrap();

        let message = ImagePreparer::new(ImagePreparerOptions {
            subject: "images".to_string(),
            path,
        })
        .prepare(&CancellationToken::new())
        .await
        .unwrap();

        assert_eq!(
            message.headers.get(CONTENT_TYPE_HEADER).map(String::as_str),
            Some("image/jpeg")
        );
    }

    #[tokio::test]
    async fn test_missing_image() {
        let dir = tempdir().unwrap();

        let error = ImagePreparer::new(ImagePreparerOptions {
            subject: "images".to_string(),
            path: dir.path().join("gone.png"),
        })
        .prepare(&CancellationToken::new())
        .await
        .unwrap_err();

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::NotFound { .. })
        ));
    }
}
