use crate::Error;
use crate::content_type::image_extension_for;
use crate::file_saver::{base_name, create_output_dir, write_payload};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use minitoolstream_connector::{
    BoxError, CancellationToken, FILENAME_HEADER, MessageHandler, ReceivedMessage,
};
use tracing::{debug, info};

/// Handler that saves image payloads, keeping the original file name when the
/// publisher sent one.
#[derive(Clone, Debug)]
pub struct ImageSaver {
    output_dir: PathBuf,
}

impl ImageSaver {
    /// Creates the saver, creating `output_dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateDir`] when the directory cannot be created.
    pub async fn new<P: Into<PathBuf>>(output_dir: P) -> Result<Self, Error> {
        Ok(Self {
            output_dir: create_output_dir(output_dir.into()).await?,
        })
    }

    /// Directory images are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn target_path(&self, message: &ReceivedMessage) -> PathBuf {
        let mut name = base_name(message);

        // Only the final component of a sender-supplied name is trusted.
        let original = message
            .header(FILENAME_HEADER)
            .and_then(|filename| Path::new(filename).file_name())
            .map(|filename| filename.to_string_lossy().into_owned());

        if let Some(original) = original {
            name.push('_');
            name.push_str(&original);
        } else if let Some(ext) = message.content_type().and_then(image_extension_for) {
            name.push_str(ext);
        }

        self.output_dir.join(name)
    }
}

#[async_trait]
impl MessageHandler for ImageSaver {
    async fn handle(
        &self,
        message: &ReceivedMessage,
        _shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError> {
        if message.data.is_empty() {
            debug!(sequence = message.sequence, "no image data");
            return Ok(());
        }

        let path = self.target_path(message);
        write_payload(&path, &message.data).await?;
        info!(
            path = %path.display(),
            size = message.data.len(),
            content_type = message.content_type().unwrap_or_default(),
            "saved image"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use chrono::Utc;
    use minitoolstream_connector::{CONTENT_TYPE_HEADER, Headers};
    use tempfile::tempdir;

    fn image(sequence: u64, headers: &[(&str, &str)]) -> ReceivedMessage {
        ReceivedMessage {
            subject: "camera".to_string(),
            sequence,
            data: Bytes::from_static(b"\xff\xd8\xff"),
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<Headers>(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_keeps_original_file_name() {
        let dir = tempdir().unwrap();
        let saver = ImageSaver::new(dir.path()).await.unwrap();

        saver
            .handle(&image(2, &[(FILENAME_HEADER, "front-door.jpg")]), &CancellationToken::new())
            .await
            .unwrap();

        assert!(dir.path().join("camera_seq_2_front-door.jpg").is_file());
    }

    #[tokio::test]
    async fn test_strips_directories_from_file_name() {
        let dir = tempdir().unwrap();
        let saver = ImageSaver::new(dir.path().join("out")).await.unwrap();

        saver
            .handle(
                &image(3, &[(FILENAME_HEADER, "../../etc/shot.png")]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(dir.path().join("out").join("camera_seq_3_shot.png").is_file());
    }

    #[tokio::test]
    async fn test_extension_from_content_type() {
        let dir = tempdir().unwrap();
        let saver = ImageSaver::new(dir.path()).await.unwrap();

        saver
            .handle(&image(4, &[(CONTENT_TYPE_HEADER, "image/svg+xml")]), &CancellationToken::new())
            .await
            .unwrap();
        saver
            .handle(
                &image(5, &[(CONTENT_TYPE_HEADER, "application/json")]),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(dir.path().join("camera_seq_4.svg").is_file());
        assert!(dir.path().join("camera_seq_5").is_file());
    }

    #[tokio::test]
    async fn test_subject_cannot_escape_output_dir() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out");
        let saver = ImageSaver::new(&output).await.unwrap();
        let message = ReceivedMessage {
            subject: "../cams/door".to_string(),
            ..image(6, &[(FILENAME_HEADER, "shot.jpg")])
        };

        saver.handle(&message, &CancellationToken::new()).await.unwrap();

        assert!(output.join(".._cams_door_seq_6_shot.jpg").is_file());
        assert!(!dir.path().join("cams").exists());
    }
}
