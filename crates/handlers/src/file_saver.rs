use crate::Error;
use crate::content_type::extension_for;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use minitoolstream_connector::{BoxError, CancellationToken, MessageHandler, ReceivedMessage};
use tracing::{debug, info};

/// Handler that writes every payload to a file in an output directory.
///
/// Files are named `<subject>_seq_<sequence>` plus an extension derived from
/// the `content-type` header. Path separators in the subject are replaced
/// with `_`.
#[derive(Clone, Debug)]
pub struct FileSaver {
    output_dir: PathBuf,
}

impl FileSaver {
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

    /// Directory files are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn target_path(&self, message: &ReceivedMessage) -> PathBuf {
        let mut name = base_name(message);
        if let Some(ext) = message.content_type().and_then(extension_for) {
            name.push_str(ext);
        }
        self.output_dir.join(name)
    }
}

#[async_trait]
impl MessageHandler for FileSaver {
    async fn handle(
        &self,
        message: &ReceivedMessage,
        _shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError> {
        if message.data.is_empty() {
            debug!(sequence = message.sequence, "no data to save");
            return Ok(());
        }

        let path = self.target_path(message);
        write_payload(&path, &message.data).await?;
        info!(path = %path.display(), size = message.data.len(), "saved message");

        Ok(())
    }
}

pub(crate) async fn create_output_dir(path: PathBuf) -> Result<PathBuf, Error> {
    match tokio::fs::create_dir_all(&path).await {
        Ok(()) => Ok(path),
        Err(source) => Err(Error::CreateDir { path, source }),
    }
}

/// File name stem for a message. Path separators in the subject become `_` so
/// the name stays a single component inside the output directory.
pub(crate) fn base_name(message: &ReceivedMessage) -> String {
    let subject: String = message
        .subject
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{subject}_seq_{}", message.sequence)
}

pub(crate) async fn write_payload(path: &Path, data: &[u8]) -> Result<(), Error> {
    tokio::fs::write(path, data)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
}
