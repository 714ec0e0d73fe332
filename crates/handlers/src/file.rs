use crate::Error;
use crate::content_type::content_type_for_path;

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use minitoolstream_connector::{
    BoxError, CONTENT_TYPE_HEADER, CancellationToken, FILENAME_HEADER, Headers, MessagePreparer,
    PublishMessage, TIMESTAMP_HEADER,
};
use tracing::debug;

/// Options for the file preparer.
#[derive(Clone, Debug, Default)]
pub struct FilePreparerOptions {
    /// Destination subject.
    pub subject: String,

    /// File published on every call.
    pub path: PathBuf,

    /// Payload MIME type. Guessed from the extension when absent.
    pub content_type: Option<String>,
}

/// Publishes the current contents of a file.
#[derive(Clone, Debug)]
pub struct FilePreparer {
    content_type: Option<String>,
    path: PathBuf,
    subject: String,
}

impl FilePreparer {
    /// Creates a new file preparer. The file is read on every prepare.
    #[must_use]
    pub fn new(
        FilePreparerOptions {
            subject,
            path,
            content_type,
        }: FilePreparerOptions,
    ) -> Self {
        Self {
            content_type: content_type.filter(|content_type| !content_type.is_empty()),
            path,
            subject,
        }
    }
}

#[async_trait]
impl MessagePreparer for FilePreparer {
    async fn prepare(
        &self,
        _shutdown_token: &CancellationToken,
    ) -> Result<PublishMessage, BoxError> {
        let data = read_file(&self.path).await?;
        debug!(subject = %self.subject, path = %self.path.display(), size = data.len(), "read file");

        let content_type = self
            .content_type
            .as_deref()
            .unwrap_or_else(|| content_type_for_path(&self.path));

        Ok(PublishMessage {
            subject: self.subject.clone(),
            data,
            headers: file_headers(&self.path, content_type),
        })
    }
}

pub(crate) async fn read_file(path: &Path) -> Result<Bytes, Error> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(Bytes::from(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(Error::NotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(Error::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn file_headers(path: &Path, content_type: &str) -> Headers {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE_HEADER.to_string(), content_type.to_string());
    if let Some(name) = path.file_name() {
        headers.insert(
            FILENAME_HEADER.to_string(),
            name.to_string_lossy().into_owned(),
        );
    }
    headers.insert(
        TIMESTAMP_HEADER.to_string(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    headers
}
