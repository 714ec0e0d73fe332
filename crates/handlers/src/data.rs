use crate::content_type::DEFAULT_CONTENT_TYPE;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use minitoolstream_connector::{
    BoxError, CONTENT_TYPE_HEADER, CancellationToken, Headers, MessagePreparer, PublishMessage,
    TIMESTAMP_HEADER,
};
use tracing::debug;

/// Options for the data preparer.
#[derive(Clone, Debug, Default)]
pub struct DataPreparerOptions {
    /// Destination subject.
    pub subject: String,

    /// Payload published on every call.
    pub data: Bytes,

    /// Payload MIME type. Defaults to `application/octet-stream`.
    pub content_type: Option<String>,

    /// Extra headers; these override the generated ones.
    pub headers: Headers,
}

/// Publishes a fixed in-memory payload.
#[derive(Clone, Debug)]
pub struct DataPreparer {
    content_type: String,
    data: Bytes,
    headers: Headers,
    subject: String,
}

impl DataPreparer {
    /// Creates a new data preparer.
    #[must_use]
    pub fn new(
        DataPreparerOptions {
            subject,
            data,
            content_type,
            headers,
        }: DataPreparerOptions,
    ) -> Self {
        Self {
            content_type: content_type
                .filter(|content_type| !content_type.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            data,
            headers,
            subject,
        }
    }

    /// Adds custom headers, replacing existing keys.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

#[async_trait]
impl MessagePreparer for DataPreparer {
    async fn prepare(
        &self,
        _shutdown_token: &CancellationToken,
    ) -> Result<PublishMessage, BoxError> {
        debug!(subject = %self.subject, size = self.data.len(), "preparing data");

        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE_HEADER.to_string(), self.content_type.clone());
        headers.insert(
            TIMESTAMP_HEADER.to_string(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        headers.extend(self.headers.clone());

        Ok(PublishMessage {
            subject: self.subject.clone(),
            data: self.data.clone(),
            headers,
        })
    }
}
