use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::CONTENT_TYPE_HEADER;

/// String key/value metadata carried alongside a payload.
pub type Headers = HashMap<String, String>;

/// A message to be published to the ingress service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishMessage {
    /// Destination subject.
    pub subject: String,

    /// Raw payload.
    pub data: Bytes,

    /// Payload metadata.
    pub headers: Headers,
}

impl PublishMessage {
    /// Creates a message without headers.
    pub fn new<S, B>(subject: S, data: B) -> Self
    where
        S: Into<String>,
        B: Into<Bytes>,
    {
        Self {
            subject: subject.into(),
            data: data.into(),
            headers: Headers::new(),
        }
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// A message delivered by the egress service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Subject the message was published to.
    pub subject: String,

    /// Per-subject position assigned by the broker.
    pub sequence: u64,

    /// Raw payload.
    pub data: Bytes,

    /// Payload metadata.
    pub headers: Headers,

    /// Time the broker stored the message.
    pub timestamp: DateTime<Utc>,
}

impl ReceivedMessage {
    /// Returns the `content-type` header, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE_HEADER).map(String::as_str)
    }

    /// Returns a header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Outcome of a publish reported by the ingress service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishResult {
    /// Sequence assigned to the stored message.
    pub sequence: u64,

    /// Name of the object holding the payload server-side.
    pub object_name: String,

    /// Zero on success, a server-defined code otherwise.
    pub status_code: i64,

    /// Human readable failure reason when `status_code` is non-zero.
    pub error_message: String,
}

impl PublishResult {
    /// Whether the server accepted the message.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status_code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_lookup() {
        let message = ReceivedMessage {
            subject: "docs".to_string(),
            sequence: 3,
            data: Bytes::from_static(b"{}"),
            headers: Headers::from([(
                CONTENT_TYPE_HEADER.to_string(),
                "application/json".to_string(),
            )]),
            timestamp: Utc::now(),
        };

        assert_eq!(message.content_type(), Some("application/json"));
        assert_eq!(message.header("filename"), None);
    }

    #[test]
    fn test_publish_message_headers() {
        let message = PublishMessage::new("docs", "hello")
            .with_header("a", "1")
            .with_header("a", "2");

        assert_eq!(message.headers.get("a").map(String::as_str), Some("2"));
        assert_eq!(message.data, Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_publish_result_status() {
        let ok = PublishResult::default();
        let failed = PublishResult {
            status_code: 13,
            error_message: "disk full".to_string(),
            ..PublishResult::default()
        };

        assert!(ok.is_success());
        assert!(!failed.is_success());
    }
}
