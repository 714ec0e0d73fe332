use async_trait::async_trait;
use minitoolstream_connector::{BoxError, CancellationToken, MessageHandler, ReceivedMessage};
use tracing::info;

/// Payloads below this size are logged verbatim when they are plain text.
const MAX_LOGGED_TEXT: usize = 1000;

/// Handler that logs every received message.
#[derive(Clone, Debug, Default)]
pub struct LogHandler {
    prefix: String,
}

impl LogHandler {
    /// Creates a handler whose log lines carry `prefix`.
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl MessageHandler for LogHandler {
    async fn handle(
        &self,
        message: &ReceivedMessage,
        _shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError> {
        info!(
            prefix = %self.prefix,
            subject = %message.subject,
            sequence = message.sequence,
            size = message.data.len(),
            "message"
        );

        if !message.headers.is_empty() {
            info!(prefix = %self.prefix, headers = ?message.headers, "headers");
        }

        if message.content_type() == Some("text/plain")
            && !message.data.is_empty()
            && message.data.len() < MAX_LOGGED_TEXT
        {
            info!(
                prefix = %self.prefix,
                "data: {}",
                String::from_utf8_lossy(&message.data)
            );
        }

        Ok(())
    }
}
