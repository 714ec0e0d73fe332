use minitoolstream_connector::BoxError;
use thiserror::Error;

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum Error {
    /// Some messages of a concurrent publish failed.
    #[error("failed to publish {failed} of {total} messages")]
    Batch {
        /// Number of failed messages.
        failed: usize,

        /// Number of messages attempted.
        total: usize,

        /// Failures keyed by 1-based position in the batch.
        failures: Vec<(usize, Error)>,
    },

    /// Closing the ingress client failed.
    #[error("failed to close client: {0}")]
    Close(#[source] minitoolstream_connector::Error),

    /// A publish task panicked or was aborted.
    #[error("publish task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Neither the call nor the registry supplied any preparers.
    #[error("no message preparers to publish")]
    NothingToPublish,

    /// The preparer could not build a message.
    #[error("failed to prepare message: {0}")]
    Prepare(#[source] BoxError),

    /// The ingress client rejected the request.
    #[error("publish failed: {0}")]
    Publish(#[source] minitoolstream_connector::Error),

    /// The server accepted the request but reported a failure status.
    #[error("server error (status {status_code}): {message}")]
    Server {
        /// Non-zero status returned by the server.
        status_code: i64,

        /// Server-provided description.
        message: String,
    },
}
