use thiserror::Error;

/// Errors that can occur in the multi-subject subscriber.
#[derive(Debug, Error)]
pub enum Error {
    /// `start` was called on a running subscriber.
    #[error("subscriber already started")]
    AlreadyStarted,

    /// Shutdown interrupted the operation.
    #[error("cancelled")]
    Cancelled,

    /// Closing the egress client failed.
    #[error("failed to close client: {0}")]
    Close(#[source] minitoolstream_connector::Error),

    /// A durable name is required so the broker can track delivery progress.
    #[error("durable name cannot be empty")]
    EmptyDurableName,

    /// Handlers must be bound to a named subject.
    #[error("subject cannot be empty")]
    EmptySubject,

    /// Opening a fetch stream failed.
    #[error("failed to fetch: {0}")]
    Fetch(#[source] minitoolstream_connector::Error),

    /// `start` was called without any registered handler.
    #[error("no handlers registered")]
    NoHandlers,

    /// Handlers registered after `start` would never get a worker.
    #[error("handlers cannot be registered after start")]
    RegistrationClosed,

    /// The subscriber has already been stopped.
    #[error("subscriber stopped")]
    Stopped,

    /// A message stream failed part way through a fetch.
    #[error("fetch error: {0}")]
    Stream(#[source] minitoolstream_connector::Error),

    /// Opening the notification stream failed.
    #[error("failed to subscribe: {0}")]
    Subscribe(#[source] minitoolstream_connector::Error),
}
