use thiserror::Error;

/// Type-erased error returned by user-supplied handlers, preparers and
/// transport implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by connector clients and streams.
#[derive(Debug, Error)]
pub enum Error {
    /// The client has been closed.
    #[error("client closed")]
    Closed,

    /// A request argument was rejected before reaching the transport.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A stream failed part way through.
    #[error("stream error: {0}")]
    Stream(#[source] BoxError),

    /// The transport failed to carry out a request.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    /// Wraps any error as a transport failure.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Transport(error.into())
    }

    /// Wraps any error as a mid-stream failure.
    pub fn stream<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Stream(error.into())
    }
}
