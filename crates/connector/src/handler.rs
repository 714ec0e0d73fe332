use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{BoxError, ReceivedMessage};

/// Processes messages received on a subject.
///
/// Called once per message. An error only affects that message; the
/// subscriber logs it and keeps delivering.
///
/// `shutdown_token` is cancelled when the subscriber stops. Long-running
/// handlers should watch it; the subscriber abandons a handler that is still
/// running once it fires.
#[async_trait]
pub trait MessageHandler
where
    Self: Send + Sync + 'static,
{
    /// Handles one message.
    async fn handle(
        &self,
        message: &ReceivedMessage,
        shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError>;
}

/// Closure-backed [`MessageHandler`].
///
/// The closure receives owned copies of the message and the shutdown token so
/// the returned future can be `'static`.
pub struct MessageHandlerFn<F> {
    f: F,
}

impl<F> MessageHandlerFn<F> {
    /// Wraps a closure.
    pub const fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared handler.
    pub fn arc<Fut>(f: F) -> Arc<dyn MessageHandler>
    where
        F: Fn(ReceivedMessage, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<F> fmt::Debug for MessageHandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageHandlerFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> MessageHandler for MessageHandlerFn<F>
where
    F: Fn(ReceivedMessage, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn handle(
        &self,
        message: &ReceivedMessage,
        shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError> {
        (self.f)(message.clone(), shutdown_token.clone()).await
    }
}
