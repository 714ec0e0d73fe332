use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{BoxError, PublishMessage};

/// Builds a message for publishing.
#[async_trait]
pub trait MessagePreparer
where
    Self: Send + Sync + 'static,
{
    /// Produces the message to publish.
    ///
    /// `shutdown_token` is cancelled when the publisher closes.
    async fn prepare(
        &self,
        shutdown_token: &CancellationToken,
    ) -> Result<PublishMessage, BoxError>;
}

/// Closure-backed [`MessagePreparer`].
pub struct PreparerFn<F> {
    f: F,
}

impl<F> PreparerFn<F> {
    /// Wraps a closure.
    pub const fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared preparer.
    pub fn arc<Fut>(f: F) -> Arc<dyn MessagePreparer>
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PublishMessage, BoxError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<F> fmt::Debug for PreparerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparerFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> MessagePreparer for PreparerFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PublishMessage, BoxError>> + Send + 'static,
{
    async fn prepare(
        &self,
        shutdown_token: &CancellationToken,
    ) -> Result<PublishMessage, BoxError> {
        (self.f)(shutdown_token.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_preparer() {
        let preparer = PreparerFn::arc(|_token: CancellationToken| async {
            Ok::<_, BoxError>(PublishMessage::new("events", "payload"))
        });

        let message = preparer.prepare(&CancellationToken::new()).await.unwrap();

        assert_eq!(message.subject, "events");
    }

    #[tokio::test]
    async fn test_closure_preparer_sees_cancelled_token() {
        let preparer = PreparerFn::new(|token: CancellationToken| async move {
            if token.is_cancelled() {
                return Err::<PublishMessage, BoxError>("publisher closed".into());
            }
            Ok(PublishMessage::new("events", "payload"))
        });
        let token = CancellationToken::new();
        token.cancel();

        assert!(preparer.prepare(&token).await.is_err());
    }
}
