use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{BoxError, PublishResult};

/// Processes the outcome of a publish.
#[async_trait]
pub trait ResultHandler
where
    Self: Send + Sync + 'static,
{
    /// Handles one publish result.
    ///
    /// `shutdown_token` is cancelled when the publisher closes.
    async fn handle(
        &self,
        result: &PublishResult,
        shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError>;
}

/// Closure-backed [`ResultHandler`].
pub struct ResultHandlerFn<F> {
    f: F,
}

impl<F> ResultHandlerFn<F> {
    /// Wraps a closure.
    pub const fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps a closure and returns it as a shared result handler.
    pub fn arc<Fut>(f: F) -> Arc<dyn ResultHandler>
    where
        F: Fn(PublishResult, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<F> fmt::Debug for ResultHandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandlerFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> ResultHandler for ResultHandlerFn<F>
where
    F: Fn(PublishResult, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn handle(
        &self,
        result: &PublishResult,
        shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError> {
        (self.f)(result.clone(), shutdown_token.clone()).await
    }
}
