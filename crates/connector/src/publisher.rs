use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{MessagePreparer, ResultHandler};

/// Publishes prepared messages to the ingress service.
#[async_trait]
pub trait Publisher
where
    Self: Send + Sync + 'static,
{
    /// The error type for the publisher.
    type Error: Error + Send + Sync + 'static;

    /// Prepares and publishes a single message.
    async fn publish(&self, preparer: Arc<dyn MessagePreparer>) -> Result<(), Self::Error>;

    /// Publishes every given preparer concurrently, or every registered
    /// preparer when `preparers` is empty.
    async fn publish_all(&self, preparers: Vec<Arc<dyn MessagePreparer>>)
    -> Result<(), Self::Error>;

    /// Adds a preparer used by [`Publisher::publish_all`].
    fn register_preparer(&self, preparer: Arc<dyn MessagePreparer>);

    /// Adds several preparers used by [`Publisher::publish_all`].
    fn register_preparers(&self, preparers: Vec<Arc<dyn MessagePreparer>>);

    /// Replaces the handler invoked with every publish result.
    fn set_result_handler(&self, handler: Arc<dyn ResultHandler>);

    /// Releases the ingress client.
    async fn close(&self) -> Result<(), Self::Error>;
}
