use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;

use crate::MessageHandler;

/// Consumes messages from one or more subjects and hands them to handlers.
#[async_trait]
pub trait Subscriber
where
    Self: Send + Sync + 'static,
{
    /// The error type for the subscriber.
    type Error: Error + Send + Sync + 'static;

    /// Binds `handler` to `subject`, replacing any previous binding.
    fn register_handler(
        &self,
        subject: String,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), Self::Error>;

    /// Binds several handlers at once. Last write wins per subject.
    fn register_handlers(
        &self,
        handlers: HashMap<String, Arc<dyn MessageHandler>>,
    ) -> Result<(), Self::Error>;

    /// Starts consuming every registered subject. Returns without waiting for
    /// subscriptions to be established.
    async fn start(&self) -> Result<(), Self::Error>;

    /// Stops every subscription and releases the client.
    async fn stop(&self);

    /// Blocks until every subscription has ended on its own.
    async fn wait(&self);
}
