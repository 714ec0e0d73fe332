use crate::{Error, Notification, PublishMessage, PublishResult, ReceivedMessage, SubscriptionConfig};

use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy sequence of notifications for one subject.
///
/// Ends with `None` on end-of-stream; an `Err` item reports a broken stream.
pub type NotificationStream = BoxStream<'static, Result<Notification, Error>>;

/// Lazy sequence of messages produced by one fetch.
///
/// Ends with `None` once the batch is drained; an `Err` item aborts the fetch.
pub type MessageStream = BoxStream<'static, Result<ReceivedMessage, Error>>;

/// Client for the ingress (publish) service.
#[async_trait]
pub trait IngressClient
where
    Self: Send + Sync + 'static,
{
    /// Publishes one message.
    async fn publish(&self, message: PublishMessage) -> Result<PublishResult, Error>;

    /// Releases the underlying connection.
    async fn close(&self) -> Result<(), Error>;
}

/// Client for the egress (subscribe) service.
///
/// Implementations are shared by every subject worker, so all methods must be
/// safe to call concurrently.
#[async_trait]
pub trait EgressClient
where
    Self: Send + Sync + 'static,
{
    /// Opens a notification stream for `config.subject`.
    async fn subscribe(&self, config: &SubscriptionConfig) -> Result<NotificationStream, Error>;

    /// Opens a stream over the next batch of messages for the durable consumer.
    async fn fetch(&self, config: &SubscriptionConfig) -> Result<MessageStream, Error>;

    /// Returns the last sequence the server assigned on `subject`.
    async fn last_sequence(&self, subject: &str) -> Result<u64, Error>;

    /// Releases the underlying connection.
    async fn close(&self) -> Result<(), Error>;
}
