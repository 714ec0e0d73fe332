use crate::Error;
use crate::result_handler::LoggingResultHandler;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use minitoolstream_connector::{
    CancellationToken, IngressClient, MessagePreparer, PublishResult, Publisher, ResultHandler,
};
use parking_lot::RwLock;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, info, warn};

/// Options for the simple publisher.
#[derive(Clone)]
pub struct PublisherOptions {
    /// Ingress client used for every publish.
    pub client: Arc<dyn IngressClient>,

    /// Handler invoked with every publish result. Defaults to a verbose
    /// [`LoggingResultHandler`].
    pub result_handler: Option<Arc<dyn ResultHandler>>,
}

impl PublisherOptions {
    /// Creates options with the default result handler.
    pub fn new(client: Arc<dyn IngressClient>) -> Self {
        Self {
            client,
            result_handler: None,
        }
    }
}

impl fmt::Debug for PublisherOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherOptions")
            .field("custom_result_handler", &self.result_handler.is_some())
            .finish_non_exhaustive()
    }
}

/// Publishes prepared messages, one at a time or concurrently.
pub struct SimplePublisher {
    client: Arc<dyn IngressClient>,
    preparers: RwLock<Vec<Arc<dyn MessagePreparer>>>,
    result_handler: RwLock<Arc<dyn ResultHandler>>,
    shutdown_token: CancellationToken,
}

impl SimplePublisher {
    /// Creates a new publisher.
    pub fn new(
        PublisherOptions {
            client,
            result_handler,
        }: PublisherOptions,
    ) -> Self {
        let result_handler =
            result_handler.unwrap_or_else(|| Arc::new(LoggingResultHandler::new(true)));

        Self {
            client,
            preparers: RwLock::new(Vec::new()),
            result_handler: RwLock::new(result_handler),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Adds a preparer used when [`SimplePublisher::publish_all`] is called
    /// without arguments.
    pub fn register_preparer(&self, preparer: Arc<dyn MessagePreparer>) {
        let mut preparers = self.preparers.write();
        preparers.push(preparer);
        info!("registered message preparer (total: {})", preparers.len());
    }

    /// Adds several preparers at once.
    pub fn register_preparers<I>(&self, preparers: I)
    where
        I: IntoIterator<Item = Arc<dyn MessagePreparer>>,
    {
        let mut registry = self.preparers.write();
        let before = registry.len();
        registry.extend(preparers);
        info!(
            "registered {} message preparers (total: {})",
            registry.len() - before,
            registry.len()
        );
    }

    /// Replaces the result handler.
    pub fn set_result_handler(&self, handler: Arc<dyn ResultHandler>) {
        *self.result_handler.write() = handler;
        info!("custom result handler set");
    }

    /// Number of registered preparers.
    #[must_use]
    pub fn preparer_count(&self) -> usize {
        self.preparers.read().len()
    }

    /// Prepares and publishes one message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prepare`] when the preparer fails, [`Error::Publish`]
    /// when the client fails and [`Error::Server`] for a non-zero status.
    pub async fn publish(
        &self,
        preparer: Arc<dyn MessagePreparer>,
    ) -> Result<PublishResult, Error> {
        let result_handler = self.result_handler.read().clone();
        publish_one(
            1,
            self.client.clone(),
            result_handler,
            preparer,
            self.shutdown_token.clone(),
        )
        .await
    }

    /// Publishes every preparer concurrently and waits for all of them.
    ///
    /// An empty `preparers` publishes the registered ones instead. Dropping the
    /// returned future aborts the publishes still in flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToPublish`] when there is nothing to publish and
    /// [`Error::Batch`] listing every failure otherwise.
    pub async fn publish_all(&self, preparers: Vec<Arc<dyn MessagePreparer>>) -> Result<(), Error> {
        let preparers = if preparers.is_empty() {
            self.preparers.read().clone()
        } else {
            preparers
        };

        if preparers.is_empty() {
            return Err(Error::NothingToPublish);
        }

        let total = preparers.len();
        info!("publishing {} messages", total);

        let result_handler = self.result_handler.read().clone();
        let handles: Vec<_> = preparers
            .into_iter()
            .enumerate()
            .map(|(i, preparer)| {
                AbortOnDropHandle::new(tokio::spawn(publish_one(
                    i + 1,
                    self.client.clone(),
                    result_handler.clone(),
                    preparer,
                    self.shutdown_token.clone(),
                )))
            })
            .collect();

        let failures: Vec<(usize, Error)> = join_all(handles)
            .await
            .into_iter()
            .enumerate()
            .filter_map(|(i, joined)| match joined {
                Ok(Ok(_)) => None,
                Ok(Err(e)) => Some((i + 1, e)),
                Err(e) => Some((i + 1, Error::Join(e))),
            })
            .collect();

        if failures.is_empty() {
            info!("all {} messages published", total);
            return Ok(());
        }

        for (index, e) in &failures {
            error!(index, "message failed: {}", e);
        }

        Err(Error::Batch {
            failed: failures.len(),
            total,
            failures,
        })
    }

    /// Cancels the token handed to preparers and result handlers, then closes
    /// the ingress client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Close`] when the client fails to close.
    pub async fn close(&self) -> Result<(), Error> {
        self.shutdown_token.cancel();
        self.client.close().await.map_err(Error::Close)?;
        info!("publisher closed");
        Ok(())
    }
}

async fn publish_one(
    index: usize,
    client: Arc<dyn IngressClient>,
    result_handler: Arc<dyn ResultHandler>,
    preparer: Arc<dyn MessagePreparer>,
    shutdown_token: CancellationToken,
) -> Result<PublishResult, Error> {
    debug!(index, "preparing message");
    let message = preparer
        .prepare(&shutdown_token)
        .await
        .map_err(Error::Prepare)?;

    debug!(index, subject = %message.subject, size = message.data.len(), "publishing");
    let result = client.publish(message).await.map_err(Error::Publish)?;

    if let Err(e) = result_handler.handle(&result, &shutdown_token).await {
        warn!(index, "result handler error: {}", e);
    }

    if !result.is_success() {
        return Err(Error::Server {
            status_code: result.status_code,
            message: result.error_message,
        });
    }

    Ok(result)
}

impl fmt::Debug for SimplePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplePublisher")
            .field("preparers", &self.preparer_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Publisher for SimplePublisher {
    type Error = Error;

    async fn publish(&self, preparer: Arc<dyn MessagePreparer>) -> Result<(), Error> {
        Self::publish(self, preparer).await.map(|_| ())
    }

    async fn publish_all(&self, preparers: Vec<Arc<dyn MessagePreparer>>) -> Result<(), Error> {
        Self::publish_all(self, preparers).await
    }

    fn register_preparer(&self, preparer: Arc<dyn MessagePreparer>) {
        Self::register_preparer(self, preparer);
    }

    fn register_preparers(&self, preparers: Vec<Arc<dyn MessagePreparer>>) {
        Self::register_preparers(self, preparers);
    }

    fn set_result_handler(&self, handler: Arc<dyn ResultHandler>) {
        Self::set_result_handler(self, handler);
    }

    async fn close(&self) -> Result<(), Error> {
        Self::close(self).await
    }
}
