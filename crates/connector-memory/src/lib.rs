//! In-memory implementation of the connector clients for tests and local
//! development.
//!
//! [`MemoryBroker`] plays both the ingress and the egress service. Messages are
//! kept per subject with 1-based sequences, and fetch positions are tracked per
//! `(durable name, subject)` the way a durable consumer on the real broker is.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use minitoolstream_connector::{
    EgressClient, Error, IngressClient, MessageStream, Notification, NotificationStream,
    PublishMessage, PublishResult, ReceivedMessage, SubscriptionConfig,
};
use tokio::sync::{Mutex, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Notifications buffered per subscription before new ones are dropped.
const NOTIFICATION_BUFFER: usize = 100;

type CursorKey = (String, String);

#[derive(Debug, Default)]
struct BrokerState {
    closed: bool,
    cursors: HashMap<CursorKey, u64>,
    subjects: HashMap<String, Vec<ReceivedMessage>>,
    watchers: HashMap<String, Vec<mpsc::Sender<Result<Notification, Error>>>>,
}

impl BrokerState {
    fn last_sequence(&self, subject: &str) -> u64 {
        self.subjects
            .get(subject)
            .map_or(0, |messages| messages.len() as u64)
    }

    fn notify(&mut self, subject: &str, sequence: u64) {
        if let Some(watchers) = self.watchers.get_mut(subject) {
            watchers.retain(|watcher| {
                match watcher.try_send(Ok(Notification::new(subject, sequence))) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        debug!(subject, sequence, "subscriber lagging, notification dropped");
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => false,
                }
            });
        }
    }

    /// Drops watchers whose notification stream was dropped.
    fn prune_watchers(&mut self) {
        self.watchers.retain(|_, senders| {
            senders.retain(|sender| !sender.is_closed());
            !senders.is_empty()
        });
    }

    fn watcher_count(&self) -> usize {
        self.watchers.values().map(Vec::len).sum()
    }
}

/// In-memory broker implementing [`IngressClient`] and [`EgressClient`].
///
/// Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryBroker {
    close_count: Arc<AtomicUsize>,
    state: Arc<Mutex<BrokerState>>,
}

impl MemoryBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times [`EgressClient::close`] or [`IngressClient::close`] was called.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    /// Last sequence delivered to `durable_name` on `subject`.
    pub async fn cursor(&self, durable_name: &str, subject: &str) -> u64 {
        let state = self.state.lock().await;
        state
            .cursors
            .get(&(durable_name.to_string(), subject.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of notification streams still attached.
    pub async fn subscription_count(&self) -> usize {
        let mut state = self.state.lock().await;
        state.prune_watchers();
        state.watcher_count()
    }

    async fn close_inner(&self) {
        self.close_count.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock().await;
        if !state.closed {
            debug!("closing in-memory broker");
            state.closed = true;
            state.watchers.clear();
        }
    }
}

#[async_trait]
impl IngressClient for MemoryBroker {
    async fn publish(&self, message: PublishMessage) -> Result<PublishResult, Error> {
        if message.subject.is_empty() {
            return Err(Error::InvalidArgument("subject cannot be empty"));
        }

        let mut state = self.state.lock().await;
        if state.closed {
            return Err(Error::Closed);
        }

        let PublishMessage {
            subject,
            data,
            headers,
        } = message;

        let log = state.subjects.entry(subject.clone()).or_default();
        let sequence = log.len() as u64 + 1;
        log.push(ReceivedMessage {
            subject: subject.clone(),
            sequence,
            data,
            headers,
            timestamp: Utc::now(),
        });

        state.notify(&subject, sequence);
        drop(state);

        debug!(subject = %subject, sequence, "message stored");

        Ok(PublishResult {
            sequence,
            object_name: format!("{subject}/{sequence}"),
            status_code: 0,
            error_message: String::new(),
        })
    }

    async fn close(&self) -> Result<(), Error> {
        self.close_inner().await;
        Ok(())
    }
}

#[async_trait]
impl EgressClient for MemoryBroker {
    async fn subscribe(&self, config: &SubscriptionConfig) -> Result<NotificationStream, Error> {
        config.validate()?;

        let mut state = self.state.lock().await;
        if state.closed {
            return Err(Error::Closed);
        }

        let key = (config.durable_name.clone(), config.subject.clone());
        if let Some(start_sequence) = config.start_sequence {
            state.cursors.insert(key.clone(), start_sequence.saturating_sub(1));
        }

        state.prune_watchers();

        let (sender, receiver) = mpsc::channel(NOTIFICATION_BUFFER);

        // Announce a backlog so the subscriber catches up without waiting for
        // the next publish.
        let last_sequence = state.last_sequence(&config.subject);
        let cursor = state.cursors.get(&key).copied().unwrap_or(0);
        if last_sequence > cursor {
            let _ = sender.try_send(Ok(Notification::new(config.subject.clone(), last_sequence)));
        }

        state
            .watchers
            .entry(config.subject.clone())
            .or_default()
            .push(sender);
        drop(state);

        debug!(subject = %config.subject, durable = %config.durable_name, "subscribed");

        Ok(ReceiverStream::new(receiver).boxed())
    }

    async fn fetch(&self, config: &SubscriptionConfig) -> Result<MessageStream, Error> {
        config.validate()?;

        let mut state = self.state.lock().await;
        if state.closed {
            return Err(Error::Closed);
        }

        let key = (config.durable_name.clone(), config.subject.clone());
        let cursor = state.cursors.get(&key).copied().unwrap_or(0);

        let batch: Vec<ReceivedMessage> = state
            .subjects
            .get(&config.subject)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|message| message.sequence > cursor)
                    .take(config.batch_size as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(last) = batch.last() {
            state.cursors.insert(key, last.sequence);
        }
        drop(state);

        debug!(
            subject = %config.subject,
            durable = %config.durable_name,
            count = batch.len(),
            "fetched batch"
        );

        Ok(stream::iter(batch.into_iter().map(Ok)).boxed())
    }

    async fn last_sequence(&self, subject: &str) -> Result<u64, Error> {
        if subject.is_empty() {
            return Err(Error::InvalidArgument("subject cannot be empty"));
        }

        let state = self.state.lock().await;
        if state.closed {
            return Err(Error::Closed);
        }

        Ok(state.last_sequence(subject))
    }

    async fn close(&self) -> Result<(), Error> {
        self.close_inner().await;
        Ok(())
    }
}
