//! Scripted egress client and recording handler shared by the subscriber tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use minitoolstream_connector::{
    BoxError, CancellationToken, EgressClient, Error, Headers, MessageHandler, MessageStream,
    Notification, NotificationStream, ReceivedMessage, SubscriptionConfig,
};
use parking_lot::Mutex;

/// Installs a test log writer once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok()
}

/// Builds a received message with a predictable payload.
pub fn message(subject: &str, sequence: u64) -> ReceivedMessage {
    ReceivedMessage {
        subject: subject.to_string(),
        sequence,
        data: Bytes::from(format!("{subject}-{sequence}")),
        headers: Headers::new(),
        timestamp: Utc::now(),
    }
}

/// Response to one fetch call.
pub enum Batch {
    Messages(Vec<ReceivedMessage>),
    Hang,
}

/// Scripted behaviour of one subject.
#[derive(Default)]
pub struct SubjectScript {
    subscribe_fails: bool,
    notifications: Vec<Result<Notification, Error>>,
    hold_open: bool,
    batches: VecDeque<Batch>,
}

impl SubjectScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe calls for this subject fail.
    pub fn subscribe_fails(mut self) -> Self {
        self.subscribe_fails = true;
        self
    }

    /// Notification for `sequence` on `subject`.
    pub fn notify(mut self, subject: &str, sequence: u64) -> Self {
        self.notifications
            .push(Ok(Notification::new(subject, sequence)));
        self
    }

    /// Mid-stream failure.
    pub fn stream_error(mut self) -> Self {
        self.notifications
            .push(Err(Error::stream("notification stream reset")));
        self
    }

    /// Keep the stream open after the scripted notifications instead of
    /// ending it.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn batch(mut self, messages: Vec<ReceivedMessage>) -> Self {
        self.batches.push_back(Batch::Messages(messages));
        self
    }

    pub fn hanging_batch(mut self) -> Self {
        self.batches.push_back(Batch::Hang);
        self
    }
}

/// Egress client that replays per-subject scripts and counts calls.
#[derive(Default)]
pub struct ScriptedEgress {
    scripts: Mutex<HashMap<String, SubjectScript>>,
    subscribed: Mutex<Vec<String>>,
    fetches: Mutex<HashMap<String, usize>>,
    close_count: AtomicUsize,
}

impl ScriptedEgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(self, subject: &str, script: SubjectScript) -> Self {
        self.scripts.lock().insert(subject.to_string(), script);
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn subscribed(&self) -> Vec<String> {
        let mut subjects = self.subscribed.lock().clone();
        subjects.sort();
        subjects
    }

    pub fn fetch_count(&self, subject: &str) -> usize {
        self.fetches.lock().get(subject).copied().unwrap_or(0)
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EgressClient for ScriptedEgress {
    async fn subscribe(&self, config: &SubscriptionConfig) -> Result<NotificationStream, Error> {
        self.subscribed.lock().push(config.subject.clone());

        let (fails, notifications, hold_open) = {
            let mut scripts = self.scripts.lock();
            let script = scripts.entry(config.subject.clone()).or_default();
            (
                script.subscribe_fails,
                std::mem::take(&mut script.notifications),
                script.hold_open,
            )
        };

        if fails {
            return Err(Error::transport("egress unavailable"));
        }

        let notifications = stream::iter(notifications);
        if hold_open {
            Ok(notifications.chain(stream::pending()).boxed())
        } else {
            Ok(notifications.boxed())
        }
    }

    async fn fetch(&self, config: &SubscriptionConfig) -> Result<MessageStream, Error> {
        *self
            .fetches
            .lock()
            .entry(config.subject.clone())
            .or_default() += 1;

        let batch = self
            .scripts
            .lock()
            .get_mut(&config.subject)
            .and_then(|script| script.batches.pop_front());

        match batch {
            Some(Batch::Messages(messages)) => Ok(stream::iter(messages.into_iter().map(Ok)).boxed()),
            Some(Batch::Hang) => Ok(stream::pending().boxed()),
            None => Ok(stream::empty().boxed()),
        }
    }

    async fn last_sequence(&self, _subject: &str) -> Result<u64, Error> {
        Ok(0)
    }

    async fn close(&self) -> Result<(), Error> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Handler that records every sequence it sees and optionally rejects some.
#[derive(Default)]
pub struct RecordingHandler {
    seen: Mutex<Vec<u64>>,
    reject: Vec<u64>,
}

impl RecordingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(sequences: Vec<u64>) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            reject: sequences,
        })
    }

    pub fn seen(&self) -> Vec<u64> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(
        &self,
        message: &ReceivedMessage,
        _shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError> {
        self.seen.lock().push(message.sequence);
        if self.reject.contains(&message.sequence) {
            return Err(format!("rejected {}", message.sequence).into());
        }
        Ok(())
    }
}
