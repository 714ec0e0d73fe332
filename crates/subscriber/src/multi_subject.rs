use crate::Error;
use crate::worker::SubjectWorker;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use minitoolstream_connector::{EgressClient, MessageHandler, Subscriber};
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

/// Batch size used when the options leave it at zero.
pub const DEFAULT_BATCH_SIZE: u32 = 10;

/// Per-subject notification queue capacity used when the options leave it at zero.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Options for the multi-subject subscriber.
#[derive(Clone)]
pub struct MultiSubjectOptions {
    /// Egress client shared by every subject worker.
    pub client: Arc<dyn EgressClient>,

    /// Durable consumer name; the broker tracks each subject's cursor under it.
    pub durable_name: String,

    /// Messages per fetch. Zero selects [`DEFAULT_BATCH_SIZE`].
    pub batch_size: u32,

    /// Pending notifications buffered per subject. Zero selects
    /// [`DEFAULT_QUEUE_CAPACITY`].
    pub queue_capacity: usize,
}

impl MultiSubjectOptions {
    /// Creates options with default batch size and queue capacity.
    pub fn new<D: Into<String>>(client: Arc<dyn EgressClient>, durable_name: D) -> Self {
        Self {
            client,
            durable_name: durable_name.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl fmt::Debug for MultiSubjectOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSubjectOptions")
            .field("durable_name", &self.durable_name)
            .field("batch_size", &self.batch_size)
            .field("queue_capacity", &self.queue_capacity)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a [`MultiSubject`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Accepting registrations.
    Created,

    /// Workers spawned.
    Running,

    /// Cancellation signalled, waiting for workers to exit.
    Stopping,

    /// Workers exited and the client is closed.
    Stopped,
}

/// Subscribes to many subjects at once, one worker per subject.
///
/// Workers share a single cancellation token; stopping always stops every
/// subject. A failure in one subject (subscribe error, broken stream, handler
/// error) is logged and never affects the others.
pub struct MultiSubject {
    batch_size: u32,
    client: Arc<dyn EgressClient>,
    durable_name: String,
    handlers: RwLock<HashMap<String, Arc<dyn MessageHandler>>>,
    queue_capacity: usize,
    shutdown_token: CancellationToken,
    state: Mutex<State>,
    stopped_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl MultiSubject {
    /// Creates a new subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDurableName`] when no durable name is given.
    pub fn new(
        MultiSubjectOptions {
            client,
            durable_name,
            batch_size,
            queue_capacity,
        }: MultiSubjectOptions,
    ) -> Result<Self, Error> {
        if durable_name.is_empty() {
            return Err(Error::EmptyDurableName);
        }

        Ok(Self {
            batch_size: if batch_size == 0 {
                DEFAULT_BATCH_SIZE
            } else {
                batch_size
            },
            client,
            durable_name,
            handlers: RwLock::new(HashMap::new()),
            queue_capacity: if queue_capacity == 0 {
                DEFAULT_QUEUE_CAPACITY
            } else {
                queue_capacity
            },
            shutdown_token: CancellationToken::new(),
            state: Mutex::new(State::Created),
            stopped_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> State {
        *self.state.lock()
    }

    /// Subjects with a registered handler, sorted.
    #[must_use]
    pub fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self.handlers.read().keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Binds `handler` to `subject`, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySubject`] for an empty subject and
    /// [`Error::RegistrationClosed`] once the subscriber has started.
    pub fn register_handler<S: Into<String>>(
        &self,
        subject: S,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), Error> {
        let subject = subject.into();
        if subject.is_empty() {
            return Err(Error::EmptySubject);
        }

        let state = self.state.lock();
        if *state != State::Created {
            return Err(Error::RegistrationClosed);
        }

        self.handlers.write().insert(subject.clone(), handler);
        drop(state);

        info!(subject = %subject, "registered handler");
        Ok(())
    }

    /// Binds several handlers at once. Last write wins per subject.
    ///
    /// Nothing is registered if any subject is empty.
    ///
    /// # Errors
    ///
    /// Same as [`MultiSubject::register_handler`].
    pub fn register_handlers<I, S>(&self, handlers: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (S, Arc<dyn MessageHandler>)>,
        S: Into<String>,
    {
        let handlers: Vec<(String, Arc<dyn MessageHandler>)> = handlers
            .into_iter()
            .map(|(subject, handler)| (subject.into(), handler))
            .collect();
        if handlers.iter().any(|(subject, _)| subject.is_empty()) {
            return Err(Error::EmptySubject);
        }

        let state = self.state.lock();
        if *state != State::Created {
            return Err(Error::RegistrationClosed);
        }

        let mut registry = self.handlers.write();
        for (subject, handler) in handlers {
            info!(subject = %subject, "registered handler");
            registry.insert(subject, handler);
        }
        drop(registry);
        drop(state);

        Ok(())
    }

    /// Spawns one worker per registered subject and returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoHandlers`] when nothing is registered,
    /// [`Error::AlreadyStarted`] on a second call and [`Error::Stopped`] after
    /// [`MultiSubject::stop`].
    pub fn start(&self) -> Result<(), Error> {
        let bindings: Vec<(String, Arc<dyn MessageHandler>)> = {
            let mut state = self.state.lock();
            match *state {
                State::Created => {}
                State::Running => return Err(Error::AlreadyStarted),
                State::Stopping | State::Stopped => return Err(Error::Stopped),
            }

            let handlers = self.handlers.read();
            if handlers.is_empty() {
                return Err(Error::NoHandlers);
            }

            *state = State::Running;
            handlers
                .iter()
                .map(|(subject, handler)| (subject.clone(), handler.clone()))
                .collect()
        };

        info!("starting subscriptions for {} subjects", bindings.len());

        for (subject, handler) in bindings {
            let worker = SubjectWorker {
                batch_size: self.batch_size,
                client: self.client.clone(),
                durable_name: self.durable_name.clone(),
                handler,
                queue_capacity: self.queue_capacity,
                shutdown_token: self.shutdown_token.clone(),
                subject,
                task_tracker: self.task_tracker.clone(),
            };
            self.task_tracker.spawn(worker.run());
        }

        self.task_tracker.close();

        Ok(())
    }

    /// Cancels every worker, waits for them to exit, then closes the client.
    ///
    /// Safe to call repeatedly and from several tasks: later callers wait for
    /// the first one to finish, and the client is closed exactly once.
    pub async fn stop(&self) {
        let first = {
            let mut state = self.state.lock();
            match *state {
                State::Created | State::Running => {
                    *state = State::Stopping;
                    true
                }
                State::Stopping | State::Stopped => false,
            }
        };

        if !first {
            debug!("stop already in progress");
            self.stopped_token.cancelled().await;
            return;
        }

        info!("stopping subscriber");

        self.shutdown_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        if let Err(e) = self.client.close().await {
            error!("{}", Error::Close(e));
        }

        *self.state.lock() = State::Stopped;
        self.stopped_token.cancel();

        info!("subscriber stopped");
    }

    /// Blocks until every worker has exited, without cancelling them.
    ///
    /// Returns immediately if the subscriber was never started.
    pub async fn wait(&self) {
        if self.state() == State::Created {
            return;
        }

        self.task_tracker.wait().await;
    }
}

impl fmt::Debug for MultiSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSubject")
            .field("batch_size", &self.batch_size)
            .field("durable_name", &self.durable_name)
            .field("queue_capacity", &self.queue_capacity)
            .field("state", &self.state())
            .field("subjects", &self.subjects())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Subscriber for MultiSubject {
    type Error = Error;

    fn register_handler(
        &self,
        subject: String,
        handler: Arc<dyn MessageHandler>,
    ) -> Result<(), Error> {
        Self::register_handler(self, subject, handler)
    }

    fn register_handlers(
        &self,
        handlers: HashMap<String, Arc<dyn MessageHandler>>,
    ) -> Result<(), Error> {
        Self::register_handlers(self, handlers)
    }

    async fn start(&self) -> Result<(), Error> {
        Self::start(self)
    }

    async fn stop(&self) {
        Self::stop(self).await;
    }

    async fn wait(&self) {
        Self::wait(self).await;
    }
}
