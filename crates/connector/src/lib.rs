//! Abstract interface for the MiniToolStream connector.
//!
//! Defines the entities exchanged with the ingress (publish) and egress
//! (subscribe) services, the client traits the transport layer implements, and
//! the single-method capabilities (handlers, preparers, result handlers) that
//! application code plugs into publishers and subscribers.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Ingress and egress client traits plus the stream types they return.
pub mod client;

mod error;

/// Handlers process messages received from a subject.
pub mod handler;

/// Messages published to and received from subjects.
pub mod message;

/// Notifications signal that new messages exist for a subject.
pub mod notification;

/// Preparers build messages for publishing.
pub mod preparer;

/// Publishers send prepared messages to the ingress service.
pub mod publisher;

/// Result handlers process the outcome of a publish.
pub mod result_handler;

/// Subscribers consume messages from subjects.
pub mod subscriber;

/// Subscription configuration shared by subscribe and fetch requests.
pub mod subscription;

pub use client::{EgressClient, IngressClient, MessageStream, NotificationStream};
pub use error::{BoxError, Error};
pub use handler::{MessageHandler, MessageHandlerFn};
pub use message::{Headers, PublishMessage, PublishResult, ReceivedMessage};
pub use notification::Notification;
pub use preparer::{MessagePreparer, PreparerFn};
pub use publisher::Publisher;
pub use result_handler::{ResultHandler, ResultHandlerFn};
pub use subscriber::Subscriber;
pub use subscription::SubscriptionConfig;
pub use tokio_util::sync::CancellationToken;

/// Header carrying the MIME type of a payload.
pub const CONTENT_TYPE_HEADER: &str = "content-type";

/// Header carrying the original file name of a payload.
pub const FILENAME_HEADER: &str = "filename";

/// Header carrying the RFC 3339 preparation time of a payload.
pub const TIMESTAMP_HEADER: &str = "timestamp";
