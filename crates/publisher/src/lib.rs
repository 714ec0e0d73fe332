//! Publisher for the MiniToolStream ingress service.
//!
//! [`SimplePublisher`] runs registered [`MessagePreparer`]s, sends what they
//! build through an [`IngressClient`] and reports every outcome to a
//! [`ResultHandler`].
//!
//! [`MessagePreparer`]: minitoolstream_connector::MessagePreparer
//! [`IngressClient`]: minitoolstream_connector::IngressClient
//! [`ResultHandler`]: minitoolstream_connector::ResultHandler
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod result_handler;
mod simple;

pub use error::Error;
pub use result_handler::LoggingResultHandler;
pub use simple::{PublisherOptions, SimplePublisher};
