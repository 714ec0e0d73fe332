//! Multi-subject subscriber for the MiniToolStream egress service.
//!
//! [`MultiSubject`] binds message handlers to subjects and, once started, runs
//! one worker per subject. Each worker keeps a notification stream open and,
//! for every notification, fetches the next batch for its durable consumer and
//! hands the messages to the subject's handler in order.
//!
//! ```text
//! start ─► worker(a) ─► subscribe ─► relay ─► queue ─► fetch ─► handler(a)
//!       ─► worker(b) ─► subscribe ─► relay ─► queue ─► fetch ─► handler(b)
//! stop  ─► cancel all ─► join all ─► client.close()
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod fetch;
mod multi_subject;
mod worker;

pub use error::Error;
pub use fetch::CycleSummary;
pub use multi_subject::{
    DEFAULT_BATCH_SIZE, DEFAULT_QUEUE_CAPACITY, MultiSubject, MultiSubjectOptions, State,
};
