/// Signals that messages exist at or before `sequence` for `subject`.
///
/// Carries no payload; the subscriber fetches the messages separately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Subject that received new data.
    pub subject: String,

    /// Latest sequence known to the server when the notification was sent.
    pub sequence: u64,
}

impl Notification {
    /// Creates a new notification.
    pub fn new<S: Into<String>>(subject: S, sequence: u64) -> Self {
        Self {
            subject: subject.into(),
            sequence,
        }
    }
}
