use crate::Error;

/// Describes one subscribe or fetch request against the egress service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionConfig {
    /// Subject to subscribe to or fetch from.
    pub subject: String,

    /// Consumer identity the broker uses to track delivery progress.
    pub durable_name: String,

    /// Resume point; `None` lets the server pick its default position.
    pub start_sequence: Option<u64>,

    /// Upper bound on messages returned by one fetch.
    pub batch_size: u32,
}

impl SubscriptionConfig {
    /// Creates a config with no explicit start sequence.
    pub fn new<S, D>(subject: S, durable_name: D, batch_size: u32) -> Self
    where
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            subject: subject.into(),
            durable_name: durable_name.into(),
            start_sequence: None,
            batch_size,
        }
    }

    /// Sets the sequence the subscription resumes from.
    #[must_use]
    pub fn with_start_sequence(mut self, sequence: u64) -> Self {
        self.start_sequence = Some(sequence);
        self
    }

    /// Checks the invariants every transport relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty subject or a zero batch size.
    pub fn validate(&self) -> Result<(), Error> {
        if self.subject.is_empty() {
            return Err(Error::InvalidArgument("subject cannot be empty"));
        }

        if self.batch_size == 0 {
            return Err(Error::InvalidArgument("batch size must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = SubscriptionConfig::new("images", "worker", 10);

        assert!(config.validate().is_ok());
        assert_eq!(config.start_sequence, None);
    }

    #[test]
    fn test_validate_rejects_empty_subject() {
        let config = SubscriptionConfig::new("", "worker", 10);

        assert!(matches!(
            config.validate(),
            Err(Error::InvalidArgument("subject cannot be empty"))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = SubscriptionConfig::new("images", "worker", 0);

        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_with_start_sequence() {
        let config = SubscriptionConfig::new("images", "worker", 5).with_start_sequence(42);

        assert_eq!(config.start_sequence, Some(42));
    }
}
