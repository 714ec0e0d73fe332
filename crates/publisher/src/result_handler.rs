use async_trait::async_trait;
use minitoolstream_connector::{BoxError, CancellationToken, PublishResult, ResultHandler};
use tracing::{info, warn};

/// Result handler that logs every publish outcome.
///
/// A failed status is logged, not returned; the publisher reports it to the
/// caller separately.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingResultHandler {
    verbose: bool,
}

impl LoggingResultHandler {
    /// Creates a handler. `verbose` adds the stored object name to success
    /// lines.
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

#[async_trait]
impl ResultHandler for LoggingResultHandler {
    async fn handle(
        &self,
        result: &PublishResult,
        _shutdown_token: &CancellationToken,
    ) -> Result<(), BoxError> {
        if !result.is_success() {
            warn!(
                status_code = result.status_code,
                "publish failed: {}", result.error_message
            );
            return Ok(());
        }

        if self.verbose {
            info!(
                sequence = result.sequence,
                object = %result.object_name,
                "published"
            );
        } else {
            info!(sequence = result.sequence, "published");
        }

        Ok(())
    }
}
