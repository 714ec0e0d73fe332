use crate::Error;

use futures::StreamExt;
use minitoolstream_connector::{EgressClient, MessageHandler, SubscriptionConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Counts reported by one fetch-and-dispatch cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Messages handed to the handler.
    pub delivered: usize,

    /// Messages the handler rejected.
    pub failed: usize,
}

/// Fetches the next batch for `config` and hands every message to `handler`.
///
/// Handler failures are logged and counted; delivery continues with the next
/// message. A stream failure aborts the rest of the batch. A handler still
/// running when `shutdown_token` fires is dropped.
pub(crate) async fn fetch_and_dispatch(
    client: &dyn EgressClient,
    config: &SubscriptionConfig,
    handler: &dyn MessageHandler,
    shutdown_token: &CancellationToken,
) -> Result<CycleSummary, Error> {
    let mut messages = tokio::select! {
        biased;
        () = shutdown_token.cancelled() => return Err(Error::Cancelled),
        result = client.fetch(config) => result.map_err(Error::Fetch)?,
    };

    let mut summary = CycleSummary::default();

    loop {
        let next = tokio::select! {
            biased;
            () = shutdown_token.cancelled() => return Err(Error::Cancelled),
            next = messages.next() => next,
        };

        let Some(message) = next else {
            break;
        };
        let message = message.map_err(Error::Stream)?;

        debug!(
            subject = %config.subject,
            sequence = message.sequence,
            size = message.data.len(),
            "message received"
        );

        summary.delivered += 1;
        let handled = tokio::select! {
            biased;
            result = handler.handle(&message, shutdown_token) => result,
            () = shutdown_token.cancelled() => {
                debug!(
                    subject = %config.subject,
                    sequence = message.sequence,
                    "handler abandoned on shutdown"
                );
                return Err(Error::Cancelled);
            }
        };
        if let Err(e) = handled {
            summary.failed += 1;
            warn!(
                subject = %config.subject,
                sequence = message.sequence,
                "handler error: {}",
                e
            );
        }
    }

    Ok(summary)
}
