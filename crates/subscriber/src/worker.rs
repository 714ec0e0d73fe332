use crate::Error;
use crate::fetch::fetch_and_dispatch;

use std::sync::Arc;

use futures::StreamExt;
use minitoolstream_connector::{
    EgressClient, MessageHandler, Notification, NotificationStream, SubscriptionConfig,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Drives the subscription of a single subject.
///
/// The worker owns the subject's notification stream. A relay task moves
/// notifications into a bounded queue while the worker itself runs one
/// fetch-and-dispatch cycle per queued notification, so a subject never has
/// two cycles in flight.
pub(crate) struct SubjectWorker {
    pub(crate) batch_size: u32,
    pub(crate) client: Arc<dyn EgressClient>,
    pub(crate) durable_name: String,
    pub(crate) handler: Arc<dyn MessageHandler>,
    pub(crate) queue_capacity: usize,
    pub(crate) shutdown_token: CancellationToken,
    pub(crate) subject: String,
    pub(crate) task_tracker: TaskTracker,
}

impl SubjectWorker {
    fn subscription_config(&self) -> SubscriptionConfig {
        SubscriptionConfig::new(self.subject.clone(), self.durable_name.clone(), self.batch_size)
    }

    pub(crate) async fn run(self) {
        info!(subject = %self.subject, "starting subscription");

        let config = self.subscription_config();
        let notifications = tokio::select! {
            biased;
            () = self.shutdown_token.cancelled() => {
                debug!(subject = %self.subject, "cancelled before subscription opened");
                return;
            }
            result = self.client.subscribe(&config) => match result {
                Ok(notifications) => notifications,
                Err(e) => {
                    error!(subject = %self.subject, "{}", Error::Subscribe(e));
                    return;
                }
            },
        };

        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        self.task_tracker.spawn(relay_notifications(
            self.subject.clone(),
            notifications,
            sender,
            self.shutdown_token.clone(),
        ));

        self.dispatch(config, receiver).await;
    }

    async fn dispatch(&self, config: SubscriptionConfig, mut queue: mpsc::Receiver<Notification>) {
        info!(subject = %self.subject, "waiting for notifications");

        loop {
            tokio::select! {
                biased;
                () = self.shutdown_token.cancelled() => {
                    info!(subject = %self.subject, "cancelled, stopping subscription");
                    return;
                }
                next = queue.recv() => {
                    let Some(notification) = next else {
                        info!(subject = %self.subject, "notification queue closed");
                        return;
                    };

                    match fetch_and_dispatch(
                        self.client.as_ref(),
                        &config,
                        self.handler.as_ref(),
                        &self.shutdown_token,
                    )
                    .await
                    {
                        Ok(summary) => info!(
                            subject = %self.subject,
                            sequence = notification.sequence,
                            delivered = summary.delivered,
                            failed = summary.failed,
                            "processed notification"
                        ),
                        Err(Error::Cancelled) => {
                            info!(subject = %self.subject, "cancelled during fetch");
                            return;
                        }
                        Err(e) => error!(
                            subject = %self.subject,
                            sequence = notification.sequence,
                            "error processing notification: {}",
                            e
                        ),
                    }
                }
            }
        }
    }
}

/// Moves notifications from the stream into the worker's queue.
///
/// Returning drops `sender`, which closes the queue for the dispatch loop.
async fn relay_notifications(
    subject: String,
    mut notifications: NotificationStream,
    sender: mpsc::Sender<Notification>,
    shutdown_token: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            biased;
            () = shutdown_token.cancelled() => return,
            next = notifications.next() => next,
        };

        match next {
            None => {
                info!(subject = %subject, "notification stream closed");
                return;
            }
            Some(Err(e)) => {
                if !shutdown_token.is_cancelled() {
                    warn!(subject = %subject, "{}", Error::Stream(e));
                }
                return;
            }
            Some(Ok(notification)) => {
                debug!(
                    subject = %subject,
                    sequence = notification.sequence,
                    "notification received"
                );

                tokio::select! {
                    biased;
                    () = shutdown_token.cancelled() => return,
                    result = sender.send(notification) => {
                        if result.is_err() {
                            debug!(subject = %subject, "dispatch loop gone, stopping relay");
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use futures::stream;
    use minitoolstream_connector::Error as ConnectorError;

    #[tokio::test]
    async fn test_relay_closes_queue_on_end_of_stream() {
        let notifications = stream::iter(vec![
            Ok(Notification::new("a", 1)),
            Ok(Notification::new("a", 2)),
        ])
        .boxed();
        let (sender, mut receiver) = mpsc::channel(4);

        relay_notifications("a".to_string(), notifications, sender, CancellationToken::new())
            .await;

        assert_eq!(receiver.recv().await, Some(Notification::new("a", 1)));
        assert_eq!(receiver.recv().await, Some(Notification::new("a", 2)));
        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_relay_stops_on_stream_error() {
        let notifications = stream::iter(vec![
            Err(ConnectorError::stream("broken pipe")),
            Ok(Notification::new("a", 1)),
        ])
        .boxed();
        let (sender, mut receiver) = mpsc::channel(4);

        relay_notifications("a".to_string(), notifications, sender, CancellationToken::new())
            .await;

        assert_eq!(receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_relay_abandons_full_queue_on_cancel() {
        let notifications = stream::iter((1..=10).map(|sequence| Ok(Notification::new("a", sequence))))
            .boxed();
        let (sender, mut receiver) = mpsc::channel(1);
        let token = CancellationToken::new();

        let relay = tokio::spawn(relay_notifications(
            "a".to_string(),
            notifications,
            sender,
            token.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), relay)
            .await
            .expect("relay did not observe cancellation")
            .unwrap();

        assert_eq!(receiver.recv().await, Some(Notification::new("a", 1)));
        assert_eq!(receiver.recv().await, None);
    }
}
