use crate::ports::{ClassifiedPushError, PushSender};
use crate::types::notification::{NotificationPayload, SendReceipt};

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

impl ClassifiedPushError for Infallible {
    fn is_stale_token(&self) -> bool {
        match *self {}
    }
}

/// Dry-run sender: logs each payload instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender {
    sent: Arc<AtomicU64>,
}

impl PushSender for LoggingSender {
    type Error = Infallible;
    type Fut<'a>
        = std::future::Ready<Result<SendReceipt, Self::Error>>
    where
        Self: 'a;

    fn send<'a>(&'a self, payload: &'a NotificationPayload) -> Self::Fut<'a> {
        let sequence = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            token = %payload.token,
            title = %payload.notification.title,
            body = %payload.notification.body,
            data = ?payload.data,
            "dry-run push notification"
        );
        std::future::ready(Ok(SendReceipt {
            name: format!("dry-run/{sequence}"),
        }))
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send__should_number_receipts() {
        let sender = LoggingSender::default();
        let payload = NotificationPayload::new("tok", "Title", "Body");

        let first = sender.send(&payload).await.expect("first");
        let second = sender.send(&payload).await.expect("second");

        assert_eq!(first.name, "dry-run/1");
        assert_eq!(second.name, "dry-run/2");
    }
}
