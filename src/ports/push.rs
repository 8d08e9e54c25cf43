use crate::types::notification::{NotificationPayload, SendReceipt};

/// Delivery errors that can tell whether the target device token is no
/// longer usable.
pub trait ClassifiedPushError: std::fmt::Display + Send + Sync + 'static {
    fn is_stale_token(&self) -> bool;
}

pub trait PushSender: Clone + Send + Sync + 'static {
    type Error: ClassifiedPushError;
    type Fut<'a>: Future<Output = Result<SendReceipt, Self::Error>> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(&'a self, payload: &'a NotificationPayload) -> Self::Fut<'a>;
}
