use crate::ports::{ClassifiedPushError, DocumentStore, PushSender};
use crate::types::documents::{FCM_TOKEN_FIELD, USERS};
use crate::types::notification::{NotificationPayload, SendReceipt};

use serde::Serialize;
use serde::de::DeserializeOwned;

mod applications;
pub(crate) mod compose;
mod messages;
pub mod slots;

pub use applications::{ApplicationAttempt, ApplicationReport};

/// Why a trigger produced no notification. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ChatNotFound,
    NoRecipient,
    RecipientNotFound,
    NoToken,
    NoNewApplicants,
    NoOrganizer,
    OrganizerNotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageOutcome {
    Skipped { reason: SkipReason },
    Sent { receipt: SendReceipt },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptResult {
    Sent { receipt: SendReceipt },
    Failed { error: String },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum LookupError {
    #[error("failed to read {collection}/{id}: {message}")]
    Store {
        collection: &'static str,
        id: String,
        message: String,
    },
    #[error("malformed document {collection}/{id}: {source}")]
    Decode {
        collection: &'static str,
        id: String,
        source: serde_json::Error,
    },
}

/// Turns document-store triggers into push notifications. Holds no state
/// between invocations; every call reads the store afresh.
#[derive(Debug, Clone)]
pub struct Dispatcher<S, P> {
    store: S,
    sender: P,
    web_base_url: String,
}

impl<S, P> Dispatcher<S, P>
where
    S: DocumentStore,
    P: PushSender,
{
    pub fn new(store: S, sender: P, web_base_url: impl Into<String>) -> Self {
        Self {
            store,
            sender,
            web_base_url: web_base_url.into(),
        }
    }

    pub fn sender(&self) -> &P {
        &self.sender
    }

    async fn load<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<T>, LookupError> {
        let document = self
            .store
            .get(collection, id)
            .await
            .map_err(|err| LookupError::Store {
                collection,
                id: id.to_string(),
                message: err.to_string(),
            })?;
        match document {
            Some(document) => document
                .decode()
                .map(Some)
                .map_err(|source| LookupError::Decode {
                    collection,
                    id: id.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Sends `payload` and, when the gateway reports the token as stale,
    /// removes it from the user's record unless the user has registered a
    /// different token since. Returns whether cleanup ran.
    async fn deliver(
        &self,
        user_id: &str,
        payload: &NotificationPayload,
        allow_cleanup: bool,
    ) -> (Result<SendReceipt, P::Error>, bool) {
        let result = self.sender.send(payload).await;
        let mut cleaned = false;
        if let Err(err) = &result
            && err.is_stale_token()
            && allow_cleanup
        {
            self.clear_stale_token(user_id, &payload.token).await;
            cleaned = true;
        }
        (result, cleaned)
    }

    async fn clear_stale_token(&self, user_id: &str, token: &str) {
        match self
            .store
            .delete_field_if(USERS, user_id, FCM_TOKEN_FIELD, token)
            .await
        {
            Ok(true) => tracing::info!(user_id, "removed stale device token"),
            Ok(false) => tracing::info!(user_id, "device token already replaced; kept it"),
            Err(err) => {
                tracing::warn!(user_id, error = %err, "failed to remove stale device token")
            }
        }
    }
}
