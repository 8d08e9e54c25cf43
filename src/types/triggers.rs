use crate::types::documents::{Event, Message};

use serde::{Deserialize, Serialize};

/// Body posted by the trigger infrastructure when a message document is
/// created under `chats/{chatId}/messages/{messageId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreated {
    pub params: MessageParams,
    pub value: Message,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageParams {
    pub chat_id: String,
    pub message_id: String,
}

/// Body posted when an `events/{eventId}` document is updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUpdated {
    pub params: EventParams,
    #[serde(default)]
    pub before: Event,
    #[serde(default)]
    pub after: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParams {
    pub event_id: String,
}
