use super::compose::{self, MessageNotice};
use super::{Dispatcher, LookupError, MessageOutcome, SkipReason};
use crate::ports::{DocumentStore, PushSender};
use crate::types::documents::{CHATS, Chat, USERS, User};
use crate::types::triggers::MessageCreated;

impl<S, P> Dispatcher<S, P>
where
    S: DocumentStore,
    P: PushSender,
{
    /// Notifies the other chat participant about a newly created message.
    ///
    /// Never fails: lookup and delivery errors are logged and reported as
    /// [`MessageOutcome::Failed`].
    pub async fn on_message_created(&self, trigger: &MessageCreated) -> MessageOutcome {
        let chat_id = trigger.params.chat_id.as_str();
        let message_id = trigger.params.message_id.as_str();
        match self.notify_message(trigger).await {
            Ok(outcome) => {
                match &outcome {
                    MessageOutcome::Skipped { reason } => {
                        tracing::info!(chat_id, message_id, ?reason, "message notification skipped")
                    }
                    MessageOutcome::Sent { receipt } => {
                        tracing::info!(chat_id, message_id, receipt = %receipt.name, "message notification sent")
                    }
                    MessageOutcome::Failed { .. } => {}
                }
                outcome
            }
            Err(err) => {
                tracing::error!(chat_id, message_id, error = %err, "message notification failed");
                MessageOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    async fn notify_message(&self, trigger: &MessageCreated) -> Result<MessageOutcome, LookupError> {
        let chat_id = trigger.params.chat_id.as_str();
        let message = &trigger.value;

        let Some(chat) = self.load::<Chat>(CHATS, chat_id).await? else {
            return Ok(skipped(SkipReason::ChatNotFound));
        };
        let Some(recipient_id) = chat.recipient_for(&message.sender_id) else {
            return Ok(skipped(SkipReason::NoRecipient));
        };
        let Some(recipient) = self.load::<User>(USERS, recipient_id).await? else {
            return Ok(skipped(SkipReason::RecipientNotFound));
        };
        let Some(token) = recipient.token() else {
            return Ok(skipped(SkipReason::NoToken));
        };

        let sender_name = chat
            .participant_name(&message.sender_id)
            .unwrap_or(compose::UNKNOWN_USER_NAME);
        let payload = compose::message_notification(
            &MessageNotice {
                token,
                chat_id,
                message_id: &trigger.params.message_id,
                sender_id: &message.sender_id,
                sender_name,
                text: message.text.as_deref(),
            },
            &self.web_base_url,
        );

        let (result, _) = self.deliver(recipient_id, &payload, true).await;
        Ok(match result {
            Ok(receipt) => MessageOutcome::Sent { receipt },
            Err(err) => {
                tracing::error!(
                    chat_id,
                    recipient_id,
                    error = %err,
                    "push delivery error"
                );
                MessageOutcome::Failed {
                    error: err.to_string(),
                }
            }
        })
    }
}

fn skipped(reason: SkipReason) -> MessageOutcome {
    MessageOutcome::Skipped { reason }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::notify::testing::{TestSender, store_from};
    use crate::types::documents::Message;
    use crate::types::triggers::MessageParams;
    use serde_json::json;

    fn trigger(sender_id: &str, text: Option<&str>) -> MessageCreated {
        MessageCreated {
            params: MessageParams {
                chat_id: "c1".to_string(),
                message_id: "m1".to_string(),
            },
            value: Message {
                sender_id: sender_id.to_string(),
                text: text.map(str::to_string),
            },
        }
    }

    fn seeded() -> serde_json::Value {
        json!({
            "chats": {
                "c1": {
                    "participants": ["alice", "bob"],
                    "participantNames": { "alice": "Alice", "bob": "Bob" }
                }
            },
            "users": {
                "alice": { "name": "Alice", "fcmToken": "tok-alice" },
                "bob": { "name": "Bob", "fcmToken": "tok-bob" }
            }
        })
    }

    #[tokio::test]
    async fn on_message_created__should_notify_the_other_participant() {
        // Given
        let sender = TestSender::default();
        let dispatcher = Dispatcher::new(store_from(seeded()), sender.clone(), "https://app.example");

        // When
        let outcome = dispatcher
            .on_message_created(&trigger("alice", Some("Lunch?")))
            .await;

        // Then
        assert!(matches!(outcome, MessageOutcome::Sent { .. }));
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "tok-bob");
        assert_eq!(sent[0].notification.title, "Alice sent a message");
        assert_eq!(sent[0].notification.body, "Lunch?");
        assert_eq!(sent[0].data["chatId"], "c1");
    }

    #[tokio::test]
    async fn on_message_created__should_notify_sender_of_reply_direction() {
        let sender = TestSender::default();
        let dispatcher = Dispatcher::new(store_from(seeded()), sender.clone(), "https://app.example");

        dispatcher.on_message_created(&trigger("bob", Some("Sure"))).await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "tok-alice");
        assert_eq!(sent[0].notification.title, "Bob sent a message");
    }

    #[tokio::test]
    async fn on_message_created__should_skip_when_chat_missing() {
        // Given
        let sender = TestSender::default();
        let dispatcher = Dispatcher::new(store_from(json!({})), sender.clone(), "https://app.example");

        // When
        let outcome = dispatcher.on_message_created(&trigger("alice", Some("Hi"))).await;

        // Then
        assert_eq!(
            outcome,
            MessageOutcome::Skipped {
                reason: SkipReason::ChatNotFound
            }
        );
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn on_message_created__should_skip_when_recipient_missing_or_tokenless() {
        // Given
        let missing_user = json!({
            "chats": { "c1": { "participants": ["alice", "bob"] } },
            "users": {}
        });
        let tokenless = json!({
            "chats": { "c1": { "participants": ["alice", "bob"] } },
            "users": { "bob": { "name": "Bob" } }
        });
        let sender = TestSender::default();

        // When
        let first = Dispatcher::new(store_from(missing_user), sender.clone(), "https://app.example")
            .on_message_created(&trigger("alice", Some("Hi")))
            .await;
        let second = Dispatcher::new(store_from(tokenless), sender.clone(), "https://app.example")
            .on_message_created(&trigger("alice", Some("Hi")))
            .await;

        // Then
        assert_eq!(
            first,
            MessageOutcome::Skipped {
                reason: SkipReason::RecipientNotFound
            }
        );
        assert_eq!(
            second,
            MessageOutcome::Skipped {
                reason: SkipReason::NoToken
            }
        );
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn on_message_created__should_skip_when_no_other_participant() {
        let store = store_from(json!({
            "chats": { "c1": { "participants": ["alice"] } }
        }));
        let sender = TestSender::default();

        let outcome = Dispatcher::new(store, sender.clone(), "https://app.example")
            .on_message_created(&trigger("alice", Some("echo")))
            .await;

        assert_eq!(
            outcome,
            MessageOutcome::Skipped {
                reason: SkipReason::NoRecipient
            }
        );
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn on_message_created__should_use_placeholders_for_unknown_sender_and_empty_text() {
        // Given
        let store = store_from(json!({
            "chats": { "c1": { "participants": ["alice", "bob"] } },
            "users": { "bob": { "fcmToken": "tok-bob" } }
        }));
        let sender = TestSender::default();

        // When
        Dispatcher::new(store, sender.clone(), "https://app.example")
            .on_message_created(&trigger("alice", None))
            .await;

        // Then
        let sent = sender.sent();
        assert_eq!(sent[0].notification.title, "Someone sent a message");
        assert_eq!(sent[0].notification.body, compose::EMPTY_MESSAGE_BODY);
    }

    #[tokio::test]
    async fn on_message_created__should_fall_back_when_sender_name_is_null() {
        // Given
        let store = store_from(json!({
            "chats": {
                "c1": {
                    "participants": ["alice", "bob"],
                    "participantNames": { "alice": null, "bob": "Bob" }
                }
            },
            "users": { "bob": { "fcmToken": "tok-bob" } }
        }));
        let sender = TestSender::default();

        // When
        let outcome = Dispatcher::new(store, sender.clone(), "https://app.example")
            .on_message_created(&trigger("alice", Some("Hi")))
            .await;

        // Then
        assert!(matches!(outcome, MessageOutcome::Sent { .. }));
        assert_eq!(sender.sent()[0].notification.title, "Someone sent a message");
    }

    #[tokio::test]
    async fn on_message_created__should_report_failure_without_panicking() {
        // Given
        let sender = TestSender::default();
        sender.fail_body("Hi");
        let dispatcher = Dispatcher::new(store_from(seeded()), sender.clone(), "https://app.example");

        // When
        let outcome = dispatcher.on_message_created(&trigger("alice", Some("Hi"))).await;

        // Then
        assert!(matches!(outcome, MessageOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn on_message_created__should_clear_stale_recipient_token() {
        // Given
        let store = store_from(seeded());
        let sender = TestSender::default();
        sender.report_stale();
        let dispatcher = Dispatcher::new(store.clone(), sender, "https://app.example");

        // When
        dispatcher.on_message_created(&trigger("alice", Some("Hi"))).await;

        // Then
        let bob = store.snapshot("users", "bob").expect("bob");
        assert!(!bob.contains_key("fcmToken"));
        let alice = store.snapshot("users", "alice").expect("alice");
        assert!(alice.contains_key("fcmToken"));
    }

    #[tokio::test]
    async fn on_message_created__should_send_again_when_trigger_is_replayed() {
        let sender = TestSender::default();
        let dispatcher = Dispatcher::new(store_from(seeded()), sender.clone(), "https://app.example");
        let event = trigger("alice", Some("Hi"));

        dispatcher.on_message_created(&event).await;
        dispatcher.on_message_created(&event).await;

        assert_eq!(sender.sent().len(), 2);
    }
}
