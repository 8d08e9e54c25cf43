use crate::notify::{ApplicationReport, MessageOutcome};
use crate::ports::{DocumentStore, PaymentGateway, PushSender};
use crate::state::AppState;
use crate::types::triggers::{EventUpdated, MessageCreated};

use axum::Json;
use axum::extract::State;

/// Always answers 200 once the body parses; delivery problems are reported
/// in the outcome, never as an HTTP error, so the trigger is not retried.
pub(crate) async fn message_created<S, P, G>(
    State(state): State<AppState<S, P, G>>,
    Json(trigger): Json<MessageCreated>,
) -> Json<MessageOutcome>
where
    S: DocumentStore,
    P: PushSender,
    G: PaymentGateway,
{
    Json(state.dispatcher.on_message_created(&trigger).await)
}

pub(crate) async fn event_updated<S, P, G>(
    State(state): State<AppState<S, P, G>>,
    Json(trigger): Json<EventUpdated>,
) -> Json<ApplicationReport>
where
    S: DocumentStore,
    P: PushSender,
    G: PaymentGateway,
{
    Json(state.dispatcher.on_event_updated(&trigger).await)
}
