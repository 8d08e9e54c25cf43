use super::push::ErrorResponse;
use crate::ports::{DocumentStore, PaymentGateway, PushSender};
use crate::state::AppState;
use crate::types::payments::{PaymentIntent, PaymentIntentRequest};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

pub(crate) async fn create_intent<S, P, G>(
    State(state): State<AppState<S, P, G>>,
    Json(request): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntent>, (StatusCode, Json<ErrorResponse>)>
where
    S: DocumentStore,
    P: PushSender,
    G: PaymentGateway,
{
    let Some(gateway) = state.payments.as_ref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Payments are not configured.",
            }),
        ));
    };

    if request.amount == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "amount must be greater than 0.",
            }),
        ));
    }
    let currency = request.currency.trim();
    if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "currency must be a three-letter ISO code.",
            }),
        ));
    }

    let request = PaymentIntentRequest {
        currency: currency.to_string(),
        ..request
    };
    match gateway.create_payment_intent(&request).await {
        Ok(intent) => {
            tracing::info!(intent_id = %intent.id, amount = request.amount, "payment intent created");
            Ok(Json(intent))
        }
        Err(err) => {
            tracing::error!(error = %err, "payment intent error");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to create payment intent.",
                }),
            ))
        }
    }
}
