use crate::ports::{DocumentStore, PaymentGateway, PushSender};
use crate::state::AppState;
use crate::types::notification::NotificationPayload;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

const DEFAULT_TEST_TITLE: &str = "Test notification";
const DEFAULT_TEST_BODY: &str = "Push delivery is working.";

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TestPushRequest {
    pub(crate) token: String,
    pub(crate) title: Option<String>,
    pub(crate) body: Option<String>,
    pub(crate) link: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct TestPushResponse {
    pub(crate) status: &'static str,
    pub(crate) name: String,
}

pub(crate) async fn push_test<S, P, G>(
    State(state): State<AppState<S, P, G>>,
    Json(request): Json<TestPushRequest>,
) -> Result<Json<TestPushResponse>, (StatusCode, Json<ErrorResponse>)>
where
    S: DocumentStore,
    P: PushSender,
    G: PaymentGateway,
{
    let token = request.token.trim();
    if token.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "token is required.",
            }),
        ));
    }

    let title = non_blank(request.title.as_deref()).unwrap_or(DEFAULT_TEST_TITLE);
    let body = non_blank(request.body.as_deref()).unwrap_or(DEFAULT_TEST_BODY);
    let mut payload = NotificationPayload::new(token, title, body).with_data("type", "test");
    if let Some(link) = non_blank(request.link.as_deref()) {
        payload = payload.with_link(link);
    }

    match state.dispatcher.sender().send(&payload).await {
        Ok(receipt) => Ok(Json(TestPushResponse {
            status: "sent",
            name: receipt.name,
        })),
        Err(err) => {
            tracing::error!(error = %err, "push test error");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "Failed to send test notification.",
                }),
            ))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
