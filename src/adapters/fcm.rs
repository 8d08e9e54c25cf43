use super::google_auth::{AccessTokens, TokenError};
use crate::ports::{ClassifiedPushError, PushSender};
use crate::types::notification::{NotificationPayload, SendReceipt};

use serde::{Deserialize, Serialize};

use std::future::Future;
use std::pin::Pin;

pub const DEFAULT_FCM_URL: &str = "https://fcm.googleapis.com/v1";

/// Firebase Cloud Messaging HTTP v1 client.
#[derive(Clone)]
pub struct FcmSender {
    client: reqwest::Client,
    endpoint: String,
    tokens: AccessTokens,
}

#[derive(Debug, thiserror::Error)]
pub enum FcmError {
    #[error("device token is no longer registered")]
    Unregistered,
    #[error("invalid device token: {0}")]
    InvalidToken(String),
    #[error("fcm rejected message ({status}, {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
    #[error("fcm request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to obtain access token: {0}")]
    Auth(#[from] TokenError),
}

impl ClassifiedPushError for FcmError {
    fn is_stale_token(&self) -> bool {
        matches!(self, FcmError::Unregistered | FcmError::InvalidToken(_))
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: &'a NotificationPayload,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

impl FcmSender {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        project_id: &str,
        tokens: AccessTokens,
    ) -> Self {
        Self {
            client,
            endpoint: format!(
                "{}/projects/{project_id}/messages:send",
                base_url.trim_end_matches('/')
            ),
            tokens,
        }
    }

    async fn post(&self, payload: &NotificationPayload) -> Result<SendReceipt, FcmError> {
        let token = self.tokens.bearer().await?;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&SendRequest { message: payload })
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

impl PushSender for FcmSender {
    type Error = FcmError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<SendReceipt, Self::Error>> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(&'a self, payload: &'a NotificationPayload) -> Self::Fut<'a> {
        Box::pin(self.post(payload))
    }
}

/// Maps an FCM error response onto [`FcmError`], singling out the responses
/// that mean the device token should be forgotten.
pub(crate) fn classify_error(status: u16, body: &str) -> FcmError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return FcmError::Rejected {
            status,
            code: "UNKNOWN".to_string(),
            message: body.to_string(),
        };
    };
    let error = envelope.error;
    let code = error
        .details
        .iter()
        .find_map(|detail| detail.error_code.clone())
        .unwrap_or(error.status);

    match code.as_str() {
        "UNREGISTERED" => FcmError::Unregistered,
        "INVALID_ARGUMENT"
            if error
                .message
                .to_ascii_lowercase()
                .contains("registration token") =>
        {
            FcmError::InvalidToken(error.message)
        }
        _ => FcmError::Rejected {
            status,
            code,
            message: error.message,
        },
    }
}
