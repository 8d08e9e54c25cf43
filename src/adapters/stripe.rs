use crate::ports::PaymentGateway;
use crate::types::payments::{PaymentIntent, PaymentIntentRequest};

use serde::Deserialize;

use std::future::Future;
use std::pin::Pin;

pub const DEFAULT_STRIPE_URL: &str = "https://api.stripe.com";

#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("stripe request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("stripe returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl StripeGateway {
    pub fn new(client: reqwest::Client, base_url: &str, secret_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    async fn create(&self, request: &PaymentIntentRequest) -> Result<PaymentIntent, StripeError> {
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&intent_form(request))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        Err(StripeError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl PaymentGateway for StripeGateway {
    type Error = StripeError;
    type Fut<'a>
        = Pin<Box<dyn Future<Output = Result<PaymentIntent, Self::Error>> + Send + 'a>>
    where
        Self: 'a;

    fn create_payment_intent<'a>(&'a self, request: &'a PaymentIntentRequest) -> Self::Fut<'a> {
        Box::pin(self.create(request))
    }
}

fn intent_form(request: &PaymentIntentRequest) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("amount", request.amount.to_string()),
        ("currency", request.currency.to_ascii_lowercase()),
        ("automatic_payment_methods[enabled]", "true".to_string()),
    ];
    if let Some(description) = request.description.as_deref()
        && !description.trim().is_empty()
    {
        form.push(("description", description.trim().to_string()));
    }
    form
}
