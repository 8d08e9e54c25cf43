use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in the currency's smallest unit (cents for USD).
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(rename = "clientSecret", alias = "client_secret")]
    pub client_secret: String,
}
