use crate::types::payments::{PaymentIntent, PaymentIntentRequest};

pub trait PaymentGateway: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;
    type Fut<'a>: Future<Output = Result<PaymentIntent, Self::Error>> + Send + 'a
    where
        Self: 'a;

    fn create_payment_intent<'a>(&'a self, request: &'a PaymentIntentRequest) -> Self::Fut<'a>;
}
