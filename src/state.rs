use crate::auth::AuthState;
use crate::notify::Dispatcher;

use std::sync::Arc;

pub struct AppState<S, P, G> {
    pub dispatcher: Arc<Dispatcher<S, P>>,
    /// `None` when no payment provider is configured.
    pub payments: Option<G>,
    pub auth: Option<AuthState>,
}

impl<S, P, G> AppState<S, P, G> {
    pub fn new(dispatcher: Dispatcher<S, P>, payments: Option<G>, auth: Option<AuthState>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            payments,
            auth,
        }
    }
}

impl<S, P, G: Clone> Clone for AppState<S, P, G> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            payments: self.payments.clone(),
            auth: self.auth.clone(),
        }
    }
}
