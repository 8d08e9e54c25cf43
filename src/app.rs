use crate::adapters::google_auth::TokenError;
use crate::adapters::memory::MemoryStoreError;
use crate::adapters::{
    AccessTokens, FcmSender, FirestoreStore, LoggingSender, MemoryStore, ServiceAccountKey,
    StripeGateway,
};
use crate::assets;
use crate::auth::{AuthError, AuthState};
use crate::config::{self, PushBackend, StoreBackend};
use crate::notify::Dispatcher;
use crate::ports::{DocumentStore, PaymentGateway, PushSender};
use crate::state::AppState;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;

mod auth;
mod payments;
mod push;
mod triggers;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("{0}")]
    Config(String),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("failed to load seed documents: {0}")]
    Seed(#[from] MemoryStoreError),
    #[error("invalid auth configuration: {0}")]
    Auth(#[from] AuthError),
}

/// Routes over any store, push sender and payment gateway.
pub fn router<S, P, G>(state: AppState<S, P, G>) -> Router
where
    S: DocumentStore,
    P: PushSender,
    G: PaymentGateway,
{
    let auth = state.auth.clone();
    Router::new()
        .route("/triggers/messages", post(triggers::message_created::<S, P, G>))
        .route("/triggers/events", post(triggers::event_updated::<S, P, G>))
        .route("/api/push/test", post(push::push_test::<S, P, G>))
        .route(
            "/api/payments/intent",
            post(payments::create_intent::<S, P, G>),
        )
        .route("/sw.js", get(assets::service_worker))
        .route("/firebase-messaging-sw.js", get(assets::service_worker))
        .route("/health", get(health))
        .with_state(state)
        .layer(middleware::from_fn_with_state(auth, auth::auth_middleware))
}

/// Builds the application from configuration, wiring the configured store and
/// push backends.
pub fn app(config: &config::AppConfig) -> Result<Router, StartupError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("pushrelay/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let auth = AuthState::from_config(config)?;
    let payments = config.payments.as_ref().map(|payments| {
        StripeGateway::new(
            client.clone(),
            &payments.stripe_url,
            payments.stripe_secret_key.clone(),
        )
    });
    if payments.is_none() {
        tracing::info!("payments disabled: no stripe secret key configured");
    }

    let needs_google =
        config.store == StoreBackend::Firestore || config.push == PushBackend::Fcm;
    let google = if needs_google {
        Some(GoogleServices::resolve(config, &client)?)
    } else {
        None
    };
    let base = config.web_base_url.clone();

    Ok(match (&config.store, config.push, google) {
        (StoreBackend::Firestore, PushBackend::Fcm, Some(google)) => router(AppState::new(
            Dispatcher::new(google.firestore(&client), google.fcm(&client), base),
            payments,
            auth,
        )),
        (StoreBackend::Firestore, PushBackend::DryRun, Some(google)) => router(AppState::new(
            Dispatcher::new(google.firestore(&client), LoggingSender::default(), base),
            payments,
            auth,
        )),
        (StoreBackend::Memory { seed }, PushBackend::Fcm, Some(google)) => router(AppState::new(
            Dispatcher::new(memory_store(seed.as_deref())?, google.fcm(&client), base),
            payments,
            auth,
        )),
        (StoreBackend::Memory { seed }, PushBackend::DryRun, _) => router(AppState::new(
            Dispatcher::new(memory_store(seed.as_deref())?, LoggingSender::default(), base),
            payments,
            auth,
        )),
        (_, _, None) => {
            return Err(StartupError::Config(
                "google configuration is required for the firestore and fcm backends".to_string(),
            ));
        }
    })
}

fn memory_store(seed: Option<&std::path::Path>) -> Result<MemoryStore, MemoryStoreError> {
    match seed {
        Some(path) => {
            let store = MemoryStore::from_file(path)?;
            tracing::info!(seed = %path.display(), "loaded in-memory documents");
            Ok(store)
        }
        None => Ok(MemoryStore::default()),
    }
}

struct GoogleServices {
    project_id: String,
    tokens: AccessTokens,
    firestore_url: String,
    fcm_url: String,
}

impl GoogleServices {
    fn resolve(
        config: &config::AppConfig,
        client: &reqwest::Client,
    ) -> Result<Self, StartupError> {
        let google = config.google.as_ref().ok_or_else(|| {
            StartupError::Config(
                "a google project is required for the firestore and fcm backends".to_string(),
            )
        })?;

        let key = google
            .service_account
            .as_deref()
            .map(ServiceAccountKey::from_file)
            .transpose()?;
        let project_id = google
            .project_id
            .clone()
            .or_else(|| key.as_ref().map(|key| key.project_id.clone()))
            .ok_or_else(|| {
                StartupError::Config("google project id is not configured".to_string())
            })?;
        let tokens = match (google.access_token.as_ref(), key) {
            (Some(token), _) => AccessTokens::Static(token.clone()),
            (None, Some(key)) => AccessTokens::service_account(key, client.clone())?,
            (None, None) => {
                return Err(StartupError::Config(
                    "either a service account key or an access token is required".to_string(),
                ));
            }
        };

        Ok(Self {
            project_id,
            tokens,
            firestore_url: google.firestore_url.clone(),
            fcm_url: google.fcm_url.clone(),
        })
    }

    fn firestore(&self, client: &reqwest::Client) -> FirestoreStore {
        FirestoreStore::new(
            client.clone(),
            self.firestore_url.clone(),
            self.project_id.clone(),
            self.tokens.clone(),
        )
    }

    fn fcm(&self, client: &reqwest::Client) -> FcmSender {
        FcmSender::new(
            client.clone(),
            &self.fcm_url,
            &self.project_id,
            self.tokens.clone(),
        )
    }
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
