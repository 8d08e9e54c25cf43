pub mod fcm;
pub mod firestore;
pub mod google_auth;
pub mod logging;
pub mod memory;
pub mod stripe;

pub use fcm::FcmSender;
pub use firestore::FirestoreStore;
pub use google_auth::{AccessTokens, ServiceAccountKey};
pub use logging::LoggingSender;
pub use memory::MemoryStore;
pub use stripe::StripeGateway;
