pub mod payments;
pub mod push;
pub mod store;

pub use payments::PaymentGateway;
pub use push::{ClassifiedPushError, PushSender};
pub use store::DocumentStore;
