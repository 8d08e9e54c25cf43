pub mod documents;
pub mod notification;
pub mod payments;
pub mod triggers;
