//! State managers owned by the core task

pub mod connection;
pub mod publication;
pub mod subscription;

pub use connection::{ConnectionManager, ConnectionStats};
pub use publication::PublicationController;
pub use subscription::SubscriptionController;
