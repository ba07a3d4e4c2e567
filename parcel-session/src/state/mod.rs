pub mod intake;
pub mod schema;
pub mod transitions;

// Re-export all schema types for convenience
pub use schema::{ChatId, Draft, IntakeSession, NewOrder, OrderId, OrderStatus, Step};
