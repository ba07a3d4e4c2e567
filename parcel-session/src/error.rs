use thiserror::Error;

use crate::state::schema::{OrderId, OrderStatus};

/// Rejection of a single collected field.
///
/// The message is shown to the submitter verbatim when the step is re-prompted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{0} cannot be empty.")]
    Empty(&'static str),

    #[error("Enter a valid phone number (10-15 digits, spaces or hyphens, optional leading +).")]
    Phone,

    #[error("Invalid date. Enter the date as DD.MM.YYYY.")]
    Date,

    #[error("Enter a valid weight (a number greater than 0).")]
    Weight,
}

/// Error types for parcel-session operations.
/// These are used by both the library and binary crates.
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Access denied")]
    AccessDenied,

    #[error("Usage: {0}")]
    Usage(String),

    #[error("Order #{0} not found")]
    OrderNotFound(OrderId),

    #[error("Order #{id} is already {status}")]
    AlreadyResolved { id: OrderId, status: OrderStatus },

    #[error("Invalid status transition: cannot go from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid status value: {0}. Valid values: pending, done, cancelled")]
    InvalidStatus(String),

    #[error("Invalid intake step: {0}")]
    InvalidStep(String),

    #[error("Invalid order action: {0}")]
    InvalidAction(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Corrupt intake session record: {0}")]
    CorruptSession(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OrderError>;
