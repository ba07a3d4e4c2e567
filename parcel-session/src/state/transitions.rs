use crate::error::{OrderError, Result};
use crate::state::schema::OrderStatus;

/// Validate a status transition is allowed.
pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<()> {
    let valid = match from {
        OrderStatus::Pending => matches!(to, OrderStatus::Done | OrderStatus::Cancelled),
        // Terminal states
        OrderStatus::Done | OrderStatus::Cancelled => false,
    };

    if valid {
        Ok(())
    } else {
        Err(OrderError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}
