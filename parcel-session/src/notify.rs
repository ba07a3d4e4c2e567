//! Outbound messages and the seam to the chat transport.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::state::schema::{ChatId, OrderId};

/// Keyboard attached to an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Leave whatever keyboard the chat currently shows.
    None,
    /// One-button reply keyboard for back-navigation during intake.
    Back,
    /// Remove the reply keyboard.
    Remove,
    /// Inline "mark done" / "mark cancelled" buttons for an order.
    OrderActions(OrderId),
}

/// Text plus keyboard, addressed by whoever sends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }
}

#[derive(Error, Debug)]
#[error("delivery to {chat} failed: {reason}")]
pub struct DeliveryError {
    pub chat: ChatId,
    pub reason: String,
}

/// Sends messages to chat identities other than the one currently talking to us.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), DeliveryError>;
}

/// Send a message and swallow delivery failures.
///
/// Returns whether the message was delivered. Failures are logged only.
pub async fn deliver(notifier: &dyn Notifier, chat: ChatId, reply: &Reply) -> bool {
    match notifier.send(chat, reply).await {
        Ok(()) => true,
        Err(e) => {
            warn!(chat = %chat, error = %e, "notification not delivered");
            false
        }
    }
}
