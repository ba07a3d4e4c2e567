//! Minimal Telegram Bot API client: long polling, sending, and button handling.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use parcel_session::command::OrderAction;
use parcel_session::notify::{DeliveryError, Keyboard, Notifier, Reply};
use parcel_session::state::intake::BACK_LABEL;
use parcel_session::state::schema::{ChatId, OrderId};

/// Extra time on top of the long-poll timeout before the HTTP request gives up.
const REQUEST_SLACK_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} failed: {description}")]
    Api { method: String, description: String },
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// `reply_markup` payload for a keyboard, if it needs one.
pub fn reply_markup(keyboard: Keyboard) -> Option<Value> {
    match keyboard {
        Keyboard::None => None,
        Keyboard::Back => Some(json!({
            "keyboard": [[{ "text": BACK_LABEL }]],
            "resize_keyboard": true,
        })),
        Keyboard::Remove => Some(json!({ "remove_keyboard": true })),
        Keyboard::OrderActions(id) => Some(order_actions(id)),
    }
}

fn order_actions(id: OrderId) -> Value {
    json!({
        "inline_keyboard": [[
            { "text": "✅ Done", "callback_data": OrderAction::Done(id).callback_data() },
            { "text": "❌ Cancel", "callback_data": OrderAction::Cancel(id).callback_data() },
        ]]
    })
}

/// Body of a `sendMessage` call. Text is sent without a parse mode.
pub fn send_message_body(chat: ChatId, reply: &Reply) -> Value {
    let mut body = json!({
        "chat_id": chat.0,
        "text": reply.text,
    });
    if let Some(markup) = reply_markup(reply.keyboard) {
        body["reply_markup"] = markup;
    }
    body
}

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + REQUEST_SLACK_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TelegramError> {
        // The URL carries the bot token, so it is stripped from transport errors.
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        let status = response.status();
        let parsed: ApiResponse<T> = response.json().await.map_err(|e| e.without_url())?;

        if !parsed.ok {
            return Err(TelegramError::Api {
                method: method.to_string(),
                description: parsed
                    .description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }
        parsed.result.ok_or_else(|| TelegramError::Api {
            method: method.to_string(),
            description: "response has no result".to_string(),
        })
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    pub async fn send_message(&self, chat: ChatId, reply: &Reply) -> Result<Message, TelegramError> {
        self.call("sendMessage", &send_message_body(chat, reply)).await
    }

    /// Stop the loading indicator on a pressed button.
    pub async fn answer_callback_query(&self, query_id: &str, text: Option<&str>) -> Result<bool, TelegramError> {
        let mut body = json!({ "callback_query_id": query_id });
        if let Some(text) = text {
            body["text"] = json!(text);
        }
        self.call("answerCallbackQuery", &body).await
    }

    /// Replace the text of a message the bot sent earlier; drops its inline buttons.
    pub async fn edit_message_text(&self, chat: ChatId, message_id: i64, text: &str) -> Result<Value, TelegramError> {
        self.call(
            "editMessageText",
            &json!({
                "chat_id": chat.0,
                "message_id": message_id,
                "text": text,
            }),
        )
        .await
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), DeliveryError> {
        self.send_message(chat, reply)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError {
                chat,
                reason: e.to_string(),
            })
    }
}
