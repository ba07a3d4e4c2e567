//! Turns Telegram updates into desk calls and desk replies into Bot API calls.

use async_trait::async_trait;
use tracing::{debug, warn};

use parcel_session::command::{Command, OrderAction};
use parcel_session::desk::OrderDesk;
use parcel_session::notify::Reply;
use parcel_session::state::schema::ChatId;

use crate::telegram::{TelegramClient, TelegramError, Update};

/// A message the bot sent earlier, addressed for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message_id: i64,
}

/// An update reduced to what the desk cares about.
///
/// `sender` is the user who wrote the message and owns the conversation;
/// `chat` is where replies go. They differ in group chats.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Command {
        chat: ChatId,
        sender: ChatId,
        command: Command,
    },
    Text {
        chat: ChatId,
        sender: ChatId,
        text: String,
    },
    Action {
        query_id: String,
        caller: ChatId,
        origin: Option<MessageRef>,
        action: OrderAction,
    },
    /// Button press whose payload is not an order action.
    UnknownAction {
        query_id: String,
        data: String,
    },
}

impl Inbound {
    /// Decode an update. Returns `None` for updates the bot ignores
    /// (stickers, edits, anonymous channel posts and the like).
    pub fn from_update(update: Update) -> Option<Inbound> {
        if let Some(query) = update.callback_query {
            let data = query.data.unwrap_or_default();
            return Some(match data.parse::<OrderAction>() {
                Ok(action) => Inbound::Action {
                    query_id: query.id,
                    caller: ChatId(query.from.id),
                    origin: query.message.map(|m| MessageRef {
                        chat: ChatId(m.chat.id),
                        message_id: m.message_id,
                    }),
                    action,
                },
                Err(_) => Inbound::UnknownAction {
                    query_id: query.id,
                    data,
                },
            });
        }

        let message = update.message?;
        let chat = ChatId(message.chat.id);
        let sender = ChatId(message.from?.id);
        let text = message.text?;
        Some(match Command::parse(&text) {
            Some(command) => Inbound::Command {
                chat,
                sender,
                command,
            },
            None => Inbound::Text { chat, sender, text },
        })
    }
}

/// A Bot API call to make in response to an inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Send { chat: ChatId, reply: Reply },
    AnswerCallback { query_id: String },
    Edit { target: MessageRef, text: String },
}

/// Where the dispatcher makes its Bot API calls.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn perform(&self, outbound: &Outbound) -> Result<(), TelegramError>;
}

#[async_trait]
impl Outbox for TelegramClient {
    async fn perform(&self, outbound: &Outbound) -> Result<(), TelegramError> {
        match outbound {
            Outbound::Send { chat, reply } => self.send_message(*chat, reply).await.map(|_| ()),
            Outbound::AnswerCallback { query_id } => self
                .answer_callback_query(query_id, None)
                .await
                .map(|_| ()),
            Outbound::Edit { target, text } => self
                .edit_message_text(target.chat, target.message_id, text)
                .await
                .map(|_| ()),
        }
    }
}

async fn post(outbox: &dyn Outbox, outbound: Outbound) {
    if let Err(e) = outbox.perform(&outbound).await {
        warn!(error = %e, "failed to deliver reply");
    }
}

/// Run one inbound event through the desk, making the Bot API calls as it goes.
///
/// A submitter hears back before administrators are told about a new order,
/// and a button press is answered before the order is touched.
pub async fn dispatch(desk: &OrderDesk, outbox: &dyn Outbox, inbound: Inbound) {
    match inbound {
        Inbound::Command {
            chat,
            sender,
            command,
        } => {
            debug!(chat = %chat, sender = %sender, command = ?command, "command");
            let reply = desk.handle_command(sender, command).await;
            post(outbox, Outbound::Send { chat, reply }).await;
        }
        Inbound::Text { chat, sender, text } => {
            let outcome = desk.handle_text(sender, &text).await;
            post(
                outbox,
                Outbound::Send {
                    chat,
                    reply: outcome.reply,
                },
            )
            .await;
            if let Some(order) = outcome.accepted {
                desk.broadcast(&order).await;
            }
        }
        Inbound::Action {
            query_id,
            caller,
            origin,
            action,
        } => {
            debug!(chat = %caller, action = %action, "button pressed");
            post(outbox, Outbound::AnswerCallback { query_id }).await;
            let reply = desk.handle_action(caller, action).await;
            let outbound = match origin {
                Some(target) => Outbound::Edit {
                    target,
                    text: reply.text,
                },
                None => Outbound::Send {
                    chat: caller,
                    reply,
                },
            };
            post(outbox, outbound).await;
        }
        Inbound::UnknownAction { query_id, data } => {
            warn!(data = %data, "unrecognized button payload");
            post(outbox, Outbound::AnswerCallback { query_id }).await;
        }
    }
}
