#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parcel_session::access::AdminSet;
use parcel_session::db::Store;
use parcel_session::desk::OrderDesk;
use parcel_session::notify::{DeliveryError, Notifier, Reply};
use parcel_session::state::schema::ChatId;

pub const ADMIN: ChatId = ChatId(100);
pub const SECOND_ADMIN: ChatId = ChatId(50);
pub const SUBMITTER: ChatId = ChatId(7);

pub const HAPPY_PATH: [&str; 6] = [
    "Jane Doe",
    "+380501234567",
    "Kyiv",
    "Lviv",
    "01.12.2025",
    "3.5",
];

/// Notifier that records every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(ChatId, Reply)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(ChatId, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat: ChatId) -> Vec<Reply> {
        self.sent()
            .into_iter()
            .filter(|(to, _)| *to == chat)
            .map(|(_, reply)| reply)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push((chat, reply.clone()));
        Ok(())
    }
}

/// Notifier whose every delivery fails.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, chat: ChatId, _reply: &Reply) -> Result<(), DeliveryError> {
        Err(DeliveryError {
            chat,
            reason: "chat unreachable".to_string(),
        })
    }
}

pub fn desk_with(notifier: Arc<dyn Notifier>) -> OrderDesk {
    OrderDesk::new(
        Store::in_memory().expect("in-memory store"),
        notifier,
        AdminSet::new([ADMIN, SECOND_ADMIN]),
    )
}

pub fn recording_desk() -> (OrderDesk, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    (desk_with(notifier.clone()), notifier)
}

/// Run a submitter through the whole conversation, announce the order the
/// way the daemon does, and return the last reply.
pub async fn place_order(desk: &OrderDesk, submitter: ChatId, answers: &[&str]) -> Reply {
    desk.begin_intake(submitter).await;
    let mut last = None;
    for answer in answers {
        last = Some(desk.handle_text(submitter, answer).await);
    }
    let outcome = last.expect("at least one answer");
    if let Some(order) = &outcome.accepted {
        desk.broadcast(order).await;
    }
    outcome.reply
}
