//! The order desk: one entry point per inbound event.
//!
//! Submitter conversations and administrator requests both land here. Every
//! handler returns the reply for the caller; messages to anyone else go
//! through the [`Notifier`] and never affect the result.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::access::AdminSet;
use crate::command::{Command, OrderAction};
use crate::db::orders::{self, Order};
use crate::db::queries::{self, OrderCounts};
use crate::db::{sessions, Store};
use crate::error::{OrderError, Result};
use crate::lifecycle::{self, TransitionReport};
use crate::notify::{self, Keyboard, Notifier, Reply};
use crate::report;
use crate::state::intake::{self, Transition};
use crate::state::schema::{ChatId, IntakeSession, OrderId, OrderStatus, Step};

/// Reply to a submitter's message, plus the order it committed, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeReply {
    pub reply: Reply,
    pub accepted: Option<Order>,
}

impl From<Reply> for IntakeReply {
    fn from(reply: Reply) -> Self {
        Self {
            reply,
            accepted: None,
        }
    }
}

pub struct OrderDesk {
    store: Store,
    notifier: Arc<dyn Notifier>,
    admins: AdminSet,
}

impl OrderDesk {
    pub fn new(store: Store, notifier: Arc<dyn Notifier>, admins: AdminSet) -> Self {
        Self {
            store,
            notifier,
            admins,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Handle a slash command from `caller`.
    pub async fn handle_command(&self, caller: ChatId, command: Command) -> Reply {
        match command {
            Command::Start => self.begin_intake(caller).await,
            Command::Cancel => self.cancel_intake(caller).await,
            Command::Help => Reply::text(report::HELP),
            Command::Find(keyword) => self
                .search(caller, &keyword)
                .await
                .map(|found| Reply::text(report::search_results(&found)))
                .unwrap_or_else(error_reply),
            Command::Stats => self
                .counts(caller)
                .await
                .map(|counts| Reply::text(report::counts(&counts)))
                .unwrap_or_else(error_reply),
            Command::Orders => self
                .pending(caller)
                .await
                .map(|pending| Reply::text(report::pending(&pending)))
                .unwrap_or_else(error_reply),
            Command::Done(args) => {
                self.resolve_command(caller, &args, OrderStatus::Done, "/done <id>")
                    .await
            }
            Command::CancelOrder(args) => {
                self.resolve_command(caller, &args, OrderStatus::Cancelled, "/cancel_order <id>")
                    .await
            }
            Command::Unknown(name) => Reply::text(format!(
                "Unknown command /{name}. Send /help for the list of commands."
            )),
        }
    }

    /// Handle an inline-button action from `caller`.
    pub async fn handle_action(&self, caller: ChatId, action: OrderAction) -> Reply {
        self.resolve(caller, action.order_id(), action.target_status())
            .await
            .map(|outcome| Reply::text(report::resolution_ack(&outcome.order)))
            .unwrap_or_else(error_reply)
    }

    /// Start a fresh intake conversation, replacing any draft in progress.
    pub async fn begin_intake(&self, submitter: ChatId) -> Reply {
        let conn = self.store.conn().await;
        match sessions::save(&conn, &IntakeSession::new(submitter)) {
            Ok(()) => prompt(Step::FIRST),
            Err(e) => {
                error!(chat = %submitter, error = %e, "failed to start intake");
                Reply::with_keyboard(report::GENERIC_FAILURE, Keyboard::Remove)
            }
        }
    }

    /// Abandon the submitter's conversation. Nothing is persisted.
    pub async fn cancel_intake(&self, submitter: ChatId) -> Reply {
        let conn = self.store.conn().await;
        if let Err(e) = sessions::delete(&conn, submitter) {
            warn!(chat = %submitter, error = %e, "failed to discard intake session");
        }
        Reply::with_keyboard(report::INTAKE_CANCELLED, Keyboard::Remove)
    }

    /// Feed a plain text message into the submitter's conversation.
    ///
    /// When the message completes an order, the caller delivers the reply
    /// first and then announces the order with [`OrderDesk::broadcast`].
    pub async fn handle_text(&self, submitter: ChatId, text: &str) -> IntakeReply {
        match self.advance_intake(submitter, text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(chat = %submitter, error = %e, "intake failed");
                let conn = self.store.conn().await;
                if let Err(e) = sessions::delete(&conn, submitter) {
                    warn!(chat = %submitter, error = %e, "failed to discard intake session");
                }
                IntakeReply::from(Reply::with_keyboard(report::GENERIC_FAILURE, Keyboard::Remove))
            }
        }
    }

    async fn advance_intake(&self, submitter: ChatId, text: &str) -> Result<IntakeReply> {
        let mut conn = self.store.conn().await;
        let Some(mut session) = sessions::find(&conn, submitter)? else {
            return Ok(Reply::text(report::NO_SESSION_HINT).into());
        };

        let reply = match intake::advance(&mut session, text)? {
            Transition::Prompt { step } => {
                sessions::save(&conn, &session)?;
                prompt(step)
            }
            Transition::Rejected { error, .. } => {
                Reply::with_keyboard(format!("❗ {error}"), Keyboard::Back)
            }
            Transition::Cancelled => {
                sessions::delete(&conn, submitter)?;
                Reply::with_keyboard(report::INTAKE_CANCELLED, Keyboard::Remove)
            }
            Transition::Complete(order) => {
                let order = orders::commit_intake(&mut conn, &order)?;
                info!(order_id = %order.id, chat = %submitter, "order accepted");
                return Ok(IntakeReply {
                    reply: Reply::with_keyboard(report::CONFIRMATION, Keyboard::Remove),
                    accepted: Some(order),
                });
            }
        };
        Ok(reply.into())
    }

    /// Send the new-order notice to every administrator, lowest id first.
    pub async fn broadcast(&self, order: &Order) {
        let notice = Reply::with_keyboard(report::admin_notice(order), Keyboard::OrderActions(order.id));
        let mut delivered = 0;
        for admin in self.admins.iter() {
            if notify::deliver(self.notifier.as_ref(), admin, &notice).await {
                delivered += 1;
            }
        }
        info!(
            order_id = %order.id,
            delivered,
            admins = self.admins.len(),
            "order broadcast"
        );
    }

    /// Resolve an order on behalf of an administrator.
    pub async fn resolve(
        &self,
        caller: ChatId,
        id: OrderId,
        target: OrderStatus,
    ) -> Result<TransitionReport> {
        self.admins.authorize(caller)?;
        lifecycle::transition(&self.store, self.notifier.as_ref(), id, target).await
    }

    async fn resolve_command(
        &self,
        caller: ChatId,
        args: &str,
        target: OrderStatus,
        usage: &str,
    ) -> Reply {
        self.resolve_args(caller, args, target, usage)
            .await
            .map(|outcome| Reply::text(report::resolution_ack(&outcome.order)))
            .unwrap_or_else(error_reply)
    }

    async fn resolve_args(
        &self,
        caller: ChatId,
        args: &str,
        target: OrderStatus,
        usage: &str,
    ) -> Result<TransitionReport> {
        self.admins.authorize(caller)?;
        let id = parse_order_id(args, usage)?;
        self.resolve(caller, id, target).await
    }

    /// Orders whose name or phone contains `keyword`.
    pub async fn search(&self, caller: ChatId, keyword: &str) -> Result<Vec<Order>> {
        self.admins.authorize(caller)?;
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(OrderError::Usage(
                "/find <part of a name or phone>, e.g. /find 093".to_string(),
            ));
        }
        let conn = self.store.conn().await;
        Ok(queries::search(&conn, keyword)?)
    }

    pub async fn counts(&self, caller: ChatId) -> Result<OrderCounts> {
        self.admins.authorize(caller)?;
        let conn = self.store.conn().await;
        Ok(queries::counts(&conn)?)
    }

    pub async fn pending(&self, caller: ChatId) -> Result<Vec<Order>> {
        self.admins.authorize(caller)?;
        let conn = self.store.conn().await;
        Ok(queries::list_pending(&conn)?)
    }
}

fn prompt(step: Step) -> Reply {
    Reply::with_keyboard(step.prompt(), Keyboard::Back)
}

fn parse_order_id(args: &str, usage: &str) -> Result<OrderId> {
    if args.trim().is_empty() {
        return Err(OrderError::Usage(usage.to_string()));
    }
    args.parse()
}

/// Reply for a failed administrator request.
fn error_reply(err: OrderError) -> Reply {
    match err {
        OrderError::AccessDenied => Reply::text(report::ACCESS_DENIED),
        OrderError::Usage(_)
        | OrderError::OrderNotFound(_)
        | OrderError::AlreadyResolved { .. }
        | OrderError::InvalidTransition { .. } => Reply::text(format!("❗ {err}")),
        other => {
            error!(error = %other, "request failed");
            Reply::text(report::REQUEST_FAILED)
        }
    }
}
