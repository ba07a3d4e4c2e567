//! Chat commands and inline-button actions, decoded once at the transport edge.

use std::fmt;

use crate::error::OrderError;
use crate::state::schema::{OrderId, OrderStatus};

/// A slash command sent as a chat message.
///
/// Arguments are kept raw; the desk checks authorization before it looks at them,
/// so a non-administrator never learns the expected syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Help,
    Find(String),
    Stats,
    Orders,
    Done(String),
    CancelOrder(String),
    Unknown(String),
}

impl Command {
    /// Parse a message as a command. Returns `None` for ordinary text.
    ///
    /// Accepts the `/name@botname` form used in group chats.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        let args = args.to_string();

        Some(match name.as_str() {
            "start" => Command::Start,
            "cancel" => Command::Cancel,
            "help" => Command::Help,
            "find" => Command::Find(args),
            "stats" => Command::Stats,
            "orders" => Command::Orders,
            "done" => Command::Done(args),
            "cancel_order" => Command::CancelOrder(args),
            _ => Command::Unknown(name),
        })
    }
}

/// Administrator action on an order, carried by inline buttons as `<action>:<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Done(OrderId),
    Cancel(OrderId),
}

impl OrderAction {
    pub fn order_id(self) -> OrderId {
        match self {
            OrderAction::Done(id) | OrderAction::Cancel(id) => id,
        }
    }

    pub fn target_status(self) -> OrderStatus {
        match self {
            OrderAction::Done(_) => OrderStatus::Done,
            OrderAction::Cancel(_) => OrderStatus::Cancelled,
        }
    }

    /// Button payload for this action.
    pub fn callback_data(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderAction::Done(id) => write!(f, "done:{}", id),
            OrderAction::Cancel(id) => write!(f, "cancel:{}", id),
        }
    }
}

impl std::str::FromStr for OrderAction {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OrderError::InvalidAction(s.to_string());
        let (action, id) = s.split_once(':').ok_or_else(invalid)?;
        let id = id.parse::<i64>().map(OrderId).map_err(|_| invalid())?;
        match action {
            "done" => Ok(OrderAction::Done(id)),
            "cancel" => Ok(OrderAction::Cancel(id)),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_not_a_command() {
        assert_eq!(Command::parse("Jane Doe"), None);
        assert_eq!(Command::parse("🔙 Back"), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/cancel"), Some(Command::Cancel));
        assert_eq!(Command::parse("/stats"), Some(Command::Stats));
        assert_eq!(Command::parse("/orders"), Some(Command::Orders));
        assert_eq!(
            Command::parse("/find 093"),
            Some(Command::Find("093".to_string()))
        );
        assert_eq!(
            Command::parse("/find Jane  Doe "),
            Some(Command::Find("Jane  Doe".to_string()))
        );
        assert_eq!(Command::parse("/done 12"), Some(Command::Done("12".to_string())));
        assert_eq!(
            Command::parse("/cancel_order 3"),
            Some(Command::CancelOrder("3".to_string()))
        );
    }

    #[test]
    fn test_parse_strips_bot_mention() {
        assert_eq!(Command::parse("/stats@parcel_bot"), Some(Command::Stats));
        assert_eq!(
            Command::parse("/done@parcel_bot 4"),
            Some(Command::Done("4".to_string()))
        );
    }

    #[test]
    fn test_parse_missing_args_are_empty() {
        assert_eq!(Command::parse("/find"), Some(Command::Find(String::new())));
        assert_eq!(Command::parse("/done"), Some(Command::Done(String::new())));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse("/launch"),
            Some(Command::Unknown("launch".to_string()))
        );
    }

    #[test]
    fn test_order_action_from_str() {
        assert_eq!("done:7".parse::<OrderAction>().unwrap(), OrderAction::Done(OrderId(7)));
        assert_eq!(
            "cancel:12".parse::<OrderAction>().unwrap(),
            OrderAction::Cancel(OrderId(12))
        );
        assert!("done:".parse::<OrderAction>().is_err());
        assert!("ship:3".parse::<OrderAction>().is_err());
        assert!("done-3".parse::<OrderAction>().is_err());
    }

    #[test]
    fn test_callback_data_decodes_back() {
        for action in [OrderAction::Done(OrderId(5)), OrderAction::Cancel(OrderId(5))] {
            assert_eq!(action.callback_data().parse::<OrderAction>().unwrap(), action);
        }
    }
}
