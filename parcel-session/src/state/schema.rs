use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::{OrderError, Result};

/// Store-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = OrderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(OrderId)
            .map_err(|_| OrderError::Usage(format!("'{}' is not a valid order id", s.trim())))
    }
}

/// Opaque chat identity of a submitter or administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolution status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Done,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Done => "done",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "done" => Ok(OrderStatus::Done),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(OrderError::InvalidStatus(s.to_string())),
        }
    }
}

impl ToSql for OrderStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OrderStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: OrderError| FromSqlError::Other(Box::new(e)))
    }
}

/// Intake step cursor. The order of variants is the order of collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Name,
    Phone,
    From,
    To,
    Date,
    Weight,
}

impl Step {
    pub const FIRST: Step = Step::Name;

    /// The step that follows this one, or `None` after the last step.
    pub fn next(self) -> Option<Step> {
        match self {
            Step::Name => Some(Step::Phone),
            Step::Phone => Some(Step::From),
            Step::From => Some(Step::To),
            Step::To => Some(Step::Date),
            Step::Date => Some(Step::Weight),
            Step::Weight => None,
        }
    }

    /// The step before this one, or `None` on the first step.
    pub fn previous(self) -> Option<Step> {
        match self {
            Step::Name => None,
            Step::Phone => Some(Step::Name),
            Step::From => Some(Step::Phone),
            Step::To => Some(Step::From),
            Step::Date => Some(Step::To),
            Step::Weight => Some(Step::Date),
        }
    }

    /// Question asked on entry to this step.
    pub fn prompt(self) -> &'static str {
        match self {
            Step::Name => "Hello! Please enter your name:",
            Step::Phone => "Enter your phone number:",
            Step::From => "Where should we pick up the parcel?",
            Step::To => "Where should we deliver the parcel?",
            Step::Date => "Choose a delivery date (DD.MM.YYYY):",
            Step::Weight => "Enter the parcel weight in kg:",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Name => "name",
            Step::Phone => "phone",
            Step::From => "from",
            Step::To => "to",
            Step::Date => "date",
            Step::Weight => "weight",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = OrderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "name" => Ok(Step::Name),
            "phone" => Ok(Step::Phone),
            "from" => Ok(Step::From),
            "to" => Ok(Step::To),
            "date" => Ok(Step::Date),
            "weight" => Ok(Step::Weight),
            _ => Err(OrderError::InvalidStep(s.to_string())),
        }
    }
}

/// Fields collected so far in an intake conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// A fully collected order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub name: String,
    pub phone: String,
    pub from_address: String,
    pub to_address: String,
    pub date: NaiveDate,
    pub weight: f64,
    pub submitter: ChatId,
}

impl Draft {
    /// Convert a complete draft into an order ready for insertion.
    pub fn into_new_order(self, submitter: ChatId) -> Result<NewOrder> {
        fn required<T>(value: Option<T>, field: Step) -> Result<T> {
            value.ok_or_else(|| OrderError::MissingField(field.to_string()))
        }

        Ok(NewOrder {
            name: required(self.name, Step::Name)?,
            phone: required(self.phone, Step::Phone)?,
            from_address: required(self.from_address, Step::From)?,
            to_address: required(self.to_address, Step::To)?,
            date: required(self.date, Step::Date)?,
            weight: required(self.weight, Step::Weight)?,
            submitter,
        })
    }
}

/// Per-submitter intake conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeSession {
    pub submitter: ChatId,
    pub step: Step,
    pub draft: Draft,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IntakeSession {
    /// Create a fresh session positioned on the first step.
    pub fn new(submitter: ChatId) -> Self {
        let now = Utc::now();
        Self {
            submitter,
            step: Step::FIRST,
            draft: Draft::default(),
            started_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_from_str() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!("DONE".parse::<OrderStatus>().unwrap(), OrderStatus::Done);
        assert_eq!("cancelled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_step_order_is_linear() {
        let mut seen = vec![Step::FIRST];
        let mut step = Step::FIRST;
        while let Some(next) = step.next() {
            assert_eq!(next.previous(), Some(step));
            seen.push(next);
            step = next;
        }
        assert_eq!(
            seen,
            vec![Step::Name, Step::Phone, Step::From, Step::To, Step::Date, Step::Weight]
        );
        assert_eq!(Step::Name.previous(), None);
    }

    #[test]
    fn test_step_round_trips_through_str() {
        for step in [Step::Name, Step::Phone, Step::From, Step::To, Step::Date, Step::Weight] {
            assert_eq!(step.as_str().parse::<Step>().unwrap(), step);
        }
        assert!("address".parse::<Step>().is_err());
    }

    #[test]
    fn test_order_id_parse() {
        assert_eq!(" 42 ".parse::<OrderId>().unwrap(), OrderId(42));
        assert!(matches!("abc".parse::<OrderId>(), Err(OrderError::Usage(_))));
    }

    #[test]
    fn test_incomplete_draft_reports_missing_field() {
        let draft = Draft {
            name: Some("Jane".to_string()),
            ..Draft::default()
        };
        let err = draft.into_new_order(ChatId(1)).unwrap_err();
        assert!(matches!(err, OrderError::MissingField(f) if f == "phone"));
    }
}
