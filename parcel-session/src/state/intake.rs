//! Intake state machine.
//!
//! Walks a submitter through the collection steps in order, validating each
//! answer, and yields a complete [`NewOrder`] once the last step is accepted.
//! The machine only mutates the in-memory session; persisting it, committing
//! the order and talking to the chat are the caller's job.

use chrono::Utc;

use crate::error::{FieldError, Result};
use crate::state::schema::{IntakeSession, NewOrder, Step};
use crate::validate;

/// Label of the reply-keyboard button that navigates one step back.
pub const BACK_LABEL: &str = "🔙 Back";

/// Accepted spellings of the back token, compared lowercase after trimming.
const BACK_TOKENS: [&str; 2] = ["back", "🔙 back"];

/// Outcome of feeding one message to an intake session.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The session moved (forward or back) and now waits on this step.
    Prompt { step: Step },

    /// The answer was rejected; the session still waits on this step.
    Rejected { step: Step, error: FieldError },

    /// Back was requested on the first step; the session should be discarded.
    Cancelled,

    /// All fields were collected.
    Complete(NewOrder),
}

/// Whether the input is the back-navigation token.
pub fn is_back(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    BACK_TOKENS.contains(&normalized.as_str())
}

/// Advance the session with one message from the submitter.
///
/// Rejected input leaves the session untouched. Back-navigation moves the
/// cursor without discarding anything already collected.
pub fn advance(session: &mut IntakeSession, input: &str) -> Result<Transition> {
    if is_back(input) {
        return Ok(match session.step.previous() {
            Some(previous) => {
                session.step = previous;
                session.updated_at = Utc::now();
                Transition::Prompt { step: previous }
            }
            None => Transition::Cancelled,
        });
    }

    let step = session.step;
    if let Err(error) = accept(session, input) {
        return Ok(Transition::Rejected { step, error });
    }
    session.updated_at = Utc::now();

    match step.next() {
        Some(next) => {
            session.step = next;
            Ok(Transition::Prompt { step: next })
        }
        None => {
            let order = session.draft.clone().into_new_order(session.submitter)?;
            Ok(Transition::Complete(order))
        }
    }
}

/// Validate the input for the current step and store it in the draft.
fn accept(session: &mut IntakeSession, input: &str) -> std::result::Result<(), FieldError> {
    let draft = &mut session.draft;
    match session.step {
        Step::Name => draft.name = Some(validate::validate_text("Name", input)?),
        Step::Phone => draft.phone = Some(validate::validate_phone(input)?),
        Step::From => draft.from_address = Some(validate::validate_text("Pickup address", input)?),
        Step::To => draft.to_address = Some(validate::validate_text("Delivery address", input)?),
        Step::Date => draft.date = Some(validate::validate_date(input)?),
        Step::Weight => draft.weight = Some(validate::validate_weight(input)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::schema::{ChatId, Draft};
    use chrono::NaiveDate;

    const HAPPY_PATH: [&str; 6] = [
        "Jane Doe",
        "+380501234567",
        "Kyiv",
        "Lviv",
        "01.12.2025",
        "3.5",
    ];

    fn session_at(step: Step) -> IntakeSession {
        let mut session = IntakeSession::new(ChatId(7));
        for input in HAPPY_PATH {
            if session.step == step {
                break;
            }
            advance(&mut session, input).unwrap();
        }
        assert_eq!(session.step, step);
        session
    }

    #[test]
    fn test_is_back_spellings() {
        assert!(is_back("back"));
        assert!(is_back("  BACK "));
        assert!(is_back("🔙 Back"));
        assert!(is_back(BACK_LABEL));
        assert!(!is_back("go back"));
        assert!(!is_back("Backstreet 5"));
    }

    #[test]
    fn test_happy_path_completes() {
        let mut session = IntakeSession::new(ChatId(7));
        let mut last = None;
        for input in HAPPY_PATH {
            last = Some(advance(&mut session, input).unwrap());
        }
        let Some(Transition::Complete(order)) = last else {
            panic!("expected completion, got {:?}", last);
        };
        assert_eq!(order.name, "Jane Doe");
        assert_eq!(order.phone, "+380501234567");
        assert_eq!(order.from_address, "Kyiv");
        assert_eq!(order.to_address, "Lviv");
        assert_eq!(order.date, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(order.weight, 3.5);
        assert_eq!(order.submitter, ChatId(7));
    }

    #[test]
    fn test_each_step_prompts_the_next() {
        let mut session = IntakeSession::new(ChatId(7));
        let expected = [Step::Phone, Step::From, Step::To, Step::Date, Step::Weight];
        for (input, step) in HAPPY_PATH.iter().zip(expected) {
            assert_eq!(advance(&mut session, input).unwrap(), Transition::Prompt { step });
        }
    }

    #[test]
    fn test_back_from_every_later_step_keeps_fields() {
        for step in [Step::Phone, Step::From, Step::To, Step::Date, Step::Weight] {
            let mut session = session_at(step);
            let before = session.draft.clone();
            let previous = step.previous().unwrap();

            let transition = advance(&mut session, "back").unwrap();

            assert_eq!(transition, Transition::Prompt { step: previous });
            assert_eq!(session.step, previous);
            assert_eq!(session.draft, before);
        }
    }

    #[test]
    fn test_back_on_first_step_cancels() {
        let mut session = IntakeSession::new(ChatId(7));
        assert_eq!(advance(&mut session, "🔙 Back").unwrap(), Transition::Cancelled);
    }

    #[test]
    fn test_rejection_leaves_session_unchanged() {
        let cases = [
            (Step::Name, "   "),
            (Step::Phone, "123"),
            (Step::From, ""),
            (Step::To, " "),
            (Step::Date, "31.02.2025"),
            (Step::Weight, "-1"),
        ];
        for (step, bad) in cases {
            let mut session = session_at(step);
            let before = session.clone();

            let transition = advance(&mut session, bad).unwrap();

            assert!(matches!(transition, Transition::Rejected { step: s, .. } if s == step));
            assert_eq!(session, before);
        }
    }

    #[test]
    fn test_weight_retry_then_commit() {
        let mut session = session_at(Step::Weight);
        assert_eq!(
            advance(&mut session, "-1").unwrap(),
            Transition::Rejected {
                step: Step::Weight,
                error: FieldError::Weight
            }
        );
        let transition = advance(&mut session, "2").unwrap();
        assert!(matches!(transition, Transition::Complete(order) if order.weight == 2.0));
    }

    #[test]
    fn test_invalid_then_valid_date() {
        let mut session = session_at(Step::Date);
        assert!(matches!(
            advance(&mut session, "31.02.2025").unwrap(),
            Transition::Rejected { step: Step::Date, .. }
        ));
        assert_eq!(
            advance(&mut session, "28.02.2025").unwrap(),
            Transition::Prompt { step: Step::Weight }
        );
        assert_eq!(
            session.draft.date,
            Some(NaiveDate::from_ymd_opt(2025, 2, 28).unwrap())
        );
    }

    #[test]
    fn test_reentering_a_step_overwrites_value() {
        let mut session = session_at(Step::From);
        advance(&mut session, "back").unwrap();
        advance(&mut session, "+380670000000").unwrap();
        assert_eq!(session.step, Step::From);
        assert_eq!(session.draft.phone.as_deref(), Some("+380670000000"));
        assert_eq!(session.draft.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_corrupt_draft_on_last_step_errors() {
        let mut session = IntakeSession::new(ChatId(7));
        session.step = Step::Weight;
        session.draft = Draft::default();
        assert!(advance(&mut session, "1").is_err());
    }
}
