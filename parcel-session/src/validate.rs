//! Per-field checks for intake input.
//!
//! Every check is pure: it returns the normalized value or a [`FieldError`]
//! and never touches session state.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::FieldError;

const DATE_FORMAT: &str = "%d.%m.%Y";

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[\d\s\-]{10,15}$").expect("phone pattern is valid"))
}

fn date_shape() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("date pattern is valid"))
}

/// Validate free text (name, pickup and delivery addresses).
///
/// Anything non-empty after trimming is accepted; the trimmed text is kept.
pub fn validate_text(label: &'static str, input: &str) -> Result<String, FieldError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(FieldError::Empty(label));
    }
    Ok(text.to_string())
}

/// Validate a phone number: optional leading `+`, then 10-15 digits, spaces or hyphens.
pub fn validate_phone(input: &str) -> Result<String, FieldError> {
    let phone = input.trim();
    if phone_pattern().is_match(phone) {
        Ok(phone.to_string())
    } else {
        Err(FieldError::Phone)
    }
}

/// Validate a delivery date in `DD.MM.YYYY` form.
///
/// The date must exist on the calendar, so `31.02.2025` is rejected.
pub fn validate_date(input: &str) -> Result<NaiveDate, FieldError> {
    let raw = input.trim();
    if !date_shape().is_match(raw) {
        return Err(FieldError::Date);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| FieldError::Date)
}

/// Validate a parcel weight in kilograms: a finite number greater than zero.
pub fn validate_weight(input: &str) -> Result<f64, FieldError> {
    match input.trim().parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight > 0.0 => Ok(weight),
        _ => Err(FieldError::Weight),
    }
}

/// Render a date the way submitters type it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Render a weight with at least one decimal place, so `2` reads `2.0`.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{weight:.1}")
    } else {
        weight.to_string()
    }
}
