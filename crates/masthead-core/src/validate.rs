//! Request payload validation, mirrored by the API handlers.
//!
//! Rules: title 1..=200 chars, content nonempty, scheduled_at (when present)
//! must parse as RFC3339 and lie in the future, email must look like an
//! address. Validation failures carry a human-readable message that goes
//! straight into the 400 response body.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleMissing,

    #[error("Title must be less than {TITLE_MAX_CHARS} characters")]
    TitleTooLong,

    #[error("Content is required")]
    ContentMissing,

    #[error("Scheduled date is not a valid timestamp: {0}")]
    BadTimestamp(String),

    #[error("Scheduled date must be in the future")]
    ScheduledInPast,

    #[error("Please enter a valid email address")]
    BadEmail,
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::TitleMissing);
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::ContentMissing);
    }
    Ok(())
}

/// Parse and check an optional schedule timestamp against `now`.
///
/// `None` and the empty string both mean "not scheduled". A timestamp in the
/// past is rejected so a post can never be created already-due.
pub fn validate_scheduled_at(
    raw: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let raw = match raw {
        None => return Ok(None),
        Some(s) if s.trim().is_empty() => return Ok(None),
        Some(s) => s,
    };

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|_| ValidationError::BadTimestamp(raw.to_string()))?
        .with_timezone(&Utc);

    if parsed <= now {
        return Err(ValidationError::ScheduledInPast);
    }
    Ok(Some(parsed))
}

/// Minimal email shape check: something@something.something, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::BadEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::BadEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::BadEmail);
    }
    Ok(())
}
