//! Input validation for admin writes and client feedback
//!
//! Checks run in a fixed order (empty fields, then file pattern, then the
//! substring blacklist), so the reported error is deterministic.

use crate::error::ValidationError;
use crate::models::Feedback;
use once_cell::sync::Lazy;
use regex::Regex;

// Hardcoded patterns, compiled once
static FILE_REF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9а-яА-ЯёЁ_\-.]+\.[a-zA-Z0-9]+$")
        .expect("hardcoded file reference regex is invalid - fix source code")
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("hardcoded email regex is invalid - fix source code")
});

static TELEGRAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@[a-zA-Z0-9_]+$").expect("hardcoded telegram regex is invalid - fix source code")
});

/// File references end up in file-serving paths; these never belong in one
const SUSPICIOUS_SUBSTRINGS: [&str; 9] = ["://", "//", "../", "./", "\\", "?", "&", "=", "%"];

const TELEGRAM_MIN_LEN: usize = 6;
const TELEGRAM_MAX_LEN: usize = 33;

/// `name.ext` with Latin or Cyrillic letters, digits, `_`, `-` and `.` only;
/// the extension stays ASCII
pub fn is_valid_file_reference(value: &str) -> bool {
    FILE_REF_REGEX.is_match(value)
}

pub fn contains_suspicious(value: &str) -> bool {
    SUSPICIOUS_SUBSTRINGS.iter().any(|s| value.contains(s))
}

pub fn validate_id(id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::InvalidId);
    }
    Ok(())
}

fn validate_associations(ids: &[i64]) -> Result<(), ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptyAssociationSet);
    }
    ids.iter().try_for_each(|id| validate_id(*id))
}

fn require_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub fn validate_content_type(name: &str) -> Result<(), ValidationError> {
    require_name(name)
}

pub fn validate_category(
    name: &str,
    img_ref: &str,
    content_type_ids: &[i64],
) -> Result<(), ValidationError> {
    require_name(name)?;
    if img_ref.is_empty() {
        return Err(ValidationError::EmptyImageReference);
    }
    validate_associations(content_type_ids)?;

    if !is_valid_file_reference(img_ref) {
        return Err(ValidationError::InvalidFileFormat { field: "img_url" });
    }
    if contains_suspicious(img_ref) {
        return Err(ValidationError::SuspiciousContent { field: "img_url" });
    }
    Ok(())
}

pub fn validate_video(
    name: &str,
    url: &str,
    img_ref: &str,
    category_ids: &[i64],
) -> Result<(), ValidationError> {
    require_name(name)?;
    if url.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    if img_ref.is_empty() {
        return Err(ValidationError::EmptyImageReference);
    }
    validate_associations(category_ids)?;

    if !is_valid_file_reference(url) {
        return Err(ValidationError::InvalidFileFormat { field: "url" });
    }
    if !is_valid_file_reference(img_ref) {
        return Err(ValidationError::InvalidFileFormat { field: "img_url" });
    }
    if contains_suspicious(url) {
        return Err(ValidationError::SuspiciousContent { field: "url" });
    }
    if contains_suspicious(img_ref) {
        return Err(ValidationError::SuspiciousContent { field: "img_url" });
    }
    Ok(())
}

pub fn validate_video_categories(category_ids: &[i64]) -> Result<(), ValidationError> {
    validate_associations(category_ids)
}

pub fn validate_account(
    username: &str,
    content_type_id: i64,
    password: &str,
    is_admin: bool,
) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    if content_type_id <= 0 {
        return Err(ValidationError::MissingContentType);
    }
    if is_admin && password.is_empty() {
        return Err(ValidationError::EmptyPasswordForAdmin);
    }
    Ok(())
}

fn is_valid_telegram(handle: &str) -> bool {
    (TELEGRAM_MIN_LEN..=TELEGRAM_MAX_LEN).contains(&handle.len()) && TELEGRAM_REGEX.is_match(handle)
}

pub fn validate_feedback(feedback: &Feedback) -> Result<(), ValidationError> {
    if feedback.message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }

    let email = feedback.email.as_deref().unwrap_or("");
    let telegram = feedback.telegram.as_deref().unwrap_or("");
    if email.is_empty() && telegram.is_empty() {
        return Err(ValidationError::MissingContact);
    }
    if !email.is_empty() && !(email.len() <= 254 && EMAIL_REGEX.is_match(email)) {
        return Err(ValidationError::InvalidEmail);
    }
    if !telegram.is_empty() && !is_valid_telegram(telegram) {
        return Err(ValidationError::InvalidTelegram);
    }
    Ok(())
}
