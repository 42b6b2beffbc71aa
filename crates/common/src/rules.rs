//! Input rules shared by the service and API layers.

use regex::Regex;
use validator::ValidateEmail;

use crate::{AppError, AppResult};

/// Nicknames: 2 to 16 characters, ASCII letters, digits or Hangul syllables.
static NICKNAME_RE: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z0-9\x{AC00}-\x{D7A3}]{2,16}$").unwrap()
});

/// Maximum length of an inquiry or post title, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Maximum length of free text such as reasons, appeals and comments.
pub const MAX_TEXT_CHARS: usize = 2000;

/// Accepted password length range, in characters.
pub const PASSWORD_CHARS: std::ops::RangeInclusive<usize> = 8..=128;

/// Normalise an email address and check its shape.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.validate_email() {
        Ok(email)
    } else {
        Err(AppError::validation("invalid email address"))
    }
}

/// Check a password against the length rule.
pub fn validate_password(password: &str) -> AppResult<()> {
    if PASSWORD_CHARS.contains(&password.chars().count()) {
        Ok(())
    } else {
        Err(AppError::validation("password must be 8-128 characters"))
    }
}

/// Check a nickname against the character and length rule.
pub fn validate_nickname(nickname: &str) -> AppResult<()> {
    if NICKNAME_RE.is_match(nickname) {
        Ok(())
    } else {
        Err(AppError::validation(
            "nickname must be 2-16 characters of letters, digits or Hangul",
        ))
    }
}

/// Trim `text` and require it to be non-empty and at most `max_chars` long.
pub fn required_text(field: &str, text: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}
