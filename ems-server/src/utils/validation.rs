//! Input validation helpers
//!
//! Length limits and field checks shared by the CRUD handlers. SQLite TEXT
//! has no built-in length enforcement, so limits live here.

use validator::ValidateEmail;

use crate::auth::password::MIN_PASSWORD_LEN;
use crate::utils::AppError;
use shared::error::ErrorCode;

/// Names: people, departments, positions, task titles
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons, comments
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: phone, username
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MAX_ADDRESS_LEN: usize = 500;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} is required"),
        )
        .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate and normalize an email address (trimmed, lower-cased)
pub fn validate_email(value: &str) -> Result<String, AppError> {
    let email = value.trim().to_lowercase();
    validate_required_text(&email, "email", MAX_EMAIL_LEN)?;
    if !email.validate_email() {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("Invalid email address: {email}"),
        )
        .with_detail("field", "email"));
    }
    Ok(email)
}

pub fn validate_password(value: &str) -> Result<(), AppError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    if value.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

pub fn validate_salary(value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "salary must be a non-negative number",
        )
        .with_detail("field", "salary"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Ana", "name", MAX_NAME_LEN).is_ok());
        let err = validate_required_text("   ", "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "phone", 5).is_ok());
        assert!(validate_optional_text(&Some("123456".into()), "phone", 5).is_err());
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(validate_email(" Ana@Example.COM ").unwrap(), "ana@example.com");
        assert_eq!(validate_email("not-an-email").unwrap_err().code, ErrorCode::InvalidFormat);
        assert_eq!(validate_email("").unwrap_err().code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_password_and_salary() {
        assert_eq!(validate_password("12345").unwrap_err().code, ErrorCode::PasswordTooShort);
        assert!(validate_password("123456").is_ok());
        assert!(validate_salary(0.0).is_ok());
        assert!(validate_salary(-1.0).is_err());
        assert!(validate_salary(f64::NAN).is_err());
    }
}
