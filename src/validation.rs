//! Input checks shared by the route handlers.

use crate::analytics::filter::is_valid_date;

/// New admin passwords: 6 to 256 characters, not all whitespace.
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.trim().is_empty() {
        return Err("Password must not be blank");
    }
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    if password.len() > 256 {
        return Err("Password must be at most 256 characters");
    }
    Ok(())
}

/// Submission dates are calendar days written `YYYY-MM-DD`.
pub fn validate_submission_date(date: &str) -> Result<(), &'static str> {
    if !is_valid_date(date) {
        return Err("date must be a valid YYYY-MM-DD day");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("      ").is_err());
        assert!(validate_password(&"x".repeat(257)).is_err());
    }

    #[test]
    fn submission_date_rules() {
        assert!(validate_submission_date("2024-02-29").is_ok());
        assert!(validate_submission_date("2023-02-29").is_err());
        assert!(validate_submission_date("2024-1-5").is_err());
        assert!(validate_submission_date("").is_err());
    }
}
