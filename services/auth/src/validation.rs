//! Input validation utilities

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::ServiceError;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_EMAIL_LENGTH: usize = 120;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Validate a first or last name
pub fn validate_name(name: &str) -> Result<(), String> {
    let length = name.trim().chars().count();
    if length == 0 {
        return Err("Name is required".to_string());
    }

    if length > MAX_NAME_LENGTH {
        return Err(format!(
            "Name must be at most {} characters long",
            MAX_NAME_LENGTH
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Email must be at most {} characters long",
            MAX_EMAIL_LENGTH
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LENGTH
        ));
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else if !c.is_alphanumeric() {
            has_special = true;
        }
    }

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    if !has_special {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

pub fn validate_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    if password != confirmation {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

/// Collects the failing fields of a form
#[derive(Debug, Default)]
pub struct FormValidator {
    errors: BTreeMap<String, String>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the first failure of each field
    pub fn check(mut self, field: &str, result: Result<(), String>) -> Self {
        if let Err(message) = result {
            self.errors.entry(field.to_string()).or_insert(message);
        }
        self
    }

    pub fn finish(self) -> Result<(), ServiceError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::IncorrectInput(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(50)).is_ok());
        assert!(validate_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_emails() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("not an email").is_err());
        let long = format!("{}@example.com", "a".repeat(110));
        assert_eq!(
            validate_email(&long),
            Err("Email must be at most 120 characters long".to_string())
        );
    }

    #[test]
    fn test_passwords() {
        assert!(validate_password("Sup3r$ecret").is_ok());
        assert!(validate_password("Sh0r$").is_err());
        assert!(validate_password("nouppercase1$").is_err());
        assert!(validate_password("NOLOWERCASE1$").is_err());
        assert!(validate_password("NoDigits$$").is_err());
        assert!(validate_password("NoSpecial123").is_err());
        assert!(validate_password(&format!("Aa1${}", "x".repeat(125))).is_err());
    }

    #[test]
    fn test_form_validator_collects_fields() {
        let result = FormValidator::new()
            .check("first_name", validate_name("Ada"))
            .check("email", validate_email("nope"))
            .check("password", validate_password("weak"))
            .check("password_confirmation", validate_confirmation("a", "b"))
            .finish();

        match result {
            Err(ServiceError::IncorrectInput(fields)) => {
                assert_eq!(fields.len(), 3);
                assert_eq!(fields["email"], "Invalid email format");
                assert_eq!(fields["password_confirmation"], "Passwords do not match");
                assert!(!fields.contains_key("first_name"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
