//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{LoginCredentials, NewUser, UpdateUser};

/// Validate a first or last name
pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }

    if value.chars().count() > 100 {
        return Err(format!("{field} must be at most 100 characters long"));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
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

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a registration or user creation payload
pub fn validate_new_user(user: &NewUser) -> Result<(), String> {
    validate_name("First name", &user.first_name)?;
    validate_name("Last name", &user.last_name)?;
    validate_email(&user.email)?;
    validate_password(&user.password)
}

/// Validate a profile update payload
pub fn validate_update(update: &UpdateUser) -> Result<(), String> {
    validate_name("First name", &update.first_name)?;
    validate_name("Last name", &update.last_name)?;
    validate_email(&update.email)
}

/// Validate login credentials
pub fn validate_credentials(credentials: &LoginCredentials) -> Result<(), String> {
    validate_email(&credentials.email)?;
    validate_password(&credentials.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b").is_err());
    }

    #[test]
    fn test_validate_password_has_no_complexity_rule() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_new_user_reports_first_problem() {
        let user = NewUser {
            first_name: "A".to_string(),
            last_name: "  ".to_string(),
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        };
        assert_eq!(
            validate_new_user(&user).unwrap_err(),
            "Last name is required"
        );
    }
}
