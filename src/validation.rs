//! Request validation helpers.
//!
//! Handlers collect every failed rule with a [`Validator`] so clients get the
//! full list of problems in one response instead of fixing them one by one.

use std::str::FromStr;

use email_address::EmailAddress;

use crate::error::{AppError, ErrorItem};

/// Maximum accepted amount in minor units (one quadrillion).
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Accumulates validation failures.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ErrorItem>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `code` unless `ok` holds.
    pub fn check(&mut self, ok: bool, code: &str, description: &str) -> &mut Self {
        if !ok {
            self.errors.push(ErrorItem::new(code, description));
        }
        self
    }

    /// Require a trimmed, non-empty string of at most `max` characters.
    pub fn text(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.errors.push(ErrorItem::new(
                format!("{field}_required"),
                format!("{field} must not be empty"),
            ));
        } else if trimmed.chars().count() > max {
            self.errors.push(ErrorItem::new(
                format!("{field}_too_long"),
                format!("{field} must be at most {max} characters"),
            ));
        }
        self
    }

    /// Require a money amount in `1..=MAX_AMOUNT`.
    pub fn amount(&mut self, field: &str, value: i64) -> &mut Self {
        if value <= 0 || value > MAX_AMOUNT {
            self.errors.push(ErrorItem::new(
                format!("invalid_{field}"),
                format!("{field} must be between 1 and {MAX_AMOUNT}"),
            ));
        }
        self
    }

    pub fn email(&mut self, value: &str) -> &mut Self {
        self.check(
            is_valid_email(value),
            "invalid_email",
            "email is not a valid address",
        )
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        if let Some(problem) = password_problem(value) {
            self.errors.push(ErrorItem::new(
                "weak_password",
                format!("{field} {problem}"),
            ));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// RFC 5322 address check via `email_address`, additionally requiring a
/// dotted domain so addresses like `budi@localhost` are refused.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 255
        && EmailAddress::from_str(email).is_ok_and(|address| {
            let domain = address.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        })
}

fn password_problem(password: &str) -> Option<&'static str> {
    if password.chars().count() < 8 {
        Some("must be at least 8 characters")
    } else if password.len() > 72 {
        // bcrypt ignores everything past 72 bytes
        Some("must be at most 72 bytes")
    } else if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        Some("must contain a letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("must contain a digit")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("budi@example.co.id"));
        assert!(!is_valid_email("budi.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("budi@localhost"));
        assert!(!is_valid_email("budi @example.com"));
        assert!(!is_valid_email("a@b@example.com"));
        assert!(!is_valid_email("budi@example..com"));
        assert!(is_valid_email("budi.santoso+tag@example.com"));
    }

    #[test]
    fn password_rules() {
        assert_eq!(password_problem("s3cretpass"), None);
        assert_eq!(password_problem("short1"), Some("must be at least 8 characters"));
        assert_eq!(password_problem("12345678"), Some("must contain a letter"));
        assert_eq!(password_problem("abcdefgh"), Some("must contain a digit"));
    }

    #[test]
    fn collects_all_failures() {
        let err = Validator::new()
            .text("name", "   ", 100)
            .email("nope")
            .amount("amount", 0)
            .finish()
            .unwrap_err();

        match err {
            AppError::Validation(items) => {
                let codes: Vec<_> = items.iter().map(|i| i.error_code.as_str()).collect();
                assert_eq!(codes, ["name_required", "invalid_email", "invalid_amount"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn passes_when_everything_is_valid() {
        assert!(
            Validator::new()
                .text("name", "Budi", 100)
                .email("budi@example.com")
                .password("password", "s3cretpass")
                .amount("amount", 10_000)
                .finish()
                .is_ok()
        );
    }
}
