// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Password policy validation.
//!
//! Applied at self-registration, admin account creation, and password
//! change. The policy is deliberately simple: a minimum length, a minimum
//! number of character classes, and a ban on passwords that equal the
//! account's username or email.

use thiserror::Error;

/// Ways a candidate password can fail the policy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    /// Password is shorter than the minimum.
    #[error("Password must be at least {min_length} characters long")]
    TooShort { min_length: usize },

    /// Password draws on too few character classes.
    #[error(
        "Password must contain at least {required} of the following: uppercase letter, lowercase letter, digit, symbol (found {found})"
    )]
    InsufficientComplexity { required: usize, found: usize },

    /// Password equals the account's username or email.
    #[error("Password must not match {field}")]
    MatchesForbiddenField { field: String },

    /// Password and its confirmation differ.
    #[error("Password and confirmation do not match")]
    ConfirmationMismatch,
}

/// Password policy configuration.
pub struct PasswordPolicy {
    /// Minimum password length in bytes.
    pub min_length: usize,
    /// Minimum number of character classes (of 4) the password must draw on.
    pub min_complexity: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 12,
            min_complexity: 3,
        }
    }
}

impl PasswordPolicy {
    /// Validates a candidate password.
    ///
    /// Checks run in order: confirmation match, length, complexity, then the
    /// forbidden-value comparison (case-insensitive against the username and
    /// email). The first failure is reported.
    ///
    /// # Errors
    ///
    /// Returns the corresponding `PasswordPolicyError` for the first check
    /// that fails.
    pub fn validate(
        &self,
        password: &str,
        confirmation: &str,
        username: &str,
        email: &str,
    ) -> Result<(), PasswordPolicyError> {
        if password != confirmation {
            return Err(PasswordPolicyError::ConfirmationMismatch);
        }

        if password.len() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        let found: usize = Self::character_classes(password);
        if found < self.min_complexity {
            return Err(PasswordPolicyError::InsufficientComplexity {
                required: self.min_complexity,
                found,
            });
        }

        let lowered: String = password.to_lowercase();
        for (field, forbidden) in [("username", username), ("email", email)] {
            if lowered == forbidden.to_lowercase() {
                return Err(PasswordPolicyError::MatchesForbiddenField {
                    field: field.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Counts how many of the four character classes (uppercase, lowercase,
    /// digit, symbol) the password draws on.
    fn character_classes(password: &str) -> usize {
        let classes: [fn(char) -> bool; 4] = [
            |c| c.is_ascii_uppercase(),
            |c| c.is_ascii_lowercase(),
            |c| c.is_ascii_digit(),
            |c| c.is_ascii_graphic() && !c.is_ascii_alphanumeric(),
        ];
        classes
            .iter()
            .filter(|class| password.chars().any(|c| class(c)))
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn check(password: &str) -> Result<(), PasswordPolicyError> {
        PasswordPolicy::default().validate(password, password, "ann", "ann@example.com")
    }

    #[test]
    fn test_valid_passwords() {
        // All four classes.
        assert!(check("MyP@ssw0rd123").is_ok());
        // Three of four is enough.
        assert!(check("MyPassword123").is_ok());
        // Exactly at the minimum length.
        assert!(check("MyPass123!ab").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            check("Short1!"),
            Err(PasswordPolicyError::TooShort { min_length: 12 })
        );
    }

    #[test]
    fn test_insufficient_complexity() {
        assert_eq!(
            check("alllowercase"),
            Err(PasswordPolicyError::InsufficientComplexity {
                required: 3,
                found: 1
            })
        );
        assert_eq!(
            check("OnlyLettersHere"),
            Err(PasswordPolicyError::InsufficientComplexity {
                required: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_matches_username_case_insensitively() {
        let result = PasswordPolicy::default().validate(
            "AnnRider123!",
            "AnnRider123!",
            "annrider123!",
            "ann@example.com",
        );
        assert_eq!(
            result,
            Err(PasswordPolicyError::MatchesForbiddenField {
                field: String::from("username")
            })
        );
    }

    #[test]
    fn test_matches_email_case_insensitively() {
        let result = PasswordPolicy::default().validate(
            "Ann@Example.com1",
            "Ann@Example.com1",
            "ann",
            "ann@example.com1",
        );
        assert_eq!(
            result,
            Err(PasswordPolicyError::MatchesForbiddenField {
                field: String::from("email")
            })
        );
    }

    #[test]
    fn test_confirmation_mismatch() {
        let result = PasswordPolicy::default().validate(
            "MyP@ssw0rd123",
            "MyP@ssw0rd124",
            "ann",
            "ann@example.com",
        );
        assert_eq!(result, Err(PasswordPolicyError::ConfirmationMismatch));
    }

    #[test]
    fn test_character_class_counting() {
        assert_eq!(PasswordPolicy::character_classes("Aa1!"), 4);
        assert_eq!(PasswordPolicy::character_classes("Aa1"), 3);
        assert_eq!(PasswordPolicy::character_classes("abc!"), 2);
        assert_eq!(PasswordPolicy::character_classes("abc"), 1);
        assert_eq!(PasswordPolicy::character_classes(""), 0);
    }
}
