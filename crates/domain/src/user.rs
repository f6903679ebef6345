// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::role::Role;
use serde::{Deserialize, Serialize};

/// A user account.
///
/// `user_id` is the canonical internal identifier. Usernames are unique and
/// normalized to lowercase for case-insensitive lookup. Password hashes never
/// appear on this type; they live on the persistence layer's account DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Canonical internal identifier. `None` before first persistence.
    pub user_id: Option<i64>,
    /// Unique login name, normalized to lowercase.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// The role this user holds.
    pub role: Role,
    /// Driver availability flag. Flipped by the ride lifecycle rule when a
    /// ride assigned to this user starts or completes. Meaningless for
    /// non-driver roles but carried on every account.
    pub is_available: bool,
}

impl User {
    /// Creates a new `User` without a persisted `user_id`.
    ///
    /// Usernames are normalized to lowercase. New accounts start available.
    ///
    /// # Arguments
    ///
    /// * `username` - Unique login name
    /// * `email` - Contact email address
    /// * `role` - The role this user holds
    #[must_use]
    pub fn new(username: &str, email: String, role: Role) -> Self {
        Self {
            user_id: None,
            username: username.to_lowercase(),
            email,
            role,
            is_available: true,
        }
    }

    /// Creates a `User` with an existing `user_id` (from persistence).
    #[must_use]
    pub fn with_id(
        user_id: i64,
        username: &str,
        email: String,
        role: Role,
        is_available: bool,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            username: username.to_lowercase(),
            email,
            role,
            is_available,
        }
    }

    /// Validates that this user holds the required role.
    ///
    /// Used when a ride references a user as its rider or driver.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RoleMismatch` if the user holds a different role,
    /// or `DomainError::UserNotFound` if the user has no persisted ID.
    pub fn require_role(&self, required: Role) -> Result<(), DomainError> {
        let user_id = self.user_id.ok_or(DomainError::UserNotFound(0))?;
        if self.role == required {
            Ok(())
        } else {
            Err(DomainError::RoleMismatch {
                user_id,
                required_role: required.as_str().to_string(),
                actual_role: self.role.as_str().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_normalized_to_lowercase() {
        let user = User::new("RiderOne", String::from("rider@example.com"), Role::Rider);
        assert_eq!(user.username, "riderone");
    }

    #[test]
    fn test_require_role_matches() {
        let driver = User::with_id(
            7,
            "driver1",
            String::from("driver@example.com"),
            Role::Driver,
            true,
        );
        assert!(driver.require_role(Role::Driver).is_ok());
    }

    #[test]
    fn test_require_role_mismatch() {
        let rider = User::with_id(
            3,
            "rider1",
            String::from("rider@example.com"),
            Role::Rider,
            true,
        );
        match rider.require_role(Role::Driver) {
            Err(DomainError::RoleMismatch {
                user_id,
                required_role,
                actual_role,
            }) => {
                assert_eq!(user_id, 3);
                assert_eq!(required_role, "driver");
                assert_eq!(actual_role, "rider");
            }
            other => panic!("Expected RoleMismatch, got {other:?}"),
        }
    }
}
