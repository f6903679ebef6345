// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rideline_domain::{Role, User};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Stored account record.
///
/// This is the persistence-layer view of a user: it carries the password hash
/// and bookkeeping timestamps that never appear on the domain `User` type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountData {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_available: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl AccountData {
    /// Converts this account into the domain `User` it backs.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if the stored role string is
    /// not a recognized role.
    pub fn to_user(&self) -> Result<User, PersistenceError> {
        let role: Role = Role::parse(&self.role)
            .map_err(|e| PersistenceError::CorruptRecord(e.to_string()))?;
        Ok(User::with_id(
            self.user_id,
            &self.username,
            self.email.clone(),
            role,
            self.is_available,
        ))
    }
}

/// Stored session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// One row of the trip-duration report: rides per driver per month whose
/// pickup-to-dropoff span exceeded one hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDurationRow {
    /// Month the dropoff event fell in, formatted `YYYY-MM`.
    pub month: String,
    /// The driver's username.
    pub driver: String,
    /// Number of qualifying trips.
    pub trips: i64,
}
