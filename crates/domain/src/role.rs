// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User roles.
//!
//! Roles are a closed enumeration matched exhaustively at every
//! authorization check. Adding a role is a compile-time-checked change.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role held by a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrators may see and manage all rides, ride events, accounts,
    /// and reports.
    Admin,
    /// Drivers carry out rides. A driver may update the rides assigned to
    /// them; the lifecycle rule flips their availability flag.
    Driver,
    /// Riders book rides and may only see their own. Default role for
    /// self-registration.
    #[default]
    Rider,
}

impl Role {
    /// Returns the string representation of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Driver => "driver",
            Self::Rider => "rider",
        }
    }

    /// Parses a role from a string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRole` if the string is not a valid role.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "admin" => Ok(Self::Admin),
            "driver" => Ok(Self::Driver),
            "rider" => Ok(Self::Rider),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }

    /// Returns whether this role is the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns whether this role is the driver role.
    #[must_use]
    pub const fn is_driver(&self) -> bool {
        matches!(self, Self::Driver)
    }

    /// Returns whether this role is the rider role.
    #[must_use]
    pub const fn is_rider(&self) -> bool {
        matches!(self, Self::Rider)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
