// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Latitude is outside the valid range of -90 to 90 degrees.
    InvalidLatitude(f64),
    /// Longitude is outside the valid range of -180 to 180 degrees.
    InvalidLongitude(f64),
    /// Ride status string is not recognized.
    InvalidRideStatus {
        /// The unrecognized status value.
        status: String,
    },
    /// Role string is not recognized.
    InvalidRole(String),
    /// Username is empty or invalid.
    InvalidUsername(String),
    /// Email address is empty or invalid.
    InvalidEmail(String),
    /// Location label is empty or invalid.
    InvalidLocation(String),
    /// A referenced ride does not exist.
    RideNotFound(i64),
    /// A referenced user does not exist.
    UserNotFound(i64),
    /// A user does not hold the role required for the reference.
    RoleMismatch {
        /// The user that was referenced.
        user_id: i64,
        /// The role the reference requires.
        required_role: String,
        /// The role the user actually holds.
        actual_role: String,
    },
    /// A timestamp could not be parsed or formatted.
    InvalidTimestamp {
        /// The offending timestamp value.
        value: String,
        /// The underlying parse/format error.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude {lat}: must be between -90 and 90")
            }
            Self::InvalidLongitude(lng) => {
                write!(f, "Invalid longitude {lng}: must be between -180 and 180")
            }
            Self::InvalidRideStatus { status } => {
                write!(f, "Invalid ride status: {status}")
            }
            Self::InvalidRole(role) => write!(f, "Invalid role: {role}"),
            Self::InvalidUsername(msg) => write!(f, "Invalid username: {msg}"),
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidLocation(msg) => write!(f, "Invalid location: {msg}"),
            Self::RideNotFound(id) => write!(f, "Ride not found: {id}"),
            Self::UserNotFound(id) => write!(f, "User not found: {id}"),
            Self::RoleMismatch {
                user_id,
                required_role,
                actual_role,
            } => {
                write!(
                    f,
                    "User {user_id} has role {actual_role}, but {required_role} is required"
                )
            }
            Self::InvalidTimestamp { value, reason } => {
                write!(f, "Invalid timestamp '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
