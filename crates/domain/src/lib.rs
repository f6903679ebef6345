// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Domain types and rule validation for Rideline.
//!
//! This crate defines the entity and value types shared across the system:
//! rides, ride events, users, roles, statuses, and coordinates. It performs
//! no I/O; validation happens at construction so that a value that exists is
//! a value that is valid.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod coordinate;
mod error;
mod ride;
mod ride_event;
mod ride_status;
mod role;
mod user;

pub use coordinate::Coordinate;
pub use error::DomainError;
pub use ride::Ride;
pub use ride_event::RideEvent;
pub use ride_status::RideStatus;
pub use role::Role;
pub use user::User;

/// Validates that a username is acceptable.
///
/// Usernames must be non-empty, at most 150 characters, and consist of
/// alphanumerics, dots, dashes, and underscores.
///
/// # Errors
///
/// Returns `DomainError::InvalidUsername` describing the violation.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.is_empty() {
        return Err(DomainError::InvalidUsername(String::from(
            "username cannot be empty",
        )));
    }
    if username.len() > 150 {
        return Err(DomainError::InvalidUsername(String::from(
            "username cannot exceed 150 characters",
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(DomainError::InvalidUsername(String::from(
            "username may only contain letters, digits, '.', '-', and '_'",
        )));
    }
    Ok(())
}

/// Validates that an email address is plausibly well-formed.
///
/// This is a structural check (single `@` with non-empty local part and a
/// domain containing a dot), not full RFC validation.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` describing the violation.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::InvalidEmail(String::from(
            "email must contain '@'",
        )));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(DomainError::InvalidEmail(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(())
}

/// Validates that a location label is acceptable.
///
/// # Errors
///
/// Returns `DomainError::InvalidLocation` if the label is empty or longer
/// than 255 characters.
pub fn validate_location(label: &str) -> Result<(), DomainError> {
    if label.trim().is_empty() {
        return Err(DomainError::InvalidLocation(String::from(
            "location cannot be empty",
        )));
    }
    if label.len() > 255 {
        return Err(DomainError::InvalidLocation(String::from(
            "location cannot exceed 255 characters",
        )));
    }
    Ok(())
}
