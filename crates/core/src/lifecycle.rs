// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The ride lifecycle rule.
//!
//! Every persisted change to a ride's status passes through
//! [`apply_status_transition`] before the write is committed. The rule is
//! side-effect-only: it stamps timestamps and flips the driver's availability
//! flag, but it does NOT restrict which transitions are permitted. A ride may
//! jump straight from `scheduled` to `completed`; doing so records an end
//! time without a start time ever being stamped here. That permissive
//! behavior is compatibility with the original system and must be preserved.
//!
//! The caller is responsible for reading `previous_status` from the durable
//! store (never from client-supplied data) and for committing the ride and
//! the driver in a single transaction.

use crate::error::CoreError;
use rideline_domain::{Ride, RideStatus, User};
use time::OffsetDateTime;
use time::format_description::well_known::Iso8601;

/// What a status transition actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    /// No timestamp or availability side effect was performed.
    NoChange,
    /// The ride entered `in_progress`: start time stamped, driver marked
    /// unavailable.
    Started,
    /// The ride entered `completed`: end time stamped, driver marked
    /// available.
    Completed,
}

impl TransitionEffect {
    /// Returns whether the driver's availability flag was mutated and must be
    /// persisted alongside the ride.
    #[must_use]
    pub const fn driver_changed(&self) -> bool {
        matches!(self, Self::Started | Self::Completed)
    }
}

/// Formats a timestamp as ISO 8601 for storage.
///
/// # Errors
///
/// Returns `CoreError::Internal` if formatting fails.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, CoreError> {
    timestamp
        .format(&Iso8601::DEFAULT)
        .map_err(|e| CoreError::Internal(format!("Failed to format timestamp: {e}")))
}

/// Applies the status-transition side effects to a ride and its driver.
///
/// * entering `in_progress` (from any other status) stamps `start_time` with
///   `now` and marks the driver unavailable
/// * entering `completed` (from any other status) stamps `end_time` with
///   `now` and marks the driver available
/// * every other transition, including a repeat of the current status,
///   changes neither timestamps nor availability
///
/// The ride and driver are mutated in place; persistence of both records in
/// one atomic unit is the caller's responsibility.
///
/// # Arguments
///
/// * `ride` - The ride as it is about to be persisted
/// * `driver` - The driver assigned to the ride
/// * `previous_status` - The status read from the durable store
/// * `now` - The current time
///
/// # Errors
///
/// Returns `CoreError::Internal` if the timestamp cannot be formatted.
pub fn apply_status_transition(
    ride: &mut Ride,
    driver: &mut User,
    previous_status: RideStatus,
    now: OffsetDateTime,
) -> Result<TransitionEffect, CoreError> {
    match ride.status {
        RideStatus::InProgress if previous_status != RideStatus::InProgress => {
            ride.start_time = format_timestamp(now)?;
            driver.is_available = false;
            Ok(TransitionEffect::Started)
        }
        RideStatus::Completed if previous_status != RideStatus::Completed => {
            ride.end_time = Some(format_timestamp(now)?);
            driver.is_available = true;
            Ok(TransitionEffect::Completed)
        }
        RideStatus::Scheduled | RideStatus::InProgress | RideStatus::Completed => {
            Ok(TransitionEffect::NoChange)
        }
    }
}
