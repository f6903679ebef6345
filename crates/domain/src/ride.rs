// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::coordinate::Coordinate;
use crate::ride_status::RideStatus;
use serde::{Deserialize, Serialize};

/// A trip record linking one rider and one driver.
///
/// `ride_id` is the canonical identifier assigned by the database; `None`
/// indicates the ride has not been persisted yet. All timestamps are ISO 8601
/// strings in UTC.
///
/// Invariant: `end_time` is `None` while the status is not `completed`. The
/// lifecycle rule in the core crate is the only place that stamps
/// `start_time`/`end_time` on a status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// Canonical identifier (opaque, stable, immutable once assigned).
    pub ride_id: Option<i64>,
    /// The user who booked the ride. Must hold the rider role.
    pub rider_id: i64,
    /// The user carrying out the ride. Must hold the driver role.
    pub driver_id: i64,
    /// The lifecycle status.
    pub status: RideStatus,
    /// Human-readable pickup label.
    pub start_location: String,
    /// Human-readable dropoff label.
    pub end_location: String,
    /// Pickup point.
    pub pickup: Coordinate,
    /// Dropoff point.
    pub dropoff: Coordinate,
    /// Scheduled or actual start of the ride (ISO 8601).
    pub start_time: String,
    /// Actual end of the ride (ISO 8601). `None` until completed.
    pub end_time: Option<String>,
    /// When the record was created (ISO 8601).
    pub created_at: String,
    /// When the record was last updated (ISO 8601).
    pub updated_at: String,
}

impl Ride {
    /// Creates a new `Ride` without a persisted `ride_id`, in `scheduled`
    /// status with no end time.
    ///
    /// # Arguments
    ///
    /// * `rider_id` - The rider's user ID
    /// * `driver_id` - The driver's user ID
    /// * `start_location` - Human-readable pickup label
    /// * `end_location` - Human-readable dropoff label
    /// * `pickup` - Pickup coordinate
    /// * `dropoff` - Dropoff coordinate
    /// * `start_time` - Scheduled start (ISO 8601)
    /// * `created_at` - Creation timestamp (ISO 8601)
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rider_id: i64,
        driver_id: i64,
        start_location: String,
        end_location: String,
        pickup: Coordinate,
        dropoff: Coordinate,
        start_time: String,
        created_at: String,
    ) -> Self {
        Self {
            ride_id: None,
            rider_id,
            driver_id,
            status: RideStatus::Scheduled,
            start_location,
            end_location,
            pickup,
            dropoff,
            start_time,
            end_time: None,
            updated_at: created_at.clone(),
            created_at,
        }
    }

    /// Creates a `Ride` with an existing `ride_id` (from persistence).
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn with_id(
        ride_id: i64,
        rider_id: i64,
        driver_id: i64,
        status: RideStatus,
        start_location: String,
        end_location: String,
        pickup: Coordinate,
        dropoff: Coordinate,
        start_time: String,
        end_time: Option<String>,
        created_at: String,
        updated_at: String,
    ) -> Self {
        Self {
            ride_id: Some(ride_id),
            rider_id,
            driver_id,
            status,
            start_location,
            end_location,
            pickup,
            dropoff,
            start_time,
            end_time,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ride() -> Ride {
        Ride::new(
            1,
            2,
            String::from("Location A"),
            String::from("Location B"),
            Coordinate::new(37.7749, -122.4194).expect("valid pickup"),
            Coordinate::new(37.8044, -122.2712).expect("valid dropoff"),
            String::from("2026-01-01T10:00:00Z"),
            String::from("2026-01-01T09:00:00Z"),
        )
    }

    #[test]
    fn test_new_ride_is_scheduled_with_no_end_time() {
        let ride = sample_ride();
        assert_eq!(ride.status, RideStatus::Scheduled);
        assert!(ride.ride_id.is_none());
        assert!(ride.end_time.is_none());
        assert_eq!(ride.created_at, ride.updated_at);
    }
}
