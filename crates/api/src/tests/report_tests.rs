// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the trip-duration report handler.
//!
//! Event timestamps are seeded directly through persistence so the
//! pickup-to-dropoff spans are under test control.

use super::helpers::{
    create_admin, create_driver, create_rider, create_test_persistence, ride_request,
};
use crate::handlers::{create_ride, trip_duration_report};
use crate::request_response::TripDurationEntry;

#[test]
fn test_report_returns_rows_for_long_trips_only() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");

    let long_trip = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();
    persistence
        .append_ride_event(
            long_trip.ride_id,
            "2026-02-01T10:00:00.000000000Z",
            "Status changed to in_progress",
        )
        .unwrap();
    persistence
        .append_ride_event(
            long_trip.ride_id,
            "2026-02-01T12:00:00.000000000Z",
            "Status changed to completed",
        )
        .unwrap();

    let short_trip = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();
    persistence
        .append_ride_event(
            short_trip.ride_id,
            "2026-02-02T10:00:00.000000000Z",
            "Status changed to in_progress",
        )
        .unwrap();
    persistence
        .append_ride_event(
            short_trip.ride_id,
            "2026-02-02T10:20:00.000000000Z",
            "Status changed to completed",
        )
        .unwrap();

    let report = trip_duration_report(&mut persistence, &admin).unwrap();

    assert_eq!(
        report.rows,
        vec![TripDurationEntry {
            month: String::from("2026-02"),
            driver: String::from("driver_one"),
            trips: 1,
        }]
    );
}

#[test]
fn test_report_is_empty_without_qualifying_trips() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);

    let report = trip_duration_report(&mut persistence, &admin).unwrap();

    assert!(report.rows.is_empty());
}
