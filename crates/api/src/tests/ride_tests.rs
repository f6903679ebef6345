// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for ride creation and the guarded update path: lifecycle side
//! effects, silent read-only field reversion, and event emission.

use super::helpers::{
    create_admin, create_driver, create_rider, create_test_persistence, ride_request,
};
use crate::error::ApiError;
use crate::handlers::{create_ride, get_ride, update_ride};
use crate::request_response::UpdateRideRequest;

fn status_update(status: &str) -> UpdateRideRequest {
    UpdateRideRequest {
        status: Some(status.to_string()),
        ..UpdateRideRequest::default()
    }
}

#[test]
fn test_create_ride_starts_scheduled() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");

    let info = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    assert_eq!(info.status, "scheduled");
    assert_eq!(info.rider_email, "ann@example.com");
    assert!(info.end_time.is_none());
    assert!(persistence.get_ride(info.ride_id).unwrap().is_some());
}

#[test]
fn test_create_ride_rejects_missing_driver() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");

    let result = create_ride(&mut persistence, ride_request(rider.user_id, 999), &admin);

    match result {
        Err(ApiError::ValidationFailure { field, .. }) => assert_eq!(field, "driver_id"),
        other => panic!("Expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn test_create_ride_rejects_driver_without_driver_role() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let other_rider = create_rider(&mut persistence, "bob");

    let result = create_ride(
        &mut persistence,
        ride_request(rider.user_id, other_rider.user_id),
        &admin,
    );

    match result {
        Err(ApiError::ValidationFailure { field, .. }) => assert_eq!(field, "driver_id"),
        other => panic!("Expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn test_create_ride_rejects_out_of_range_pickup() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");

    let mut request = ride_request(rider.user_id, driver.user_id);
    request.pickup_latitude = 91.0;

    let result = create_ride(&mut persistence, request, &admin);

    match result {
        Err(ApiError::ValidationFailure { field, .. }) => assert_eq!(field, "pickup_latitude"),
        other => panic!("Expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn test_start_transition_stamps_time_and_occupies_driver() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    let updated = update_ride(
        &mut persistence,
        created.ride_id,
        status_update("in_progress"),
        &admin,
    )
    .unwrap();

    assert_eq!(updated.status, "in_progress");
    // The scheduled start was replaced with the actual start.
    assert_ne!(updated.start_time, created.start_time);
    assert!(updated.end_time.is_none());

    let account = persistence
        .get_account_by_id(driver.user_id)
        .unwrap()
        .unwrap();
    assert!(!account.is_available);

    let events = persistence.list_ride_events(created.ride_id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].description, "Status changed to in_progress");
}

#[test]
fn test_complete_transition_stamps_end_and_frees_driver() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    update_ride(
        &mut persistence,
        created.ride_id,
        status_update("in_progress"),
        &admin,
    )
    .unwrap();
    let completed = update_ride(
        &mut persistence,
        created.ride_id,
        status_update("completed"),
        &admin,
    )
    .unwrap();

    assert_eq!(completed.status, "completed");
    assert!(completed.end_time.is_some());

    let account = persistence
        .get_account_by_id(driver.user_id)
        .unwrap()
        .unwrap();
    assert!(account.is_available);

    let events = persistence.list_ride_events(created.ride_id).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].description, "Status changed to completed");
}

#[test]
fn test_direct_scheduled_to_completed_jump_is_permitted() {
    // No transition ordering is enforced; the jump records an end time
    // without the start time ever being stamped.
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    let completed = update_ride(
        &mut persistence,
        created.ride_id,
        status_update("completed"),
        &admin,
    )
    .unwrap();

    assert_eq!(completed.status, "completed");
    assert_eq!(completed.start_time, created.start_time);
    assert!(completed.end_time.is_some());
}

#[test]
fn test_repeated_status_changes_nothing() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    let started = update_ride(
        &mut persistence,
        created.ride_id,
        status_update("in_progress"),
        &admin,
    )
    .unwrap();
    let repeated = update_ride(
        &mut persistence,
        created.ride_id,
        status_update("in_progress"),
        &admin,
    )
    .unwrap();

    assert_eq!(repeated.start_time, started.start_time);
    assert!(repeated.end_time.is_none());

    // No second event for the no-op transition.
    let events = persistence.list_ride_events(created.ride_id).unwrap();
    assert_eq!(events.len(), 1);

    let account = persistence
        .get_account_by_id(driver.user_id)
        .unwrap()
        .unwrap();
    assert!(!account.is_available, "driver stays occupied");
}

#[test]
fn test_pickup_change_is_silently_reverted_while_in_progress() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();
    update_ride(
        &mut persistence,
        created.ride_id,
        status_update("in_progress"),
        &admin,
    )
    .unwrap();

    // The write is accepted; the locked fields keep their stored values.
    let request = UpdateRideRequest {
        pickup_latitude: Some(10.0),
        pickup_longitude: Some(10.0),
        start_time: Some(String::from("2030-01-01T00:00:00.000000000Z")),
        ..UpdateRideRequest::default()
    };
    let updated = update_ride(&mut persistence, created.ride_id, request, &admin).unwrap();

    assert!((updated.pickup_latitude - 37.7749).abs() < 1e-9);
    assert!((updated.pickup_longitude - (-122.4194)).abs() < 1e-9);
    assert_ne!(updated.start_time, "2030-01-01T00:00:00.000000000Z");

    let stored = persistence.get_ride(created.ride_id).unwrap().unwrap();
    assert!((stored.pickup.latitude() - 37.7749).abs() < 1e-9);
}

#[test]
fn test_driver_change_is_silently_reverted_while_in_progress() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let other_driver = create_driver(&mut persistence, "driver_two");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();
    update_ride(
        &mut persistence,
        created.ride_id,
        status_update("in_progress"),
        &admin,
    )
    .unwrap();

    let request = UpdateRideRequest {
        driver_id: Some(other_driver.user_id),
        ..UpdateRideRequest::default()
    };
    let updated = update_ride(&mut persistence, created.ride_id, request, &admin).unwrap();

    assert_eq!(updated.driver_id, driver.user_id);
}

#[test]
fn test_driver_can_be_reassigned_while_scheduled() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let other_driver = create_driver(&mut persistence, "driver_two");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    let request = UpdateRideRequest {
        driver_id: Some(other_driver.user_id),
        ..UpdateRideRequest::default()
    };
    let updated = update_ride(&mut persistence, created.ride_id, request, &admin).unwrap();

    assert_eq!(updated.driver_id, other_driver.user_id);
}

#[test]
fn test_dropoff_stays_editable_while_in_progress() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();
    update_ride(
        &mut persistence,
        created.ride_id,
        status_update("in_progress"),
        &admin,
    )
    .unwrap();

    let request = UpdateRideRequest {
        dropoff_latitude: Some(37.8715),
        dropoff_longitude: Some(-122.2730),
        ..UpdateRideRequest::default()
    };
    let updated = update_ride(&mut persistence, created.ride_id, request, &admin).unwrap();

    assert!((updated.dropoff_latitude - 37.8715).abs() < 1e-9);
}

#[test]
fn test_update_unknown_ride_is_not_found() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);

    let result = update_ride(&mut persistence, 999, status_update("in_progress"), &admin);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_update_rejects_unknown_status() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    let result = update_ride(
        &mut persistence,
        created.ride_id,
        status_update("cancelled"),
        &admin,
    );

    match result {
        Err(ApiError::ValidationFailure { field, .. }) => assert_eq!(field, "status"),
        other => panic!("Expected ValidationFailure, got {other:?}"),
    }
}

#[test]
fn test_get_ride_returns_rider_email() {
    let mut persistence = create_test_persistence();
    let admin = create_admin(&mut persistence);
    let rider = create_rider(&mut persistence, "ann");
    let driver = create_driver(&mut persistence, "driver_one");
    let created = create_ride(
        &mut persistence,
        ride_request(rider.user_id, driver.user_id),
        &admin,
    )
    .unwrap();

    let fetched = get_ride(&mut persistence, created.ride_id, &admin).unwrap();

    assert_eq!(fetched.ride_id, created.ride_id);
    assert_eq!(fetched.rider_email, "ann@example.com");
}
