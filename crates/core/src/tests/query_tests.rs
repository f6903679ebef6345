// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for ride query filtering, ordering, and scope restriction.

use super::helpers::{coord, ride_ids, view, view_with_pickup};
use crate::error::CoreError;
use crate::query::{QueryContext, RideOrdering, RideQueryOptions, query_rides};
use rideline_domain::{RideStatus, Role};

fn admin() -> QueryContext {
    QueryContext::new(1, Role::Admin)
}

#[test]
fn test_status_filter_returns_only_matching_rides() {
    let views = vec![
        view(1, 10, "ann@example.com", RideStatus::Completed),
        view(2, 10, "ann@example.com", RideStatus::Scheduled),
        view(3, 11, "bob@example.com", RideStatus::Completed),
    ];
    let options = RideQueryOptions {
        status: Some(RideStatus::Completed),
        ..RideQueryOptions::default()
    };

    let result = query_rides(views, &options, &admin()).expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![1, 3]);
}

#[test]
fn test_email_filter_is_case_insensitive_substring() {
    let views = vec![
        view(1, 10, "Anna@Example.com", RideStatus::Scheduled),
        view(2, 11, "bob@example.com", RideStatus::Scheduled),
        view(3, 12, "joanne@example.com", RideStatus::Scheduled),
    ];
    let options = RideQueryOptions {
        rider_email_contains: Some(String::from("ann")),
        ..RideQueryOptions::default()
    };

    let result = query_rides(views, &options, &admin()).expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![1, 3]);
}

#[test]
fn test_combined_filters_intersect() {
    let views = vec![
        view(1, 10, "ann@example.com", RideStatus::Completed),
        view(2, 10, "ann@example.com", RideStatus::Scheduled),
        view(3, 11, "bob@example.com", RideStatus::Completed),
    ];
    let options = RideQueryOptions {
        status: Some(RideStatus::Completed),
        rider_email_contains: Some(String::from("ann")),
        ..RideQueryOptions::default()
    };

    let result = query_rides(views, &options, &admin()).expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![1]);
}

#[test]
fn test_natural_order_preserves_input_order() {
    let views = vec![
        view(3, 10, "ann@example.com", RideStatus::Scheduled),
        view(1, 10, "ann@example.com", RideStatus::Scheduled),
        view(2, 10, "ann@example.com", RideStatus::Scheduled),
    ];

    let result = query_rides(views, &RideQueryOptions::default(), &admin())
        .expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![3, 1, 2]);
}

#[test]
fn test_pickup_time_orders_ascending_by_start_time() {
    let mut late = view(1, 10, "ann@example.com", RideStatus::Scheduled);
    late.ride.start_time = String::from("2026-03-01T10:00:00.000000000Z");
    let mut early = view(2, 10, "ann@example.com", RideStatus::Scheduled);
    early.ride.start_time = String::from("2026-01-01T10:00:00.000000000Z");
    let mut mid = view(3, 10, "ann@example.com", RideStatus::Scheduled);
    mid.ride.start_time = String::from("2026-02-01T10:00:00.000000000Z");

    let options = RideQueryOptions {
        order_by: RideOrdering::PickupTime,
        ..RideQueryOptions::default()
    };

    let result = query_rides(vec![late, early, mid], &options, &admin())
        .expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![2, 3, 1]);
}

#[test]
fn test_distance_order_annotates_and_sorts() {
    let reference = coord(37.7750, -122.4195);
    let near = view_with_pickup(1, 10, "ann@example.com", coord(37.7749, -122.4194));
    let far = view_with_pickup(2, 10, "ann@example.com", coord(37.8044, -122.2712));

    let options = RideQueryOptions {
        order_by: RideOrdering::Distance,
        reference: Some(reference),
        ..RideQueryOptions::default()
    };

    let result = query_rides(vec![far, near], &options, &admin()).expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![1, 2]);
    let near_distance = result[0].distance_km.expect("distance annotated");
    let far_distance = result[1].distance_km.expect("distance annotated");
    assert!(near_distance > 0.0);
    assert!((near_distance - 0.014).abs() < 0.005);
    assert!(far_distance > near_distance);
}

#[test]
fn test_distance_order_without_reference_is_missing_parameter() {
    let views = vec![view(1, 10, "ann@example.com", RideStatus::Scheduled)];
    let options = RideQueryOptions {
        order_by: RideOrdering::Distance,
        ..RideQueryOptions::default()
    };

    let result = query_rides(views, &options, &admin());

    match result {
        Err(CoreError::MissingParameter { parameter }) => {
            assert!(parameter.contains("reference"));
        }
        other => panic!("Expected MissingParameter, got {other:?}"),
    }
}

#[test]
fn test_non_admin_only_sees_own_rides() {
    let views = vec![
        view(1, 10, "ann@example.com", RideStatus::Scheduled),
        view(2, 11, "bob@example.com", RideStatus::Scheduled),
        view(3, 10, "ann@example.com", RideStatus::Completed),
    ];
    let rider = QueryContext::new(10, Role::Rider);

    let result = query_rides(views, &RideQueryOptions::default(), &rider)
        .expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![1, 3]);
}

#[test]
fn test_scope_restriction_beats_broad_filters() {
    // Filters that would match other riders' rides still never surface them.
    let views = vec![
        view(1, 10, "ann@example.com", RideStatus::Completed),
        view(2, 11, "ann-other@example.com", RideStatus::Completed),
    ];
    let rider = QueryContext::new(10, Role::Rider);
    let options = RideQueryOptions {
        status: Some(RideStatus::Completed),
        rider_email_contains: Some(String::from("ann")),
        ..RideQueryOptions::default()
    };

    let result = query_rides(views, &options, &rider).expect("query should succeed");

    assert_eq!(ride_ids(&result), vec![1]);
}

#[test]
fn test_driver_scope_is_rider_based() {
    // A driver querying sees only rides where they are the rider, which for
    // a pure driver account is none.
    let views = vec![
        view(1, 10, "ann@example.com", RideStatus::Scheduled),
        view(2, 11, "bob@example.com", RideStatus::Scheduled),
    ];
    let driver = QueryContext::new(50, Role::Driver);

    let result = query_rides(views, &RideQueryOptions::default(), &driver)
        .expect("query should succeed");

    assert!(result.is_empty());
}

#[test]
fn test_empty_input_is_fine() {
    let result = query_rides(Vec::new(), &RideQueryOptions::default(), &admin())
        .expect("query should succeed");
    assert!(result.is_empty());
}
